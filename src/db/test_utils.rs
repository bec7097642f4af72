#![allow(dead_code)]
use crate::db::{schema, DbPool};
use crate::errors::{Error, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Fresh in-memory database with the full schema, one per test.
pub(crate) async fn setup_test_db() -> Result<DbPool> {
    let conn = Connection::open_in_memory()
        .map_err(|e| Error::Database(format!("Test DB: failed to open in-memory: {}", e)))?;
    conn.execute("PRAGMA foreign_keys = ON;", [])?;
    schema::create_tables(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub(crate) fn direct_insert_employee(
    conn: &Connection,
    name: &str,
    email: Option<&str>,
) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO employees (name, email, is_active) VALUES (?1, ?2, TRUE)",
    )?;
    Ok(stmt.insert(params![name, email])?)
}

pub(crate) fn direct_insert_job(
    conn: &Connection,
    work_order: &str,
    job_name: &str,
    customer: &str,
    total_hours: f64,
) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO jobs (work_order, job_name, customer, total_hours) VALUES (?1, ?2, ?3, ?4)",
    )?;
    Ok(stmt.insert(params![work_order, job_name, customer, total_hours])?)
}

pub(crate) fn direct_insert_section(
    conn: &Connection,
    job_id: i64,
    section_name: &str,
    estimated_hours: f64,
) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO job_sections (job_id, section_name, estimated_hours) VALUES (?1, ?2, ?3)",
    )?;
    Ok(stmt.insert(params![job_id, section_name, estimated_hours])?)
}

pub(crate) fn direct_insert_timesheet(
    conn: &Connection,
    employee_name: &str,
    work_date: NaiveDate,
) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO timesheets (employee_name, work_date) VALUES (?1, ?2)",
    )?;
    Ok(stmt.insert(params![employee_name, work_date])?)
}

pub(crate) fn direct_insert_entry(
    conn: &Connection,
    timesheet_id: i64,
    work_order: Option<&str>,
    hours: f64,
) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO timesheet_entries (timesheet_id, work_order, hours) VALUES (?1, ?2, ?3)",
    )?;
    Ok(stmt.insert(params![timesheet_id, work_order, hours])?)
}

/// Row count of a whole table, for asserting that failed writes left nothing.
pub(crate) fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count)
}
