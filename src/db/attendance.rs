use crate::db::connection::acquire;
use crate::db::{clean_opt, DbPool};
use crate::errors::Result;
use crate::models::{AttendanceRecord, AttendanceWithEmployee};
use chrono::{Datelike, Days, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Optional list filters for the attendance listing. `week` expands to the
/// seven-day range starting at the given date.
#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub employee_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub week: Option<NaiveDate>,
}

/// Request body for recording one day of attendance. Resubmitting the same
/// (employee, date) pair overwrites the stored row.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertAttendance {
    pub employee_id: i64,
    pub work_date: NaiveDate,
    #[serde(default)]
    pub hours_worked: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for editing an existing attendance row by id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAttendance {
    #[serde(default)]
    pub hours_worked: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

const ATTENDANCE_COLUMNS: &str = "id, employee_id, work_date, day_of_week, hours_worked, status, \
     notes, created_at, updated_at";

pub(crate) fn attendance_from_row(row: &Row<'_>) -> rusqlite::Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        work_date: row.get(2)?,
        day_of_week: row.get(3)?,
        hours_worked: row.get(4)?,
        status: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Reads the 13-column attendance + employee join produced by the listing
/// queries (nine attendance columns, then name, email, position, department).
pub(crate) fn attendance_with_employee_from_row(
    row: &Row<'_>,
) -> rusqlite::Result<AttendanceWithEmployee> {
    Ok(AttendanceWithEmployee {
        record: attendance_from_row(row)?,
        employee_name: row.get(9)?,
        email: row.get(10)?,
        position: row.get(11)?,
        department: row.get(12)?,
    })
}

/// Lists attendance joined with employee identity, newest first.
#[instrument(skip(pool))]
pub async fn list_attendance(
    pool: &DbPool,
    filter: &AttendanceFilter,
) -> Result<Vec<AttendanceWithEmployee>> {
    let conn = acquire(pool)?;
    let mut sql = String::from(
        "SELECT a.id, a.employee_id, a.work_date, a.day_of_week, a.hours_worked, a.status, \
                a.notes, a.created_at, a.updated_at, \
                e.name, e.email, e.position, e.department
         FROM attendance a
         LEFT JOIN employees e ON a.employee_id = e.id
         WHERE 1=1",
    );
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    if let Some(employee_id) = filter.employee_id {
        sql.push_str(" AND a.employee_id = ?");
        values.push(Box::new(employee_id));
    }
    let (start, end) = match filter.week {
        Some(week_start) => (
            Some(week_start),
            Some(week_start + Days::new(6)),
        ),
        None => (filter.start_date, filter.end_date),
    };
    if let Some(start) = start {
        sql.push_str(" AND a.work_date >= ?");
        values.push(Box::new(start));
    }
    if let Some(end) = end {
        sql.push_str(" AND a.work_date <= ?");
        values.push(Box::new(end));
    }
    sql.push_str(" ORDER BY a.work_date DESC, e.name");

    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map(
            rusqlite::params_from_iter(values.iter()),
            attendance_with_employee_from_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!("Fetched {} attendance records.", records.len());
    Ok(records)
}

/// Records attendance for one employee and day. An existing row for the same
/// (employee, date) pair is overwritten in place; the weekday is derived from
/// the date (ISO, Monday = 1).
#[instrument(skip(pool, upsert))]
pub async fn upsert_attendance(
    pool: &DbPool,
    upsert: &UpsertAttendance,
) -> Result<AttendanceRecord> {
    let day_of_week = upsert.work_date.weekday().number_from_monday();
    let conn = acquire(pool)?;
    let now = Utc::now();
    let mut stmt = conn.prepare_cached(
        "INSERT INTO attendance (employee_id, work_date, day_of_week, hours_worked, status, \
         notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
         ON CONFLICT (employee_id, work_date) DO UPDATE SET
             hours_worked = excluded.hours_worked,
             status = excluded.status,
             notes = excluded.notes,
             updated_at = excluded.updated_at",
    )?;
    stmt.execute(params![
        upsert.employee_id,
        upsert.work_date,
        day_of_week,
        upsert.hours_worked.unwrap_or(0.0),
        upsert.status.as_deref().unwrap_or("present"),
        clean_opt(&upsert.notes),
        now,
    ])?;

    info!(
        "Recorded attendance for employee {} on {}",
        upsert.employee_id, upsert.work_date
    );
    let mut fetch = conn.prepare_cached(&format!(
        "SELECT {} FROM attendance WHERE employee_id = ?1 AND work_date = ?2",
        ATTENDANCE_COLUMNS
    ))?;
    Ok(fetch.query_row(params![upsert.employee_id, upsert.work_date], attendance_from_row)?)
}

/// Edits an existing attendance row by id. Returns `None` for unknown ids.
#[instrument(skip(pool, update))]
pub async fn update_attendance(
    pool: &DbPool,
    id: i64,
    update: &UpdateAttendance,
) -> Result<Option<AttendanceRecord>> {
    let conn = acquire(pool)?;
    let rows = conn.execute(
        "UPDATE attendance
         SET hours_worked = COALESCE(?1, hours_worked),
             status = COALESCE(?2, status),
             notes = COALESCE(?3, notes),
             updated_at = ?4
         WHERE id = ?5",
        params![
            update.hours_worked,
            update.status.as_deref(),
            clean_opt(&update.notes),
            Utc::now(),
            id,
        ],
    )?;
    if rows == 0 {
        return Ok(None);
    }
    let mut fetch = conn.prepare_cached(&format!(
        "SELECT {} FROM attendance WHERE id = ?1",
        ATTENDANCE_COLUMNS
    ))?;
    Ok(fetch.query_row(params![id], attendance_from_row).optional()?)
}

/// Deletes one attendance row. Returns false when nothing matched.
#[instrument(skip(pool))]
pub async fn delete_attendance(pool: &DbPool, id: i64) -> Result<bool> {
    let conn = acquire(pool)?;
    let rows = conn.execute("DELETE FROM attendance WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}

/// All attendance rows inside a date range, unjoined, for the weekly summary.
#[instrument(skip(pool))]
pub async fn list_week(
    pool: &DbPool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<AttendanceRecord>> {
    let conn = acquire(pool)?;
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM attendance WHERE work_date >= ?1 AND work_date <= ?2 ORDER BY work_date",
        ATTENDANCE_COLUMNS
    ))?;
    let records = stmt
        .query_map(params![start, end], attendance_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}
