use crate::db::connection::acquire;
use crate::db::{clean_opt, DbPool};
use crate::errors::{Error, Result};
use crate::models::{AttendanceWithEmployee, Employee};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Request body for creating an employee. `name` is the only required field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEmployee {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
}

/// Request body for a full-replace employee update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEmployee {
    #[serde(flatten)]
    pub fields: NewEmployee,
    /// Omitted means "keep active"; the soft-delete route is DELETE.
    #[serde(default)]
    pub is_active: Option<bool>,
}

const EMPLOYEE_COLUMNS: &str = "id, name, email, phone, position, department, hire_date, \
     is_active, created_at, updated_at";

pub(crate) fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        position: row.get(4)?,
        department: row.get(5)?,
        hire_date: row.get(6)?,
        is_active: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Lists active employees ordered by name.
#[instrument(skip(pool))]
pub async fn list_active_employees(pool: &DbPool) -> Result<Vec<Employee>> {
    let conn = acquire(pool)?;
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM employees WHERE is_active = TRUE ORDER BY name",
        EMPLOYEE_COLUMNS
    ))?;
    let employees = stmt
        .query_map([], employee_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!("Fetched {} active employees.", employees.len());
    Ok(employees)
}

/// Fetches a single active employee.
#[instrument(skip(pool))]
pub async fn get_employee(pool: &DbPool, id: i64) -> Result<Option<Employee>> {
    let conn = acquire(pool)?;
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM employees WHERE id = ?1 AND is_active = TRUE",
        EMPLOYEE_COLUMNS
    ))?;
    Ok(stmt.query_row(params![id], employee_from_row).optional()?)
}

/// Creates an employee. Duplicate email maps to `Conflict`.
#[instrument(skip(pool, new))]
pub async fn create_employee(pool: &DbPool, new: &NewEmployee) -> Result<Employee> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Employee name is required".to_string()));
    }

    let conn = acquire(pool)?;
    let now = Utc::now();
    let mut stmt = conn.prepare_cached(
        "INSERT INTO employees (name, email, phone, position, department, hire_date, is_active, \
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, TRUE, ?7, ?7)",
    )?;
    let id = stmt
        .insert(params![
            name,
            clean_opt(&new.email),
            clean_opt(&new.phone),
            clean_opt(&new.position),
            clean_opt(&new.department),
            new.hire_date,
            now,
        ])
        .map_err(|e| Error::conflict_on_unique(e, "Employee with this email already exists"))?;

    info!("Created employee id {} ('{}')", id, name);
    let mut fetch = conn.prepare_cached(&format!(
        "SELECT {} FROM employees WHERE id = ?1",
        EMPLOYEE_COLUMNS
    ))?;
    Ok(fetch.query_row(params![id], employee_from_row)?)
}

/// Full replace of an employee's mutable fields. Returns `None` when the id
/// does not exist.
#[instrument(skip(pool, update))]
pub async fn update_employee(
    pool: &DbPool,
    id: i64,
    update: &UpdateEmployee,
) -> Result<Option<Employee>> {
    let name = update.fields.name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Employee name is required".to_string()));
    }

    let conn = acquire(pool)?;
    let rows = conn
        .execute(
            "UPDATE employees
             SET name = ?1, email = ?2, phone = ?3, position = ?4, department = ?5,
                 hire_date = ?6, is_active = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                name,
                clean_opt(&update.fields.email),
                clean_opt(&update.fields.phone),
                clean_opt(&update.fields.position),
                clean_opt(&update.fields.department),
                update.fields.hire_date,
                update.is_active.unwrap_or(true),
                Utc::now(),
                id,
            ],
        )
        .map_err(|e| Error::conflict_on_unique(e, "Employee with this email already exists"))?;

    if rows == 0 {
        return Ok(None);
    }
    let mut fetch = conn.prepare_cached(&format!(
        "SELECT {} FROM employees WHERE id = ?1",
        EMPLOYEE_COLUMNS
    ))?;
    Ok(fetch.query_row(params![id], employee_from_row).optional()?)
}

/// Soft delete: flips `is_active` off. Timesheets and attendance referencing
/// the employee are left untouched. Returns false when nothing matched.
#[instrument(skip(pool))]
pub async fn deactivate_employee(pool: &DbPool, id: i64) -> Result<bool> {
    let conn = acquire(pool)?;
    let rows = conn.execute(
        "UPDATE employees SET is_active = FALSE, updated_at = ?1 WHERE id = ?2",
        params![Utc::now(), id],
    )?;
    if rows > 0 {
        info!("Soft-deleted employee id {}", id);
    }
    Ok(rows > 0)
}

/// One employee's attendance history, newest first, with optional range.
#[instrument(skip(pool))]
pub async fn list_employee_attendance(
    pool: &DbPool,
    employee_id: i64,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<Vec<AttendanceWithEmployee>> {
    let conn = acquire(pool)?;
    let mut sql = String::from(
        "SELECT a.id, a.employee_id, a.work_date, a.day_of_week, a.hours_worked, a.status, \
                a.notes, a.created_at, a.updated_at, \
                e.name, e.email, e.position, e.department
         FROM attendance a
         JOIN employees e ON a.employee_id = e.id
         WHERE a.employee_id = ?",
    );
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(employee_id)];
    if let Some(start) = start_date {
        sql.push_str(" AND a.work_date >= ?");
        values.push(Box::new(start));
    }
    if let Some(end) = end_date {
        sql.push_str(" AND a.work_date <= ?");
        values.push(Box::new(end));
    }
    sql.push_str(" ORDER BY a.work_date DESC");

    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map(
            rusqlite::params_from_iter(values.iter()),
            crate::db::attendance::attendance_with_employee_from_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}
