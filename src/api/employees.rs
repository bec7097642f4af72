use crate::db::employees::{self, NewEmployee, UpdateEmployee};
use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::{AttendanceWithEmployee, Employee};
use chrono::NaiveDate;

pub async fn list(pool: &DbPool) -> Result<Vec<Employee>> {
    employees::list_active_employees(pool).await
}

pub async fn get(pool: &DbPool, id: i64) -> Result<Employee> {
    employees::get_employee(pool, id)
        .await?
        .ok_or(Error::NotFound("Employee"))
}

pub async fn create(pool: &DbPool, new: &NewEmployee) -> Result<Employee> {
    employees::create_employee(pool, new).await
}

pub async fn update(pool: &DbPool, id: i64, update: &UpdateEmployee) -> Result<Employee> {
    employees::update_employee(pool, id, update)
        .await?
        .ok_or(Error::NotFound("Employee"))
}

pub async fn deactivate(pool: &DbPool, id: i64) -> Result<()> {
    if employees::deactivate_employee(pool, id).await? {
        Ok(())
    } else {
        Err(Error::NotFound("Employee"))
    }
}

/// One employee's attendance history. 404s when the employee is unknown or
/// inactive, matching the detail route.
pub async fn attendance_history(
    pool: &DbPool,
    id: i64,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<Vec<AttendanceWithEmployee>> {
    get(pool, id).await?;
    employees::list_employee_attendance(pool, id, start_date, end_date).await
}
