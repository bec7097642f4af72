use crate::core::week::{build_weekly_summary, week_start_of};
use crate::db::attendance::{self, AttendanceFilter, UpdateAttendance, UpsertAttendance};
use crate::db::{employees, DbPool};
use crate::errors::{Error, Result};
use crate::models::{AttendanceRecord, AttendanceWithEmployee, WeeklySummary};
use chrono::{Days, NaiveDate};

pub async fn list(
    pool: &DbPool,
    filter: &AttendanceFilter,
) -> Result<Vec<AttendanceWithEmployee>> {
    attendance::list_attendance(pool, filter).await
}

/// Records one day of attendance; re-posting the same (employee, date)
/// overwrites in place. Unknown employees 404 rather than foreign-key error.
pub async fn record(pool: &DbPool, upsert: &UpsertAttendance) -> Result<AttendanceRecord> {
    employees::get_employee(pool, upsert.employee_id)
        .await?
        .ok_or(Error::NotFound("Employee"))?;
    attendance::upsert_attendance(pool, upsert).await
}

pub async fn update(
    pool: &DbPool,
    id: i64,
    update: &UpdateAttendance,
) -> Result<AttendanceRecord> {
    attendance::update_attendance(pool, id, update)
        .await?
        .ok_or(Error::NotFound("Attendance record"))
}

pub async fn delete(pool: &DbPool, id: i64) -> Result<()> {
    if attendance::delete_attendance(pool, id).await? {
        Ok(())
    } else {
        Err(Error::NotFound("Attendance record"))
    }
}

/// Weekly summary for every active employee. Any date selects its week; the
/// summary always spans Monday through Sunday.
pub async fn weekly_summary(pool: &DbPool, any_day: NaiveDate) -> Result<WeeklySummary> {
    let week_start = week_start_of(any_day);
    let week_end = week_start + Days::new(6);
    let staff = employees::list_active_employees(pool).await?;
    let records = attendance::list_week(pool, week_start, week_end).await?;
    Ok(build_weekly_summary(&staff, &records, week_start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::employees::NewEmployee;
    use crate::db::test_utils::setup_test_db;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn add_employee(pool: &DbPool, name: &str) -> Result<i64> {
        let created = employees::create_employee(
            pool,
            &NewEmployee {
                name: name.to_string(),
                ..NewEmployee::default()
            },
        )
        .await?;
        Ok(created.id)
    }

    #[tokio::test]
    async fn test_record_rejects_unknown_employee() -> Result<()> {
        let pool = setup_test_db().await?;
        let err = record(
            &pool,
            &UpsertAttendance {
                employee_id: 99,
                work_date: date("2026-08-24"),
                hours_worked: Some(8.0),
                status: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotFound("Employee")));
        Ok(())
    }

    #[tokio::test]
    async fn test_weekly_summary_spans_monday_to_sunday() -> Result<()> {
        let pool = setup_test_db().await?;
        let id = add_employee(&pool, "John Smith").await?;
        for (day, hours) in [("2026-08-24", 8.0), ("2026-08-26", 6.5), ("2026-08-30", 4.0)] {
            record(
                &pool,
                &UpsertAttendance {
                    employee_id: id,
                    work_date: date(day),
                    hours_worked: Some(hours),
                    status: None,
                    notes: None,
                },
            )
            .await?;
        }

        // Asking for the Thursday resolves to the same week.
        let summary = weekly_summary(&pool, date("2026-08-27")).await?;
        assert_eq!(summary.week_start, date("2026-08-24"));
        assert_eq!(summary.week_end, date("2026-08-30"));
        assert_eq!(summary.employees.len(), 1);

        let row = &summary.employees[0];
        assert!((row.weekly_hours.monday - 8.0).abs() < f64::EPSILON);
        assert!((row.weekly_hours.wednesday - 6.5).abs() < f64::EPSILON);
        assert!((row.weekly_hours.sunday - 4.0).abs() < f64::EPSILON);
        assert!((row.total_hours - 18.5).abs() < f64::EPSILON);
        assert_eq!(row.days_present, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_map_missing_to_not_found() -> Result<()> {
        let pool = setup_test_db().await?;
        assert!(matches!(
            update(&pool, 5, &UpdateAttendance::default()).await.unwrap_err(),
            Error::NotFound("Attendance record")
        ));
        assert!(matches!(
            delete(&pool, 5).await.unwrap_err(),
            Error::NotFound("Attendance record")
        ));
        Ok(())
    }
}
