use crate::db::connection::acquire;
use crate::db::{clean_opt, DbPool};
use crate::errors::{Error, Result};
use crate::models::{Timesheet, TimesheetDetail, TimesheetEntry, TimesheetSummary};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Optional list filters for the timesheet listing.
#[derive(Debug, Clone, Default)]
pub struct TimesheetFilter {
    pub employee_id: Option<i64>,
    /// Case-insensitive substring match on the captured employee name.
    pub employee_name: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One line item in a create or update request. `hours` must be positive;
/// a non-positive value rejects the whole request before anything is written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTimesheetEntry {
    #[serde(default)]
    pub job_id: Option<i64>,
    #[serde(default)]
    pub work_order: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub task_code: Option<String>,
    #[serde(default)]
    pub hours: f64,
}

/// Request body for creating a timesheet with its entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTimesheet {
    #[serde(default)]
    pub employee_id: Option<i64>,
    #[serde(default)]
    pub employee_name: String,
    #[serde(default)]
    pub work_date: Option<NaiveDate>,
    #[serde(default)]
    pub shift_time: Option<f64>,
    #[serde(default)]
    pub total_hours: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub entries: Vec<NewTimesheetEntry>,
}

/// Request body for a full-replace timesheet update. `entries: None` leaves
/// the stored entries untouched; `Some(..)` replaces them wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTimesheet {
    #[serde(default)]
    pub employee_id: Option<i64>,
    #[serde(default)]
    pub employee_name: String,
    #[serde(default)]
    pub work_date: Option<NaiveDate>,
    #[serde(default)]
    pub shift_time: Option<f64>,
    #[serde(default)]
    pub total_hours: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub entries: Option<Vec<NewTimesheetEntry>>,
}

const TIMESHEET_COLUMNS: &str = "id, employee_id, employee_name, work_date, shift_time, \
     total_hours, status, notes, created_at, updated_at";

pub(crate) fn timesheet_from_row(row: &Row<'_>) -> rusqlite::Result<Timesheet> {
    Ok(Timesheet {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        employee_name: row.get(2)?,
        work_date: row.get(3)?,
        shift_time: row.get(4)?,
        total_hours: row.get(5)?,
        status: row.get(6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<TimesheetEntry> {
    Ok(TimesheetEntry {
        id: row.get(0)?,
        timesheet_id: row.get(1)?,
        job_id: row.get(2)?,
        work_order: row.get(3)?,
        customer: row.get(4)?,
        description: row.get(5)?,
        task_code: row.get(6)?,
        hours: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn validate_header(employee_name: &str, work_date: Option<NaiveDate>) -> Result<NaiveDate> {
    if employee_name.trim().is_empty() {
        return Err(Error::Validation(
            "Employee name and work date are required".to_string(),
        ));
    }
    work_date.ok_or_else(|| {
        Error::Validation("Employee name and work date are required".to_string())
    })
}

fn validate_entries(entries: &[NewTimesheetEntry]) -> Result<()> {
    if entries.iter().any(|e| e.hours <= 0.0) {
        return Err(Error::Validation(
            "Entry hours must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Lists timesheets with per-sheet entry aggregates, newest work date first.
#[instrument(skip(pool))]
pub async fn list_timesheets(
    pool: &DbPool,
    filter: &TimesheetFilter,
) -> Result<Vec<TimesheetSummary>> {
    let conn = acquire(pool)?;
    let mut sql = String::from(
        "SELECT t.id, t.employee_id, t.employee_name, t.work_date, t.shift_time, t.total_hours, \
                t.status, t.notes, t.created_at, t.updated_at,
                COUNT(te.id),
                COALESCE(SUM(te.hours), 0.0)
         FROM timesheets t
         LEFT JOIN timesheet_entries te ON te.timesheet_id = t.id
         WHERE 1=1",
    );
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    if let Some(employee_id) = filter.employee_id {
        sql.push_str(" AND t.employee_id = ?");
        values.push(Box::new(employee_id));
    }
    if let Some(name) = &filter.employee_name {
        sql.push_str(" AND LOWER(t.employee_name) LIKE ?");
        values.push(Box::new(format!("%{}%", name.to_lowercase())));
    }
    if let Some(status) = &filter.status {
        sql.push_str(" AND t.status = ?");
        values.push(Box::new(status.clone()));
    }
    if let Some(start) = filter.start_date {
        sql.push_str(" AND t.work_date >= ?");
        values.push(Box::new(start));
    }
    if let Some(end) = filter.end_date {
        sql.push_str(" AND t.work_date <= ?");
        values.push(Box::new(end));
    }
    sql.push_str(" GROUP BY t.id ORDER BY t.work_date DESC, t.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let sheets = stmt
        .query_map(rusqlite::params_from_iter(values.iter()), |row| {
            Ok(TimesheetSummary {
                timesheet: timesheet_from_row(row)?,
                entry_count: row.get(10)?,
                entries_hours: row.get(11)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!("Fetched {} timesheets.", sheets.len());
    Ok(sheets)
}

fn fetch_timesheet_detail(conn: &Connection, id: i64) -> Result<Option<TimesheetDetail>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM timesheets WHERE id = ?1",
        TIMESHEET_COLUMNS
    ))?;
    let Some(timesheet) = stmt.query_row(params![id], timesheet_from_row).optional()? else {
        return Ok(None);
    };
    let entries = fetch_entries(conn, id)?;
    Ok(Some(TimesheetDetail { timesheet, entries }))
}

fn fetch_entries(conn: &Connection, timesheet_id: i64) -> Result<Vec<TimesheetEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, timesheet_id, job_id, work_order, customer, description, task_code, hours, \
                created_at, updated_at
         FROM timesheet_entries WHERE timesheet_id = ?1 ORDER BY id",
    )?;
    let entries = stmt
        .query_map(params![timesheet_id], entry_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

/// Fetches a timesheet together with all of its entries.
#[instrument(skip(pool))]
pub async fn get_timesheet(pool: &DbPool, id: i64) -> Result<Option<TimesheetDetail>> {
    let conn = acquire(pool)?;
    fetch_timesheet_detail(&conn, id)
}

pub(crate) fn insert_entries(
    tx: &rusqlite::Transaction<'_>,
    timesheet_id: i64,
    entries: &[NewTimesheetEntry],
    now: DateTime<Utc>,
) -> Result<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO timesheet_entries (timesheet_id, job_id, work_order, customer, description, \
         task_code, hours, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )?;
    for entry in entries {
        stmt.execute(params![
            timesheet_id,
            entry.job_id,
            clean_opt(&entry.work_order),
            clean_opt(&entry.customer),
            clean_opt(&entry.description),
            clean_opt(&entry.task_code),
            entry.hours,
            now,
        ])?;
    }
    Ok(())
}

/// Creates a timesheet and its entries in one transaction.
#[instrument(skip(pool, new))]
pub async fn create_timesheet(pool: &DbPool, new: &NewTimesheet) -> Result<TimesheetDetail> {
    let work_date = validate_header(&new.employee_name, new.work_date)?;
    validate_entries(&new.entries)?;

    let mut conn = acquire(pool)?;
    let tx = conn
        .transaction()
        .map_err(|e| Error::Database(format!("Failed to start transaction: {}", e)))?;
    let now = Utc::now();

    let timesheet_id = {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO timesheets (employee_id, employee_name, work_date, shift_time, \
             total_hours, status, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        )?;
        stmt.insert(params![
            new.employee_id,
            new.employee_name.trim(),
            work_date,
            new.shift_time,
            new.total_hours.unwrap_or(0.0),
            new.status.as_deref().unwrap_or("draft"),
            clean_opt(&new.notes),
            now,
        ])?
    };

    insert_entries(&tx, timesheet_id, &new.entries, now)?;

    tx.commit()
        .map_err(|e| Error::Database(format!("Failed to commit timesheet create: {}", e)))?;
    info!(
        "Created timesheet id {} for '{}' ({} entries)",
        timesheet_id,
        new.employee_name.trim(),
        new.entries.len()
    );

    fetch_timesheet_detail(&conn, timesheet_id)?
        .ok_or_else(|| Error::Database("Timesheet vanished after insert".to_string()))
}

/// Full replace of a timesheet. When `entries` is supplied, the stored
/// entries are deleted and reinserted inside the same transaction. Returns
/// `None` for unknown ids without writing anything.
#[instrument(skip(pool, update))]
pub async fn update_timesheet(
    pool: &DbPool,
    id: i64,
    update: &UpdateTimesheet,
) -> Result<Option<TimesheetDetail>> {
    let work_date = validate_header(&update.employee_name, update.work_date)?;
    if let Some(entries) = &update.entries {
        validate_entries(entries)?;
    }

    let mut conn = acquire(pool)?;
    let tx = conn
        .transaction()
        .map_err(|e| Error::Database(format!("Failed to start transaction: {}", e)))?;
    let now = Utc::now();

    let rows = tx.execute(
        "UPDATE timesheets
         SET employee_id = ?1, employee_name = ?2, work_date = ?3, shift_time = ?4,
             total_hours = ?5, status = ?6, notes = ?7, updated_at = ?8
         WHERE id = ?9",
        params![
            update.employee_id,
            update.employee_name.trim(),
            work_date,
            update.shift_time,
            update.total_hours.unwrap_or(0.0),
            update.status.as_deref().unwrap_or("draft"),
            clean_opt(&update.notes),
            now,
            id,
        ],
    )?;
    if rows == 0 {
        // Nothing matched; the open transaction is dropped and rolls back.
        return Ok(None);
    }

    if let Some(entries) = &update.entries {
        tx.execute(
            "DELETE FROM timesheet_entries WHERE timesheet_id = ?1",
            params![id],
        )?;
        insert_entries(&tx, id, entries, now)?;
    }

    tx.commit()
        .map_err(|e| Error::Database(format!("Failed to commit timesheet update: {}", e)))?;
    fetch_timesheet_detail(&conn, id)
}

/// Hard delete; the schema cascades to timesheet_entries and nulls out any
/// uploaded file links.
#[instrument(skip(pool))]
pub async fn delete_timesheet(pool: &DbPool, id: i64) -> Result<bool> {
    let conn = acquire(pool)?;
    let rows = conn.execute("DELETE FROM timesheets WHERE id = ?1", params![id])?;
    if rows > 0 {
        info!("Deleted timesheet id {} (entries cascade)", id);
    }
    Ok(rows > 0)
}

/// Lists the entries of one timesheet.
#[instrument(skip(pool))]
pub async fn list_timesheet_entries(pool: &DbPool, timesheet_id: i64) -> Result<Vec<TimesheetEntry>> {
    let conn = acquire(pool)?;
    fetch_entries(&conn, timesheet_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{
        count_rows, direct_insert_entry, direct_insert_timesheet, init_test_tracing, setup_test_db,
    };

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sample_sheet() -> NewTimesheet {
        NewTimesheet {
            employee_name: "John Smith".to_string(),
            work_date: Some(date("2026-08-24")),
            shift_time: Some(8.0),
            total_hours: Some(8.0),
            entries: vec![
                NewTimesheetEntry {
                    work_order: Some("4363".to_string()),
                    customer: Some("ABC Manufacturing".to_string()),
                    description: Some("Welding".to_string()),
                    hours: 5.0,
                    ..NewTimesheetEntry::default()
                },
                NewTimesheetEntry {
                    work_order: Some("4364".to_string()),
                    hours: 3.0,
                    ..NewTimesheetEntry::default()
                },
            ],
            ..NewTimesheet::default()
        }
    }

    #[tokio::test]
    async fn test_create_timesheet_with_entries() -> Result<()> {
        init_test_tracing();
        let pool = setup_test_db().await?;

        let detail = create_timesheet(&pool, &sample_sheet()).await?;
        assert_eq!(detail.timesheet.status, "draft");
        assert_eq!(detail.entries.len(), 2);

        let listed = list_timesheets(&pool, &TimesheetFilter::default()).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].entry_count, 2);
        assert!((listed[0].entries_hours - 8.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_entry_hours() -> Result<()> {
        let pool = setup_test_db().await?;
        let mut new = sample_sheet();
        new.entries.push(NewTimesheetEntry {
            hours: 0.0,
            ..NewTimesheetEntry::default()
        });

        let err = create_timesheet(&pool, &new).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let conn = pool.lock().unwrap();
        assert_eq!(count_rows(&conn, "timesheets")?, 0, "nothing written");
        assert_eq!(count_rows(&conn, "timesheet_entries")?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_requires_name_and_date() -> Result<()> {
        let pool = setup_test_db().await?;
        let err = create_timesheet(
            &pool,
            &NewTimesheet {
                employee_name: "John Smith".to_string(),
                ..NewTimesheet::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_entries_wholesale() -> Result<()> {
        let pool = setup_test_db().await?;
        let detail = create_timesheet(&pool, &sample_sheet()).await?;

        let updated = update_timesheet(
            &pool,
            detail.timesheet.id,
            &UpdateTimesheet {
                employee_name: "John Smith".to_string(),
                work_date: Some(date("2026-08-24")),
                total_hours: Some(6.0),
                status: Some("submitted".to_string()),
                entries: Some(vec![NewTimesheetEntry {
                    work_order: Some("4365".to_string()),
                    hours: 6.0,
                    ..NewTimesheetEntry::default()
                }]),
                ..UpdateTimesheet::default()
            },
        )
        .await?
        .expect("timesheet exists");

        assert_eq!(updated.timesheet.status, "submitted");
        assert_eq!(updated.entries.len(), 1, "old entries replaced");
        assert_eq!(updated.entries[0].work_order.as_deref(), Some("4365"));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_without_entries_keeps_them() -> Result<()> {
        let pool = setup_test_db().await?;
        let detail = create_timesheet(&pool, &sample_sheet()).await?;

        let updated = update_timesheet(
            &pool,
            detail.timesheet.id,
            &UpdateTimesheet {
                employee_name: "John Smith".to_string(),
                work_date: Some(date("2026-08-24")),
                notes: Some("reviewed".to_string()),
                entries: None,
                ..UpdateTimesheet::default()
            },
        )
        .await?
        .expect("timesheet exists");

        assert_eq!(updated.entries.len(), 2, "entries untouched");
        assert_eq!(updated.timesheet.notes.as_deref(), Some("reviewed"));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_timesheet_is_none() -> Result<()> {
        let pool = setup_test_db().await?;
        let missing = update_timesheet(
            &pool,
            777,
            &UpdateTimesheet {
                employee_name: "Ghost".to_string(),
                work_date: Some(date("2026-08-24")),
                ..UpdateTimesheet::default()
            },
        )
        .await?;
        assert!(missing.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_timesheets_filters_by_name_and_range() -> Result<()> {
        let pool = setup_test_db().await?;
        {
            let conn = pool.lock().unwrap();
            let first = direct_insert_timesheet(&conn, "John Smith", date("2026-08-17"))?;
            direct_insert_entry(&conn, first, Some("4363"), 8.0)?;
            direct_insert_timesheet(&conn, "Jane Doe", date("2026-08-24"))?;
        }

        let by_name = list_timesheets(
            &pool,
            &TimesheetFilter {
                employee_name: Some("jane".to_string()),
                ..TimesheetFilter::default()
            },
        )
        .await?;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].timesheet.employee_name, "Jane Doe");

        let in_range = list_timesheets(
            &pool,
            &TimesheetFilter {
                start_date: Some(date("2026-08-18")),
                ..TimesheetFilter::default()
            },
        )
        .await?;
        assert_eq!(in_range.len(), 1);
        assert_eq!(in_range[0].timesheet.work_date, date("2026-08-24"));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_cascades_to_entries() -> Result<()> {
        let pool = setup_test_db().await?;
        let id = {
            let conn = pool.lock().unwrap();
            let id = direct_insert_timesheet(&conn, "John Smith", date("2026-08-24"))?;
            direct_insert_entry(&conn, id, Some("4363"), 4.0)?;
            direct_insert_entry(&conn, id, None, 4.0)?;
            id
        };

        assert!(delete_timesheet(&pool, id).await?);
        assert!(!delete_timesheet(&pool, id).await?);

        let conn = pool.lock().unwrap();
        assert_eq!(count_rows(&conn, "timesheet_entries")?, 0);
        Ok(())
    }
}
