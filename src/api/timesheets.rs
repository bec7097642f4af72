use crate::db::timesheets::{self, NewTimesheet, TimesheetFilter, UpdateTimesheet};
use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::{TimesheetDetail, TimesheetEntry, TimesheetSummary};
use chrono::NaiveDate;

pub async fn list(pool: &DbPool, filter: &TimesheetFilter) -> Result<Vec<TimesheetSummary>> {
    timesheets::list_timesheets(pool, filter).await
}

pub async fn get(pool: &DbPool, id: i64) -> Result<TimesheetDetail> {
    timesheets::get_timesheet(pool, id)
        .await?
        .ok_or(Error::NotFound("Timesheet"))
}

pub async fn create(pool: &DbPool, new: &NewTimesheet) -> Result<TimesheetDetail> {
    timesheets::create_timesheet(pool, new).await
}

pub async fn update(
    pool: &DbPool,
    id: i64,
    update: &UpdateTimesheet,
) -> Result<TimesheetDetail> {
    timesheets::update_timesheet(pool, id, update)
        .await?
        .ok_or(Error::NotFound("Timesheet"))
}

pub async fn delete(pool: &DbPool, id: i64) -> Result<()> {
    if timesheets::delete_timesheet(pool, id).await? {
        Ok(())
    } else {
        Err(Error::NotFound("Timesheet"))
    }
}

/// Entries of one timesheet; 404s when the sheet itself is unknown.
pub async fn entries(pool: &DbPool, id: i64) -> Result<Vec<TimesheetEntry>> {
    get(pool, id).await?;
    timesheets::list_timesheet_entries(pool, id).await
}

/// Detail rows for every timesheet in a date range, for the CSV export.
pub async fn export_range(
    pool: &DbPool,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<Vec<TimesheetDetail>> {
    let summaries = timesheets::list_timesheets(
        pool,
        &TimesheetFilter {
            start_date,
            end_date,
            ..TimesheetFilter::default()
        },
    )
    .await?;
    let mut details = Vec::with_capacity(summaries.len());
    for summary in summaries {
        // Listing and detail read under the same lock sequence; a sheet
        // deleted in between is simply skipped.
        if let Some(detail) = timesheets::get_timesheet(pool, summary.timesheet.id).await? {
            details.push(detail);
        }
    }
    Ok(details)
}
