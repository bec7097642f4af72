use crate::db::connection::acquire;
use crate::db::timesheets::{self, NewTimesheetEntry};
use crate::db::{clean_opt, DbPool};
use crate::errors::{Error, Result};
use crate::models::{ExtractedTimesheet, TimesheetDetail, UploadStats, UploadedFile};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Optional list filters for the upload listing.
#[derive(Debug, Clone, Default)]
pub struct UploadFilter {
    pub processed: Option<bool>,
    pub timesheet_id: Option<i64>,
}

/// Request body for registering an uploaded timesheet photo. The payload is
/// base64; only its metadata is persisted, storage itself is mocked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUpload {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub file_data: String,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub timesheet_id: Option<i64>,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub work_order: Option<String>,
    /// Extraction results already known at upload time, if any.
    #[serde(default)]
    pub processing_data: Option<ExtractedTimesheet>,
}

/// Result of processing an upload: the updated file row, plus the draft
/// timesheet created from the extraction when one could be built.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub upload: UploadedFile,
    pub timesheet: Option<TimesheetDetail>,
}

const UPLOAD_COLUMNS: &str = "id, filename, original_name, file_type, file_size, file_path, \
     timesheet_id, employee_name, work_order, processed, processing_status, processing_error, \
     extracted_data, created_at";

fn upload_from_row(row: &Row<'_>) -> rusqlite::Result<UploadedFile> {
    Ok(UploadedFile {
        id: row.get(0)?,
        filename: row.get(1)?,
        original_name: row.get(2)?,
        file_type: row.get(3)?,
        file_size: row.get(4)?,
        file_path: row.get(5)?,
        timesheet_id: row.get(6)?,
        employee_name: row.get(7)?,
        work_order: row.get(8)?,
        processed: row.get(9)?,
        processing_status: row.get(10)?,
        processing_error: row.get(11)?,
        extracted_data: row.get(12)?,
        created_at: row.get(13)?,
    })
}

/// Lists uploads, newest first.
#[instrument(skip(pool))]
pub async fn list_uploads(pool: &DbPool, filter: &UploadFilter) -> Result<Vec<UploadedFile>> {
    let conn = acquire(pool)?;
    let mut sql = format!("SELECT {} FROM uploaded_files WHERE 1=1", UPLOAD_COLUMNS);
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    if let Some(processed) = filter.processed {
        sql.push_str(" AND processed = ?");
        values.push(Box::new(processed));
    }
    if let Some(timesheet_id) = filter.timesheet_id {
        sql.push_str(" AND timesheet_id = ?");
        values.push(Box::new(timesheet_id));
    }
    sql.push_str(" ORDER BY created_at DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let uploads = stmt
        .query_map(rusqlite::params_from_iter(values.iter()), upload_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!("Fetched {} uploads.", uploads.len());
    Ok(uploads)
}

/// Fetches one upload row.
#[instrument(skip(pool))]
pub async fn get_upload(pool: &DbPool, id: i64) -> Result<Option<UploadedFile>> {
    let conn = acquire(pool)?;
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM uploaded_files WHERE id = ?1",
        UPLOAD_COLUMNS
    ))?;
    Ok(stmt.query_row(params![id], upload_from_row).optional()?)
}

/// Registers an upload. The stored filename is prefixed with a UUID so
/// repeated uploads of the same photo never collide. When the client already
/// supplies extraction results the row is marked completed immediately.
#[instrument(skip(pool, new))]
pub async fn create_upload(pool: &DbPool, new: &NewUpload) -> Result<UploadedFile> {
    let original_name = new.filename.trim();
    if original_name.is_empty() || new.file_data.is_empty() {
        return Err(Error::Validation(
            "Filename and file data are required".to_string(),
        ));
    }

    let stored_name = format!("{}_{}", Uuid::new_v4(), original_name);
    // Base64 expands by 4/3; recover the approximate decoded size.
    let file_size = (new.file_data.len() as i64) * 3 / 4;
    let file_path = format!("/uploads/{}", stored_name);
    let extracted_json = new
        .processing_data
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;
    let processed = extracted_json.is_some();

    let conn = acquire(pool)?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO uploaded_files (filename, original_name, file_type, file_size, file_path, \
         timesheet_id, employee_name, work_order, processed, processing_status, extracted_data, \
         created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )?;
    let id = stmt.insert(params![
        stored_name,
        original_name,
        new.file_type.as_deref().unwrap_or("image/jpeg"),
        file_size,
        file_path,
        new.timesheet_id,
        clean_opt(&new.employee_name),
        clean_opt(&new.work_order),
        processed,
        if processed { "completed" } else { "pending" },
        extracted_json,
        Utc::now(),
    ])?;

    info!("Registered upload id {} ('{}')", id, original_name);
    let mut fetch = conn.prepare_cached(&format!(
        "SELECT {} FROM uploaded_files WHERE id = ?1",
        UPLOAD_COLUMNS
    ))?;
    Ok(fetch.query_row(params![id], upload_from_row)?)
}

/// Marks an upload processed and, when the extraction names an employee,
/// promotes it to a draft timesheet in the same transaction. Entries without
/// positive hours are dropped during promotion. A failed promotion rolls the
/// write back and stamps the row `processing_status = 'error'` with the
/// failure message. Returns `None` for unknown upload ids.
#[instrument(skip(pool, extraction))]
pub async fn process_upload(
    pool: &DbPool,
    id: i64,
    extraction: Option<ExtractedTimesheet>,
) -> Result<Option<ProcessOutcome>> {
    let promoted = {
        let mut conn = acquire(pool)?;
        promote_in_tx(&mut conn, id, extraction.as_ref())
    };
    let timesheet_id = match promoted {
        Ok(Some(timesheet_id)) => timesheet_id,
        Ok(None) => return Ok(None),
        Err(err) => {
            // The row stays visible in listings and the error counter.
            if let Err(stamp_err) = mark_processing_error(pool, id, &err.to_string()).await {
                warn!(
                    "Could not record processing failure for upload {}: {}",
                    id, stamp_err
                );
            }
            return Err(err);
        }
    };

    let upload = get_upload(pool, id)
        .await?
        .ok_or_else(|| Error::Database("Upload vanished after processing".to_string()))?;
    let timesheet = match timesheet_id {
        Some(tid) => timesheets::get_timesheet(pool, tid).await?,
        None => None,
    };
    Ok(Some(ProcessOutcome { upload, timesheet }))
}

/// The transactional half of processing: stamps the file completed and
/// creates the draft timesheet when the extraction allows it. `Ok(None)`
/// means the upload id is unknown; the inner option is the promoted
/// timesheet id.
fn promote_in_tx(
    conn: &mut rusqlite::Connection,
    id: i64,
    extraction: Option<&ExtractedTimesheet>,
) -> Result<Option<Option<i64>>> {
    let tx = conn
        .transaction()
        .map_err(|e| Error::Database(format!("Failed to start transaction: {}", e)))?;
    let now = Utc::now();

    let exists: Option<i64> = tx
        .query_row(
            "SELECT id FROM uploaded_files WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    if exists.is_none() {
        return Ok(None);
    }

    let extracted_json = extraction.map(serde_json::to_value).transpose()?;
    tx.execute(
        "UPDATE uploaded_files
         SET processed = TRUE, processing_status = 'completed', processing_error = NULL,
             extracted_data = COALESCE(?1, extracted_data)
         WHERE id = ?2",
        params![extracted_json, id],
    )?;

    let timesheet_id = match extraction.and_then(promoted_sheet) {
        Some((employee_name, work_date, shift_time, entries)) => {
            let total_hours: f64 = entries.iter().map(|e| e.hours).sum();
            let timesheet_id = {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO timesheets (employee_name, work_date, shift_time, \
                     total_hours, status, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, 'draft', ?5, ?5)",
                )?;
                stmt.insert(params![employee_name, work_date, shift_time, total_hours, now])?
            };
            timesheets::insert_entries(&tx, timesheet_id, &entries, now)?;
            tx.execute(
                "UPDATE uploaded_files SET timesheet_id = ?1 WHERE id = ?2",
                params![timesheet_id, id],
            )?;
            info!(
                "Promoted upload {} to draft timesheet {} ({} entries)",
                id,
                timesheet_id,
                entries.len()
            );
            Some(timesheet_id)
        }
        None => {
            debug!("Upload {} processed without promotion", id);
            None
        }
    };

    tx.commit()
        .map_err(|e| Error::Database(format!("Failed to commit upload processing: {}", e)))?;
    Ok(Some(timesheet_id))
}

/// Builds the draft-timesheet fields from an extraction, if it names an
/// employee. Entries with missing or non-positive hours are dropped.
fn promoted_sheet(
    extraction: &ExtractedTimesheet,
) -> Option<(String, chrono::NaiveDate, Option<f64>, Vec<NewTimesheetEntry>)> {
    let employee_name = extraction
        .employee_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())?
        .to_string();
    let work_date = extraction
        .date
        .unwrap_or_else(|| Utc::now().date_naive());
    let entries = extraction
        .work_entries
        .iter()
        .filter_map(|entry| {
            let hours = entry.hours.filter(|h| *h > 0.0)?;
            Some(NewTimesheetEntry {
                job_id: None,
                work_order: entry.work_order.clone(),
                customer: entry.customer.clone(),
                description: entry.description.clone(),
                task_code: entry.code.clone(),
                hours,
            })
        })
        .collect();
    Some((employee_name, work_date, extraction.shift_time, entries))
}

/// Records a processing failure on the upload row.
#[instrument(skip(pool))]
pub async fn mark_processing_error(pool: &DbPool, id: i64, message: &str) -> Result<bool> {
    let conn = acquire(pool)?;
    let rows = conn.execute(
        "UPDATE uploaded_files
         SET processed = FALSE, processing_status = 'error', processing_error = ?1
         WHERE id = ?2",
        params![message, id],
    )?;
    if rows > 0 {
        warn!("Upload {} marked failed: {}", id, message);
    }
    Ok(rows > 0)
}

/// Counters over the uploaded_files table.
#[instrument(skip(pool))]
pub async fn upload_stats(pool: &DbPool) -> Result<UploadStats> {
    let conn = acquire(pool)?;
    let stats = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(processed = TRUE), 0),
                COALESCE(SUM(processing_status = 'pending'), 0),
                COALESCE(SUM(processing_status = 'error'), 0)
         FROM uploaded_files",
        [],
        |row| {
            Ok(UploadStats {
                total: row.get(0)?,
                processed: row.get(1)?,
                pending: row.get(2)?,
                error: row.get(3)?,
            })
        },
    )?;
    Ok(stats)
}

/// Returns the upload row plus mock file content, since storage is mocked.
#[instrument(skip(pool))]
pub async fn download_upload(pool: &DbPool, id: i64) -> Result<Option<(UploadedFile, Vec<u8>)>> {
    let Some(upload) = get_upload(pool, id).await? else {
        return Ok(None);
    };
    let content = format!("Mock file content for {}", upload.original_name).into_bytes();
    Ok(Some((upload, content)))
}

/// Deletes one upload row. Returns false when nothing matched.
#[instrument(skip(pool))]
pub async fn delete_upload(pool: &DbPool, id: i64) -> Result<bool> {
    let conn = acquire(pool)?;
    let rows = conn.execute("DELETE FROM uploaded_files WHERE id = ?1", params![id])?;
    if rows > 0 {
        info!("Deleted upload id {}", id);
    }
    Ok(rows > 0)
}
