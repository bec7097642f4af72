use crate::db::connection::acquire;
use crate::db::{clean_opt, DbPool};
use crate::errors::{Error, Result};
use crate::models::{Job, JobDetail, JobSection, JobSummary};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Optional list filters, matching the query parameters of the jobs listing.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Exact status match.
    pub status: Option<String>,
    /// Case-insensitive substring match on the customer name.
    pub customer: Option<String>,
}

/// One section attached to a job-create request. Sections without a name or
/// a positive estimate are skipped, as the capture form sends blank rows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewJobSection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub estimated_hours: f64,
}

/// Request body for creating a job. Work order, job name, and customer are
/// required; everything else is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewJob {
    #[serde(default)]
    pub work_order: String,
    #[serde(default)]
    pub job_name: String,
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub total_hours: Option<f64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub sections: Vec<NewJobSection>,
}

/// Request body for a full-replace job update. Sections are managed on
/// creation only; the update route replaces the job row alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJob {
    #[serde(default)]
    pub work_order: String,
    #[serde(default)]
    pub job_name: String,
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub total_hours: Option<f64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
}

const JOB_COLUMNS: &str = "id, work_order, job_name, customer, location, description, status, \
     total_hours, completed_hours, start_date, end_date, created_at, updated_at";

pub(crate) fn job_from_row(row: &Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: row.get(0)?,
        work_order: row.get(1)?,
        job_name: row.get(2)?,
        customer: row.get(3)?,
        location: row.get(4)?,
        description: row.get(5)?,
        status: row.get(6)?,
        total_hours: row.get(7)?,
        completed_hours: row.get(8)?,
        start_date: row.get(9)?,
        end_date: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn section_from_row(row: &Row<'_>) -> rusqlite::Result<JobSection> {
    Ok(JobSection {
        id: row.get(0)?,
        job_id: row.get(1)?,
        section_name: row.get(2)?,
        estimated_hours: row.get(3)?,
        completed_hours: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn validate_required(work_order: &str, job_name: &str, customer: &str) -> Result<()> {
    if work_order.trim().is_empty() || job_name.trim().is_empty() || customer.trim().is_empty() {
        return Err(Error::Validation(
            "Work order, job name, and customer are required".to_string(),
        ));
    }
    Ok(())
}

/// Lists jobs with per-job section aggregates, newest first.
#[instrument(skip(pool))]
pub async fn list_jobs(pool: &DbPool, filter: &JobFilter) -> Result<Vec<JobSummary>> {
    let conn = acquire(pool)?;
    let mut sql = format!(
        "SELECT {cols},
                COUNT(js.id),
                COALESCE(SUM(js.estimated_hours), 0.0),
                COALESCE(SUM(js.completed_hours), 0.0)
         FROM jobs j
         LEFT JOIN job_sections js ON js.job_id = j.id
         WHERE 1=1",
        cols = "j.id, j.work_order, j.job_name, j.customer, j.location, j.description, j.status, \
                j.total_hours, j.completed_hours, j.start_date, j.end_date, j.created_at, \
                j.updated_at"
    );
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    if let Some(status) = &filter.status {
        sql.push_str(" AND j.status = ?");
        values.push(Box::new(status.clone()));
    }
    if let Some(customer) = &filter.customer {
        sql.push_str(" AND LOWER(j.customer) LIKE ?");
        values.push(Box::new(format!("%{}%", customer.to_lowercase())));
    }
    sql.push_str(" GROUP BY j.id ORDER BY j.created_at DESC, j.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let jobs = stmt
        .query_map(rusqlite::params_from_iter(values.iter()), |row| {
            Ok(JobSummary {
                job: job_from_row(row)?,
                section_count: row.get(13)?,
                total_estimated_hours: row.get(14)?,
                total_completed_hours: row.get(15)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!("Fetched {} jobs.", jobs.len());
    Ok(jobs)
}

fn fetch_job_detail(conn: &Connection, id: i64) -> Result<Option<JobDetail>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS))?;
    let Some(job) = stmt.query_row(params![id], job_from_row).optional()? else {
        return Ok(None);
    };
    let sections = fetch_sections(conn, id)?;
    Ok(Some(JobDetail { job, sections }))
}

fn fetch_sections(conn: &Connection, job_id: i64) -> Result<Vec<JobSection>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, job_id, section_name, estimated_hours, completed_hours, created_at, updated_at
         FROM job_sections WHERE job_id = ?1 ORDER BY created_at, id",
    )?;
    let sections = stmt
        .query_map(params![job_id], section_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(sections)
}

/// Fetches a job together with all of its sections.
#[instrument(skip(pool))]
pub async fn get_job(pool: &DbPool, id: i64) -> Result<Option<JobDetail>> {
    let conn = acquire(pool)?;
    fetch_job_detail(&conn, id)
}

/// Creates a job and its sections in one transaction; any failure rolls the
/// whole create back. Duplicate work_order maps to `Conflict`.
#[instrument(skip(pool, new))]
pub async fn create_job(pool: &DbPool, new: &NewJob) -> Result<JobDetail> {
    validate_required(&new.work_order, &new.job_name, &new.customer)?;

    let mut conn = acquire(pool)?;
    let tx = conn
        .transaction()
        .map_err(|e| Error::Database(format!("Failed to start transaction: {}", e)))?;
    let now = Utc::now();

    let job_id = {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO jobs (work_order, job_name, customer, location, description, \
             total_hours, start_date, end_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        )?;
        stmt.insert(params![
            new.work_order.trim(),
            new.job_name.trim(),
            new.customer.trim(),
            clean_opt(&new.location),
            clean_opt(&new.description),
            new.total_hours.unwrap_or(0.0),
            new.start_date,
            new.end_date,
            now,
        ])
        .map_err(|e| Error::conflict_on_unique(e, "Job with this work order already exists"))?
    };

    insert_sections(&tx, job_id, &new.sections, now)?;

    tx.commit()
        .map_err(|e| Error::Database(format!("Failed to commit job create: {}", e)))?;
    info!("Created job id {} (work order '{}')", job_id, new.work_order.trim());

    fetch_job_detail(&conn, job_id)?
        .ok_or_else(|| Error::Database("Job vanished after insert".to_string()))
}

fn insert_sections(
    tx: &rusqlite::Transaction<'_>,
    job_id: i64,
    sections: &[NewJobSection],
    now: DateTime<Utc>,
) -> Result<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO job_sections (job_id, section_name, estimated_hours, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
    )?;
    for section in sections {
        let name = section.name.trim();
        // Blank form rows arrive as empty sections; skip them.
        if name.is_empty() || section.estimated_hours <= 0.0 {
            debug!("Skipping blank section row for job {}", job_id);
            continue;
        }
        stmt.execute(params![job_id, name, section.estimated_hours, now])?;
    }
    Ok(())
}

/// Full replace of a job's mutable fields. Returns `None` for unknown ids.
#[instrument(skip(pool, update))]
pub async fn update_job(pool: &DbPool, id: i64, update: &UpdateJob) -> Result<Option<Job>> {
    validate_required(&update.work_order, &update.job_name, &update.customer)?;

    let conn = acquire(pool)?;
    let rows = conn
        .execute(
            "UPDATE jobs
             SET work_order = ?1, job_name = ?2, customer = ?3, location = ?4, description = ?5,
                 total_hours = ?6, start_date = ?7, end_date = ?8, status = ?9, updated_at = ?10
             WHERE id = ?11",
            params![
                update.work_order.trim(),
                update.job_name.trim(),
                update.customer.trim(),
                clean_opt(&update.location),
                clean_opt(&update.description),
                update.total_hours.unwrap_or(0.0),
                update.start_date,
                update.end_date,
                update.status.as_deref().unwrap_or("active"),
                Utc::now(),
                id,
            ],
        )
        .map_err(|e| Error::conflict_on_unique(e, "Job with this work order already exists"))?;

    if rows == 0 {
        return Ok(None);
    }
    let mut fetch =
        conn.prepare_cached(&format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS))?;
    Ok(fetch.query_row(params![id], job_from_row).optional()?)
}

/// Hard delete; the schema cascades to job_sections.
#[instrument(skip(pool))]
pub async fn delete_job(pool: &DbPool, id: i64) -> Result<bool> {
    let conn = acquire(pool)?;
    let rows = conn.execute("DELETE FROM jobs WHERE id = ?1", params![id])?;
    if rows > 0 {
        info!("Deleted job id {} (sections cascade)", id);
    }
    Ok(rows > 0)
}

/// Lists the sections of one job.
#[instrument(skip(pool))]
pub async fn list_job_sections(pool: &DbPool, job_id: i64) -> Result<Vec<JobSection>> {
    let conn = acquire(pool)?;
    fetch_sections(&conn, job_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{
        count_rows, direct_insert_job, direct_insert_section, init_test_tracing, setup_test_db,
    };

    fn sample_job(work_order: &str) -> NewJob {
        NewJob {
            work_order: work_order.to_string(),
            job_name: "Production Line Repair".to_string(),
            customer: "ABC Manufacturing".to_string(),
            total_hours: Some(40.0),
            sections: vec![
                NewJobSection {
                    name: "Preparation".to_string(),
                    estimated_hours: 10.0,
                },
                NewJobSection {
                    name: "Welding".to_string(),
                    estimated_hours: 30.0,
                },
            ],
            ..NewJob::default()
        }
    }

    #[tokio::test]
    async fn test_create_job_with_sections_and_aggregates() -> Result<()> {
        init_test_tracing();
        let pool = setup_test_db().await?;

        let detail = create_job(&pool, &sample_job("4363")).await?;
        assert_eq!(detail.job.work_order, "4363");
        assert_eq!(detail.sections.len(), 2);

        let listed = list_jobs(&pool, &JobFilter::default()).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].section_count, 2);
        assert!((listed[0].total_estimated_hours - 40.0).abs() < f64::EPSILON);
        assert!((listed[0].job.total_hours - 40.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_job_missing_required_writes_nothing() -> Result<()> {
        let pool = setup_test_db().await?;
        let err = create_job(
            &pool,
            &NewJob {
                work_order: "4363".to_string(),
                ..NewJob::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let conn = pool.lock().unwrap();
        assert_eq!(count_rows(&conn, "jobs")?, 0);
        assert_eq!(count_rows(&conn, "job_sections")?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_work_order_is_conflict_and_rolls_back_sections() -> Result<()> {
        let pool = setup_test_db().await?;
        create_job(&pool, &sample_job("4363")).await?;

        let err = create_job(&pool, &sample_job("4363")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let conn = pool.lock().unwrap();
        assert_eq!(count_rows(&conn, "jobs")?, 1);
        assert_eq!(count_rows(&conn, "job_sections")?, 2, "only the first job's sections");
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_section_rows_are_skipped() -> Result<()> {
        let pool = setup_test_db().await?;
        let mut new = sample_job("4400");
        new.sections.push(NewJobSection::default());
        new.sections.push(NewJobSection {
            name: "Zero".to_string(),
            estimated_hours: 0.0,
        });

        let detail = create_job(&pool, &new).await?;
        assert_eq!(detail.sections.len(), 2, "blank and zero-estimate rows skipped");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_jobs_filters() -> Result<()> {
        let pool = setup_test_db().await?;
        create_job(&pool, &sample_job("4363")).await?;
        let mut other = sample_job("4364");
        other.customer = "XYZ Corp".to_string();
        create_job(&pool, &other).await?;

        let by_customer = list_jobs(
            &pool,
            &JobFilter {
                customer: Some("xyz".to_string()),
                ..JobFilter::default()
            },
        )
        .await?;
        assert_eq!(by_customer.len(), 1);
        assert_eq!(by_customer[0].job.work_order, "4364");

        let by_status = list_jobs(
            &pool,
            &JobFilter {
                status: Some("completed".to_string()),
                ..JobFilter::default()
            },
        )
        .await?;
        assert!(by_status.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_job_status_and_not_found() -> Result<()> {
        let pool = setup_test_db().await?;
        let created = create_job(&pool, &sample_job("4363")).await?;

        let updated = update_job(
            &pool,
            created.job.id,
            &UpdateJob {
                work_order: "4363".to_string(),
                job_name: "Production Line Repair".to_string(),
                customer: "ABC Manufacturing".to_string(),
                status: Some("completed".to_string()),
                total_hours: Some(42.0),
                ..UpdateJob::default()
            },
        )
        .await?
        .expect("job exists");
        assert_eq!(updated.status, "completed");
        assert!((updated.total_hours - 42.0).abs() < f64::EPSILON);

        let missing = update_job(
            &pool,
            9999,
            &UpdateJob {
                work_order: "x".to_string(),
                job_name: "y".to_string(),
                customer: "z".to_string(),
                ..UpdateJob::default()
            },
        )
        .await?;
        assert!(missing.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_job_cascades_to_sections() -> Result<()> {
        let pool = setup_test_db().await?;
        let job_id = {
            let conn = pool.lock().unwrap();
            let job_id = direct_insert_job(&conn, "4365", "Inspection", "DEF Industries", 20.0)?;
            direct_insert_section(&conn, job_id, "Setup", 5.0)?;
            direct_insert_section(&conn, job_id, "Testing", 15.0)?;
            job_id
        };

        assert!(delete_job(&pool, job_id).await?);

        let conn = pool.lock().unwrap();
        assert_eq!(count_rows(&conn, "jobs")?, 0);
        assert_eq!(count_rows(&conn, "job_sections")?, 0, "cascade removed sections");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_job_returns_sections_in_order() -> Result<()> {
        let pool = setup_test_db().await?;
        let detail = create_job(&pool, &sample_job("4363")).await?;
        let fetched = get_job(&pool, detail.job.id).await?.expect("job exists");
        let names: Vec<_> = fetched
            .sections
            .iter()
            .map(|s| s.section_name.as_str())
            .collect();
        assert_eq!(names, vec!["Preparation", "Welding"]);

        assert!(get_job(&pool, 12345).await?.is_none());
        Ok(())
    }
}
