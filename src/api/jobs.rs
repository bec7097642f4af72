use crate::core::budget::{budget_percent, budget_status, BudgetStatus};
use crate::db::jobs::{self, JobFilter, NewJob, UpdateJob};
use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::{Job, JobDetail, JobSection, JobSummary};
use serde::Serialize;

/// A job detail annotated with its budget standing.
#[derive(Debug, Clone, Serialize)]
pub struct JobWithBudget {
    #[serde(flatten)]
    pub detail: JobDetail,
    pub budget_percent: f64,
    pub budget_status: BudgetStatus,
}

pub async fn list(pool: &DbPool, filter: &JobFilter) -> Result<Vec<JobSummary>> {
    jobs::list_jobs(pool, filter).await
}

pub async fn get(pool: &DbPool, id: i64) -> Result<JobWithBudget> {
    let detail = jobs::get_job(pool, id)
        .await?
        .ok_or(Error::NotFound("Job"))?;
    let percent = budget_percent(detail.job.completed_hours, detail.job.total_hours);
    let status = budget_status(detail.job.completed_hours, detail.job.total_hours);
    Ok(JobWithBudget {
        detail,
        budget_percent: percent,
        budget_status: status,
    })
}

pub async fn create(pool: &DbPool, new: &NewJob) -> Result<JobDetail> {
    jobs::create_job(pool, new).await
}

pub async fn update(pool: &DbPool, id: i64, update: &UpdateJob) -> Result<Job> {
    jobs::update_job(pool, id, update)
        .await?
        .ok_or(Error::NotFound("Job"))
}

pub async fn delete(pool: &DbPool, id: i64) -> Result<()> {
    if jobs::delete_job(pool, id).await? {
        Ok(())
    } else {
        Err(Error::NotFound("Job"))
    }
}

/// Sections of one job; 404s when the job itself is unknown.
pub async fn sections(pool: &DbPool, id: i64) -> Result<Vec<JobSection>> {
    get(pool, id).await?;
    jobs::list_job_sections(pool, id).await
}
