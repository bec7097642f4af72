use crate::db::uploads::{self, NewUpload, ProcessOutcome, UploadFilter};
use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::{ExtractedTimesheet, UploadStats, UploadedFile};

pub async fn list(pool: &DbPool, filter: &UploadFilter) -> Result<Vec<UploadedFile>> {
    uploads::list_uploads(pool, filter).await
}

pub async fn get(pool: &DbPool, id: i64) -> Result<UploadedFile> {
    uploads::get_upload(pool, id)
        .await?
        .ok_or(Error::NotFound("File"))
}

pub async fn create(pool: &DbPool, new: &NewUpload) -> Result<UploadedFile> {
    uploads::create_upload(pool, new).await
}

/// Marks an upload processed, promoting it to a draft timesheet when the
/// extraction names an employee.
pub async fn process(
    pool: &DbPool,
    id: i64,
    extraction: Option<ExtractedTimesheet>,
) -> Result<ProcessOutcome> {
    uploads::process_upload(pool, id, extraction)
        .await?
        .ok_or(Error::NotFound("File"))
}

pub async fn stats(pool: &DbPool) -> Result<UploadStats> {
    uploads::upload_stats(pool).await
}

pub async fn download(pool: &DbPool, id: i64) -> Result<(UploadedFile, Vec<u8>)> {
    uploads::download_upload(pool, id)
        .await?
        .ok_or(Error::NotFound("File"))
}

pub async fn delete(pool: &DbPool, id: i64) -> Result<()> {
    if uploads::delete_upload(pool, id).await? {
        Ok(())
    } else {
        Err(Error::NotFound("File"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::response::{envelope, Reply};
    use crate::db::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_missing_file_maps_to_404() -> Result<()> {
        let pool = setup_test_db().await?;
        let reply = envelope(get(&pool, 9).await.map(Reply::ok));
        assert_eq!(reply.status, 404);
        assert_eq!(reply.body.error.as_deref(), Some("File not found"));

        assert!(matches!(
            process(&pool, 9, None).await.unwrap_err(),
            Error::NotFound("File")
        ));
        assert!(matches!(
            download(&pool, 9).await.unwrap_err(),
            Error::NotFound("File")
        ));
        Ok(())
    }
}
