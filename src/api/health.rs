use crate::db::DbPool;
use crate::errors::Result;
use crate::models::HealthReport;
use chrono::Utc;
use tracing::warn;

/// Reports process and database liveness. A failing probe degrades the
/// report instead of erroring, so the caller always gets an answer.
pub async fn health_check(pool: &DbPool) -> Result<HealthReport> {
    let database = match pool.lock() {
        Ok(conn) => conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).is_ok(),
        Err(_) => false,
    };
    if !database {
        warn!("Health probe could not reach the database");
    }
    Ok(HealthReport {
        status: if database { "ok" } else { "degraded" }.to_string(),
        database,
        timestamp: Utc::now(),
    })
}
