//! Environment-driven application configuration.

/// Database path resolution from environment variables
pub mod database;

use crate::errors::Result;
use tracing::info;

/// Everything the application needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Filesystem path of the SQLite database.
    pub database_path: String,
}

/// Loads the full application configuration from the environment.
///
/// `.env` loading is the caller's responsibility (done once in `main`);
/// this function only reads already-present variables.
///
/// # Errors
///
/// Returns `Error::Config` if a configured value is present but unusable.
pub fn load_app_configuration() -> Result<AppConfig> {
    let database_path = database::resolve_database_path()?;
    info!("Configured database path: {}", database_path);
    Ok(AppConfig { database_path })
}
