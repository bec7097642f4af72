//! Database location resolution.
//!
//! The original deployment accepted either a single `DATABASE_URL` or a set
//! of discrete `DB_*` variables. With an embedded SQLite store the same idea
//! collapses to one variable: `DATABASE_PATH`, with a local-file default so
//! a fresh checkout works without any configuration.

use crate::errors::{Error, Result};

const DEFAULT_DATABASE_PATH: &str = "data/ravensheet.sqlite";

/// Resolves the SQLite database path from `DATABASE_PATH`, falling back to
/// a default local file.
///
/// # Errors
///
/// Returns `Error::Config` when `DATABASE_PATH` is set but empty.
pub fn resolve_database_path() -> Result<String> {
    match std::env::var("DATABASE_PATH") {
        Ok(path) if path.trim().is_empty() => {
            Err(Error::Config("DATABASE_PATH is set but empty".to_string()))
        }
        Ok(path) => Ok(path),
        Err(_) => Ok(DEFAULT_DATABASE_PATH.to_string()),
    }
}
