//! SQLite persistence layer. One shared connection behind a mutex; every
//! multi-row write runs inside an explicit transaction.

pub mod attendance;
pub mod connection;
pub mod employees;
pub mod jobs;
pub(crate) mod schema;
pub mod seed;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod timesheets;
pub mod uploads;

pub use connection::{init_db, DbPool};

/// Trims an optional string, mapping blank input to `None` so the database
/// never stores empty strings where NULL is meant.
pub(crate) fn clean_opt(opt: &Option<String>) -> Option<String> {
    opt.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
