//! Transport-agnostic resource handlers. Each submodule wraps the database
//! layer with the not-found mapping and response envelope the JSON surface
//! exposes, independent of what carries the request.

pub mod attendance;
pub mod employees;
pub mod health;
pub mod jobs;
pub mod response;
pub mod timesheets;
pub mod uploads;
