//! `Ravensheet` - shop operations tracking for a fabrication business
//!
//! This crate provides the full back office for a small fabrication shop:
//! employees with soft delete, jobs and their budgeted sections, captured
//! paper timesheets with line entries, daily attendance with weekly
//! summaries, uploaded timesheet photos with promotion to draft timesheets,
//! and CSV exports.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_types_passed_by_value,
    clippy::needless_pass_by_value,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::float_cmp,
    clippy::todo,
    clippy::unimplemented,

    // Complexity and readability
    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::match_same_arms,

    // Style consistency
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Resource handlers, the response envelope, and the health probe
pub mod api;
/// Configuration management for database and application settings
pub mod config;
/// Pure business logic - budget math, weekly folding, CSV rendering
pub mod core;
/// SQLite persistence layer
pub mod db;
/// Unified error types and result handling
pub mod errors;
/// Row and payload types shared across layers
pub mod models;
