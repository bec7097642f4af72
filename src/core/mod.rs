//! Pure business logic: budget math, weekly attendance folding, and CSV
//! report rendering. Nothing here touches the database.

pub mod budget;
pub mod report;
pub mod week;
