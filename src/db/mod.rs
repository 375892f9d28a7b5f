//! Database module: pool setup, schema initialization and read queries.
//!
//! - `model`: row shapes returned by SQL before they become domain types.
//! - `repo`: connection handling, the migration runner and the two list queries.
//!
//! Callers import from `school_roster::db`; the repository API is re-exported here.

pub mod model;
pub mod repo;

pub use repo::*;

/// Storage failures surfaced by this module.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached or answered with an error at query time.
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    /// Schema creation or seeding failed during startup.
    #[error("storage initialization failed: {0}")]
    InitializationFailed(#[from] sqlx::migrate::MigrateError),
}
