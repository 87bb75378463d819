//! Error types for the migration system.

use thiserror::Error;

use crate::migration::MigrationStep;

/// Errors that can occur while running migrations.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// SQL generation failed.
    #[error(transparent)]
    Core(#[from] polysql_core::Error),

    /// A data-access operation failed.
    #[error(transparent)]
    Orm(#[from] polysql_orm::OrmError),

    /// A migration phase failed. The failure hook has already run; the
    /// runner never continues past a failed phase.
    #[error("migration step {step} failed: {source}")]
    MigrationFailed {
        /// The step that failed.
        step: MigrationStep,
        /// The underlying cause.
        #[source]
        source: Box<MigrateError>,
    },
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
