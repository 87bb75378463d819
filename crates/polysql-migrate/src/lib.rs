//! # polysql-migrate
//!
//! Versioned, idempotent database migrations.
//!
//! A migration implements [`Migration`] and brings the database to one
//! version through three phases (Setup, Migrate, Finish), each split into a
//! shared hook and a role-specific hook ([`SystemRole::Client`] or
//! [`SystemRole::Server`]). The [`MigrationRunner`] persists per-phase
//! completion flags in the reserved `__version` table, so re-running an
//! already-applied version performs no work and a crash resumes at the
//! next incomplete phase.
//!
//! ```ignore
//! use polysql_migrate::{Migration, MigrationRunner, SystemRole};
//!
//! struct CreateAuthors;
//!
//! impl<P: polysql_orm::ConnectionProvider> Migration<P> for CreateAuthors {
//!     fn version(&self) -> i32 {
//!         1
//!     }
//!
//!     fn migrate<'a>(
//!         &'a self,
//!         db: &'a mut polysql_core::Database,
//!         _provider: &'a polysql_orm::DbProvider<P>,
//!     ) -> futures::future::BoxFuture<'a, polysql_migrate::Result<()>> {
//!         Box::pin(async move {
//!             let table = db.add_table("Authors");
//!             table
//!                 .add_column("Id", polysql_core::ScalarType::Int32)
//!                 .primary_key()
//!                 .auto_increment(1, 1)?;
//!             table.add_column_with_precision("Name", polysql_core::ScalarType::String, 256);
//!             Ok(())
//!         })
//!     }
//! }
//!
//! let runner = MigrationRunner::new(&db);
//! runner.run_all(SystemRole::Server, &[&CreateAuthors]).await?;
//! ```

mod error;
mod migration;
mod runner;
mod version;

pub use error::{MigrateError, Result};
pub use migration::{Migration, MigrationStep, SystemRole};
pub use runner::MigrationRunner;
pub use version::{VersionRecord, VERSION_TABLE};
