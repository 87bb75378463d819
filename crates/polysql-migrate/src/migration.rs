//! The migration contract.

use std::fmt;

use futures::future::BoxFuture;
use polysql_core::Database;
use polysql_orm::{ConnectionProvider, DbProvider};

use crate::error::{MigrateError, Result};

/// Where the system is running; role-specific hooks fire only when the
/// declared role matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemRole {
    /// Running on a client (typically the SQLite-like engine).
    Client,
    /// Running on a server.
    Server,
}

/// One hook slot of a migration version.
///
/// Each of the three phases (Setup, Migrate, Finish) has a shared step that
/// always runs and a role-specific step that runs first when the role
/// matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStep {
    /// Shared setup, both roles.
    Setup,
    /// Shared migration body, both roles.
    Migrate,
    /// Shared finalization, both roles; typically seeding or cleanup.
    Finish,
    /// Client-only setup.
    ClientSetup,
    /// Client-only migration body.
    ClientMigrate,
    /// Client-only finalization.
    ClientFinish,
    /// Server-only setup.
    ServerSetup,
    /// Server-only migration body.
    ServerMigrate,
    /// Server-only finalization.
    ServerFinish,
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A versioned migration.
///
/// Every hook receives a fresh [`Database`] DDL context; whatever the hook
/// accumulates there is rendered and executed right after the hook returns.
/// Hooks default to no-ops, so a migration implements only the steps it
/// needs. Hook bodies are boxed futures so migration lists can be
/// heterogeneous (`&[&dyn Migration<P>]`).
pub trait Migration<P: ConnectionProvider>: Send + Sync {
    /// The version this migration brings the database to.
    fn version(&self) -> i32;

    /// Shared setup phase.
    fn setup<'a>(
        &'a self,
        _db: &'a mut Database,
        _provider: &'a DbProvider<P>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Shared migration phase.
    fn migrate<'a>(
        &'a self,
        _db: &'a mut Database,
        _provider: &'a DbProvider<P>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Shared finish phase.
    fn finish<'a>(
        &'a self,
        _db: &'a mut Database,
        _provider: &'a DbProvider<P>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Client-only setup phase.
    fn client_setup<'a>(
        &'a self,
        _db: &'a mut Database,
        _provider: &'a DbProvider<P>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Client-only migration phase.
    fn client_migrate<'a>(
        &'a self,
        _db: &'a mut Database,
        _provider: &'a DbProvider<P>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Client-only finish phase.
    fn client_finish<'a>(
        &'a self,
        _db: &'a mut Database,
        _provider: &'a DbProvider<P>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Server-only setup phase.
    fn server_setup<'a>(
        &'a self,
        _db: &'a mut Database,
        _provider: &'a DbProvider<P>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Server-only migration phase.
    fn server_migrate<'a>(
        &'a self,
        _db: &'a mut Database,
        _provider: &'a DbProvider<P>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Server-only finish phase.
    fn server_finish<'a>(
        &'a self,
        _db: &'a mut Database,
        _provider: &'a DbProvider<P>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Failure hook: invoked with the failed step and its error before the
    /// runner rethrows. Nothing is swallowed.
    fn failed<'a>(
        &'a self,
        _db: &'a mut Database,
        _provider: &'a DbProvider<P>,
        _step: MigrationStep,
        _error: &'a MigrateError,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async {})
    }
}
