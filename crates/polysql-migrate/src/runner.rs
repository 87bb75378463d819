//! The migration runner.
//!
//! Runs ordered migrations as a per-version state machine. Each of the
//! three phases (Setup, Migrate, Finish) runs the role-specific hook first
//! (when the role matches), then the shared hook; every hook gets a fresh
//! DDL context whose rendered output executes immediately. The phase's
//! completion flag is persisted independently, so a crash mid-migration
//! resumes at the next incomplete phase.

use chrono::Utc;
use polysql_core::{Database, ParameterMap, Q, ScalarType, Value};
use polysql_orm::{ConnectionProvider, DbProvider};
use tracing::{debug, info};

use crate::error::{MigrateError, Result};
use crate::migration::{Migration, MigrationStep, SystemRole};
use crate::version::{VersionRecord, VERSION_TABLE};

/// The three phases of one migration version, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Setup,
    Migrate,
    Finish,
}

impl Phase {
    fn shared_step(self) -> MigrationStep {
        match self {
            Self::Setup => MigrationStep::Setup,
            Self::Migrate => MigrationStep::Migrate,
            Self::Finish => MigrationStep::Finish,
        }
    }

    fn role_step(self, role: SystemRole) -> MigrationStep {
        match (role, self) {
            (SystemRole::Client, Self::Setup) => MigrationStep::ClientSetup,
            (SystemRole::Client, Self::Migrate) => MigrationStep::ClientMigrate,
            (SystemRole::Client, Self::Finish) => MigrationStep::ClientFinish,
            (SystemRole::Server, Self::Setup) => MigrationStep::ServerSetup,
            (SystemRole::Server, Self::Migrate) => MigrationStep::ServerMigrate,
            (SystemRole::Server, Self::Finish) => MigrationStep::ServerFinish,
        }
    }
}

/// Runs migrations against one provider.
pub struct MigrationRunner<'a, P: ConnectionProvider> {
    provider: &'a DbProvider<P>,
}

impl<'a, P: ConnectionProvider> MigrationRunner<'a, P> {
    /// Creates a runner over `provider`.
    #[must_use]
    pub fn new(provider: &'a DbProvider<P>) -> Self {
        Self { provider }
    }

    /// Ensures the reserved version table exists.
    pub async fn create_system_tables(&self) -> Result<()> {
        if self.provider.check_if_table_exists(VERSION_TABLE).await? {
            return Ok(());
        }
        info!(table = VERSION_TABLE, "creating version table");

        let mut database = self.ddl_context();
        let table = database.add_table(VERSION_TABLE);
        table
            .add_column("VersionNumber", ScalarType::Int32)
            .primary_key()
            .clustered()
            .not_nullable();
        table
            .add_column("MigrationDate", ScalarType::DateTimeOffset)
            .not_nullable();
        table
            .add_column("IsSetupComplete", ScalarType::Bool)
            .not_nullable_with_default(Value::Bool(true));
        table
            .add_column("IsMigrationComplete", ScalarType::Bool)
            .not_nullable_with_default(Value::Bool(true));
        table
            .add_column("IsFinishComplete", ScalarType::Bool)
            .not_nullable_with_default(Value::Bool(true));

        let ddl = database.to_sql()?;
        self.provider
            .execute_non_query(&ddl, &ParameterMap::new())
            .await?;
        Ok(())
    }

    /// Runs every migration in version order, creating the version table
    /// first.
    pub async fn run_all(
        &self,
        role: SystemRole,
        migrations: &[&dyn Migration<P>],
    ) -> Result<()> {
        self.create_system_tables().await?;

        let mut ordered: Vec<&dyn Migration<P>> = migrations.to_vec();
        ordered.sort_by_key(|m| m.version());

        for migration in ordered {
            self.run(role, migration).await?;
        }
        Ok(())
    }

    /// Runs one migration; phases already marked complete are skipped.
    pub async fn run(&self, role: SystemRole, migration: &dyn Migration<P>) -> Result<()> {
        let mut record = self.load_or_create_version(migration.version()).await?;
        if record.is_complete() {
            debug!(version = record.version_number, "migration already complete");
            return Ok(());
        }
        info!(version = record.version_number, "running migration");

        if !record.is_setup_complete {
            self.run_phase(role, migration, Phase::Setup).await?;
            record.is_setup_complete = true;
            self.persist(&record).await?;
        }
        if !record.is_migration_complete {
            self.run_phase(role, migration, Phase::Migrate).await?;
            record.is_migration_complete = true;
            self.persist(&record).await?;
        }
        if !record.is_finish_complete {
            self.run_phase(role, migration, Phase::Finish).await?;
            record.is_finish_complete = true;
            self.persist(&record).await?;
        }
        Ok(())
    }

    async fn run_phase(
        &self,
        role: SystemRole,
        migration: &dyn Migration<P>,
        phase: Phase,
    ) -> Result<()> {
        self.execute_step(migration, phase.role_step(role)).await?;
        self.execute_step(migration, phase.shared_step()).await
    }

    async fn execute_step(
        &self,
        migration: &dyn Migration<P>,
        step: MigrationStep,
    ) -> Result<()> {
        let mut database = self.ddl_context();

        let outcome = self.invoke_hook(migration, step, &mut database).await;
        match outcome {
            Ok(()) => Ok(()),
            Err(error) => {
                migration
                    .failed(&mut database, self.provider, step, &error)
                    .await;
                Err(MigrateError::MigrationFailed {
                    step,
                    source: Box::new(error),
                })
            }
        }
    }

    async fn invoke_hook(
        &self,
        migration: &dyn Migration<P>,
        step: MigrationStep,
        database: &mut Database,
    ) -> Result<()> {
        match step {
            MigrationStep::Setup => migration.setup(database, self.provider).await?,
            MigrationStep::Migrate => migration.migrate(database, self.provider).await?,
            MigrationStep::Finish => migration.finish(database, self.provider).await?,
            MigrationStep::ClientSetup => migration.client_setup(database, self.provider).await?,
            MigrationStep::ClientMigrate => {
                migration.client_migrate(database, self.provider).await?;
            }
            MigrationStep::ClientFinish => migration.client_finish(database, self.provider).await?,
            MigrationStep::ServerSetup => migration.server_setup(database, self.provider).await?,
            MigrationStep::ServerMigrate => {
                migration.server_migrate(database, self.provider).await?;
            }
            MigrationStep::ServerFinish => migration.server_finish(database, self.provider).await?,
        }

        if !database.is_empty() {
            let ddl = database.to_sql()?;
            if !ddl.trim().is_empty() {
                debug!(step = %step, "executing accumulated DDL");
                self.provider
                    .execute_non_query(&ddl, &ParameterMap::new())
                    .await?;
            }
        }
        Ok(())
    }

    async fn load_or_create_version(&self, version: i32) -> Result<VersionRecord> {
        let query = self
            .provider
            .query::<VersionRecord>()
            .filter(Q::eq("VersionNumber", version))?
            .order_by_desc("VersionNumber")?;

        if let Some(record) = self.provider.fetch_first(&query).await? {
            return Ok(record);
        }

        let record = VersionRecord::new(version, Utc::now());
        self.provider.create(&record).await?;
        Ok(record)
    }

    async fn persist(&self, record: &VersionRecord) -> Result<()> {
        let query = self
            .provider
            .query::<VersionRecord>()
            .filter(Q::eq("VersionNumber", record.version_number))?;
        self.provider.update_filtered(&query, record).await?;
        Ok(())
    }

    fn ddl_context(&self) -> Database {
        Database::new(
            self.provider.database_name(),
            self.provider.dialect().clone(),
            self.provider.config().clone(),
        )
    }
}
