//! The database provider: the top-level data-access surface.

use std::sync::Arc;

use futures::future::BoxFuture;
use polysql_core::template::expand;
use polysql_core::{Dialect, Model, ParameterMap, Q, Query, SchemaConfig, Value};
use tracing::{debug, warn};

use crate::connection::{Connection, ConnectionProvider, FromRow, Row};
use crate::error::{OrmError, Result};
use crate::statements;
use crate::transaction::Transaction;

/// Data-access entry point: queries, the write pipeline and transactions
/// over one [`ConnectionProvider`].
///
/// Each top-level operation acquires a connection for its own duration and
/// releases it on completion; an explicit [`Transaction`] keeps one open for
/// its whole scope. The schema configuration is shared, read-mostly state —
/// two operations on the same model type may run concurrently on different
/// connections.
pub struct DbProvider<P: ConnectionProvider> {
    provider: P,
    dialect: Arc<Dialect>,
    config: Arc<SchemaConfig>,
}

impl<P: ConnectionProvider> DbProvider<P> {
    /// Creates a provider with a fresh schema configuration.
    #[must_use]
    pub fn new(provider: P, dialect: Dialect) -> Self {
        Self::with_config(provider, dialect, Arc::new(SchemaConfig::new()))
    }

    /// Creates a provider sharing an existing schema configuration.
    #[must_use]
    pub fn with_config(provider: P, dialect: Dialect, config: Arc<SchemaConfig>) -> Self {
        Self {
            provider,
            dialect: Arc::new(dialect),
            config,
        }
    }

    /// The dialect statements render with.
    #[must_use]
    pub fn dialect(&self) -> &Arc<Dialect> {
        &self.dialect
    }

    /// The shared schema configuration.
    #[must_use]
    pub fn config(&self) -> &Arc<SchemaConfig> {
        &self.config
    }

    /// The connected database's name.
    #[must_use]
    pub fn database_name(&self) -> &str {
        self.provider.database_name()
    }

    /// Starts a query over `T`.
    #[must_use]
    pub fn query<T: Model>(&self) -> Query<T> {
        Query::new(Arc::clone(&self.dialect), Arc::clone(&self.config))
    }

    /// Inserts `model`, then reconciles its many-to-many relations.
    pub async fn create<T: Model>(&self, model: &T) -> Result<()> {
        let mut conn = self.provider.acquire().await?;
        let meta = self.config.resolve::<T>();
        statements::run_create(&mut conn, &self.dialect, &meta, model).await
    }

    /// Updates `model` by primary key, then reconciles its many-to-many
    /// relations.
    pub async fn update<T: Model>(&self, model: &T) -> Result<()> {
        let mut conn = self.provider.acquire().await?;
        let meta = self.config.resolve::<T>();
        statements::run_update(&mut conn, &self.dialect, &meta, model).await
    }

    /// Inserts or updates `model` using the engine's upsert strategy.
    pub async fn create_or_update<T: Model>(&self, model: &T) -> Result<()> {
        let mut conn = self.provider.acquire().await?;
        let meta = self.config.resolve::<T>();
        statements::run_upsert(&mut conn, &self.dialect, &meta, model).await
    }

    /// Hard-deletes every `T` matching `predicate`. There is no soft-delete
    /// at this layer.
    pub async fn delete<T: Model>(&self, predicate: Q) -> Result<()> {
        let query = self.query::<T>().filter(predicate)?;
        let sql = query.to_sql_delete()?;
        debug!(sql = %sql, "executing delete");
        let mut conn = self.provider.acquire().await?;
        conn.execute(&sql, query.params()).await?;
        Ok(())
    }

    /// Fetches every row matching `query`, mapped through [`FromRow`].
    pub async fn fetch<T: Model + FromRow>(&self, query: &Query<T>) -> Result<Vec<T>> {
        let sql = query.to_sql();
        debug!(sql = %sql, "executing select");
        let mut conn = self.provider.acquire().await?;
        let rows = conn.query_rows(&sql, query.params()).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Fetches the first matching row, if any.
    pub async fn fetch_first<T: Model + FromRow>(&self, query: &Query<T>) -> Result<Option<T>> {
        Ok(self.fetch(query).await?.into_iter().next())
    }

    /// Fetches exactly one matching row.
    pub async fn fetch_single<T: Model + FromRow>(&self, query: &Query<T>) -> Result<T> {
        let mut results = self.fetch(query).await?;
        match results.len() {
            0 => Err(OrmError::NotFound),
            1 => Ok(results.remove(0)),
            _ => Err(OrmError::MultipleRows),
        }
    }

    /// Counts the rows matching `query`.
    pub async fn count<T: Model>(&self, query: &Query<T>) -> Result<i64> {
        let sql = query.to_sql_count();
        debug!(sql = %sql, "executing count");
        let mut conn = self.provider.acquire().await?;
        match conn.query_scalar(&sql, query.params()).await? {
            Some(Value::Int(n)) => Ok(n),
            Some(other) => Err(OrmError::Mapping(format!(
                "count returned a non-integer value: {other:?}"
            ))),
            None => Ok(0),
        }
    }

    /// Executes the UPDATE form of a filtered query against `model`.
    pub async fn update_filtered<T: Model>(&self, query: &Query<T>, model: &T) -> Result<()> {
        let (sql, params) = query.to_sql_update(model);
        debug!(sql = %sql, "executing filtered update");
        let mut conn = self.provider.acquire().await?;
        conn.execute(&sql, &params).await?;
        Ok(())
    }

    /// Executes raw non-query text.
    pub async fn execute_non_query(&self, sql: &str, params: &ParameterMap) -> Result<u64> {
        let mut conn = self.provider.acquire().await?;
        conn.execute(sql, params).await
    }

    /// Executes raw text returning a single scalar.
    pub async fn execute_scalar(&self, sql: &str, params: &ParameterMap) -> Result<Option<Value>> {
        let mut conn = self.provider.acquire().await?;
        conn.query_scalar(sql, params).await
    }

    /// Executes raw text returning all rows.
    pub async fn execute_rows(&self, sql: &str, params: &ParameterMap) -> Result<Vec<Row>> {
        let mut conn = self.provider.acquire().await?;
        conn.query_rows(sql, params).await
    }

    /// Checks whether `table` exists in the connected database.
    pub async fn check_if_table_exists(&self, table: &str) -> Result<bool> {
        let sql = expand(self.dialect.check_table_exists, &[table]);
        match self.execute_scalar(&sql, &ParameterMap::new()).await? {
            Some(Value::Int(n)) => Ok(n > 0),
            _ => Ok(false),
        }
    }

    /// Begins an explicit transaction scope.
    pub async fn begin_transaction(&self) -> Result<Transaction<P::Conn>> {
        let conn = self.provider.acquire().await?;
        Transaction::begin(conn, Arc::clone(&self.dialect), Arc::clone(&self.config)).await
    }

    /// Runs `work` inside a native transaction: commits on success, rolls
    /// back and rethrows on any error. There are no partial commits.
    pub async fn run_in_transaction<F>(&self, work: F) -> Result<()>
    where
        F: for<'t> FnOnce(&'t mut Transaction<P::Conn>) -> BoxFuture<'t, Result<()>>,
    {
        let mut tx = self.begin_transaction().await?;
        match work(&mut tx).await {
            Ok(()) => tx.commit().await,
            Err(error) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(error = %rollback_error, "rollback failed after transaction error");
                }
                Err(error)
            }
        }
    }
}
