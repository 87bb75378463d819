//! Transactions and the unit-of-work surface.
//!
//! A [`Transaction`] wraps one connection with a native transaction and
//! exposes the write pipeline plus raw non-query execution. It commits on
//! [`Transaction::commit`]; dropping it without committing abandons the
//! native transaction, which the engine rolls back when the connection
//! closes.

use std::sync::Arc;

use polysql_core::{Dialect, Model, ParameterMap, Q, Query, SchemaConfig};

use crate::connection::Connection;
use crate::error::Result;
use crate::statements;

/// One connection plus a native transaction scoping a sequence of writes.
pub struct Transaction<C: Connection> {
    conn: C,
    dialect: Arc<Dialect>,
    config: Arc<SchemaConfig>,
}

impl<C: Connection> Transaction<C> {
    /// Begins a native transaction on `conn`.
    pub(crate) async fn begin(
        mut conn: C,
        dialect: Arc<Dialect>,
        config: Arc<SchemaConfig>,
    ) -> Result<Self> {
        conn.begin().await?;
        Ok(Self {
            conn,
            dialect,
            config,
        })
    }

    /// Inserts `model`, then reconciles its many-to-many relations.
    pub async fn create<T: Model>(&mut self, model: &T) -> Result<()> {
        let meta = self.config.resolve::<T>();
        statements::run_create(&mut self.conn, &self.dialect, &meta, model).await
    }

    /// Updates `model` by primary key, then reconciles its many-to-many
    /// relations.
    pub async fn update<T: Model>(&mut self, model: &T) -> Result<()> {
        let meta = self.config.resolve::<T>();
        statements::run_update(&mut self.conn, &self.dialect, &meta, model).await
    }

    /// Inserts or updates `model` with the engine's upsert strategy, then
    /// reconciles its many-to-many relations.
    pub async fn create_or_update<T: Model>(&mut self, model: &T) -> Result<()> {
        let meta = self.config.resolve::<T>();
        statements::run_upsert(&mut self.conn, &self.dialect, &meta, model).await
    }

    /// Hard-deletes every `T` matching `predicate`.
    pub async fn delete<T: Model>(&mut self, predicate: Q) -> Result<()> {
        let query = Query::<T>::new(Arc::clone(&self.dialect), Arc::clone(&self.config))
            .filter(predicate)?;
        let sql = query.to_sql_delete()?;
        tracing::debug!(sql = %sql, "executing delete");
        self.conn.execute(&sql, query.params()).await?;
        Ok(())
    }

    /// Executes raw non-query text within the transaction.
    pub async fn execute_non_query(&mut self, sql: &str, params: &ParameterMap) -> Result<u64> {
        self.conn.execute(sql, params).await
    }

    /// Commits the native transaction.
    pub async fn commit(mut self) -> Result<()> {
        self.conn.commit().await
    }

    /// Rolls the native transaction back.
    pub async fn rollback(mut self) -> Result<()> {
        self.conn.rollback().await
    }
}
