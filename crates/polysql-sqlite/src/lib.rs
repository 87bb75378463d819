//! # polysql-sqlite
//!
//! A SQLite connection provider for polysql, backed by `sqlx`.
//!
//! Implements the `polysql-orm` connection capability over a
//! [`sqlx::SqlitePool`]: named `@Name` placeholders are rewritten to
//! positional binds, rows are decoded by SQLite storage class, and
//! parameter-free statements run through `raw_sql` so multi-statement DDL
//! blocks execute as a unit.

mod bind;

pub use bind::expand_named_parameters;

use polysql_core::{ParameterMap, Value};
use polysql_orm::{Connection, ConnectionProvider, OrmError, Result, Row};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as _, Row as _, Sqlite, TypeInfo as _, ValueRef as _};
use tracing::debug;

fn connection_error(err: sqlx::Error) -> OrmError {
    OrmError::Connection(err.to_string())
}

/// Hands out connections from one SQLite pool.
pub struct SqliteProvider {
    pool: SqlitePool,
    database_name: String,
}

impl SqliteProvider {
    /// Connects to a SQLite database URL (e.g. `sqlite::memory:` or a file
    /// path).
    pub async fn connect(url: &str, database_name: impl Into<String>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(connection_error)?;
        Ok(Self::from_pool(pool, database_name))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: SqlitePool, database_name: impl Into<String>) -> Self {
        Self {
            pool,
            database_name: database_name.into(),
        }
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ConnectionProvider for SqliteProvider {
    type Conn = SqliteSession;

    async fn acquire(&self) -> Result<SqliteSession> {
        let conn = self.pool.acquire().await.map_err(connection_error)?;
        Ok(SqliteSession { conn })
    }

    fn database_name(&self) -> &str {
        &self.database_name
    }
}

/// One checked-out SQLite connection.
pub struct SqliteSession {
    conn: PoolConnection<Sqlite>,
}

impl Connection for SqliteSession {
    async fn execute(&mut self, sql: &str, params: &ParameterMap) -> Result<u64> {
        debug!(sql = %sql, "execute");
        if params.is_empty() {
            // DDL blocks may carry several statements
            let result = sqlx::raw_sql(sql)
                .execute(&mut *self.conn)
                .await
                .map_err(connection_error)?;
            return Ok(result.rows_affected());
        }

        let (text, values) = expand_named_parameters(sql, params)?;
        let mut query = sqlx::query(&text);
        for value in values {
            query = bind_value(query, value);
        }
        let result = query
            .execute(&mut *self.conn)
            .await
            .map_err(connection_error)?;
        Ok(result.rows_affected())
    }

    async fn query_scalar(&mut self, sql: &str, params: &ParameterMap) -> Result<Option<Value>> {
        debug!(sql = %sql, "query scalar");
        let (text, values) = expand_named_parameters(sql, params)?;
        let mut query = sqlx::query(&text);
        for value in values {
            query = bind_value(query, value);
        }
        let row = query
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(connection_error)?;
        match row {
            Some(row) => {
                let decoded = decode_row(&row)?;
                let scalar = decoded.iter().next().map(|(_, value)| value.clone());
                Ok(scalar)
            }
            None => Ok(None),
        }
    }

    async fn query_rows(&mut self, sql: &str, params: &ParameterMap) -> Result<Vec<Row>> {
        debug!(sql = %sql, "query rows");
        let (text, values) = expand_named_parameters(sql, params)?;
        let mut query = sqlx::query(&text);
        for value in values {
            query = bind_value(query, value);
        }
        let rows = query
            .fetch_all(&mut *self.conn)
            .await
            .map_err(connection_error)?;
        rows.iter().map(decode_row).collect()
    }

    async fn begin(&mut self) -> Result<()> {
        sqlx::query("BEGIN")
            .execute(&mut *self.conn)
            .await
            .map_err(connection_error)?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        sqlx::query("COMMIT")
            .execute(&mut *self.conn)
            .await
            .map_err(connection_error)?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        sqlx::query("ROLLBACK")
            .execute(&mut *self.conn)
            .await
            .map_err(connection_error)?;
        Ok(())
    }
}

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

fn bind_value(query: SqliteQuery<'_>, value: Value) -> SqliteQuery<'_> {
    match value {
        Value::Null => query.bind(Option::<i64>::None),
        Value::Bool(b) => query.bind(b),
        Value::Int(n) => query.bind(n),
        Value::Float(f) => query.bind(f),
        Value::Text(s) => query.bind(s),
        Value::Blob(b) => query.bind(b),
        Value::DateTime(dt) => query.bind(dt.to_rfc3339()),
    }
}

fn decode_row(row: &SqliteRow) -> Result<Row> {
    let mut decoded = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index).map_err(connection_error)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let info = raw.type_info();
            match info.name() {
                "INTEGER" => Value::Int(row.try_get(index).map_err(connection_error)?),
                "REAL" => Value::Float(row.try_get(index).map_err(connection_error)?),
                "BLOB" => Value::Blob(row.try_get(index).map_err(connection_error)?),
                _ => Value::Text(row.try_get(index).map_err(connection_error)?),
            }
        };
        decoded.push(column.name(), value);
    }
    Ok(decoded)
}
