//! Connection capability traits.
//!
//! The data-access layer never inspects a driver beyond this surface: an
//! acquired [`Connection`] executes already-built parameterized text and
//! returns a row set, a scalar or an affected-row count, and can scope a
//! native transaction. Concrete providers (such as the SQLite one) live in
//! their own crates.

use polysql_core::{ParameterMap, Value};

use crate::error::Result;

/// One result row: ordered column name/value pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.columns.push((name.into(), value));
    }

    /// Returns a column value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterates columns in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// An open connection to one database.
///
/// Statements issued through one connection run strictly sequentially; there
/// is no internal parallelism at this layer.
#[allow(async_fn_in_trait)]
pub trait Connection: Send {
    /// Executes a statement, returning the affected-row count.
    async fn execute(&mut self, sql: &str, params: &ParameterMap) -> Result<u64>;

    /// Executes a query returning a single scalar, if any row matched.
    async fn query_scalar(&mut self, sql: &str, params: &ParameterMap) -> Result<Option<Value>>;

    /// Executes a query returning all rows.
    async fn query_rows(&mut self, sql: &str, params: &ParameterMap) -> Result<Vec<Row>>;

    /// Begins a native transaction on this connection.
    async fn begin(&mut self) -> Result<()>;

    /// Commits the native transaction.
    async fn commit(&mut self) -> Result<()>;

    /// Rolls the native transaction back.
    async fn rollback(&mut self) -> Result<()>;
}

/// Hands out open connections; the sole capability this layer requires of a
/// database driver.
#[allow(async_fn_in_trait)]
pub trait ConnectionProvider: Send + Sync {
    /// The connection type produced by this provider.
    type Conn: Connection;

    /// Acquires an open connection.
    async fn acquire(&self) -> Result<Self::Conn>;

    /// The name of the database this provider connects to.
    fn database_name(&self) -> &str;
}

/// Maps a result row onto a model value.
pub trait FromRow: Sized {
    /// Builds `Self` from one row.
    fn from_row(row: &Row) -> Result<Self>;
}
