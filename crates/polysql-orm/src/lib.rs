//! # polysql-orm
//!
//! The asynchronous data-access surface over `polysql-core`: connection
//! capability traits, the write pipeline (create / update / upsert / delete
//! with many-to-many reconciliation) and transactional units of work.
//!
//! All statement text comes from `polysql-core`; this crate scopes
//! connections and executes. A driver only has to implement
//! [`ConnectionProvider`] and [`Connection`].
//!
//! ```ignore
//! use polysql_orm::DbProvider;
//! use polysql_core::{Dialect, Q};
//!
//! let db = DbProvider::new(sqlite_provider, Dialect::sqlite());
//! db.create(&author).await?;
//! let found = db
//!     .fetch(&db.query::<AuthorModel>().filter(Q::contains("FirstName", "Bo"))?)
//!     .await?;
//!
//! db.run_in_transaction(|tx| {
//!     Box::pin(async move {
//!         tx.create(&first).await?;
//!         tx.create(&second).await?;
//!         Ok(())
//!     })
//! })
//! .await?;
//! ```

mod connection;
mod error;
mod provider;
mod statements;
mod transaction;

pub use connection::{Connection, ConnectionProvider, FromRow, Row};
pub use error::{OrmError, Result};
pub use provider::DbProvider;
pub use transaction::Transaction;
