//! # polysql-core
//!
//! Cross-dialect SQL generation: typed, declarative query and write
//! operations compiled to parameterized SQL text for a SQL-Server-like, a
//! MySQL-like and a SQLite-like dialect, plus schema-definition DDL for
//! versioned migrations.
//!
//! This crate is pure text generation. It never opens a connection; the
//! rendered statement and its ordered parameter map are handed to an
//! executor elsewhere.
//!
//! ## Querying
//!
//! ```
//! use std::sync::Arc;
//! use polysql_core::{
//!     Dialect, Model, ModelBuilder, ModelMetadata, ParameterMap, Q, Query, SchemaConfig, Value,
//! };
//!
//! struct AuthorModel;
//!
//! impl Model for AuthorModel {
//!     fn describe() -> ModelMetadata {
//!         ModelBuilder::new::<Self>()
//!             .field("Id")
//!             .field("FirstName")
//!             .field("Email")
//!             .build()
//!     }
//!     fn parameters(&self) -> ParameterMap {
//!         ParameterMap::new()
//!     }
//!     fn primary_key_value(&self) -> Value {
//!         Value::Null
//!     }
//! }
//!
//! let query = Query::<AuthorModel>::new(
//!     Arc::new(Dialect::sql_server()),
//!     Arc::new(SchemaConfig::new()),
//! )
//! .filter(Q::contains("FirstName", "Bo"))
//! .unwrap()
//! .order_by_desc("Email")
//! .unwrap()
//! .skip_take(20, 10);
//!
//! assert_eq!(
//!     query.to_sql(),
//!     "SELECT [Authors].* FROM [Authors] WHERE ( [Authors].[FirstName] LIKE @FirstName1 ) \
//!      ORDER BY [Authors].[Email] DESC OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
//! );
//! ```

pub mod compiler;
pub mod dialect;
mod error;
mod expr;
pub mod inflect;
mod metadata;
mod model;
mod params;
mod query;
pub mod schema;
pub mod template;
mod value;

pub use dialect::{Dialect, Engine, ScalarType, TypeNames, UpsertStyle};
pub use error::{Error, Result};
pub use expr::{CompareOp, FieldPath, LogicalOp, MethodKind, PredicateNode, Q};
pub use metadata::{ModelBuilder, ModelMetadata, Relation, RelationKind, SchemaConfig};
pub use model::Model;
pub use params::ParameterMap;
pub use query::{JoinType, OrderDirection, Query};
pub use schema::{ClusterType, Column, Constraint, Database, Table, TableMode};
pub use value::{ToValue, Value};
