//! SQL dialect support.
//!
//! A [`Dialect`] is a read-only table of SQL string templates, a scalar-type
//! mapping and a handful of capability flags for one database engine. It is
//! plain data: one instance per engine, never mutated after construction,
//! safe to share across any number of compiler and builder instances.
//!
//! Templates use `{0}`-style positional markers, expanded through
//! [`crate::template::expand`].

mod my_sql;
mod sql_server;
mod sqlite;

use crate::template::expand;

/// The database engine a dialect targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// SQL-Server-like engine.
    SqlServer,
    /// MySQL-like engine.
    MySql,
    /// SQLite-like engine.
    Sqlite,
}

/// How the engine expresses insert-or-update in one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStyle {
    /// UPDATE, then INSERT when no row was affected.
    UpdateThenInsert,
    /// INSERT ... ON DUPLICATE KEY UPDATE.
    OnDuplicateKey,
    /// INSERT OR REPLACE.
    InsertOrReplace,
}

/// A logical column type, mapped to a native type name by each dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarType {
    /// Boolean.
    Bool,
    /// 8-bit integer.
    Byte,
    /// 16-bit integer.
    Int16,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// 32-bit float.
    Single,
    /// 64-bit float.
    Double,
    /// Fixed-point decimal.
    Decimal,
    /// Character data; precision 0 means unbounded.
    String,
    /// Date and time without offset.
    DateTime,
    /// Date and time with offset.
    DateTimeOffset,
    /// Time of day / duration.
    TimeSpan,
    /// Globally unique identifier.
    Guid,
    /// Binary data.
    Blob,
    /// A custom logical type, resolved through a registered override.
    Custom(String),
}

impl ScalarType {
    /// Returns true for the integer family valid under auto-increment.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Byte | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Returns a display name for diagnostics.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Custom(name) => name.clone(),
            other => format!("{other:?}"),
        }
    }
}

/// Native type names for one engine.
#[derive(Debug, Clone)]
pub struct TypeNames {
    pub bool_name: &'static str,
    pub byte_name: &'static str,
    pub int16_name: &'static str,
    pub int32_name: &'static str,
    pub int64_name: &'static str,
    pub single_name: &'static str,
    pub double_name: &'static str,
    pub decimal_name: &'static str,
    /// Template for bounded strings; `{0}` is the precision.
    pub limited_string: &'static str,
    pub max_string: &'static str,
    pub date_time: &'static str,
    pub date_time_offset: &'static str,
    pub time_span: &'static str,
    pub guid_name: &'static str,
    pub blob_name: &'static str,
}

/// SQL templates and type mappings for one database engine.
#[derive(Debug, Clone)]
pub struct Dialect {
    pub engine: Engine,
    pub upsert: UpsertStyle,
    /// Whether constraints may be added via ALTER after table creation.
    pub supports_alter_constraints: bool,

    // DDL
    pub use_database: &'static str,
    pub create_database: &'static str,
    pub drop_database: &'static str,
    pub check_database_exists: &'static str,
    pub check_table_exists: &'static str,
    pub check_table_column_exists: &'static str,
    pub create_table: &'static str,
    pub alter_table_add: &'static str,
    pub create_index: &'static str,
    pub create_column: &'static str,

    // DML
    pub insert_into: &'static str,
    pub upsert_template: &'static str,
    pub select_from: &'static str,
    pub select_count_from: &'static str,
    pub select_max_from: &'static str,
    pub select_min_from: &'static str,
    pub select_sum_from: &'static str,
    pub delete_from: &'static str,
    pub update: &'static str,
    pub select_from_join: &'static str,
    pub select_count_from_join: &'static str,
    pub delete_from_join: &'static str,
    pub update_join: &'static str,
    pub where_clause: &'static str,
    pub join_fields: &'static str,
    pub join_parameters: &'static str,
    pub inner_join: &'static str,
    pub left_join: &'static str,
    pub many_to_many_join: &'static str,
    pub skip_take: &'static str,
    pub order_by: &'static str,
    pub truncate_table: &'static str,

    // Constraints
    pub primary_key_constraint: &'static str,
    pub foreign_key_constraint: &'static str,
    pub nullable_constraint: &'static str,
    pub not_nullable_constraint: &'static str,
    pub on_delete_no_action: &'static str,
    pub on_update_no_action: &'static str,
    pub unique_constraint: &'static str,
    pub default_bool: &'static str,
    pub default_integer: &'static str,
    pub default_string: &'static str,
    pub composite_key: &'static str,
    pub composite_unique: &'static str,
    pub clustered_constraint: &'static str,
    pub non_clustered_constraint: &'static str,
    pub auto_increment: &'static str,

    // Quoting
    pub open_quote: &'static str,
    pub close_quote: &'static str,

    pub type_names: TypeNames,
}

impl Dialect {
    /// Returns the dialect name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.engine {
            Engine::SqlServer => "sqlserver",
            Engine::MySql => "mysql",
            Engine::Sqlite => "sqlite",
        }
    }

    /// Quotes an identifier with this engine's quote characters.
    #[must_use]
    pub fn quote(&self, identifier: &str) -> String {
        format!("{}{}{}", self.open_quote, identifier, self.close_quote)
    }

    /// Renders `table.field` with this engine's quote characters.
    #[must_use]
    pub fn qualify(&self, table: &str, field: &str) -> String {
        format!("{}.{}", self.quote(table), self.quote(field))
    }

    /// Maps a logical type to the engine's native type name.
    ///
    /// Returns `None` for [`ScalarType::Custom`]; custom types resolve
    /// through the schema configuration at render time.
    #[must_use]
    pub fn scalar_type_name(&self, scalar: &ScalarType, precision: u32) -> Option<String> {
        let names = &self.type_names;
        let mapped = match scalar {
            ScalarType::Bool => names.bool_name,
            ScalarType::Byte => names.byte_name,
            ScalarType::Int16 => names.int16_name,
            ScalarType::Int32 => names.int32_name,
            ScalarType::Int64 => names.int64_name,
            ScalarType::Single => names.single_name,
            ScalarType::Double => names.double_name,
            ScalarType::Decimal => names.decimal_name,
            ScalarType::DateTime => names.date_time,
            ScalarType::DateTimeOffset => names.date_time_offset,
            ScalarType::TimeSpan => names.time_span,
            ScalarType::Guid => names.guid_name,
            ScalarType::Blob => names.blob_name,
            ScalarType::String => {
                if precision == 0 {
                    names.max_string
                } else {
                    return Some(expand(names.limited_string, &[&precision.to_string()]));
                }
            }
            ScalarType::Custom(_) => return None,
        };
        Some(mapped.to_string())
    }
}
