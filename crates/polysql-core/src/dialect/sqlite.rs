//! SQLite-like dialect.
//!
//! SQLite cannot add constraints after table creation, so
//! `supports_alter_constraints` is false; the schema builder consults this
//! flag in Alter mode. Auto-increment carries no keyword: an INTEGER PRIMARY
//! KEY column auto-increments on its own.

use super::{Dialect, Engine, TypeNames, UpsertStyle};

impl Dialect {
    /// Returns the SQLite-like dialect.
    #[must_use]
    pub fn sqlite() -> Self {
        Self {
            engine: Engine::Sqlite,
            upsert: UpsertStyle::InsertOrReplace,
            supports_alter_constraints: false,

            use_database: "",
            create_database: "",
            drop_database: "",
            check_database_exists: "",
            check_table_exists: "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='{0}'",
            check_table_column_exists: "SELECT SQL FROM sqlite_master WHERE tbl_name='{0}'",
            create_table: "CREATE TABLE [{0}] ({1});",
            alter_table_add: "ALTER TABLE [{0}] ADD {1};",
            create_index: "CREATE INDEX [{0}] ON [{1}] ({2});",
            create_column: "[{0}] {1} {2}",

            insert_into: "INSERT INTO [{0}] ({1}) VALUES ({2})",
            // {0} table, {1} fields, {2} parameters
            upsert_template: "INSERT OR REPLACE INTO [{0}] ({1}) VALUES ({2})",
            select_from: "SELECT [{0}].* FROM [{0}] {1}",
            // the engine rejects a table-qualified star inside COUNT()
            select_count_from: "SELECT COUNT(*) FROM [{0}] {1}",
            select_max_from: "SELECT MAX([{0}].[{2}]) FROM [{0}] {1}",
            select_min_from: "SELECT MIN([{0}].[{2}]) FROM [{0}] {1}",
            select_sum_from: "SELECT SUM([{0}].[{2}]) FROM [{0}] {1}",
            delete_from: "DELETE FROM [{0}] {1}",
            update: "UPDATE [{0}] SET {1} {2}",
            select_from_join: "SELECT [{0}].* FROM [{0}] {1} {2}",
            select_count_from_join: "SELECT COUNT(*) FROM [{0}] {1} {2}",
            delete_from_join: "DELETE FROM [{0}] {1} {2}",
            update_join: "UPDATE [{0}] SET {1} {2} {3}",
            where_clause: "WHERE {0}",
            join_fields: "[{0}], [{1}]",
            join_parameters: "@{0}, @{1}",
            inner_join: "INNER JOIN [{0}] ON {1}",
            left_join: "LEFT OUTER JOIN [{0}] ON {1}",
            many_to_many_join: "INNER JOIN [{2}] ON [{2}].[{3}] = [{0}].[{1}] INNER JOIN [{4}] ON [{2}].[{5}] = [{4}].[{1}]",
            skip_take: "LIMIT {1} OFFSET {0}",
            order_by: "ORDER BY {0} {1}",
            truncate_table: "DELETE FROM {0}",

            primary_key_constraint: "PRIMARY KEY",
            foreign_key_constraint: "REFERENCES {2} ({3})",
            nullable_constraint: "NULL",
            not_nullable_constraint: "NOT NULL",
            on_delete_no_action: "ON DELETE NO ACTION",
            on_update_no_action: "ON UPDATE NO ACTION",
            unique_constraint: "UNIQUE",
            default_bool: "DEFAULT({0})",
            default_integer: "DEFAULT({0})",
            default_string: "DEFAULT '{0}'",
            composite_key: "PRIMARY KEY ({2}, {3})",
            composite_unique: "UNIQUE ({0}, {1})",
            clustered_constraint: "",
            non_clustered_constraint: "",
            auto_increment: "",

            open_quote: "[",
            close_quote: "]",

            type_names: TypeNames {
                bool_name: "integer",
                byte_name: "integer",
                int16_name: "integer",
                int32_name: "integer",
                int64_name: "integer",
                single_name: "real",
                double_name: "real",
                decimal_name: "text",
                limited_string: "text",
                max_string: "text",
                date_time: "text",
                date_time_offset: "text",
                time_span: "text",
                guid_name: "blob",
                blob_name: "blob",
            },
        }
    }
}
