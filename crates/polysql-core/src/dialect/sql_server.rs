//! SQL-Server-like dialect.

use super::{Dialect, Engine, TypeNames, UpsertStyle};

impl Dialect {
    /// Returns the SQL-Server-like dialect.
    #[must_use]
    pub fn sql_server() -> Self {
        Self {
            engine: Engine::SqlServer,
            upsert: UpsertStyle::UpdateThenInsert,
            supports_alter_constraints: true,

            use_database: "USE [{0}];",
            create_database: "CREATE DATABASE [{0}]",
            drop_database: "ALTER DATABASE [{0}] SET SINGLE_USER WITH ROLLBACK IMMEDIATE; DROP DATABASE [{0}];",
            check_database_exists: "SELECT COUNT(*) AS IsExists FROM sys.databases WHERE Name = '{0}'",
            check_table_exists: "SELECT COUNT(*) AS IsExists FROM dbo.sysobjects WHERE id = object_id('[dbo].[{0}]')",
            check_table_column_exists: "SELECT COUNT(*) AS IsExists FROM sys.columns WHERE [name] = '{1}' AND [object_id] = object_id('[dbo].[{0}]')",
            create_table: "CREATE TABLE [{0}] ({1});",
            alter_table_add: "ALTER TABLE [{0}] ADD {1};",
            create_index: "CREATE INDEX [{0}] ON [{1}] ({2});",
            create_column: "[{0}] {1} {2}",

            insert_into: "INSERT INTO [{0}] ({1}) VALUES ({2});",
            // {0} table, {1} set clause, {2} where clause, {3} fields, {4} parameters
            upsert_template: "UPDATE [{0}] SET {1} {2};\nIF @@ROWCOUNT = 0\nBEGIN;\n    INSERT INTO [{0}] ({3}) VALUES ({4});\nEND;",
            select_from: "SELECT [{0}].* FROM [{0}] {1}",
            select_count_from: "SELECT COUNT([{0}].*) FROM [{0}] {1}",
            select_max_from: "SELECT MAX([{0}].[{2}]) FROM [{0}] {1}",
            select_min_from: "SELECT MIN([{0}].[{2}]) FROM [{0}] {1}",
            select_sum_from: "SELECT SUM([{0}].[{2}]) FROM [{0}] {1}",
            delete_from: "DELETE FROM [{0}] {1}",
            update: "UPDATE [{0}] SET {1} {2}",
            select_from_join: "SELECT [{0}].* FROM [{0}] {1} {2}",
            select_count_from_join: "SELECT COUNT([{0}].*) FROM [{0}] {1} {2}",
            delete_from_join: "DELETE FROM [{0}] {1} {2}",
            update_join: "UPDATE [{0}] SET {1} {2} {3}",
            where_clause: "WHERE {0}",
            join_fields: "[{0}], [{1}]",
            join_parameters: "@{0}, @{1}",
            inner_join: "INNER JOIN [{0}] ON {1}",
            left_join: "LEFT OUTER JOIN [{0}] ON {1}",
            many_to_many_join: "INNER JOIN [{2}] ON [{2}].[{3}] = [{0}].[{1}] INNER JOIN [{4}] ON [{2}].[{5}] = [{4}].[{1}]",
            skip_take: "OFFSET {0} ROWS FETCH NEXT {1} ROWS ONLY",
            order_by: "ORDER BY {0} {1}",
            truncate_table: "TRUNCATE TABLE {0}",

            primary_key_constraint: "PRIMARY KEY",
            foreign_key_constraint: "CONSTRAINT FK_{0}_{1} FOREIGN KEY ({1}) REFERENCES {2} ({3})",
            nullable_constraint: "NULL",
            not_nullable_constraint: "NOT NULL",
            on_delete_no_action: "ON DELETE NO ACTION",
            on_update_no_action: "ON UPDATE NO ACTION",
            unique_constraint: "UNIQUE",
            default_bool: "DEFAULT({0})",
            default_integer: "DEFAULT({0})",
            default_string: "DEFAULT '{0}'",
            composite_key: "CONSTRAINT PK_{0}_{1}_Composite PRIMARY KEY {4} ({2}, {3})",
            composite_unique: "CONSTRAINT PK_{0}_{1}_Composite UNIQUE {2} ({0}, {1})",
            clustered_constraint: "CLUSTERED",
            non_clustered_constraint: "NONCLUSTERED",
            auto_increment: "IDENTITY({0},{1})",

            open_quote: "[",
            close_quote: "]",

            type_names: TypeNames {
                bool_name: "bit",
                byte_name: "tinyint",
                int16_name: "int",
                int32_name: "int",
                int64_name: "bigint",
                single_name: "real",
                double_name: "float",
                decimal_name: "money",
                limited_string: "nvarchar({0})",
                max_string: "nvarchar(max)",
                date_time: "datetime",
                date_time_offset: "datetimeoffset",
                time_span: "time",
                guid_name: "uniqueidentifier",
                blob_name: "binary",
            },
        }
    }
}
