//! MySQL-like dialect.

use super::{Dialect, Engine, TypeNames, UpsertStyle};

impl Dialect {
    /// Returns the MySQL-like dialect.
    #[must_use]
    pub fn my_sql() -> Self {
        Self {
            engine: Engine::MySql,
            upsert: UpsertStyle::OnDuplicateKey,
            supports_alter_constraints: true,

            use_database: "USE `{0}`;",
            create_database: "CREATE DATABASE `{0}`",
            drop_database: "DROP DATABASE `{0}`;",
            check_database_exists: "SELECT COUNT(*) AS IsExists FROM INFORMATION_SCHEMA.SCHEMATA WHERE SCHEMA_NAME = '{0}'",
            check_table_exists: "SELECT COUNT(*) AS IsExists FROM INFORMATION_SCHEMA.TABLES WHERE table_name = '{0}' LIMIT 1;",
            check_table_column_exists: "SELECT COUNT(*) AS IsExists FROM INFORMATION_SCHEMA.COLUMNS WHERE table_name = '{0}' AND column_name = '{1}'",
            create_table: "CREATE TABLE `{0}` ({1});",
            alter_table_add: "ALTER TABLE `{0}` ADD {1};",
            create_index: "CREATE INDEX `{0}` ON `{1}` ({2});",
            create_column: "`{0}` {1} {2}",

            insert_into: "INSERT INTO `{0}` ({1}) VALUES ({2});",
            // {0} table, {1} fields, {2} parameters, {3} update-set clause
            upsert_template: "INSERT INTO `{0}` ({1}) VALUES ({2}) ON DUPLICATE KEY UPDATE {3}",
            select_from: "SELECT `{0}`.* FROM `{0}` {1}",
            select_count_from: "SELECT COUNT(`{0}`.*) FROM `{0}` {1}",
            select_max_from: "SELECT MAX(`{0}`.`{2}`) FROM `{0}` {1}",
            select_min_from: "SELECT MIN(`{0}`.`{2}`) FROM `{0}` {1}",
            select_sum_from: "SELECT SUM(`{0}`.`{2}`) FROM `{0}` {1}",
            delete_from: "DELETE FROM `{0}` {1}",
            update: "UPDATE `{0}` SET {1} {2}",
            select_from_join: "SELECT `{0}`.* FROM `{0}` {1} {2}",
            select_count_from_join: "SELECT COUNT(`{0}`.*) FROM `{0}` {1} {2}",
            delete_from_join: "DELETE FROM `{0}` {1} {2}",
            update_join: "UPDATE `{0}` SET {1} {2} {3}",
            where_clause: "WHERE {0}",
            join_fields: "`{0}`, `{1}`",
            join_parameters: "@{0}, @{1}",
            inner_join: "INNER JOIN `{0}` ON {1}",
            left_join: "LEFT OUTER JOIN `{0}` ON {1}",
            many_to_many_join: "INNER JOIN `{2}` ON `{2}`.`{3}` = `{0}`.`{1}` INNER JOIN `{4}` ON `{2}`.`{5}` = `{4}`.`{1}`",
            skip_take: "LIMIT {1} OFFSET {0}",
            order_by: "ORDER BY {0} {1}",
            truncate_table: "TRUNCATE TABLE {0}",

            primary_key_constraint: "PRIMARY KEY",
            foreign_key_constraint: "CONSTRAINT FK_{0}_{1} FOREIGN KEY ({1}) REFERENCES {2} ({3})",
            nullable_constraint: "NULL",
            not_nullable_constraint: "NOT NULL",
            on_delete_no_action: "ON DELETE NO ACTION",
            on_update_no_action: "ON UPDATE NO ACTION",
            unique_constraint: "UNIQUE",
            default_bool: "DEFAULT {0}",
            default_integer: "DEFAULT {0}",
            default_string: "DEFAULT '{0}'",
            composite_key: "CONSTRAINT PK_{0}_{1}_Composite PRIMARY KEY {4} ({2}, {3})",
            composite_unique: "CONSTRAINT PK_{0}_{1}_Composite UNIQUE {2} ({0}, {1})",
            clustered_constraint: "",
            non_clustered_constraint: "",
            auto_increment: "AUTO_INCREMENT",

            open_quote: "`",
            close_quote: "`",

            type_names: TypeNames {
                bool_name: "bit",
                byte_name: "tinyint",
                int16_name: "int",
                int32_name: "int",
                int64_name: "bigint",
                single_name: "real",
                double_name: "float",
                decimal_name: "decimal(19,4)",
                limited_string: "nvarchar({0})",
                max_string: "longtext",
                date_time: "datetime",
                date_time_offset: "longtext",
                time_span: "time",
                guid_name: "char(36)",
                blob_name: "binary",
            },
        }
    }
}
