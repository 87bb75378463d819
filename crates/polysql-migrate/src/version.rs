//! The persisted version record.

use chrono::{DateTime, Utc};
use polysql_core::{Model, ModelBuilder, ModelMetadata, ParameterMap, ToValue, Value};
use polysql_orm::{FromRow, OrmError, Row};

/// Reserved table tracking migration progress, one row per version ever run.
pub const VERSION_TABLE: &str = "__version";

/// One row of the version table.
///
/// The three completion flags make each phase independently idempotent: a
/// process crash mid-migration resumes at the next incomplete phase on the
/// following run.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRecord {
    /// The migration version this row tracks.
    pub version_number: i32,
    /// Whether the setup phase completed.
    pub is_setup_complete: bool,
    /// Whether the migration phase completed.
    pub is_migration_complete: bool,
    /// Whether the finish phase completed.
    pub is_finish_complete: bool,
    /// When the version was first encountered.
    pub migration_date: DateTime<Utc>,
}

impl VersionRecord {
    /// Creates a fresh record with no phase complete.
    #[must_use]
    pub fn new(version_number: i32, migration_date: DateTime<Utc>) -> Self {
        Self {
            version_number,
            is_setup_complete: false,
            is_migration_complete: false,
            is_finish_complete: false,
            migration_date,
        }
    }

    /// True once every phase has completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_setup_complete && self.is_migration_complete && self.is_finish_complete
    }
}

impl Model for VersionRecord {
    fn describe() -> ModelMetadata {
        ModelBuilder::new::<Self>()
            .table_name(VERSION_TABLE)
            .primary_key("VersionNumber")
            .fields(&[
                "VersionNumber",
                "MigrationDate",
                "IsSetupComplete",
                "IsMigrationComplete",
                "IsFinishComplete",
            ])
            .build()
    }

    fn parameters(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert("VersionNumber", self.version_number.to_value());
        params.insert("MigrationDate", self.migration_date.to_value());
        params.insert("IsSetupComplete", self.is_setup_complete.to_value());
        params.insert("IsMigrationComplete", self.is_migration_complete.to_value());
        params.insert("IsFinishComplete", self.is_finish_complete.to_value());
        params
    }

    fn primary_key_value(&self) -> Value {
        self.version_number.to_value()
    }
}

impl FromRow for VersionRecord {
    fn from_row(row: &Row) -> polysql_orm::Result<Self> {
        Ok(Self {
            version_number: int_column(row, "VersionNumber")?.try_into().map_err(|_| {
                OrmError::Mapping(String::from("VersionNumber out of range"))
            })?,
            is_setup_complete: bool_column(row, "IsSetupComplete")?,
            is_migration_complete: bool_column(row, "IsMigrationComplete")?,
            is_finish_complete: bool_column(row, "IsFinishComplete")?,
            migration_date: date_column(row, "MigrationDate")?,
        })
    }
}

fn int_column(row: &Row, name: &str) -> polysql_orm::Result<i64> {
    match row.get(name) {
        Some(Value::Int(n)) => Ok(*n),
        other => Err(OrmError::Mapping(format!(
            "column '{name}' is not an integer: {other:?}"
        ))),
    }
}

fn bool_column(row: &Row, name: &str) -> polysql_orm::Result<bool> {
    match row.get(name) {
        Some(Value::Bool(b)) => Ok(*b),
        // engines without a boolean storage class surface 0/1
        Some(Value::Int(n)) => Ok(*n != 0),
        other => Err(OrmError::Mapping(format!(
            "column '{name}' is not a boolean: {other:?}"
        ))),
    }
}

fn date_column(row: &Row, name: &str) -> polysql_orm::Result<DateTime<Utc>> {
    match row.get(name) {
        Some(Value::DateTime(dt)) => Ok(*dt),
        Some(Value::Text(text)) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| {
                chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                    .map(|dt| dt.and_utc())
            })
            .map_err(|err| OrmError::Mapping(format!("column '{name}' is not a timestamp: {err}"))),
        other => Err(OrmError::Mapping(format!(
            "column '{name}' is not a timestamp: {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_uses_the_reserved_table() {
        let meta = VersionRecord::describe();
        assert_eq!(meta.table_name, "__version");
        assert_eq!(meta.primary_key, "VersionNumber");
        assert_eq!(meta.fields.len(), 5);
    }

    #[test]
    fn maps_integer_backed_booleans() {
        let mut row = Row::new();
        row.push("VersionNumber", Value::Int(3));
        row.push("MigrationDate", Value::Text("2024-01-02 03:04:05".into()));
        row.push("IsSetupComplete", Value::Int(1));
        row.push("IsMigrationComplete", Value::Int(0));
        row.push("IsFinishComplete", Value::Bool(true));

        let record = VersionRecord::from_row(&row).unwrap();
        assert_eq!(record.version_number, 3);
        assert!(record.is_setup_complete);
        assert!(!record.is_migration_complete);
        assert!(record.is_finish_complete);
    }
}
