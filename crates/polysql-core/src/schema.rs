//! Schema definition builders.
//!
//! A [`Database`] accumulates [`Table`] definitions during a migration step
//! and renders them once to DDL text. Constraints are plain data until
//! render time; nothing touches the dialect templates earlier, so a table
//! built against one dialect renders identically no matter when.

use std::sync::Arc;

use tracing::warn;

use crate::dialect::{Dialect, Engine, ScalarType};
use crate::error::{Error, Result};
use crate::metadata::SchemaConfig;
use crate::template::expand;
use crate::value::Value;

/// Physical clustering of an index-backed constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterType {
    /// Clustered index.
    Clustered,
    /// Non-clustered index.
    NonClustered,
}

/// A column- or table-level constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    PrimaryKey,
    Unique,
    NotNullable,
    Nullable,
    Default(Value),
    ForeignKey { table: String, field: String },
    AutoIncrement { start: i64, step: i64 },
    Clustered,
    NonClustered,
    OnDeleteNoAction,
    OnUpdateNoAction,
    CompositeKey {
        first: String,
        second: String,
        cluster: ClusterType,
    },
    CompositeUnique {
        first: String,
        second: String,
        cluster: ClusterType,
    },
}

impl Constraint {
    fn render(&self, dialect: &Dialect, table: &str, column: &str) -> String {
        match self {
            Self::PrimaryKey => dialect.primary_key_constraint.to_string(),
            Self::Unique => dialect.unique_constraint.to_string(),
            Self::NotNullable => dialect.not_nullable_constraint.to_string(),
            Self::Nullable => dialect.nullable_constraint.to_string(),
            Self::Clustered => dialect.clustered_constraint.to_string(),
            Self::NonClustered => dialect.non_clustered_constraint.to_string(),
            Self::OnDeleteNoAction => dialect.on_delete_no_action.to_string(),
            Self::OnUpdateNoAction => dialect.on_update_no_action.to_string(),
            Self::AutoIncrement { start, step } => expand(
                dialect.auto_increment,
                &[&start.to_string(), &step.to_string()],
            ),
            Self::Default(value) => match value {
                Value::Bool(b) => expand(dialect.default_bool, &[if *b { "1" } else { "0" }]),
                Value::Int(n) => expand(dialect.default_integer, &[&n.to_string()]),
                Value::Float(f) => expand(dialect.default_integer, &[&f.to_string()]),
                Value::Text(s) => expand(dialect.default_string, &[s]),
                other => expand(dialect.default_string, &[&format!("{other:?}")]),
            },
            Self::ForeignKey {
                table: reference_table,
                field,
            } => expand(
                dialect.foreign_key_constraint,
                &[table, column, reference_table, field],
            ),
            Self::CompositeKey {
                first,
                second,
                cluster,
            } => expand(
                dialect.composite_key,
                &[table, first, first, second, cluster_sql(dialect, *cluster)],
            ),
            Self::CompositeUnique {
                first,
                second,
                cluster,
            } => expand(
                dialect.composite_unique,
                &[first, second, cluster_sql(dialect, *cluster)],
            ),
        }
    }
}

fn cluster_sql(dialect: &Dialect, cluster: ClusterType) -> &'static str {
    match cluster {
        ClusterType::Clustered => dialect.clustered_constraint,
        ClusterType::NonClustered => dialect.non_clustered_constraint,
    }
}

/// A column under construction. Owned exclusively by its [`Table`].
#[derive(Debug)]
pub struct Column {
    name: String,
    scalar_type: ScalarType,
    precision: u32,
    engine: Engine,
    // Nullability, clustering and the primary key render before the rest,
    // in the order the dialects expect.
    leading: Vec<Constraint>,
    trailing: Vec<Constraint>,
}

impl Column {
    fn new(name: impl Into<String>, scalar_type: ScalarType, precision: u32, engine: Engine) -> Self {
        Self {
            name: name.into(),
            scalar_type,
            precision,
            engine,
            leading: Vec::new(),
            trailing: Vec::new(),
        }
    }

    /// Marks the column PRIMARY KEY.
    pub fn primary_key(&mut self) -> &mut Self {
        self.leading.push(Constraint::PrimaryKey);
        self
    }

    /// Marks the column CLUSTERED (where the engine supports it).
    pub fn clustered(&mut self) -> &mut Self {
        self.leading.push(Constraint::Clustered);
        self
    }

    /// Marks the column NONCLUSTERED (where the engine supports it).
    pub fn non_clustered(&mut self) -> &mut Self {
        self.leading.push(Constraint::NonClustered);
        self
    }

    /// Marks the column NOT NULL.
    pub fn not_nullable(&mut self) -> &mut Self {
        self.leading.push(Constraint::NotNullable);
        self
    }

    /// Marks the column NOT NULL with a default.
    pub fn not_nullable_with_default(&mut self, default: Value) -> &mut Self {
        self.leading.push(Constraint::NotNullable);
        self.leading.push(Constraint::Default(default));
        self
    }

    /// Marks the column NULL.
    pub fn nullable(&mut self) -> &mut Self {
        self.leading.push(Constraint::Nullable);
        self
    }

    /// Adds a DEFAULT constraint.
    pub fn default_value(&mut self, default: Value) -> &mut Self {
        self.trailing.push(Constraint::Default(default));
        self
    }

    /// Marks the column UNIQUE.
    pub fn unique(&mut self) -> &mut Self {
        self.trailing.push(Constraint::Unique);
        self
    }

    /// Adds a foreign key to `table.field` with no-action referential
    /// behavior.
    pub fn foreign_key(&mut self, table: impl Into<String>, field: impl Into<String>) -> &mut Self {
        self.trailing.push(Constraint::ForeignKey {
            table: table.into(),
            field: field.into(),
        });
        self.trailing.push(Constraint::OnDeleteNoAction);
        self.trailing.push(Constraint::OnUpdateNoAction);
        self
    }

    /// Adds an auto-increment constraint.
    ///
    /// Valid only on the integer family (byte/short/int/long); anything else
    /// fails with [`Error::Constraint`] before any SQL is generated. SQLite
    /// auto-increments 64-bit integer keys only, so smaller integer types
    /// are widened there.
    pub fn auto_increment(&mut self, start: i64, step: i64) -> Result<&mut Self> {
        if self.engine == Engine::Sqlite
            && matches!(
                self.scalar_type,
                ScalarType::Byte | ScalarType::Int16 | ScalarType::Int32
            )
        {
            self.scalar_type = ScalarType::Int64;
        }
        if !self.scalar_type.is_integer() {
            return Err(Error::Constraint(format!(
                "auto-increment requires an integer column, '{}' is {}",
                self.name,
                self.scalar_type.name()
            )));
        }
        self.trailing.push(Constraint::AutoIncrement { start, step });
        Ok(self)
    }

    fn render(&self, dialect: &Dialect, config: &SchemaConfig, table: &str) -> Result<String> {
        let type_name = match dialect.scalar_type_name(&self.scalar_type, self.precision) {
            Some(name) => name,
            None => {
                let logical = self.scalar_type.name();
                config
                    .custom_type(&logical)
                    .ok_or(Error::DataTypeNotSupported(logical))?
            }
        };

        let constraints: Vec<String> = self
            .leading
            .iter()
            .chain(self.trailing.iter())
            .map(|c| c.render(dialect, table, &self.name))
            .filter(|s| !s.is_empty())
            .collect();

        Ok(expand(
            dialect.create_column,
            &[&self.name, &type_name, &constraints.join(" ")],
        )
        .trim_end()
        .to_string())
    }
}

/// Whether a table definition creates or alters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    /// Renders one CREATE TABLE statement.
    Create,
    /// Renders one ALTER TABLE ... ADD statement per column.
    Alter,
}

/// A table definition under construction.
#[derive(Debug)]
pub struct Table {
    name: String,
    mode: TableMode,
    engine: Engine,
    columns: Vec<Column>,
    constraints: Vec<Constraint>,
}

impl Table {
    fn new(name: impl Into<String>, mode: TableMode, engine: Engine) -> Self {
        Self {
            name: name.into(),
            mode,
            engine,
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Adds a column.
    pub fn add_column(&mut self, name: impl Into<String>, scalar_type: ScalarType) -> &mut Column {
        self.add_column_with_precision(name, scalar_type, 0)
    }

    /// Adds a column with a type precision (string lengths, mostly).
    pub fn add_column_with_precision(
        &mut self,
        name: impl Into<String>,
        scalar_type: ScalarType,
        precision: u32,
    ) -> &mut Column {
        self.columns
            .push(Column::new(name, scalar_type, precision, self.engine));
        self.columns.last_mut().expect("column just pushed")
    }

    /// Adds a composite primary key over two columns.
    pub fn composite_key(
        &mut self,
        first: impl Into<String>,
        second: impl Into<String>,
        cluster: ClusterType,
    ) -> &mut Self {
        self.constraints.push(Constraint::CompositeKey {
            first: first.into(),
            second: second.into(),
            cluster,
        });
        self
    }

    /// Adds a composite unique constraint over two columns.
    pub fn composite_unique(
        &mut self,
        first: impl Into<String>,
        second: impl Into<String>,
        cluster: ClusterType,
    ) -> &mut Self {
        self.constraints.push(Constraint::CompositeUnique {
            first: first.into(),
            second: second.into(),
            cluster,
        });
        self
    }

    fn render(&self, dialect: &Dialect, config: &SchemaConfig) -> Result<String> {
        match self.mode {
            TableMode::Create => {
                let mut pieces: Vec<String> = Vec::with_capacity(self.columns.len());
                for column in &self.columns {
                    pieces.push(column.render(dialect, config, &self.name)?);
                }
                for constraint in &self.constraints {
                    pieces.push(constraint.render(dialect, &self.name, ""));
                }
                Ok(expand(
                    dialect.create_table,
                    &[&self.name, &pieces.join(", ")],
                ))
            }
            TableMode::Alter => {
                let mut statements: Vec<String> = Vec::new();
                for column in &self.columns {
                    let rendered = column.render(dialect, config, &self.name)?;
                    statements.push(expand(dialect.alter_table_add, &[&self.name, &rendered]));
                }
                if dialect.supports_alter_constraints {
                    for constraint in &self.constraints {
                        let rendered = constraint.render(dialect, &self.name, "");
                        statements.push(expand(dialect.alter_table_add, &[&self.name, &rendered]));
                    }
                } else if !self.constraints.is_empty() {
                    // Known Create/Alter asymmetry: the engine cannot add
                    // constraints after table creation, so they are skipped.
                    warn!(
                        table = %self.name,
                        skipped = self.constraints.len(),
                        "engine cannot add constraints after creation; skipping"
                    );
                }
                Ok(statements.join("\n"))
            }
        }
    }
}

/// A DDL accumulation context, built fresh per migration step.
#[derive(Debug)]
pub struct Database {
    name: String,
    dialect: Arc<Dialect>,
    config: Arc<SchemaConfig>,
    tables: Vec<Table>,
}

impl Database {
    /// Creates an empty DDL context for `name`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        dialect: Arc<Dialect>,
        config: Arc<SchemaConfig>,
    ) -> Self {
        Self {
            name: name.into(),
            dialect,
            config,
            tables: Vec::new(),
        }
    }

    /// Returns the database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the dialect this context renders with.
    #[must_use]
    pub fn dialect(&self) -> &Arc<Dialect> {
        &self.dialect
    }

    /// Begins a CREATE TABLE definition.
    pub fn add_table(&mut self, name: impl Into<String>) -> &mut Table {
        self.tables
            .push(Table::new(name, TableMode::Create, self.dialect.engine));
        self.tables.last_mut().expect("table just pushed")
    }

    /// Begins an ALTER TABLE definition.
    pub fn alter_table(&mut self, name: impl Into<String>) -> &mut Table {
        self.tables
            .push(Table::new(name, TableMode::Alter, self.dialect.engine));
        self.tables.last_mut().expect("table just pushed")
    }

    /// True when no DDL has been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Renders every accumulated definition, one statement block per table.
    pub fn to_sql(&self) -> Result<String> {
        let mut blocks: Vec<String> = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            blocks.push(table.render(&self.dialect, &self.config)?);
        }
        Ok(blocks.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database(dialect: Dialect) -> Database {
        Database::new("AppDb", Arc::new(dialect), Arc::new(SchemaConfig::new()))
    }

    fn add_authors(db: &mut Database) {
        let table = db.add_table("Authors");
        table
            .add_column("Id", ScalarType::Int32)
            .primary_key()
            .auto_increment(1, 1)
            .unwrap();
        table.add_column_with_precision("Name", ScalarType::String, 256);
    }

    #[test]
    fn create_table_sql_server() {
        let mut db = database(Dialect::sql_server());
        add_authors(&mut db);
        assert_eq!(
            db.to_sql().unwrap(),
            "CREATE TABLE [Authors] ([Id] int PRIMARY KEY IDENTITY(1,1), [Name] nvarchar(256));"
        );
    }

    #[test]
    fn create_table_my_sql() {
        let mut db = database(Dialect::my_sql());
        add_authors(&mut db);
        assert_eq!(
            db.to_sql().unwrap(),
            "CREATE TABLE `Authors` (`Id` int PRIMARY KEY AUTO_INCREMENT, `Name` nvarchar(256));"
        );
    }

    #[test]
    fn create_table_sqlite_widens_autoincrement_key() {
        let mut db = database(Dialect::sqlite());
        add_authors(&mut db);
        assert_eq!(
            db.to_sql().unwrap(),
            "CREATE TABLE [Authors] ([Id] integer PRIMARY KEY, [Name] text);"
        );
    }

    #[test]
    fn auto_increment_on_string_fails_before_rendering() {
        let mut db = database(Dialect::sql_server());
        let table = db.add_table("Authors");
        let err = table
            .add_column("Name", ScalarType::String)
            .auto_increment(1, 1)
            .unwrap_err();
        assert!(matches!(err, Error::Constraint(_)));
    }

    #[test]
    fn alter_mode_emits_one_statement_per_column() {
        let mut db = database(Dialect::sql_server());
        let table = db.alter_table("Authors");
        table.add_column("Bio", ScalarType::String);
        table.add_column("Age", ScalarType::Int32).not_nullable();
        assert_eq!(
            db.to_sql().unwrap(),
            "ALTER TABLE [Authors] ADD [Bio] nvarchar(max);\n\
             ALTER TABLE [Authors] ADD [Age] int NOT NULL;"
        );
    }

    #[test]
    fn alter_mode_skips_constraints_without_capability() {
        let mut db = database(Dialect::sqlite());
        let table = db.alter_table("Orders");
        table.add_column("Qty", ScalarType::Int32);
        table.composite_unique("OrderId", "ProductId", ClusterType::NonClustered);
        // the constraint is skipped, the column is kept
        assert_eq!(
            db.to_sql().unwrap(),
            "ALTER TABLE [Orders] ADD [Qty] integer;"
        );
    }

    #[test]
    fn alter_mode_adds_constraints_with_capability() {
        let mut db = database(Dialect::sql_server());
        let table = db.alter_table("Orders");
        table.composite_unique("OrderId", "ProductId", ClusterType::NonClustered);
        assert_eq!(
            db.to_sql().unwrap(),
            "ALTER TABLE [Orders] ADD CONSTRAINT PK_OrderId_ProductId_Composite UNIQUE NONCLUSTERED (OrderId, ProductId);"
        );
    }

    #[test]
    fn foreign_key_renders_with_referential_actions() {
        let mut db = database(Dialect::sql_server());
        let table = db.add_table("Books");
        table
            .add_column("PublisherId", ScalarType::Int32)
            .foreign_key("Publishers", "Id");
        assert_eq!(
            db.to_sql().unwrap(),
            "CREATE TABLE [Books] ([PublisherId] int \
             CONSTRAINT FK_Books_PublisherId FOREIGN KEY (PublisherId) REFERENCES Publishers (Id) \
             ON DELETE NO ACTION ON UPDATE NO ACTION);"
        );
    }

    #[test]
    fn sqlite_foreign_key_is_inline_references() {
        let mut db = database(Dialect::sqlite());
        let table = db.add_table("Books");
        table
            .add_column("PublisherId", ScalarType::Int32)
            .foreign_key("Publishers", "Id");
        assert_eq!(
            db.to_sql().unwrap(),
            "CREATE TABLE [Books] ([PublisherId] integer \
             REFERENCES Publishers (Id) ON DELETE NO ACTION ON UPDATE NO ACTION);"
        );
    }

    #[test]
    fn custom_type_override_resolves() {
        let config = Arc::new(SchemaConfig::new());
        config.register_custom_type("Point", "geometry");
        let mut db = Database::new("AppDb", Arc::new(Dialect::sql_server()), config);
        db.add_table("Shapes")
            .add_column("Center", ScalarType::Custom("Point".into()));
        assert_eq!(
            db.to_sql().unwrap(),
            "CREATE TABLE [Shapes] ([Center] geometry);"
        );
    }

    #[test]
    fn unmapped_custom_type_fails() {
        let mut db = database(Dialect::sql_server());
        db.add_table("Shapes")
            .add_column("Center", ScalarType::Custom("Point".into()));
        assert!(matches!(
            db.to_sql(),
            Err(Error::DataTypeNotSupported(_))
        ));
    }

    #[test]
    fn not_nullable_with_default_bool() {
        let mut db = database(Dialect::sql_server());
        db.add_table("Flags")
            .add_column("Enabled", ScalarType::Bool)
            .not_nullable_with_default(Value::Bool(true));
        assert_eq!(
            db.to_sql().unwrap(),
            "CREATE TABLE [Flags] ([Enabled] bit NOT NULL DEFAULT(1));"
        );
    }
}
