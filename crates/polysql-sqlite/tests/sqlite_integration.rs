//! End-to-end behavior against an in-memory SQLite database.

use futures::future::BoxFuture;
use polysql_core::{
    Database, Dialect, Model, ModelBuilder, ModelMetadata, ParameterMap, Q, ScalarType, ToValue,
    Value,
};
use polysql_migrate::{Migration, MigrationRunner, SystemRole, VersionRecord};
use polysql_orm::{DbProvider, FromRow, OrmError, Row};
use polysql_sqlite::SqliteProvider;

#[derive(Debug, Clone, PartialEq)]
struct AuthorModel {
    id: i64,
    first_name: String,
    email: String,
}

impl Model for AuthorModel {
    fn describe() -> ModelMetadata {
        ModelBuilder::new::<Self>()
            .field("Id")
            .field("FirstName")
            .field("Email")
            .build()
    }

    fn parameters(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert("Id", self.id.to_value());
        params.insert("FirstName", self.first_name.clone().to_value());
        params.insert("Email", self.email.clone().to_value());
        params
    }

    fn primary_key_value(&self) -> Value {
        self.id.to_value()
    }
}

impl FromRow for AuthorModel {
    fn from_row(row: &Row) -> polysql_orm::Result<Self> {
        Ok(Self {
            id: match row.get("Id") {
                Some(Value::Int(n)) => *n,
                other => return Err(OrmError::Mapping(format!("Id: {other:?}"))),
            },
            first_name: text_column(row, "FirstName")?,
            email: text_column(row, "Email")?,
        })
    }
}

fn text_column(row: &Row, name: &str) -> polysql_orm::Result<String> {
    match row.get(name) {
        Some(Value::Text(s)) => Ok(s.clone()),
        other => Err(OrmError::Mapping(format!("{name}: {other:?}"))),
    }
}

struct BookModel {
    id: i64,
    name: String,
    tag_ids: Vec<i64>,
}

impl Model for BookModel {
    fn describe() -> ModelMetadata {
        ModelBuilder::new::<Self>()
            .field("Id")
            .field("Name")
            .many_to_many("Tags", "Tags")
            .build()
    }

    fn parameters(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert("Id", self.id.to_value());
        params.insert("Name", self.name.clone().to_value());
        params
    }

    fn primary_key_value(&self) -> Value {
        self.id.to_value()
    }

    fn relation_keys(&self, relation_field: &str) -> Vec<Value> {
        match relation_field {
            "Tags" => self.tag_ids.iter().map(|id| id.to_value()).collect(),
            _ => Vec::new(),
        }
    }
}

async fn connect() -> DbProvider<SqliteProvider> {
    let provider = SqliteProvider::connect(":memory:", "integration_db")
        .await
        .unwrap();
    DbProvider::new(provider, Dialect::sqlite())
}

async fn create_author_schema(db: &DbProvider<SqliteProvider>) {
    let mut schema = Database::new(db.database_name(), db.dialect().clone(), db.config().clone());
    let table = schema.add_table("Authors");
    table.add_column("Id", ScalarType::Int64).primary_key();
    table.add_column("FirstName", ScalarType::String).not_nullable();
    table.add_column("Email", ScalarType::String).not_nullable();
    db.execute_non_query(&schema.to_sql().unwrap(), &ParameterMap::new())
        .await
        .unwrap();
}

async fn create_book_schema(db: &DbProvider<SqliteProvider>) {
    let mut schema = Database::new(db.database_name(), db.dialect().clone(), db.config().clone());
    let books = schema.add_table("Books");
    books.add_column("Id", ScalarType::Int64).primary_key();
    books.add_column("Name", ScalarType::String).not_nullable();
    let junction = schema.add_table("Books_Tags");
    junction.add_column("BookId", ScalarType::Int64).not_nullable();
    junction.add_column("TagId", ScalarType::Int64).not_nullable();
    db.execute_non_query(&schema.to_sql().unwrap(), &ParameterMap::new())
        .await
        .unwrap();
}

fn author(id: i64, first_name: &str, email: &str) -> AuthorModel {
    AuthorModel {
        id,
        first_name: first_name.into(),
        email: email.into(),
    }
}

#[tokio::test]
async fn crud_roundtrip() {
    let db = connect().await;
    create_author_schema(&db).await;

    db.create(&author(1, "Bob", "bob@example.com")).await.unwrap();
    db.create(&author(2, "Kevin", "kevin@example.com"))
        .await
        .unwrap();

    let query = db
        .query::<AuthorModel>()
        .filter(Q::contains("FirstName", "Bo"))
        .unwrap();
    let found = db.fetch(&query).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].email, "bob@example.com");
    assert_eq!(db.count(&query).await.unwrap(), 1);

    db.update(&author(1, "Bob", "bob@updated.example.com"))
        .await
        .unwrap();
    let updated = db.fetch_single(&query).await.unwrap();
    assert_eq!(updated.email, "bob@updated.example.com");

    db.delete::<AuthorModel>(Q::eq("FirstName", "Bob"))
        .await
        .unwrap();
    assert_eq!(db.count(&query).await.unwrap(), 0);
}

#[tokio::test]
async fn select_with_order_and_paging() {
    let db = connect().await;
    create_author_schema(&db).await;
    for (id, name) in [(1, "Alice"), (2, "Bob"), (3, "Carol"), (4, "Dan")] {
        db.create(&author(id, name, &format!("{name}@example.com")))
            .await
            .unwrap();
    }

    let query = db
        .query::<AuthorModel>()
        .order_by_desc("FirstName")
        .unwrap()
        .skip_take(1, 2);
    let page = db.fetch(&query).await.unwrap();
    let names: Vec<&str> = page.iter().map(|a| a.first_name.as_str()).collect();
    assert_eq!(names, vec!["Carol", "Bob"]);
}

#[tokio::test]
async fn upsert_inserts_then_replaces() {
    let db = connect().await;
    create_author_schema(&db).await;

    db.create_or_update(&author(1, "Bob", "first@example.com"))
        .await
        .unwrap();
    db.create_or_update(&author(1, "Bob", "second@example.com"))
        .await
        .unwrap();

    let all = db.query::<AuthorModel>();
    assert_eq!(db.count(&all).await.unwrap(), 1);
    let stored = db.fetch_single(&all).await.unwrap();
    assert_eq!(stored.email, "second@example.com");
}

#[tokio::test]
async fn many_to_many_sync_converges_to_the_supplied_set() {
    let db = connect().await;
    create_book_schema(&db).await;

    let mut book = BookModel {
        id: 1,
        name: "Dune".into(),
        tag_ids: vec![10, 20],
    };
    db.create(&book).await.unwrap();

    let rows = db
        .execute_rows(
            "SELECT BookId, TagId FROM Books_Tags ORDER BY TagId",
            &ParameterMap::new(),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    // same members again: still exactly one row per pair
    db.update(&book).await.unwrap();
    let rows = db
        .execute_rows(
            "SELECT BookId, TagId FROM Books_Tags ORDER BY TagId",
            &ParameterMap::new(),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    // a different set replaces the junction contents exactly
    book.tag_ids = vec![20, 30];
    db.update(&book).await.unwrap();
    let rows = db
        .execute_rows(
            "SELECT BookId, TagId FROM Books_Tags ORDER BY TagId",
            &ParameterMap::new(),
        )
        .await
        .unwrap();
    let tags: Vec<&Value> = rows.iter().filter_map(|r| r.get("TagId")).collect();
    assert_eq!(tags, vec![&Value::Int(20), &Value::Int(30)]);
}

#[tokio::test]
async fn transaction_rolls_back_on_error() {
    let db = connect().await;
    create_author_schema(&db).await;

    let result = db
        .run_in_transaction(|tx| {
            Box::pin(async move {
                tx.create(&author(1, "Bob", "bob@example.com")).await?;
                Err(OrmError::Connection(String::from("forced failure")))
            })
        })
        .await;
    assert!(result.is_err());
    assert_eq!(db.count(&db.query::<AuthorModel>()).await.unwrap(), 0);

    db.run_in_transaction(|tx| {
        Box::pin(async move {
            tx.create(&author(1, "Bob", "bob@example.com")).await?;
            tx.create(&author(2, "Kevin", "kevin@example.com")).await?;
            Ok(())
        })
    })
    .await
    .unwrap();
    assert_eq!(db.count(&db.query::<AuthorModel>()).await.unwrap(), 2);
}

struct CreateAuthors;

impl Migration<SqliteProvider> for CreateAuthors {
    fn version(&self) -> i32 {
        1
    }

    fn migrate<'a>(
        &'a self,
        db: &'a mut Database,
        _provider: &'a DbProvider<SqliteProvider>,
    ) -> BoxFuture<'a, polysql_migrate::Result<()>> {
        Box::pin(async move {
            let table = db.add_table("Authors");
            table
                .add_column("Id", ScalarType::Int32)
                .primary_key()
                .auto_increment(1, 1)?;
            table
                .add_column_with_precision("FirstName", ScalarType::String, 128)
                .not_nullable();
            table
                .add_column_with_precision("Email", ScalarType::String, 256)
                .not_nullable();
            Ok(())
        })
    }

    fn finish<'a>(
        &'a self,
        _db: &'a mut Database,
        provider: &'a DbProvider<SqliteProvider>,
    ) -> BoxFuture<'a, polysql_migrate::Result<()>> {
        Box::pin(async move {
            provider
                .create(&AuthorModel {
                    id: 1,
                    first_name: "Seed".into(),
                    email: "seed@example.com".into(),
                })
                .await?;
            Ok(())
        })
    }
}

#[tokio::test]
async fn migrations_are_idempotent_across_runs() {
    let db = connect().await;
    let runner = MigrationRunner::new(&db);

    runner
        .run_all(SystemRole::Client, &[&CreateAuthors])
        .await
        .unwrap();
    runner
        .run_all(SystemRole::Client, &[&CreateAuthors])
        .await
        .unwrap();

    // the seed ran exactly once
    assert_eq!(db.count(&db.query::<AuthorModel>()).await.unwrap(), 1);

    let version_query = db
        .query::<VersionRecord>()
        .filter(Q::eq("VersionNumber", 1_i32))
        .unwrap();
    let record = db.fetch_single(&version_query).await.unwrap();
    assert!(record.is_complete());
}
