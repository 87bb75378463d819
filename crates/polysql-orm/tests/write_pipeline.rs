//! Write-pipeline behavior against a recording connection.

use std::sync::{Arc, Mutex};

use polysql_core::{
    Dialect, Model, ModelBuilder, ModelMetadata, ParameterMap, Q, ToValue, Value,
};
use polysql_orm::{Connection, ConnectionProvider, DbProvider, OrmError, Result, Row};

#[derive(Clone, Default)]
struct Recorder {
    statements: Arc<Mutex<Vec<(String, ParameterMap)>>>,
    scalar: Arc<Mutex<Option<Value>>>,
}

impl Recorder {
    fn executed(&self) -> Vec<String> {
        self.statements
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    fn params_of(&self, index: usize) -> ParameterMap {
        self.statements.lock().unwrap()[index].1.clone()
    }
}

struct MockConnection {
    recorder: Recorder,
}

impl Connection for MockConnection {
    async fn execute(&mut self, sql: &str, params: &ParameterMap) -> Result<u64> {
        self.recorder
            .statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.clone()));
        Ok(1)
    }

    async fn query_scalar(&mut self, sql: &str, params: &ParameterMap) -> Result<Option<Value>> {
        self.recorder
            .statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.clone()));
        Ok(self.recorder.scalar.lock().unwrap().clone())
    }

    async fn query_rows(&mut self, sql: &str, params: &ParameterMap) -> Result<Vec<Row>> {
        self.recorder
            .statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.clone()));
        Ok(Vec::new())
    }

    async fn begin(&mut self) -> Result<()> {
        self.recorder
            .statements
            .lock()
            .unwrap()
            .push((String::from("BEGIN"), ParameterMap::new()));
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.recorder
            .statements
            .lock()
            .unwrap()
            .push((String::from("COMMIT"), ParameterMap::new()));
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.recorder
            .statements
            .lock()
            .unwrap()
            .push((String::from("ROLLBACK"), ParameterMap::new()));
        Ok(())
    }
}

struct MockProvider {
    recorder: Recorder,
}

impl ConnectionProvider for MockProvider {
    type Conn = MockConnection;

    async fn acquire(&self) -> Result<MockConnection> {
        Ok(MockConnection {
            recorder: self.recorder.clone(),
        })
    }

    fn database_name(&self) -> &str {
        "mock_db"
    }
}

fn provider(dialect: Dialect) -> (DbProvider<MockProvider>, Recorder) {
    let recorder = Recorder::default();
    let db = DbProvider::new(
        MockProvider {
            recorder: recorder.clone(),
        },
        dialect,
    );
    (db, recorder)
}

struct BookModel {
    id: i64,
    name: String,
    publisher_id: i64,
    tag_ids: Vec<i64>,
}

impl BookModel {
    fn sample() -> Self {
        Self {
            id: 7,
            name: "Dune".into(),
            publisher_id: 3,
            tag_ids: vec![10, 20],
        }
    }
}

impl Model for BookModel {
    fn describe() -> ModelMetadata {
        ModelBuilder::new::<Self>()
            .field("Id")
            .field("Name")
            .many_to_one("Publisher", "Publishers")
            .many_to_many("Tags", "Tags")
            .build()
    }

    fn parameters(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert("Id", self.id.to_value());
        params.insert("Name", self.name.clone().to_value());
        params.insert("PublisherId", self.publisher_id.to_value().zero_to_null());
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

#[tokio::test]
async fn create_inserts_then_reconciles_junction() {
    let (db, recorder) = provider(Dialect::sql_server());
    db.create(&BookModel::sample()).await.unwrap();

    let executed = recorder.executed();
    assert_eq!(executed.len(), 4);
    assert_eq!(
        executed[0],
        "INSERT INTO [Books] (Id,Name,PublisherId) VALUES (@Id,@Name,@PublisherId);"
    );
    assert_eq!(executed[1], "DELETE FROM [Books_Tags] WHERE BookId = @BookId");
    assert_eq!(
        executed[2],
        "INSERT INTO [Books_Tags] ([BookId], [TagId]) VALUES (@BookId, @TagId);"
    );
    assert_eq!(
        executed[3],
        "INSERT INTO [Books_Tags] ([BookId], [TagId]) VALUES (@BookId, @TagId);"
    );
    assert_eq!(recorder.params_of(2).get("TagId"), Some(&Value::Int(10)));
    assert_eq!(recorder.params_of(3).get("TagId"), Some(&Value::Int(20)));
}

#[tokio::test]
async fn sync_is_idempotent_in_result_not_in_statement_count() {
    let (db, recorder) = provider(Dialect::sql_server());
    let model = BookModel::sample();

    db.update(&model).await.unwrap();
    db.update(&model).await.unwrap();

    let executed = recorder.executed();
    // each run: 1 update + 1 junction delete + 2 junction inserts
    assert_eq!(executed.len(), 8);
    assert_eq!(executed[1], executed[5]);
    assert_eq!(executed[2], executed[6]);
}

#[tokio::test]
async fn upsert_uses_the_engine_strategy() {
    let (db, recorder) = provider(Dialect::sqlite());
    db.create_or_update(&BookModel::sample()).await.unwrap();
    assert_eq!(
        recorder.executed()[0],
        "INSERT OR REPLACE INTO [Books] (Id,Name,PublisherId) VALUES (@Id,@Name,@PublisherId)"
    );
}

#[tokio::test]
async fn delete_is_a_filtered_hard_delete() {
    let (db, recorder) = provider(Dialect::sql_server());
    db.delete::<BookModel>(Q::eq("Name", "Dune")).await.unwrap();
    assert_eq!(
        recorder.executed(),
        vec!["DELETE FROM [Books] WHERE ( [Books].[Name] = @Name1 )".to_string()]
    );
    assert_eq!(
        recorder.params_of(0).get("Name1"),
        Some(&Value::Text("Dune".into()))
    );
}

#[tokio::test]
async fn transaction_commits_on_success() {
    let (db, recorder) = provider(Dialect::sql_server());
    db.run_in_transaction(|tx| {
        Box::pin(async move {
            tx.create(&BookModel::sample()).await?;
            Ok(())
        })
    })
    .await
    .unwrap();

    let executed = recorder.executed();
    assert_eq!(executed.first().map(String::as_str), Some("BEGIN"));
    assert_eq!(executed.last().map(String::as_str), Some("COMMIT"));
    assert!(!executed.iter().any(|sql| sql == "ROLLBACK"));
}

#[tokio::test]
async fn transaction_rolls_back_and_rethrows_on_error() {
    let (db, recorder) = provider(Dialect::sql_server());
    let result = db
        .run_in_transaction(|tx| {
            Box::pin(async move {
                tx.create(&BookModel::sample()).await?;
                Err(OrmError::Connection(String::from("boom")))
            })
        })
        .await;

    assert!(matches!(result, Err(OrmError::Connection(_))));
    let executed = recorder.executed();
    assert_eq!(executed.last().map(String::as_str), Some("ROLLBACK"));
    assert!(!executed.iter().any(|sql| sql == "COMMIT"));
}

#[tokio::test]
async fn count_maps_the_scalar() {
    let (db, recorder) = provider(Dialect::sql_server());
    *recorder.scalar.lock().unwrap() = Some(Value::Int(12));
    let query = db
        .query::<BookModel>()
        .filter(Q::contains("Name", "Du"))
        .unwrap();
    let count = db.count(&query).await.unwrap();
    assert_eq!(count, 12);
    assert_eq!(
        recorder.executed(),
        vec![
            "SELECT COUNT([Books].*) FROM [Books] WHERE ( [Books].[Name] LIKE @Name1 )".to_string()
        ]
    );
}

#[tokio::test]
async fn check_if_table_exists_uses_the_dialect_template() {
    let (db, recorder) = provider(Dialect::sqlite());
    *recorder.scalar.lock().unwrap() = Some(Value::Int(1));
    assert!(db.check_if_table_exists("Books").await.unwrap());
    assert_eq!(
        recorder.executed(),
        vec!["SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='Books'".to_string()]
    );
}
