//! Write-pipeline statement assembly.
//!
//! Shared between [`crate::DbProvider`] and [`crate::Transaction`]: both
//! render the same INSERT / UPDATE / upsert / junction statements, they only
//! differ in how the connection is scoped.

use polysql_core::inflect::singularize;
use polysql_core::template::expand;
use polysql_core::{Dialect, Model, ModelMetadata, ParameterMap, UpsertStyle, Value};

/// Renders the INSERT for a model: every persisted field, including
/// synthesized many-to-one foreign-key columns.
pub(crate) fn insert(dialect: &Dialect, meta: &ModelMetadata, params: ParameterMap) -> (String, ParameterMap) {
    let fields = meta.fields.join(",");
    let placeholders = format!("@{}", meta.fields.join(",@"));
    let sql = expand(
        dialect.insert_into,
        &[&meta.table_name, &fields, &placeholders],
    );
    (sql, params)
}

/// Renders the UPDATE for a model: every persisted field except the primary
/// key, filtered on the primary key.
pub(crate) fn update(dialect: &Dialect, meta: &ModelMetadata, params: ParameterMap) -> (String, ParameterMap) {
    let sql = expand(
        dialect.update,
        &[
            &meta.table_name,
            &set_clause(dialect, meta),
            &pk_where_clause(dialect, meta),
        ],
    );
    (sql, params)
}

/// Renders the dialect-specific upsert for a model.
pub(crate) fn upsert(dialect: &Dialect, meta: &ModelMetadata, params: ParameterMap) -> (String, ParameterMap) {
    let fields = meta.fields.join(",");
    let placeholders = format!("@{}", meta.fields.join(",@"));
    let sql = match dialect.upsert {
        UpsertStyle::UpdateThenInsert => expand(
            dialect.upsert_template,
            &[
                &meta.table_name,
                &set_clause(dialect, meta),
                &pk_where_clause(dialect, meta),
                &fields,
                &placeholders,
            ],
        ),
        UpsertStyle::OnDuplicateKey => expand(
            dialect.upsert_template,
            &[
                &meta.table_name,
                &fields,
                &placeholders,
                &set_clause(dialect, meta),
            ],
        ),
        UpsertStyle::InsertOrReplace => expand(
            dialect.upsert_template,
            &[&meta.table_name, &fields, &placeholders],
        ),
    };
    (sql, params)
}

/// Renders the many-to-many reconciliation for every relation collection on
/// the model: one junction DELETE filtered to this model's key, then one
/// INSERT per distinct related key. Delete-all-then-reinsert converges to
/// the exact supplied set at the cost of N+1 statements even for a no-op.
pub(crate) fn many_to_many_sync<T: Model>(
    dialect: &Dialect,
    meta: &ModelMetadata,
    model: &T,
) -> Vec<(String, ParameterMap)> {
    let left_key = format!("{}{}", meta.singular_name(), meta.primary_key);
    let left_value = model.primary_key_value();
    let mut statements = Vec::new();

    for relation in meta.many_to_many() {
        let junction = meta.junction_table(relation);

        let delete_where = expand(
            dialect.where_clause,
            &[&format!("{left_key} = @{left_key}")],
        );
        let delete_sql = expand(dialect.delete_from, &[&junction, &delete_where]);
        let mut delete_params = ParameterMap::new();
        delete_params.insert(left_key.clone(), left_value.clone());
        statements.push((delete_sql.trim_end().to_string(), delete_params));

        let right_key = format!("{}Id", singularize(&relation.target_table));
        for member in distinct(model.relation_keys(&relation.field)) {
            let fields = expand(dialect.join_fields, &[&left_key, &right_key]);
            let placeholders = expand(dialect.join_parameters, &[&left_key, &right_key]);
            let insert_sql = expand(dialect.insert_into, &[&junction, &fields, &placeholders]);
            let mut params = ParameterMap::new();
            params.insert(left_key.clone(), left_value.clone());
            params.insert(right_key.clone(), member);
            statements.push((insert_sql, params));
        }
    }

    statements
}

/// Executes the full create pipeline on one connection: INSERT, then
/// many-to-many reconciliation.
pub(crate) async fn run_create<C: crate::Connection, T: Model>(
    conn: &mut C,
    dialect: &Dialect,
    meta: &ModelMetadata,
    model: &T,
) -> crate::Result<()> {
    let (sql, params) = insert(dialect, meta, model.parameters());
    tracing::debug!(sql = %sql, "executing insert");
    conn.execute(&sql, &params).await?;
    run_many_to_many_sync(conn, dialect, meta, model).await
}

/// Executes the full update pipeline on one connection.
pub(crate) async fn run_update<C: crate::Connection, T: Model>(
    conn: &mut C,
    dialect: &Dialect,
    meta: &ModelMetadata,
    model: &T,
) -> crate::Result<()> {
    let (sql, params) = update(dialect, meta, model.parameters());
    tracing::debug!(sql = %sql, "executing update");
    conn.execute(&sql, &params).await?;
    run_many_to_many_sync(conn, dialect, meta, model).await
}

/// Executes the dialect-specific upsert pipeline on one connection.
pub(crate) async fn run_upsert<C: crate::Connection, T: Model>(
    conn: &mut C,
    dialect: &Dialect,
    meta: &ModelMetadata,
    model: &T,
) -> crate::Result<()> {
    let (sql, params) = upsert(dialect, meta, model.parameters());
    tracing::debug!(sql = %sql, "executing upsert");
    conn.execute(&sql, &params).await?;
    run_many_to_many_sync(conn, dialect, meta, model).await
}

async fn run_many_to_many_sync<C: crate::Connection, T: Model>(
    conn: &mut C,
    dialect: &Dialect,
    meta: &ModelMetadata,
    model: &T,
) -> crate::Result<()> {
    for (sql, params) in many_to_many_sync(dialect, meta, model) {
        tracing::debug!(sql = %sql, "reconciling junction table");
        conn.execute(&sql, &params).await?;
    }
    Ok(())
}

fn set_clause(dialect: &Dialect, meta: &ModelMetadata) -> String {
    let fields: Vec<String> = meta
        .fields
        .iter()
        .filter(|field| **field != meta.primary_key)
        .map(|field| format!("{} = @{field}", dialect.quote(field)))
        .collect();
    fields.join(",")
}

fn pk_where_clause(dialect: &Dialect, meta: &ModelMetadata) -> String {
    expand(
        dialect.where_clause,
        &[&format!("{0} = @{0}", meta.primary_key)],
    )
}

fn distinct(values: Vec<Value>) -> Vec<Value> {
    let mut seen: Vec<Value> = Vec::with_capacity(values.len());
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}
