//! Chainable query builder.
//!
//! A [`Query`] accumulates predicate, ordering, paging and join state for a
//! model type and renders final statements through the dialect templates.
//! Nothing is rendered until a terminal `to_sql*` call; execution lives at
//! the provider layer.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::compiler::{JoinCompiler, OrderByCompiler, PredicateCompiler};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::expr::Q;
use crate::inflect::singularize;
use crate::metadata::{ModelMetadata, SchemaConfig};
use crate::model::Model;
use crate::params::ParameterMap;
use crate::template::expand;

/// Sort direction for `order_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    /// `ASC`
    Ascending,
    /// `DESC`
    Descending,
}

impl OrderDirection {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// The kind of a join link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// `INNER JOIN`
    Inner,
    /// `LEFT OUTER JOIN`
    Left,
    /// Junction-table join synthesized from naming convention.
    ManyToMany,
}

#[derive(Debug, Clone)]
struct JoinLink {
    join_type: JoinType,
    prev_table: String,
    table: String,
    on_clause: String,
}

/// A chainable, lazily rendered query over model `T`.
///
/// The table name is fixed at construction. `filter` calls accumulate AND-ed
/// WHERE clauses; `order_by`/`order_by_desc` may be used exactly once;
/// `join`/`many_to_many_join` build an ordered chain where each link nests
/// against the immediately preceding joined type.
#[derive(Debug)]
pub struct Query<T: Model> {
    dialect: Arc<Dialect>,
    config: Arc<SchemaConfig>,
    metadata: Arc<ModelMetadata>,
    where_clause: String,
    params: ParameterMap,
    order_clause: Option<String>,
    skip_take: Option<String>,
    joins: Vec<JoinLink>,
    _model: PhantomData<fn() -> T>,
}

// Manual Clone implementation to avoid a T: Clone bound.
impl<T: Model> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            dialect: Arc::clone(&self.dialect),
            config: Arc::clone(&self.config),
            metadata: Arc::clone(&self.metadata),
            where_clause: self.where_clause.clone(),
            params: self.params.clone(),
            order_clause: self.order_clause.clone(),
            skip_take: self.skip_take.clone(),
            joins: self.joins.clone(),
            _model: PhantomData,
        }
    }
}

impl<T: Model> Query<T> {
    /// Creates a query over `T`.
    #[must_use]
    pub fn new(dialect: Arc<Dialect>, config: Arc<SchemaConfig>) -> Self {
        let metadata = config.resolve::<T>();
        Self {
            dialect,
            config,
            metadata,
            where_clause: String::new(),
            params: ParameterMap::new(),
            order_clause: None,
            skip_take: None,
            joins: Vec::new(),
            _model: PhantomData,
        }
    }

    /// Returns the accumulated parameters.
    #[must_use]
    pub fn params(&self) -> &ParameterMap {
        &self.params
    }

    /// Returns the queried table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.metadata.table_name
    }

    /// Appends a predicate; multiple calls are AND-ed together.
    pub fn filter(mut self, predicate: Q) -> Result<Self> {
        let joined: Vec<String> = self.joins.iter().map(|j| j.table.clone()).collect();
        let fragment = PredicateCompiler::with_joined(&self.dialect, &self.metadata, &joined)
            .compile(&predicate.into_node(), &mut self.params)?;

        if self.where_clause.is_empty() {
            self.where_clause = expand(self.dialect.where_clause, &[&fragment]);
        } else {
            self.where_clause.push_str(" AND ");
            self.where_clause.push_str(&fragment);
        }
        Ok(self)
    }

    /// Sets ascending ordering on `field`.
    ///
    /// # Panics
    ///
    /// Panics if ordering was already set; a query orders by at most one
    /// expression.
    pub fn order_by(self, field: &str) -> Result<Self> {
        self.order(field, OrderDirection::Ascending)
    }

    /// Sets descending ordering on `field`.
    ///
    /// # Panics
    ///
    /// Panics if ordering was already set.
    pub fn order_by_desc(self, field: &str) -> Result<Self> {
        self.order(field, OrderDirection::Descending)
    }

    fn order(mut self, field: &str, direction: OrderDirection) -> Result<Self> {
        assert!(
            self.order_clause.is_none(),
            "order_by may only be set once per query"
        );
        let column = OrderByCompiler::new(&self.dialect, &self.metadata).compile(field)?;
        self.order_clause = Some(expand(
            self.dialect.order_by,
            &[&column, direction.as_sql()],
        ));
        Ok(self)
    }

    /// Sets paging: skip `skip` rows, take `take` rows.
    #[must_use]
    pub fn skip_take(mut self, skip: u64, take: u64) -> Self {
        self.skip_take = Some(expand(
            self.dialect.skip_take,
            &[&skip.to_string(), &take.to_string()],
        ));
        self
    }

    /// Joins `J` with a LEFT OUTER JOIN against the previous link (or the
    /// root table), using the naming convention
    /// `[Prev].[Id] = [Joined].[<singular Prev>Id]`. Use [`Query::on`] to
    /// replace the condition.
    #[must_use]
    pub fn join<J: Model>(self) -> Self {
        self.push_join::<J>(JoinType::Left)
    }

    /// Joins `J` with an INNER JOIN, same conventions as [`Query::join`].
    #[must_use]
    pub fn inner_join<J: Model>(self) -> Self {
        self.push_join::<J>(JoinType::Inner)
    }

    fn push_join<J: Model>(mut self, join_type: JoinType) -> Self {
        let joined = self.config.resolve::<J>();
        let prev = self.current_table().to_string();
        let on_clause = JoinCompiler::new(&self.dialect).compile(
            &prev,
            "Id",
            &joined.table_name,
            &format!("{}Id", singularize(&prev)),
        );
        self.joins.push(JoinLink {
            join_type,
            prev_table: prev,
            table: joined.table_name.clone(),
            on_clause,
        });
        self
    }

    /// Joins `J` through the synthesized junction table named from both
    /// table names sorted lexicographically. The join condition is purely
    /// conventional; supplying [`Query::on`] afterwards is an error.
    #[must_use]
    pub fn many_to_many_join<J: Model>(mut self) -> Self {
        let joined = self.config.resolve::<J>();
        let prev = self.current_table().to_string();

        let mut names = [prev.clone(), joined.table_name.clone()];
        names.sort();
        let junction = format!("{}_{}", names[0], names[1]);

        let on_clause = expand(
            self.dialect.many_to_many_join,
            &[
                &prev,
                "Id",
                &junction,
                &format!("{}Id", singularize(&prev)),
                &joined.table_name,
                &format!("{}Id", singularize(&joined.table_name)),
            ],
        );
        self.joins.push(JoinLink {
            join_type: JoinType::ManyToMany,
            prev_table: prev,
            table: joined.table_name.clone(),
            on_clause,
        });
        self
    }

    /// Replaces the convention-based condition of the most recent join with
    /// an explicit equality: `prev.left_field = joined.right_field`.
    pub fn on(mut self, left_field: &str, right_field: &str) -> Result<Self> {
        let Some(link) = self.joins.last_mut() else {
            return Err(Error::NotSupported(String::from(
                "on() requires a preceding join",
            )));
        };
        if link.join_type == JoinType::ManyToMany {
            return Err(Error::NotSupported(String::from(
                "a many-to-many join synthesizes its condition and does not accept on()",
            )));
        }
        link.on_clause = JoinCompiler::new(&self.dialect).compile(
            &link.prev_table,
            left_field,
            &link.table,
            right_field,
        );
        Ok(self)
    }

    /// Renders the SELECT statement.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let extended = self.extended_where(true, true);
        let rendered = if self.joins.is_empty() {
            expand(
                self.dialect.select_from,
                &[&self.metadata.table_name, &extended],
            )
        } else {
            expand(
                self.dialect.select_from_join,
                &[&self.metadata.table_name, &self.join_expression(), &extended],
            )
        };
        rendered.trim_end().to_string()
    }

    /// Renders the COUNT statement; ordering is irrelevant to counting and
    /// is omitted.
    #[must_use]
    pub fn to_sql_count(&self) -> String {
        let extended = self.extended_where(false, true);
        let rendered = if self.joins.is_empty() {
            expand(
                self.dialect.select_count_from,
                &[&self.metadata.table_name, &extended],
            )
        } else {
            expand(
                self.dialect.select_count_from_join,
                &[&self.metadata.table_name, &self.join_expression(), &extended],
            )
        };
        rendered.trim_end().to_string()
    }

    /// Renders the DELETE statement. Ordering and paging are rejected: they
    /// have no meaning for a filtered hard delete.
    pub fn to_sql_delete(&self) -> Result<String> {
        if self.order_clause.is_some() || self.skip_take.is_some() {
            return Err(Error::NotSupported(String::from(
                "DELETE does not accept order_by or skip_take",
            )));
        }
        let rendered = if self.joins.is_empty() {
            expand(
                self.dialect.delete_from,
                &[&self.metadata.table_name, &self.where_clause],
            )
        } else {
            expand(
                self.dialect.delete_from_join,
                &[
                    &self.metadata.table_name,
                    &self.join_expression(),
                    &self.where_clause,
                ],
            )
        };
        Ok(rendered.trim_end().to_string())
    }

    /// Renders an UPDATE of every persisted field except the primary key,
    /// filtered by the accumulated WHERE clause. Returns the statement and
    /// the merged parameters (filter parameters first, write parameters
    /// renamed on collision).
    #[must_use]
    pub fn to_sql_update(&self, model: &T) -> (String, ParameterMap) {
        let set_fields: Vec<String> = self
            .metadata
            .fields
            .iter()
            .filter(|field| **field != self.metadata.primary_key)
            .map(|field| format!("{} = @{field}", self.dialect.quote(field)))
            .collect();
        let set_clause = set_fields.join(",");

        let rendered = if self.joins.is_empty() {
            expand(
                self.dialect.update,
                &[&self.metadata.table_name, &set_clause, &self.where_clause],
            )
        } else {
            expand(
                self.dialect.update_join,
                &[
                    &self.metadata.table_name,
                    &set_clause,
                    &self.join_expression(),
                    &self.where_clause,
                ],
            )
        };

        let mut params = self.params.clone();
        params.merge(model.parameters());
        (rendered.trim_end().to_string(), params)
    }

    /// Renders the TRUNCATE statement for the queried table.
    #[must_use]
    pub fn to_sql_truncate(&self) -> String {
        expand(self.dialect.truncate_table, &[&self.metadata.table_name])
    }

    /// Renders `SELECT MAX(field)` with the current WHERE clause.
    #[must_use]
    pub fn to_sql_max(&self, field: &str) -> String {
        self.scalar(self.dialect.select_max_from, field)
    }

    /// Renders `SELECT MIN(field)` with the current WHERE clause.
    #[must_use]
    pub fn to_sql_min(&self, field: &str) -> String {
        self.scalar(self.dialect.select_min_from, field)
    }

    /// Renders `SELECT SUM(field)` with the current WHERE clause.
    #[must_use]
    pub fn to_sql_sum(&self, field: &str) -> String {
        self.scalar(self.dialect.select_sum_from, field)
    }

    fn scalar(&self, template: &str, field: &str) -> String {
        expand(
            template,
            &[&self.metadata.table_name, &self.where_clause, field],
        )
        .trim_end()
        .to_string()
    }

    fn current_table(&self) -> &str {
        self.joins
            .last()
            .map_or(self.metadata.table_name.as_str(), |j| j.table.as_str())
    }

    fn join_expression(&self) -> String {
        let clauses: Vec<String> = self
            .joins
            .iter()
            .map(|link| match link.join_type {
                JoinType::Inner => {
                    expand(self.dialect.inner_join, &[&link.table, &link.on_clause])
                }
                JoinType::Left => expand(self.dialect.left_join, &[&link.table, &link.on_clause]),
                JoinType::ManyToMany => link.on_clause.clone(),
            })
            .collect();
        clauses.join(" ")
    }

    fn extended_where(&self, with_order: bool, with_paging: bool) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.where_clause.is_empty() {
            parts.push(&self.where_clause);
        }
        if with_order {
            if let Some(order) = &self.order_clause {
                parts.push(order);
            }
        }
        if with_paging {
            if let Some(paging) = &self.skip_take {
                parts.push(paging);
            }
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ModelBuilder;
    use crate::value::{ToValue, Value};

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

    struct BookModel;

    impl Model for BookModel {
        fn describe() -> ModelMetadata {
            ModelBuilder::new::<Self>()
                .field("Id")
                .field("Name")
                .build()
        }

        fn parameters(&self) -> ParameterMap {
            ParameterMap::new()
        }

        fn primary_key_value(&self) -> Value {
            Value::Null
        }
    }

    fn query() -> Query<AuthorModel> {
        Query::new(
            Arc::new(Dialect::sql_server()),
            Arc::new(SchemaConfig::new()),
        )
    }

    #[test]
    fn bare_select() {
        assert_eq!(query().to_sql(), "SELECT [Authors].* FROM [Authors]");
    }

    #[test]
    fn select_with_filter_order_and_paging() {
        let q = query()
            .filter(Q::contains("FirstName", "Bo"))
            .unwrap()
            .order_by_desc("Email")
            .unwrap()
            .skip_take(20, 10);
        assert_eq!(
            q.to_sql(),
            "SELECT [Authors].* FROM [Authors] WHERE ( [Authors].[FirstName] LIKE @FirstName1 ) \
             ORDER BY [Authors].[Email] DESC OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
        );
        assert_eq!(q.params().names(), vec!["FirstName1"]);
    }

    #[test]
    fn sqlite_paging_renders_limit_offset() {
        let q: Query<AuthorModel> =
            Query::new(Arc::new(Dialect::sqlite()), Arc::new(SchemaConfig::new()));
        let q = q
            .filter(Q::eq("Id", 1_i64))
            .unwrap()
            .order_by_desc("Email")
            .unwrap()
            .skip_take(20, 10);
        assert_eq!(
            q.to_sql(),
            "SELECT [Authors].* FROM [Authors] WHERE ( [Authors].[Id] = @Id1 ) \
             ORDER BY [Authors].[Email] DESC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn chained_filters_number_parameters_across_the_query() {
        let q = query()
            .filter(Q::contains("FirstName", "Bo").or(Q::eq("FirstName", "Kevin")))
            .unwrap()
            .filter(Q::ne("FirstName", "Bob"))
            .unwrap();
        assert_eq!(
            q.to_sql(),
            "SELECT [Authors].* FROM [Authors] WHERE ( [Authors].[FirstName] LIKE @FirstName1 \
             OR [Authors].[FirstName] = @FirstName2 ) AND ( [Authors].[FirstName] <> @FirstName3 )"
        );
        assert_eq!(
            q.params().names(),
            vec!["FirstName1", "FirstName2", "FirstName3"]
        );
    }

    #[test]
    fn count_ignores_ordering() {
        let q = query()
            .filter(Q::contains("FirstName", "Bo"))
            .unwrap()
            .order_by_desc("Email")
            .unwrap();
        assert_eq!(
            q.to_sql_count(),
            "SELECT COUNT([Authors].*) FROM [Authors] WHERE ( [Authors].[FirstName] LIKE @FirstName1 )"
        );
    }

    #[test]
    #[should_panic(expected = "order_by may only be set once")]
    fn order_by_twice_panics() {
        let _ = query()
            .order_by("Email")
            .unwrap()
            .order_by_desc("FirstName");
    }

    #[test]
    fn delete_renders_where_only() {
        let q = query().filter(Q::eq("FirstName", "Bob")).unwrap();
        assert_eq!(
            q.to_sql_delete().unwrap(),
            "DELETE FROM [Authors] WHERE ( [Authors].[FirstName] = @FirstName1 )"
        );
    }

    #[test]
    fn delete_rejects_paging() {
        let q = query().skip_take(0, 10);
        assert!(matches!(
            q.to_sql_delete(),
            Err(Error::NotSupported(_))
        ));
    }

    #[test]
    fn update_excludes_primary_key_and_merges_parameters() {
        let model = AuthorModel {
            id: 9,
            first_name: "Bob".into(),
            email: "bob@example.com".into(),
        };
        let q = query().filter(Q::eq("Id", 9_i64)).unwrap();
        let (sql, params) = q.to_sql_update(&model);
        assert_eq!(
            sql,
            "UPDATE [Authors] SET [FirstName] = @FirstName,[Email] = @Email \
             WHERE ( [Authors].[Id] = @Id1 )"
        );
        assert_eq!(params.names(), vec!["Id1", "Id", "FirstName", "Email"]);
    }

    #[test]
    fn join_uses_naming_convention() {
        let q = query().join::<BookModel>();
        assert_eq!(
            q.to_sql(),
            "SELECT [Authors].* FROM [Authors] LEFT OUTER JOIN [Books] ON \
             [Authors].[Id] = [Books].[AuthorId]"
        );
    }

    #[test]
    fn explicit_on_replaces_the_condition() {
        let q = query()
            .inner_join::<BookModel>()
            .on("Id", "WriterId")
            .unwrap();
        assert_eq!(
            q.to_sql(),
            "SELECT [Authors].* FROM [Authors] INNER JOIN [Books] ON \
             [Authors].[Id] = [Books].[WriterId]"
        );
    }

    #[test]
    fn many_to_many_join_synthesizes_junction() {
        let q = query().many_to_many_join::<BookModel>();
        assert_eq!(
            q.to_sql(),
            "SELECT [Authors].* FROM [Authors] INNER JOIN [Authors_Books] ON \
             [Authors_Books].[AuthorId] = [Authors].[Id] INNER JOIN [Books] ON \
             [Authors_Books].[BookId] = [Books].[Id]"
        );
    }

    #[test]
    fn many_to_many_join_rejects_on() {
        let q = query().many_to_many_join::<BookModel>();
        assert!(matches!(q.on("Id", "X"), Err(Error::NotSupported(_))));
    }

    #[test]
    fn truncate_statement() {
        assert_eq!(query().to_sql_truncate(), "TRUNCATE TABLE Authors");
    }

    #[test]
    fn scalar_statements() {
        let q = query().filter(Q::gt("Id", 0_i64)).unwrap();
        assert_eq!(
            q.to_sql_max("Id"),
            "SELECT MAX([Authors].[Id]) FROM [Authors] WHERE ( [Authors].[Id] > @Id1 )"
        );
    }
}
