//! Predicate, join and order-by compilers.
//!
//! Each compiler is a single-use visitor: it walks one expression, emits a
//! SQL fragment with dialect-correct identifiers and placeholders, and
//! appends to an ordered, collision-free parameter map. Cross-table
//! navigation in a predicate resolves to the synthesized foreign-key column
//! on the owning table; it never joins implicitly.

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::expr::{CompareOp, FieldPath, LogicalOp, MethodKind, PredicateNode};
use crate::metadata::{ModelMetadata, RelationKind};
use crate::params::ParameterMap;
use crate::value::Value;

/// Compiles a [`PredicateNode`] into a WHERE fragment.
pub struct PredicateCompiler<'a> {
    dialect: &'a Dialect,
    metadata: &'a ModelMetadata,
    joined_tables: &'a [String],
}

impl<'a> PredicateCompiler<'a> {
    /// Creates a compiler for predicates over a single model.
    #[must_use]
    pub fn new(dialect: &'a Dialect, metadata: &'a ModelMetadata) -> Self {
        Self {
            dialect,
            metadata,
            joined_tables: &[],
        }
    }

    /// Creates a compiler that also accepts references to joined tables,
    /// addressed by table name as the leading path segment.
    #[must_use]
    pub fn with_joined(
        dialect: &'a Dialect,
        metadata: &'a ModelMetadata,
        joined_tables: &'a [String],
    ) -> Self {
        Self {
            dialect,
            metadata,
            joined_tables,
        }
    }

    /// Compiles the predicate, consuming the compiler.
    ///
    /// The returned fragment is wrapped in `( ... )`; parameters are added
    /// to `params` with numbered, collision-free names.
    pub fn compile(self, node: &PredicateNode, params: &mut ParameterMap) -> Result<String> {
        let body = self.visit(node, params)?;
        Ok(format!("( {body} )"))
    }

    fn visit(&self, node: &PredicateNode, params: &mut ParameterMap) -> Result<String> {
        match node {
            PredicateNode::Comparison { op, field, value } => {
                self.visit_comparison(*op, field, value, params)
            }
            PredicateNode::NullCheck { field, is_null } => {
                let (table, column) = self.resolve(field)?;
                let check = if *is_null { "IS NULL" } else { "IS NOT NULL" };
                Ok(format!("{} {check}", self.dialect.qualify(&table, &column)))
            }
            PredicateNode::MethodCall {
                kind,
                field,
                argument,
            } => self.visit_method(kind, field, argument, params),
            PredicateNode::Logical { op, left, right } => {
                let left = self.visit_logical_child(left, *op, params)?;
                let right = self.visit_logical_child(right, *op, params)?;
                Ok(format!("{left} {} {right}", op.as_sql()))
            }
        }
    }

    // A logical child with a different connective keeps its own parentheses
    // so precedence survives flattening.
    fn visit_logical_child(
        &self,
        child: &PredicateNode,
        parent: LogicalOp,
        params: &mut ParameterMap,
    ) -> Result<String> {
        let rendered = self.visit(child, params)?;
        match child {
            PredicateNode::Logical { op, .. } if *op != parent => Ok(format!("({rendered})")),
            _ => Ok(rendered),
        }
    }

    fn visit_comparison(
        &self,
        op: CompareOp,
        field: &FieldPath,
        value: &Value,
        params: &mut ParameterMap,
    ) -> Result<String> {
        let (table, column) = self.resolve(field)?;
        let qualified = self.dialect.qualify(&table, &column);

        if value.is_null() {
            return match op {
                CompareOp::Eq => Ok(format!("{qualified} IS NULL")),
                CompareOp::Ne => Ok(format!("{qualified} IS NOT NULL")),
                other => Err(Error::BinaryOperatorNotSupported(format!(
                    "{} against NULL",
                    other.as_sql()
                ))),
            };
        }

        let name = params.add_numbered(&column, value.clone());
        Ok(format!("{qualified} {} @{name}", op.as_sql()))
    }

    fn visit_method(
        &self,
        kind: &MethodKind,
        field: &FieldPath,
        argument: &Value,
        params: &mut ParameterMap,
    ) -> Result<String> {
        let Value::Text(text) = argument else {
            return Err(Error::ExpressionNotSupported(format!(
                "non-text argument to {kind:?}"
            )));
        };
        let pattern = match kind {
            MethodKind::Contains => format!("%{text}%"),
            MethodKind::StartsWith => format!("{text}%"),
            MethodKind::EndsWith => format!("%{text}"),
            MethodKind::Other(name) => return Err(Error::MethodCallNotSupported(name.clone())),
        };

        let (table, column) = self.resolve(field)?;
        let name = params.add_numbered(&column, Value::Text(pattern));
        Ok(format!(
            "{} LIKE @{name}",
            self.dialect.qualify(&table, &column)
        ))
    }

    /// Resolves a field path to `(table, column)`.
    fn resolve(&self, field: &FieldPath) -> Result<(String, String)> {
        match field.segments() {
            [column] => Ok((self.metadata.table_name.clone(), column.clone())),
            [head, tail] => {
                if let Some(relation) = self.metadata.relation(head) {
                    if relation.kind == RelationKind::ManyToOne && tail == "Id" {
                        // Navigation lands on the synthesized FK column of
                        // the owning table, not on the related table.
                        return Ok((self.metadata.table_name.clone(), format!("{head}Id")));
                    }
                    return Err(Error::ExpressionNotSupported(format!(
                        "navigation through '{head}.{tail}'"
                    )));
                }
                if self.joined_tables.iter().any(|t| t == head) {
                    return Ok((head.clone(), tail.clone()));
                }
                Err(Error::ExpressionNotSupported(format!(
                    "member access '{field}'"
                )))
            }
            _ => Err(Error::ExpressionNotSupported(format!(
                "member access '{field}'"
            ))),
        }
    }
}

/// Compiles an equality join condition between two tables.
pub struct JoinCompiler<'a> {
    dialect: &'a Dialect,
}

impl<'a> JoinCompiler<'a> {
    /// Creates a join compiler.
    #[must_use]
    pub fn new(dialect: &'a Dialect) -> Self {
        Self { dialect }
    }

    /// Renders `left_table.left_field = right_table.right_field`.
    #[must_use]
    pub fn compile(
        self,
        left_table: &str,
        left_field: &str,
        right_table: &str,
        right_field: &str,
    ) -> String {
        format!(
            "{} = {}",
            self.dialect.qualify(left_table, left_field),
            self.dialect.qualify(right_table, right_field)
        )
    }
}

/// Compiles an order-by column reference. Direction is supplied separately
/// by the caller, never derived from the expression.
pub struct OrderByCompiler<'a> {
    dialect: &'a Dialect,
    metadata: &'a ModelMetadata,
}

impl<'a> OrderByCompiler<'a> {
    /// Creates an order-by compiler.
    #[must_use]
    pub fn new(dialect: &'a Dialect, metadata: &'a ModelMetadata) -> Self {
        Self { dialect, metadata }
    }

    /// Renders `table.field` for the ordering column.
    pub fn compile(self, field: &str) -> Result<String> {
        let path = FieldPath::parse(field);
        match path.segments() {
            [column] => Ok(self.dialect.qualify(&self.metadata.table_name, column)),
            _ => Err(Error::ExpressionNotSupported(format!(
                "order by '{field}'"
            ))),
        }
    }
}
