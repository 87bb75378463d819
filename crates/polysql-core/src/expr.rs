//! Predicate expressions.
//!
//! Filters are explicit, serializable ASTs built through the fluent [`Q`]
//! API and consumed exactly once by a compiler instance. Field references
//! are dotted paths: `"FirstName"` addresses a column on the model,
//! `"Publisher.Id"` navigates a many-to-one relation and resolves to the
//! synthesized foreign-key column on the owning table.
//!
//! # Example
//!
//! ```
//! use polysql_core::Q;
//!
//! let filter = Q::contains("FirstName", "Bo").and(Q::ne("FirstName", "Bob"));
//! ```

use serde::{Deserialize, Serialize};

use crate::value::{ToValue, Value};

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
}

impl CompareOp {
    /// Returns the SQL rendering of the operator.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// A logical connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl LogicalOp {
    /// Returns the SQL rendering of the connective.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A method-style predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    /// Substring match, `LIKE %...%`.
    Contains,
    /// Prefix match, `LIKE ...%`.
    StartsWith,
    /// Suffix match, `LIKE %...`.
    EndsWith,
    /// Anything else; rejected by the compiler with its name.
    Other(String),
}

/// A dotted member-access path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parses a dotted path such as `"Publisher.Id"`.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self(path.split('.').map(str::to_string).collect())
    }

    /// Returns the path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// A node of the predicate AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PredicateNode {
    /// `field <op> constant`.
    Comparison {
        op: CompareOp,
        field: FieldPath,
        value: Value,
    },
    /// Two predicates joined by AND/OR.
    Logical {
        op: LogicalOp,
        left: Box<PredicateNode>,
        right: Box<PredicateNode>,
    },
    /// A method-style predicate such as Contains.
    MethodCall {
        kind: MethodKind,
        field: FieldPath,
        argument: Value,
    },
    /// `field IS [NOT] NULL`.
    NullCheck { field: FieldPath, is_null: bool },
}

impl PredicateNode {
    /// A short name for the node shape, used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Comparison { .. } => "Comparison",
            Self::Logical { .. } => "Logical",
            Self::MethodCall { .. } => "MethodCall",
            Self::NullCheck { .. } => "NullCheck",
        }
    }
}

/// Fluent predicate builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Q {
    node: PredicateNode,
}

impl Q {
    fn comparison<V: ToValue>(field: &str, op: CompareOp, value: V) -> Self {
        let value = value.to_value();
        let field = FieldPath::parse(field);
        // Equality against NULL is a null check, not a parameter.
        if value.is_null() && matches!(op, CompareOp::Eq | CompareOp::Ne) {
            return Self {
                node: PredicateNode::NullCheck {
                    field,
                    is_null: op == CompareOp::Eq,
                },
            };
        }
        Self {
            node: PredicateNode::Comparison { op, field, value },
        }
    }

    /// `field = value`.
    pub fn eq<V: ToValue>(field: &str, value: V) -> Self {
        Self::comparison(field, CompareOp::Eq, value)
    }

    /// `field <> value`.
    pub fn ne<V: ToValue>(field: &str, value: V) -> Self {
        Self::comparison(field, CompareOp::Ne, value)
    }

    /// `field > value`.
    pub fn gt<V: ToValue>(field: &str, value: V) -> Self {
        Self::comparison(field, CompareOp::Gt, value)
    }

    /// `field >= value`.
    pub fn gte<V: ToValue>(field: &str, value: V) -> Self {
        Self::comparison(field, CompareOp::Gte, value)
    }

    /// `field < value`.
    pub fn lt<V: ToValue>(field: &str, value: V) -> Self {
        Self::comparison(field, CompareOp::Lt, value)
    }

    /// `field <= value`.
    pub fn lte<V: ToValue>(field: &str, value: V) -> Self {
        Self::comparison(field, CompareOp::Lte, value)
    }

    /// Substring match: `field LIKE %text%`.
    pub fn contains(field: &str, text: &str) -> Self {
        Self {
            node: PredicateNode::MethodCall {
                kind: MethodKind::Contains,
                field: FieldPath::parse(field),
                argument: Value::Text(text.to_string()),
            },
        }
    }

    /// Prefix match: `field LIKE text%`.
    pub fn starts_with(field: &str, text: &str) -> Self {
        Self {
            node: PredicateNode::MethodCall {
                kind: MethodKind::StartsWith,
                field: FieldPath::parse(field),
                argument: Value::Text(text.to_string()),
            },
        }
    }

    /// Suffix match: `field LIKE %text`.
    pub fn ends_with(field: &str, text: &str) -> Self {
        Self {
            node: PredicateNode::MethodCall {
                kind: MethodKind::EndsWith,
                field: FieldPath::parse(field),
                argument: Value::Text(text.to_string()),
            },
        }
    }

    /// An arbitrary method-style predicate; only the kinds the compiler
    /// understands will translate, everything else is rejected there.
    pub fn method<V: ToValue>(name: &str, field: &str, argument: V) -> Self {
        let kind = match name {
            "Contains" => MethodKind::Contains,
            "StartsWith" => MethodKind::StartsWith,
            "EndsWith" => MethodKind::EndsWith,
            other => MethodKind::Other(other.to_string()),
        };
        Self {
            node: PredicateNode::MethodCall {
                kind,
                field: FieldPath::parse(field),
                argument: argument.to_value(),
            },
        }
    }

    /// `field IS NULL`.
    pub fn is_null(field: &str) -> Self {
        Self {
            node: PredicateNode::NullCheck {
                field: FieldPath::parse(field),
                is_null: true,
            },
        }
    }

    /// `field IS NOT NULL`.
    pub fn is_not_null(field: &str) -> Self {
        Self {
            node: PredicateNode::NullCheck {
                field: FieldPath::parse(field),
                is_null: false,
            },
        }
    }

    /// Combines with another predicate using AND.
    #[must_use]
    pub fn and(self, other: Q) -> Q {
        Q {
            node: PredicateNode::Logical {
                op: LogicalOp::And,
                left: Box::new(self.node),
                right: Box::new(other.node),
            },
        }
    }

    /// Combines with another predicate using OR.
    #[must_use]
    pub fn or(self, other: Q) -> Q {
        Q {
            node: PredicateNode::Logical {
                op: LogicalOp::Or,
                left: Box::new(self.node),
                right: Box::new(other.node),
            },
        }
    }

    /// Returns the underlying AST node.
    #[must_use]
    pub fn into_node(self) -> PredicateNode {
        self.node
    }
}

impl From<Q> for PredicateNode {
    fn from(q: Q) -> Self {
        q.node
    }
}
