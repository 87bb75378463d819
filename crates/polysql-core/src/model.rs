//! The model contract.

use crate::metadata::ModelMetadata;
use crate::params::ParameterMap;
use crate::value::Value;

/// A persistable model type.
///
/// Implementations describe their metadata once (cached by
/// [`crate::metadata::SchemaConfig`]) and expose their persisted state as a
/// [`ParameterMap`]. There is no reflection: the mapping is written by the
/// model author, which also keeps it explicit which fields are persisted.
///
/// # Example
///
/// ```
/// use polysql_core::{Model, ModelBuilder, ModelMetadata, ParameterMap, ToValue, Value};
///
/// struct AuthorModel {
///     id: i64,
///     first_name: String,
///     email: String,
/// }
///
/// impl Model for AuthorModel {
///     fn describe() -> ModelMetadata {
///         ModelBuilder::new::<Self>()
///             .field("Id")
///             .field("FirstName")
///             .field("Email")
///             .build()
///     }
///
///     fn parameters(&self) -> ParameterMap {
///         let mut params = ParameterMap::new();
///         params.insert("Id", self.id.to_value());
///         params.insert("FirstName", self.first_name.clone().to_value());
///         params.insert("Email", self.email.clone().to_value());
///         params
///     }
///
///     fn primary_key_value(&self) -> Value {
///         self.id.to_value()
///     }
/// }
/// ```
pub trait Model: 'static {
    /// Describes the model's table, fields and relations.
    fn describe() -> ModelMetadata;

    /// Returns the persisted fields as parameters, one entry per field named
    /// in the metadata, including synthesized many-to-one foreign-key
    /// columns (`Value::zero_to_null` applied to the related key).
    fn parameters(&self) -> ParameterMap;

    /// Returns this instance's primary key value.
    fn primary_key_value(&self) -> Value;

    /// Returns the primary keys of the members of a relation collection,
    /// used by many-to-many reconciliation. The default is an empty
    /// collection for models without relation collections.
    fn relation_keys(&self, _relation_field: &str) -> Vec<Value> {
        Vec::new()
    }
}
