//! Model metadata and the schema configuration registry.
//!
//! There is no runtime reflection here: each model describes itself once
//! through a [`ModelBuilder`] and the result is cached per type in a
//! [`SchemaConfig`]. The configuration is created at startup and threaded
//! through providers and builders; it also owns primary-key overrides and
//! custom scalar-type registrations.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::inflect::{singularize, table_name_for};
use crate::model::Model;

/// The kind of a model relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// This model holds a foreign key to one related record.
    ManyToOne,
    /// The related table holds the foreign key back to this model.
    OneToMany,
    /// Backed by a synthesized junction table.
    ManyToMany,
}

/// A relationship declared on a model.
#[derive(Debug, Clone)]
pub struct Relation {
    /// Relationship kind.
    pub kind: RelationKind,
    /// The declaring field name on the model.
    pub field: String,
    /// The related model's table name.
    pub target_table: String,
}

/// Resolved metadata for one model type.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// Table backing the model.
    pub table_name: String,
    /// Primary key field name.
    pub primary_key: String,
    /// Persisted field names, in declaration order, including synthesized
    /// many-to-one foreign-key columns.
    pub fields: Vec<String>,
    /// Declared relationships.
    pub relations: Vec<Relation>,
}

impl ModelMetadata {
    /// Looks up a relation by its declaring field name.
    #[must_use]
    pub fn relation(&self, field: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.field == field)
    }

    /// Iterates the many-to-many relations.
    pub fn many_to_many(&self) -> impl Iterator<Item = &Relation> {
        self.relations
            .iter()
            .filter(|r| r.kind == RelationKind::ManyToMany)
    }

    /// The singular form of the table name, used for synthesized key names.
    #[must_use]
    pub fn singular_name(&self) -> String {
        singularize(&self.table_name)
    }

    /// The junction table backing a many-to-many relation: both table names
    /// sorted lexicographically, joined by `_`.
    #[must_use]
    pub fn junction_table(&self, relation: &Relation) -> String {
        let mut names = [self.table_name.clone(), relation.target_table.clone()];
        names.sort();
        format!("{}_{}", names[0], names[1])
    }
}

/// Builder for [`ModelMetadata`], used from [`Model::describe`].
#[derive(Debug)]
pub struct ModelBuilder {
    type_name: &'static str,
    table_override: Option<String>,
    primary_key: Option<String>,
    fields: Vec<String>,
    relations: Vec<Relation>,
}

impl ModelBuilder {
    /// Starts describing model type `T`.
    #[must_use]
    pub fn new<T: 'static>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            table_override: None,
            primary_key: None,
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Overrides the table name; no pluralization is applied.
    #[must_use]
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_override = Some(name.into());
        self
    }

    /// Sets the primary key field; defaults to `Id`.
    #[must_use]
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = Some(name.into());
        self
    }

    /// Adds one persisted field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    /// Adds several persisted fields.
    #[must_use]
    pub fn fields(mut self, names: &[&str]) -> Self {
        self.fields.extend(names.iter().map(|n| (*n).to_string()));
        self
    }

    /// Declares a many-to-one relation. The related object itself is not
    /// persisted; a synthesized `<field>Id` column is appended instead.
    #[must_use]
    pub fn many_to_one(mut self, field: impl Into<String>, target_table: impl Into<String>) -> Self {
        let field = field.into();
        self.fields.push(format!("{field}Id"));
        self.relations.push(Relation {
            kind: RelationKind::ManyToOne,
            field,
            target_table: target_table.into(),
        });
        self
    }

    /// Declares a one-to-many relation; contributes no column.
    #[must_use]
    pub fn one_to_many(mut self, field: impl Into<String>, target_table: impl Into<String>) -> Self {
        self.relations.push(Relation {
            kind: RelationKind::OneToMany,
            field: field.into(),
            target_table: target_table.into(),
        });
        self
    }

    /// Declares a many-to-many relation; contributes no column, only a
    /// junction table reconciled by the write pipeline.
    #[must_use]
    pub fn many_to_many(mut self, field: impl Into<String>, target_table: impl Into<String>) -> Self {
        self.relations.push(Relation {
            kind: RelationKind::ManyToMany,
            field: field.into(),
            target_table: target_table.into(),
        });
        self
    }

    /// Builds the metadata, deriving the table name from the type name when
    /// no override was given.
    #[must_use]
    pub fn build(self) -> ModelMetadata {
        let table_name = self
            .table_override
            .unwrap_or_else(|| table_name_for(self.type_name));
        ModelMetadata {
            table_name,
            primary_key: self.primary_key.unwrap_or_else(|| String::from("Id")),
            fields: self.fields,
            relations: self.relations,
        }
    }
}

/// Process-wide, read-mostly registry of model metadata and type overrides.
///
/// Created once at startup and passed by reference (or `Arc`) to providers
/// and builders. Two operations on the same model type may resolve
/// concurrently from different connections, so both maps sit behind
/// `RwLock`s.
#[derive(Debug, Default)]
pub struct SchemaConfig {
    metadata: RwLock<HashMap<TypeId, Arc<ModelMetadata>>>,
    pk_overrides: RwLock<HashMap<TypeId, String>>,
    custom_types: RwLock<HashMap<String, String>>,
}

impl SchemaConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves (and caches) metadata for `T`.
    pub fn resolve<T: Model>(&self) -> Arc<ModelMetadata> {
        let key = TypeId::of::<T>();
        if let Some(found) = self
            .metadata
            .read()
            .expect("metadata cache poisoned")
            .get(&key)
        {
            return Arc::clone(found);
        }

        let mut meta = T::describe();
        if let Some(pk) = self
            .pk_overrides
            .read()
            .expect("pk override cache poisoned")
            .get(&key)
        {
            meta.primary_key = pk.clone();
        }
        let meta = Arc::new(meta);
        self.metadata
            .write()
            .expect("metadata cache poisoned")
            .insert(key, Arc::clone(&meta));
        meta
    }

    /// Overrides the primary key field for `T` and re-resolves its cached
    /// metadata; the last write wins.
    pub fn set_primary_key<T: Model>(&self, field: impl Into<String>) {
        let key = TypeId::of::<T>();
        let field = field.into();
        self.pk_overrides
            .write()
            .expect("pk override cache poisoned")
            .insert(key, field.clone());

        let mut meta = T::describe();
        meta.primary_key = field;
        self.metadata
            .write()
            .expect("metadata cache poisoned")
            .insert(key, Arc::new(meta));
    }

    /// Registers a native type name for a custom logical type.
    pub fn register_custom_type(&self, logical: impl Into<String>, sql: impl Into<String>) {
        self.custom_types
            .write()
            .expect("custom type cache poisoned")
            .insert(logical.into(), sql.into());
    }

    /// Looks up a registered custom type.
    #[must_use]
    pub fn custom_type(&self, logical: &str) -> Option<String> {
        self.custom_types
            .read()
            .expect("custom type cache poisoned")
            .get(logical)
            .cloned()
    }
}
