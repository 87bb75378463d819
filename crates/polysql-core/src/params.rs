//! Ordered statement parameters.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// An insertion-ordered mapping of parameter name to value.
///
/// Names are unique within one statement. Query predicates allocate numbered
/// names (`FirstName1`, `FirstName2`, ...) through [`ParameterMap::add_numbered`];
/// write operations use plain field names. Merging two maps renames on
/// collision instead of overwriting, so identical predicates on the same
/// field stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterMap {
    entries: Vec<(String, Value)>,
}

impl ParameterMap {
    /// Creates an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the map holds no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns true when a parameter named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Inserts a parameter under an exact name.
    ///
    /// The name must not already be present; numbered predicate parameters
    /// go through [`ParameterMap::add_numbered`] instead.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        debug_assert!(!self.contains(&name), "duplicate parameter '{name}'");
        self.entries.push((name, value));
    }

    /// Removes the parameter named `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Inserts a value under the next free numbered name for `field` and
    /// returns the allocated name.
    ///
    /// The sequence starts at 1 and increments on every reuse of the field
    /// name within this map, across all clauses of one statement.
    pub fn add_numbered(&mut self, field: &str, value: Value) -> String {
        let used = self
            .entries
            .iter()
            .filter(|(n, _)| {
                n.strip_prefix(field)
                    .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
            })
            .count();
        let name = format!("{field}{}", used + 1);
        self.entries.push((name.clone(), value));
        name
    }

    /// Merges `other` into this map.
    ///
    /// Colliding names are detected and renamed with the numbered scheme
    /// rather than overwritten.
    pub fn merge(&mut self, other: ParameterMap) {
        for (name, value) in other.entries {
            if self.contains(&name) {
                let base: String = name
                    .trim_end_matches(|c: char| c.is_ascii_digit())
                    .to_string();
                self.add_numbered(&base, value);
            } else {
                self.entries.push((name, value));
            }
        }
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns the parameter names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }
}
