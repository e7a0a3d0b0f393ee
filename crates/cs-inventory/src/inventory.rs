//! Resolved property sets and the per-component inventory that owns them.

use crate::error::ValidationError;
use crate::schema::PropertySchema;
use crate::value::PropertyValue;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Externally supplied raw values, keyed by field name.
pub type Overrides = BTreeMap<String, PropertyValue>;

/// Fully resolved, validated field values in declaration order.
///
/// Immutable once produced; a new set is produced by resolving again.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProperties {
    component: String,
    entries: Vec<(String, PropertyValue)>,
}

impl ResolvedProperties {
    pub(crate) fn new(component: &str, entries: Vec<(String, PropertyValue)>) -> Self {
        Self {
            component: component.to_string(),
            entries,
        }
    }

    /// Name of the component these values were resolved for.
    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PropertyValue::as_int)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PropertyValue::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropertyValue::as_bool)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ResolvedProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A schema bound to a component, plus its resolved values once configured.
#[derive(Debug, Clone)]
pub struct Inventory {
    schema: PropertySchema,
    resolved: Option<ResolvedProperties>,
}

impl Inventory {
    pub fn new(schema: PropertySchema) -> Self {
        Self {
            schema,
            resolved: None,
        }
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    /// Resolve against `overrides` and keep the result.
    ///
    /// On failure any previously resolved values are left untouched.
    pub fn resolve(
        &mut self,
        component: &str,
        overrides: &Overrides,
    ) -> Result<&ResolvedProperties, ValidationError> {
        let resolved = self.schema.resolve(component, overrides)?;
        Ok(&*self.resolved.insert(resolved))
    }

    pub fn resolved(&self) -> Option<&ResolvedProperties> {
        self.resolved.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}
