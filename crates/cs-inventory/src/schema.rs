//! Property schema declarations with parent/child inheritance.

use crate::error::{SchemaError, SchemaResult, ValidationError};
use crate::inventory::{Overrides, ResolvedProperties};
use crate::validator::Validator;
use crate::value::{FieldType, PropertyValue};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// A single declared configuration field.
#[derive(Debug, Clone)]
pub struct SchemaField {
    name: String,
    field_type: FieldType,
    default: PropertyValue,
    validator: Option<Validator>,
    description: Option<String>,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, field_type: FieldType, default: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: default.into(),
            validator: None,
            description: None,
        }
    }

    pub fn string(name: impl Into<String>, default: &str) -> Self {
        Self::new(name, FieldType::String, default)
    }

    pub fn integer(name: impl Into<String>, default: i64) -> Self {
        Self::new(name, FieldType::Integer, default)
    }

    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::new(name, FieldType::Float, default)
    }

    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, FieldType::Boolean, default)
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn default_value(&self) -> &PropertyValue {
        &self.default
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Coerce `raw` to this field's type and run the validator.
    fn admit(&self, raw: &PropertyValue) -> Result<PropertyValue, AdmitError> {
        let value = raw.coerce(self.field_type).ok_or(AdmitError::Coercion)?;
        if let Some(validator) = &self.validator {
            validator.check(&value).map_err(AdmitError::Rejected)?;
        }
        Ok(value)
    }
}

enum AdmitError {
    Coercion,
    Rejected(String),
}

/// Where a field of a derived schema came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldOrigin {
    /// Declared by this schema.
    Local,
    /// Taken unchanged from an ancestor.
    Inherited { from: String },
    /// Fully redeclared here, replacing an ancestor's declaration.
    Redeclared { from: String },
    /// Ancestor's type and validator kept, default replaced here.
    DefaultOverridden { from: String },
}

#[derive(Debug, Clone)]
struct Entry {
    field: SchemaField,
    origin: FieldOrigin,
}

/// Serializable summary of one field, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub default: PropertyValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub origin: FieldOrigin,
}

/// An ordered set of declared fields.
///
/// A derived schema starts with every field of its parent. Declarations
/// made on the derived schema replace inherited ones of the same name in
/// place, so field order is stable: ancestor fields first, then local
/// additions in declaration order.
#[derive(Debug, Clone)]
pub struct PropertySchema {
    name: String,
    parent: Option<String>,
    entries: Vec<Entry>,
    local: HashSet<String>,
}

impl PropertySchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            entries: Vec::new(),
            local: HashSet::new(),
        }
    }

    /// Start a schema that inherits every field of `parent`.
    pub fn derive(parent: &PropertySchema, name: impl Into<String>) -> Self {
        let entries = parent
            .entries
            .iter()
            .map(|e| Entry {
                field: e.field.clone(),
                origin: FieldOrigin::Inherited {
                    from: parent.name.clone(),
                },
            })
            .collect();

        Self {
            name: name.into(),
            parent: Some(parent.name.clone()),
            entries,
            local: HashSet::new(),
        }
    }

    /// Declare a field on this schema.
    ///
    /// Redeclaring an inherited field replaces it entirely. Declaring the same
    /// name twice on this schema is an error, as is a default that cannot be
    /// read as the field's type or fails its validator.
    pub fn declare(mut self, field: SchemaField) -> SchemaResult<Self> {
        self.claim(&field.name)?;

        if let Some(validator) = field
            .validator
            .as_ref()
            .filter(|v| !v.applies_to(field.field_type))
        {
            return Err(SchemaError::IncompatibleValidator {
                schema: self.name.clone(),
                field: field.name.clone(),
                field_type: field.field_type.type_name(),
                validator: validator.describe(),
            });
        }

        let default = self.checked_default(&field, &field.default)?;
        let field = SchemaField { default, ..field };

        match self.position(&field.name) {
            Some(idx) => {
                let from = self.parent_name();
                self.entries[idx] = Entry {
                    field,
                    origin: FieldOrigin::Redeclared { from },
                };
            }
            None => self.entries.push(Entry {
                field,
                origin: FieldOrigin::Local,
            }),
        }
        Ok(self)
    }

    /// Replace only the default of an inherited field.
    ///
    /// The inherited type and validator stay in force and the new default
    /// must satisfy them.
    pub fn override_default(
        mut self,
        name: &str,
        default: impl Into<PropertyValue>,
    ) -> SchemaResult<Self> {
        let Some(idx) = self.position(name) else {
            return Err(SchemaError::UnknownField {
                schema: self.name.clone(),
                field: name.to_string(),
            });
        };
        self.claim(name)?;

        let default = default.into();
        let default = self.checked_default(&self.entries[idx].field, &default)?;
        let from = self.parent_name();
        let entry = &mut self.entries[idx];
        entry.field.default = default;
        entry.origin = FieldOrigin::DefaultOverridden { from };
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.entries.iter().find(|e| e.field.name == name).map(|e| &e.field)
    }

    pub fn origin(&self, name: &str) -> Option<&FieldOrigin> {
        self.entries.iter().find(|e| e.field.name == name).map(|e| &e.origin)
    }

    pub fn fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.entries.iter().map(|e| &e.field)
    }

    pub fn describe(&self) -> Vec<FieldDescription> {
        self.entries
            .iter()
            .map(|e| FieldDescription {
                name: e.field.name.clone(),
                field_type: e.field.field_type,
                default: e.field.default.clone(),
                validator: e.field.validator.as_ref().map(Validator::describe),
                description: e.field.description.clone(),
                origin: e.origin.clone(),
            })
            .collect()
    }

    /// Resolve every declared field against `overrides`.
    ///
    /// Each field takes its override when present, else its default; the
    /// value is coerced to the field type and validated. Keys that name no
    /// declared field are rejected. `component` only labels errors.
    pub fn resolve(
        &self,
        component: &str,
        overrides: &Overrides,
    ) -> Result<ResolvedProperties, ValidationError> {
        if let Some(unknown) = overrides.keys().find(|k| self.position(k).is_none()) {
            return Err(ValidationError::UnknownField {
                component: component.to_string(),
                field: unknown.clone(),
            });
        }

        let mut entries = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let field = &entry.field;
            let (raw, source) = match overrides.get(&field.name) {
                Some(v) => (v, "override"),
                None => (&field.default, "default"),
            };

            let value = field.admit(raw).map_err(|e| match e {
                AdmitError::Coercion => ValidationError::Coercion {
                    component: component.to_string(),
                    field: field.name.clone(),
                    value: raw.to_string(),
                    expected: field.field_type.type_name(),
                },
                AdmitError::Rejected(reason) => ValidationError::Rejected {
                    component: component.to_string(),
                    field: field.name.clone(),
                    value: raw.to_string(),
                    reason,
                },
            })?;

            debug!(component, field = %field.name, value = %value, source, "resolved field");
            entries.push((field.name.clone(), value));
        }

        Ok(ResolvedProperties::new(component, entries))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.field.name == name)
    }

    fn parent_name(&self) -> String {
        self.parent.clone().unwrap_or_default()
    }

    fn claim(&mut self, name: &str) -> SchemaResult<()> {
        if !self.local.insert(name.to_string()) {
            return Err(SchemaError::DuplicateField {
                schema: self.name.clone(),
                field: name.to_string(),
            });
        }
        Ok(())
    }

    fn checked_default(
        &self,
        field: &SchemaField,
        default: &PropertyValue,
    ) -> SchemaResult<PropertyValue> {
        field.admit(default).map_err(|e| SchemaError::InvalidDefault {
            schema: self.name.clone(),
            field: field.name.clone(),
            value: default.to_string(),
            reason: match e {
                AdmitError::Coercion => format!("not a valid {}", field.field_type),
                AdmitError::Rejected(reason) => reason,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PropertySchema {
        PropertySchema::new("sphere")
            .declare(SchemaField::integer("nproc_surf", 12).with_validator(Validator::Positive))
            .unwrap()
            .declare(SchemaField::integer("nprocx", 1))
            .unwrap()
    }

    #[test]
    fn duplicate_local_declaration_fails() {
        let err = base()
            .declare(SchemaField::integer("nprocx", 2))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn default_must_satisfy_validator() {
        let err = PropertySchema::new("output")
            .declare(
                SchemaField::string("output_format", "json")
                    .with_validator(Validator::choice(["ascii", "hdf5"])),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefault { .. }));
    }

    #[test]
    fn validator_must_fit_type() {
        let err = PropertySchema::new("output")
            .declare(SchemaField::boolean("flag", true).with_validator(Validator::Positive))
            .unwrap_err();
        assert!(matches!(err, SchemaError::IncompatibleValidator { .. }));
    }

    #[test]
    fn derived_redeclaration_replaces_in_place() {
        let child = PropertySchema::derive(&base(), "regional")
            .declare(SchemaField::float("nprocx", 2.0))
            .unwrap();
        assert_eq!(child.len(), 2);
        let names: Vec<&str> = child.fields().map(SchemaField::name).collect();
        assert_eq!(names, ["nproc_surf", "nprocx"]);
        assert_eq!(child.field("nprocx").unwrap().field_type(), FieldType::Float);
        assert_eq!(
            child.origin("nprocx"),
            Some(&FieldOrigin::Redeclared {
                from: "sphere".into()
            })
        );
    }

    #[test]
    fn override_default_keeps_validator() {
        let child = PropertySchema::derive(&base(), "regional")
            .override_default("nproc_surf", 1_i64)
            .unwrap();
        let field = child.field("nproc_surf").unwrap();
        assert_eq!(field.default_value(), &PropertyValue::Int(1));
        assert!(field.validator().is_some());

        let err = PropertySchema::derive(&base(), "regional")
            .override_default("nproc_surf", 0_i64)
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefault { .. }));
    }

    #[test]
    fn override_default_of_unknown_field_fails() {
        let err = PropertySchema::derive(&base(), "regional")
            .override_default("nodex", 17_i64)
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField { .. }));
    }

    #[test]
    fn resolve_rejects_unknown_override() {
        let mut overrides = Overrides::new();
        overrides.insert("nodez".into(), PropertyValue::Int(33));
        let err = base().resolve("mesher", &overrides).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownField {
                component: "mesher".into(),
                field: "nodez".into()
            }
        );
    }

    #[test]
    fn resolve_reports_coercion_failure() {
        let mut overrides = Overrides::new();
        overrides.insert("nprocx".into(), PropertyValue::from("two"));
        let err = base().resolve("mesher", &overrides).unwrap_err();
        assert!(matches!(err, ValidationError::Coercion { expected: "integer", .. }));
        assert_eq!(err.field(), "nprocx");
    }
}
