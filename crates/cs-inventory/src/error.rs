//! Schema declaration and validation errors.

use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while declaring a schema.
///
/// These are programming errors in a component definition and are never
/// recovered from.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Duplicate field '{field}' declared in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    #[error("Invalid default for '{schema}.{field}': {value} ({reason})")]
    InvalidDefault {
        schema: String,
        field: String,
        value: String,
        reason: String,
    },

    #[error("Schema '{schema}' cannot override unknown field '{field}'")]
    UnknownField { schema: String, field: String },

    #[error("Validator '{validator}' cannot judge {field_type} field '{schema}.{field}'")]
    IncompatibleValidator {
        schema: String,
        field: String,
        field_type: &'static str,
        validator: String,
    },
}

/// Errors raised while resolving overrides against a schema.
///
/// The owning component stays unconfigured and the caller may retry with
/// corrected overrides.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Cannot read '{value}' as {expected} for field '{component}.{field}'")]
    Coercion {
        component: String,
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid value: '{component}.{field}' = {value} ({reason})")]
    Rejected {
        component: String,
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown field '{field}' for component '{component}'")]
    UnknownField { component: String, field: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Coercion { field, .. }
            | ValidationError::Rejected { field, .. }
            | ValidationError::UnknownField { field, .. } => field,
        }
    }
}
