//! cs-inventory: declarative property schemas for solver components.
//!
//! Contains:
//! - value (field types, scalar values, coercion of raw input)
//! - validator (choice, sign, range and predicate constraints)
//! - schema (field declarations with parent/child inheritance)
//! - inventory (resolved values owned by a component)
//! - error (schema and validation errors)

pub mod error;
pub mod inventory;
pub mod schema;
pub mod validator;
pub mod value;

pub use error::{SchemaError, SchemaResult, ValidationError};
pub use inventory::{Inventory, Overrides, ResolvedProperties};
pub use schema::{FieldDescription, FieldOrigin, PropertySchema, SchemaField};
pub use validator::Validator;
pub use value::{FieldType, PropertyValue};
