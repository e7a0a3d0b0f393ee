//! Error types for component operations.

use crate::component::Lifecycle;
use cs_inventory::{SchemaError, ValidationError};
use thiserror::Error;

/// An operation was attempted in a lifecycle state that does not allow it.
///
/// This is a contract violation by the caller and is never retried.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Cannot {operation} component '{component}' while {state}")]
pub struct StateError {
    pub component: String,
    pub operation: &'static str,
    pub state: Lifecycle,
}

/// Errors that can occur while configuring, pushing or launching a component.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Engine rejected properties of '{component}': {message}")]
    EngineConfiguration { component: String, message: String },

    #[error("Native entry point '{entry_point}' failed: {message}")]
    Launch {
        entry_point: &'static str,
        message: String,
    },

    #[error("Processor layout error: {message}")]
    Layout { message: String },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_error_display() {
        let err = StateError {
            component: "regional-sphere".into(),
            operation: "launch",
            state: Lifecycle::Unconfigured,
        };
        let msg = err.to_string();
        assert!(msg.contains("launch"));
        assert!(msg.contains("unconfigured"));
    }

    #[test]
    fn validation_error_conversion() {
        let err: ComponentError = ValidationError::UnknownField {
            component: "output".into(),
            field: "bogus".into(),
        }
        .into();
        assert!(matches!(err, ComponentError::Validation(_)));
        assert!(err.to_string().contains("bogus"));
    }
}
