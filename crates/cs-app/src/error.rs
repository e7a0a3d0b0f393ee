//! Error types for the cs-app service layer.

use cs_components::ComponentError;
use std::path::PathBuf;

/// Application error type shared by the CLI and any other front end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to load run configuration {}: {source}", .path.display())]
    ConfigLoad {
        path: PathBuf,
        source: cs_project::ProjectError,
    },

    #[error("Unknown component '{key}' in configuration (known: {known})")]
    UnknownComponent { key: String, known: String },

    #[error("No component schema named '{0}' (known: output, full-sphere, regional-sphere)")]
    UnknownSchema(String),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for cs-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<cs_inventory::SchemaError> for AppError {
    fn from(err: cs_inventory::SchemaError) -> Self {
        AppError::Component(err.into())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
