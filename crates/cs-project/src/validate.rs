//! Structural validation of run configurations.
//!
//! Field-level checks belong to the component schemas; this only rejects
//! files that cannot describe a run at all.

use crate::schema::RunConfig;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version} (latest is {latest})")]
    UnsupportedVersion { version: u32, latest: u32 },
}

pub fn validate_config(config: &RunConfig) -> Result<(), ValidationError> {
    if config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
            latest: LATEST_VERSION,
        });
    }

    if config.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            value: format!("{:?}", config.name),
            reason: "must not be empty".to_string(),
        });
    }

    if config.nproc == Some(0) {
        return Err(ValidationError::InvalidValue {
            field: "nproc".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    for (component, overrides) in &config.components {
        if component.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "components".to_string(),
                value: format!("{component:?}"),
                reason: "component key must not be empty".to_string(),
            });
        }
        if let Some(key) = overrides.keys().find(|k| k.trim().is_empty()) {
            return Err(ValidationError::InvalidValue {
                field: format!("components.{component}"),
                value: format!("{key:?}"),
                reason: "field key must not be empty".to_string(),
            });
        }
    }

    Ok(())
}
