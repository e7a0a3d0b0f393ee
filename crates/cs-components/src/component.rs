//! Shared component state: identity, owned inventory and lifecycle.

use crate::error::{ComponentError, ComponentResult, StateError};
use crate::traits::{EngineHandle, EngineProperties};
use core::fmt;
use cs_inventory::{Inventory, Overrides, PropertySchema, PropertyValue, ResolvedProperties};
use serde::Serialize;
use tracing::{debug, info};

/// Per-instance lifecycle: `Unconfigured -> Configured -> Launched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Unconfigured,
    Configured,
    Launched,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lifecycle::Unconfigured => "unconfigured",
            Lifecycle::Configured => "configured",
            Lifecycle::Launched => "launched",
        })
    }
}

/// Name, facility, inventory and lifecycle of one component.
#[derive(Debug, Clone)]
pub struct ComponentCore {
    name: String,
    facility: String,
    inventory: Inventory,
    state: Lifecycle,
}

impl ComponentCore {
    pub fn new(name: impl Into<String>, facility: impl Into<String>, schema: PropertySchema) -> Self {
        Self {
            name: name.into(),
            facility: facility.into(),
            inventory: Inventory::new(schema),
            state: Lifecycle::Unconfigured,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn facility(&self) -> &str {
        &self.facility
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Resolve the inventory against `overrides`.
    ///
    /// Allowed before launch. A failed resolve leaves both the state and any
    /// earlier resolved values as they were.
    pub fn configure(&mut self, overrides: &Overrides) -> ComponentResult<&ResolvedProperties> {
        if self.state == Lifecycle::Launched {
            return Err(self.state_error("configure").into());
        }

        let resolved = self.inventory.resolve(&self.name, overrides)?;
        self.state = Lifecycle::Configured;
        info!(
            component = %self.name,
            facility = %self.facility,
            overrides = overrides.len(),
            "component configured"
        );
        Ok(resolved)
    }

    /// Serialize the resolved values and hand them to the engine in one call.
    pub fn push_properties(&self, engine: &mut dyn EngineHandle) -> ComponentResult<()> {
        let resolved = self.resolved_or("push properties of")?;
        let payload = engine_payload(resolved);

        debug!(component = %self.name, fields = payload.len(), "pushing properties");
        engine
            .set_properties(&self.name, &payload)
            .map_err(|fault| ComponentError::EngineConfiguration {
                component: self.name.clone(),
                message: fault.message,
            })?;
        info!(component = %self.name, "properties accepted by engine");
        Ok(())
    }

    /// Resolved values, or a state error naming `operation`.
    pub fn resolved_or(&self, operation: &'static str) -> ComponentResult<&ResolvedProperties> {
        self.inventory
            .resolved()
            .ok_or_else(|| self.state_error(operation).into())
    }

    /// Move `Configured -> Launched`, failing from any other state.
    pub(crate) fn begin_launch(&mut self) -> Result<(), StateError> {
        if self.state != Lifecycle::Configured {
            return Err(self.state_error("launch"));
        }
        self.state = Lifecycle::Launched;
        Ok(())
    }

    fn state_error(&self, operation: &'static str) -> StateError {
        StateError {
            component: self.name.clone(),
            operation,
            state: self.state,
        }
    }
}

/// Flat name-to-scalar map of the resolved values.
pub fn engine_payload(resolved: &ResolvedProperties) -> EngineProperties {
    resolved
        .iter()
        .map(|(name, value)| {
            let json = match value {
                PropertyValue::Bool(b) => serde_json::Value::Bool(*b),
                PropertyValue::Int(n) => serde_json::Value::from(*n),
                PropertyValue::Float(x) => serde_json::Value::from(*x),
                PropertyValue::Str(s) => serde_json::Value::String(s.clone()),
            };
            (name.to_string(), json)
        })
        .collect()
}
