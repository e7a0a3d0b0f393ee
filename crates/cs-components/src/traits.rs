//! Boundary traits for the native solver and the shared component trait.

use crate::component::{ComponentCore, Lifecycle};
use crate::error::ComponentResult;
use crate::sphere::GeometryKind;
use cs_inventory::{Inventory, Overrides, ResolvedProperties};
use thiserror::Error;

/// Property payload handed to the engine: field name to scalar.
pub type EngineProperties = serde_json::Map<String, serde_json::Value>;

/// Failure reported by the native side. Its cause is opaque to this layer.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct EngineFault {
    pub message: String,
}

impl EngineFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Sink for validated component properties in the native engine's runtime state.
///
/// Implementations are owned elsewhere and outlive every component that
/// pushes into them; components only borrow them for the duration of a call.
pub trait EngineHandle {
    /// Store `properties` under `section` (the component name).
    fn set_properties(
        &mut self,
        section: &str,
        properties: &EngineProperties,
    ) -> Result<(), EngineFault>;
}

/// Launch entry points exported by the native solver module.
///
/// One method per geometry; each starts a solver run and must not be called
/// twice against the same runtime state.
pub trait NativeModule {
    fn full_sphere_launch(&mut self) -> Result<(), EngineFault>;

    fn regional_sphere_launch(&mut self) -> Result<(), EngineFault>;
}

/// A named, facility-tagged unit owning an inventory.
///
/// Implementors only provide access to their [`ComponentCore`]; the
/// lifecycle operations are shared.
pub trait Component {
    fn core(&self) -> &ComponentCore;

    fn core_mut(&mut self) -> &mut ComponentCore;

    /// Component name, used as the engine section and configuration key.
    fn name(&self) -> &str {
        self.core().name()
    }

    /// Role tag binding this component into a larger assembly.
    fn facility(&self) -> &str {
        self.core().facility()
    }

    fn state(&self) -> Lifecycle {
        self.core().state()
    }

    fn inventory(&self) -> &Inventory {
        self.core().inventory()
    }

    /// Resolved properties, if configured.
    fn properties(&self) -> Option<&ResolvedProperties> {
        self.core().inventory().resolved()
    }

    /// Resolve the inventory against `overrides`.
    fn configure(&mut self, overrides: &Overrides) -> ComponentResult<&ResolvedProperties> {
        self.core_mut().configure(overrides)
    }

    /// Push resolved properties into the engine.
    fn push_properties(&self, engine: &mut dyn EngineHandle) -> ComponentResult<()> {
        self.core().push_properties(engine)
    }
}

/// A component that selects the mesh geometry and starts the solver.
pub trait GeometryComponent: Component {
    fn geometry(&self) -> GeometryKind;

    /// Invoke this geometry's native entry point. Allowed exactly once, after
    /// configuration.
    fn launch(&mut self, module: &mut dyn NativeModule) -> ComponentResult<()>;
}
