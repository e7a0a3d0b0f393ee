//! In-process stand-in for the native solver.
//!
//! Records every property push and launch and logs them, without starting
//! anything. Used by the CLI and by tests in place of the real engine.

use cs_components::{EngineFault, EngineHandle, EngineProperties, NativeModule};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct DryRunEngine {
    pushes: Vec<PushRecord>,
    launches: Vec<&'static str>,
    /// Sections whose pushes are refused, to exercise error paths.
    reject_sections: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PushRecord {
    pub section: String,
    pub properties: EngineProperties,
}

impl DryRunEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse pushes for `section`.
    pub fn rejecting(mut self, section: impl Into<String>) -> Self {
        self.reject_sections.push(section.into());
        self
    }

    pub fn pushes(&self) -> &[PushRecord] {
        &self.pushes
    }

    pub fn launches(&self) -> &[&'static str] {
        &self.launches
    }

    fn record_launch(&mut self, entry_point: &'static str) -> Result<(), EngineFault> {
        info!(entry_point, "dry run: solver launch skipped");
        self.launches.push(entry_point);
        Ok(())
    }
}

impl EngineHandle for DryRunEngine {
    fn set_properties(
        &mut self,
        section: &str,
        properties: &EngineProperties,
    ) -> Result<(), EngineFault> {
        if self.reject_sections.iter().any(|s| s == section) {
            return Err(EngineFault::new(format!("section '{section}' refused")));
        }
        info!(section, fields = properties.len(), "dry run: properties received");
        self.pushes.push(PushRecord {
            section: section.to_string(),
            properties: properties.clone(),
        });
        Ok(())
    }
}

impl NativeModule for DryRunEngine {
    fn full_sphere_launch(&mut self) -> Result<(), EngineFault> {
        self.record_launch("full_sphere_launch")
    }

    fn regional_sphere_launch(&mut self) -> Result<(), EngineFault> {
        self.record_launch("regional_sphere_launch")
    }
}
