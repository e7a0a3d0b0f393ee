//! Binding the run's components together and driving them through setup.

use cs_components::{
    Component, EngineHandle, GeometryComponent, GeometryKind, Lifecycle, NativeModule, Output,
    ProcessorLayout, Sphere,
};
use cs_inventory::ResolvedProperties;
use cs_project::{GeometryDef, RunConfig};
use serde::Serialize;
use tracing::info;

use crate::error::{AppError, AppResult};

pub fn geometry_kind(def: GeometryDef) -> GeometryKind {
    match def {
        GeometryDef::Full => GeometryKind::Full,
        GeometryDef::Regional => GeometryKind::Regional,
    }
}

/// Snapshot of one component for reports.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentSummary {
    pub name: String,
    pub facility: String,
    pub state: Lifecycle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResolvedProperties>,
}

impl ComponentSummary {
    fn of(component: &dyn Component) -> Self {
        Self {
            name: component.name().to_string(),
            facility: component.facility().to_string(),
            state: component.state(),
            properties: component.properties().cloned(),
        }
    }
}

/// The components of a single run. The mesher's geometry is fixed when the
/// assembly is built.
#[derive(Debug)]
pub struct Assembly {
    pub output: Output,
    pub mesher: Sphere,
}

impl Assembly {
    pub fn new(geometry: GeometryKind) -> AppResult<Self> {
        Ok(Self {
            output: Output::new()?,
            mesher: Sphere::new(geometry)?,
        })
    }

    pub fn for_config(config: &RunConfig) -> AppResult<Self> {
        Self::new(geometry_kind(config.geometry))
    }

    pub fn geometry(&self) -> GeometryKind {
        self.mesher.geometry()
    }

    pub fn components(&self) -> [&dyn Component; 2] {
        [&self.output, &self.mesher]
    }

    /// Configure every component with its overrides from `config`.
    ///
    /// Every key under `components` must name a component or a facility.
    pub fn configure(&mut self, config: &RunConfig) -> AppResult<()> {
        let keys: Vec<String> = self
            .components()
            .iter()
            .flat_map(|c| [c.name().to_string(), c.facility().to_string()])
            .collect();
        if let Some(unknown) = config.components.keys().find(|k| !keys.contains(k)) {
            let mut known = keys.clone();
            known.sort();
            known.dedup();
            return Err(AppError::UnknownComponent {
                key: unknown.clone(),
                known: known.join(", "),
            });
        }

        configure_one(&mut self.output, config)?;
        configure_one(&mut self.mesher, config)?;
        Ok(())
    }

    pub fn layout(&self) -> AppResult<ProcessorLayout> {
        Ok(self.mesher.layout()?)
    }

    pub fn push_properties(&self, engine: &mut dyn EngineHandle) -> AppResult<()> {
        for component in self.components() {
            component.push_properties(engine)?;
        }
        Ok(())
    }

    pub fn launch(&mut self, module: &mut dyn NativeModule) -> AppResult<()> {
        Ok(self.mesher.launch(module)?)
    }

    pub fn summaries(&self) -> Vec<ComponentSummary> {
        self.components()
            .into_iter()
            .map(ComponentSummary::of)
            .collect()
    }
}

fn configure_one(component: &mut dyn Component, config: &RunConfig) -> AppResult<()> {
    let overrides = config.overrides_for(component.name(), component.facility());
    info!(
        component = component.name(),
        overrides = overrides.len(),
        "configuring component"
    );
    component.configure(&overrides)?;
    Ok(())
}
