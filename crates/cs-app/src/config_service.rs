//! Configuration loading, resolution previews and schema introspection.

use std::path::Path;

use cs_components::{GeometryKind, geometry_schema, output_schema};
use cs_inventory::FieldDescription;
use cs_project::RunConfig;

use crate::assembly::{Assembly, ComponentSummary};
use crate::error::{AppError, AppResult};

/// Load and structurally validate a run configuration (YAML or JSON).
pub fn load_config(path: &Path) -> AppResult<RunConfig> {
    cs_project::load(path).map_err(|source| AppError::ConfigLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the assembly for `config` and configure every component.
pub fn configure_assembly(config: &RunConfig) -> AppResult<Assembly> {
    let mut assembly = Assembly::for_config(config)?;
    assembly.configure(config)?;
    Ok(assembly)
}

/// Configure every component without touching an engine.
pub fn resolve_config(config: &RunConfig) -> AppResult<Vec<ComponentSummary>> {
    Ok(configure_assembly(config)?.summaries())
}

/// Names accepted by [`describe_schema`].
pub fn schema_names() -> Vec<&'static str> {
    let mut names = vec!["output"];
    names.extend(GeometryKind::ALL.map(GeometryKind::component_name));
    names
}

/// Field listing for a component by name.
pub fn describe_schema(component: &str) -> AppResult<Vec<FieldDescription>> {
    if component == "output" {
        return Ok(output_schema()?.describe());
    }
    let kind = GeometryKind::ALL
        .into_iter()
        .find(|k| k.component_name() == component)
        .ok_or_else(|| AppError::UnknownSchema(component.to_string()))?;
    Ok(geometry_schema(kind)?.describe())
}
