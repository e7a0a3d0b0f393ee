//! Spherical mesh geometry components and their launch dispatch.
//!
//! A run uses exactly one geometry, chosen when the assembly is built:
//!
//! | Geometry | Forced defaults  | Native entry point       |
//! |----------|------------------|--------------------------|
//! | Full     | none             | `full_sphere_launch`     |
//! | Regional | `nproc_surf = 1` | `regional_sphere_launch` |
//!
//! The regional solver decomposes a single cap, so it only runs with one
//! surface process group. That is expressed as a changed default, not as a
//! hard constraint: an explicit override still goes through ordinary
//! validation.

use crate::component::ComponentCore;
use crate::error::{ComponentError, ComponentResult};
use crate::layout::ProcessorLayout;
use crate::traits::{Component, EngineFault, GeometryComponent, NativeModule};
use core::fmt;
use cs_inventory::{
    FieldType, Overrides, PropertySchema, PropertyValue, ResolvedProperties, SchemaField, SchemaResult,
    Validator,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Closed set of supported mesh geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Full,
    Regional,
}

const FULL_DEFAULTS: &[(&str, i64)] = &[];
const REGIONAL_DEFAULTS: &[(&str, i64)] = &[("nproc_surf", 1)];

impl GeometryKind {
    pub const ALL: [GeometryKind; 2] = [GeometryKind::Full, GeometryKind::Regional];

    /// Default component name for this geometry.
    pub fn component_name(self) -> &'static str {
        match self {
            GeometryKind::Full => "full-sphere",
            GeometryKind::Regional => "regional-sphere",
        }
    }

    fn schema_name(self) -> &'static str {
        match self {
            GeometryKind::Full => "full_sphere",
            GeometryKind::Regional => "regional_sphere",
        }
    }

    /// Inherited fields whose defaults this geometry replaces.
    pub fn forced_defaults(self) -> &'static [(&'static str, i64)] {
        match self {
            GeometryKind::Full => FULL_DEFAULTS,
            GeometryKind::Regional => REGIONAL_DEFAULTS,
        }
    }

    /// Name of the native function `launch` calls for this geometry.
    pub fn entry_point(self) -> &'static str {
        match self {
            GeometryKind::Full => "full_sphere_launch",
            GeometryKind::Regional => "regional_sphere_launch",
        }
    }

    fn invoke(self, module: &mut dyn NativeModule) -> Result<(), EngineFault> {
        match self {
            GeometryKind::Full => module.full_sphere_launch(),
            GeometryKind::Regional => module.regional_sphere_launch(),
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GeometryKind::Full => "full",
            GeometryKind::Regional => "regional",
        })
    }
}

/// Fields shared by every sphere geometry.
pub fn sphere_schema() -> SchemaResult<PropertySchema> {
    let positive_int = |name: &str, default: i64| {
        SchemaField::integer(name, default).with_validator(Validator::Positive)
    };
    let nodes = |name: &str| {
        SchemaField::integer(name, 9)
            .with_validator(Validator::range(Some(2.0), None))
            .with_description("mesh nodes per process along this axis")
    };

    PropertySchema::new("sphere")
        .declare(positive_int("nproc_surf", 12).with_description("number of surface caps"))?
        .declare(positive_int("nprocx", 1))?
        .declare(positive_int("nprocy", 1))?
        .declare(positive_int("nprocz", 1))?
        .declare(
            SchemaField::boolean("coor", false)
                .with_description("read radial coordinates from coor_file"),
        )?
        .declare(SchemaField::string("coor_file", "coor.dat"))?
        .declare(nodes("nodex"))?
        .declare(nodes("nodey"))?
        .declare(nodes("nodez"))?
        .declare(positive_int("levels", 1).with_description("multigrid levels"))?
        .declare(SchemaField::float("radius_outer", 1.0).with_validator(Validator::Positive))?
        .declare(SchemaField::float("radius_inner", 0.55).with_validator(Validator::Positive))?
        .declare(SchemaField::float("theta_min", 1.0708).with_validator(Validator::NonNegative))?
        .declare(SchemaField::float("theta_max", 2.0708).with_validator(Validator::NonNegative))?
        .declare(SchemaField::float("fi_min", 0.0))?
        .declare(SchemaField::float("fi_max", 1.0))
}

/// Sphere schema specialized for `kind`.
pub fn geometry_schema(kind: GeometryKind) -> SchemaResult<PropertySchema> {
    kind.forced_defaults().iter().try_fold(
        PropertySchema::derive(&sphere_schema()?, kind.schema_name()),
        |schema, (field, value)| schema.override_default(field, *value),
    )
}

/// The mesher component of a run, bound to one geometry.
#[derive(Debug, Clone)]
pub struct Sphere {
    core: ComponentCore,
    kind: GeometryKind,
}

impl Sphere {
    pub fn new(kind: GeometryKind) -> ComponentResult<Self> {
        Self::with_name(kind, kind.component_name(), "mesher")
    }

    pub fn full() -> ComponentResult<Self> {
        Self::new(GeometryKind::Full)
    }

    pub fn regional() -> ComponentResult<Self> {
        Self::new(GeometryKind::Regional)
    }

    pub fn with_name(kind: GeometryKind, name: &str, facility: &str) -> ComponentResult<Self> {
        Ok(Self {
            core: ComponentCore::new(name, facility, geometry_schema(kind)?),
            kind,
        })
    }

    /// Process decomposition described by the resolved properties.
    pub fn layout(&self) -> ComponentResult<ProcessorLayout> {
        ProcessorLayout::from_properties(self.core.resolved_or("compute layout of")?)
    }

    fn warn_on_forced_overrides(&self, overrides: &Overrides) {
        for (field, forced) in self.kind.forced_defaults() {
            let differs = overrides
                .get(*field)
                .is_some_and(|v| v.coerce(FieldType::Integer) != Some(PropertyValue::Int(*forced)));
            if differs {
                warn!(
                    component = %self.core.name(),
                    geometry = %self.kind,
                    field,
                    forced,
                    "override replaces a geometry-specific default"
                );
            }
        }
    }
}

impl Component for Sphere {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn configure(&mut self, overrides: &Overrides) -> ComponentResult<&ResolvedProperties> {
        self.warn_on_forced_overrides(overrides);
        self.core.configure(overrides)
    }
}

impl GeometryComponent for Sphere {
    fn geometry(&self) -> GeometryKind {
        self.kind
    }

    fn launch(&mut self, module: &mut dyn NativeModule) -> ComponentResult<()> {
        self.core.begin_launch()?;

        let entry_point = self.kind.entry_point();
        info!(component = %self.core.name(), geometry = %self.kind, entry_point, "launching solver");
        self.kind
            .invoke(module)
            .map_err(|fault| ComponentError::Launch {
                entry_point,
                message: fault.message,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Lifecycle;
    use cs_inventory::FieldOrigin;

    #[derive(Default)]
    struct CountingModule {
        full: usize,
        regional: usize,
        fail: bool,
    }

    impl NativeModule for CountingModule {
        fn full_sphere_launch(&mut self) -> Result<(), EngineFault> {
            self.full += 1;
            if self.fail {
                return Err(EngineFault::new("mesh generation failed"));
            }
            Ok(())
        }

        fn regional_sphere_launch(&mut self) -> Result<(), EngineFault> {
            self.regional += 1;
            Ok(())
        }
    }

    #[test]
    fn full_sphere_keeps_base_defaults() {
        let schema = geometry_schema(GeometryKind::Full).unwrap();
        assert_eq!(schema.parent(), Some("sphere"));
        assert_eq!(
            schema.field("nproc_surf").unwrap().default_value(),
            &PropertyValue::Int(12)
        );
    }

    #[test]
    fn regional_schema_marks_forced_field() {
        let schema = geometry_schema(GeometryKind::Regional).unwrap();
        assert_eq!(
            schema.origin("nproc_surf"),
            Some(&FieldOrigin::DefaultOverridden {
                from: "sphere".into()
            })
        );
        assert_eq!(schema.len(), sphere_schema().unwrap().len());
    }

    #[test]
    fn full_sphere_dispatches_to_full_entry_point() {
        let mut sphere = Sphere::full().unwrap();
        let mut module = CountingModule::default();
        sphere.configure(&Overrides::new()).unwrap();
        sphere.launch(&mut module).unwrap();
        assert_eq!((module.full, module.regional), (1, 0));
        assert_eq!(sphere.state(), Lifecycle::Launched);
    }

    #[test]
    fn failed_launch_cannot_be_retried() {
        let mut sphere = Sphere::full().unwrap();
        let mut module = CountingModule {
            fail: true,
            ..Default::default()
        };
        sphere.configure(&Overrides::new()).unwrap();

        let err = sphere.launch(&mut module).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::Launch {
                entry_point: "full_sphere_launch",
                ..
            }
        ));
        assert!(matches!(
            sphere.launch(&mut module),
            Err(ComponentError::State(_))
        ));
        assert_eq!(module.full, 1);
    }

    #[test]
    fn regional_override_of_forced_field_still_validates() {
        let mut sphere = Sphere::regional().unwrap();

        let mut overrides = Overrides::new();
        overrides.insert("nproc_surf".into(), PropertyValue::Int(2));
        let resolved = sphere.configure(&overrides).unwrap();
        assert_eq!(resolved.get_int("nproc_surf"), Some(2));

        overrides.insert("nproc_surf".into(), PropertyValue::Int(0));
        assert!(matches!(
            sphere.configure(&overrides),
            Err(ComponentError::Validation(_))
        ));
    }

    #[test]
    fn geometry_is_not_a_configurable_field() {
        let sphere = Sphere::regional().unwrap();
        assert!(sphere.inventory().schema().field("geometry").is_none());
        assert_eq!(sphere.facility(), "mesher");
        assert_eq!(sphere.name(), "regional-sphere");
    }
}
