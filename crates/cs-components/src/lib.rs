//! cs-components: configurable solver components and their native boundary.
//!
//! Provides:
//! - `ComponentCore` and the `Component` trait (inventory, lifecycle, property push)
//! - `Output`, the output format and parallel I/O settings
//! - `Sphere`, the mesher bound to a `GeometryKind` with per-geometry launch dispatch
//! - `ProcessorLayout`, the rank decomposition implied by a sphere's properties
//!
//! The native solver is reached only through `EngineHandle` (property sink)
//! and `NativeModule` (launch entry points). Both are borrowed per call and
//! never stored.
//!
//! # Example
//!
//! ```no_run
//! use cs_components::{Component, GeometryComponent, Sphere, NativeModule, EngineFault};
//! use cs_inventory::Overrides;
//!
//! struct Solver;
//!
//! impl NativeModule for Solver {
//!     fn full_sphere_launch(&mut self) -> Result<(), EngineFault> { Ok(()) }
//!     fn regional_sphere_launch(&mut self) -> Result<(), EngineFault> { Ok(()) }
//! }
//!
//! let mut mesher = Sphere::regional().unwrap();
//! let props = mesher.configure(&Overrides::new()).unwrap();
//! assert_eq!(props.get_int("nproc_surf"), Some(1));
//! mesher.launch(&mut Solver).unwrap();
//! ```

pub mod component;
pub mod error;
pub mod layout;
pub mod output;
pub mod sphere;
pub mod traits;

// Re-exports
pub use component::{ComponentCore, Lifecycle, engine_payload};
pub use error::{ComponentError, ComponentResult, StateError};
pub use layout::{ProcLocation, ProcessorLayout};
pub use output::{Output, OutputFormat, output_schema};
pub use sphere::{GeometryKind, Sphere, geometry_schema, sphere_schema};
pub use traits::{
    Component, EngineFault, EngineHandle, EngineProperties, GeometryComponent, NativeModule,
};
