//! Shared application service layer for solver run setup.
//!
//! Centralizes configuration loading, component assembly, layout checks,
//! property pushes and launch so front ends only deal with requests and
//! reports.

pub mod assembly;
pub mod config_service;
pub mod dry_run;
pub mod error;
pub mod progress;
pub mod run_service;

// Re-export key types for convenience
pub use assembly::{Assembly, ComponentSummary, geometry_kind};
pub use config_service::{
    configure_assembly, describe_schema, load_config, resolve_config, schema_names,
};
pub use dry_run::{DryRunEngine, PushRecord};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage};
pub use run_service::{
    RunOptions, RunReport, RunRequest, run, run_config, run_with_progress,
};
