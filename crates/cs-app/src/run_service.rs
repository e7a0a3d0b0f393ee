//! Run setup service: configure, check, push and launch.

use std::path::Path;
use std::time::Instant;

use cs_components::{EngineHandle, GeometryKind, NativeModule, ProcessorLayout};
use cs_project::RunConfig;
use serde::Serialize;
use tracing::info;

use crate::assembly::{Assembly, ComponentSummary, geometry_kind};
use crate::config_service;
use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage};

/// Options for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Process count to check the layout against; falls back to the
    /// configuration's `nproc`. No check when neither is set.
    pub nproc: Option<u32>,
}

/// Request to set up and launch a run from a configuration file.
pub struct RunRequest<'a> {
    pub config_path: &'a Path,
    pub options: RunOptions,
}

/// What a completed setup did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub name: String,
    pub geometry: GeometryKind,
    pub entry_point: &'static str,
    pub layout: ProcessorLayout,
    pub components: Vec<ComponentSummary>,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Load the configuration at `request.config_path` and run it.
pub fn run(
    request: &RunRequest,
    engine: &mut dyn EngineHandle,
    module: &mut dyn NativeModule,
) -> AppResult<RunReport> {
    run_with_progress(request, engine, module, None)
}

pub fn run_with_progress(
    request: &RunRequest,
    engine: &mut dyn EngineHandle,
    module: &mut dyn NativeModule,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunReport> {
    let started = Instant::now();
    emit_progress(
        &mut progress_cb,
        RunStage::LoadingConfig,
        started,
        Some(request.config_path.display().to_string()),
    );
    let config = config_service::load_config(request.config_path)?;

    run_config_with_progress(&config, &request.options, engine, module, progress_cb, started)
}

/// Run an already loaded configuration.
pub fn run_config(
    config: &RunConfig,
    options: &RunOptions,
    engine: &mut dyn EngineHandle,
    module: &mut dyn NativeModule,
) -> AppResult<RunReport> {
    run_config_with_progress(config, options, engine, module, None, Instant::now())
}

fn run_config_with_progress(
    config: &RunConfig,
    options: &RunOptions,
    engine: &mut dyn EngineHandle,
    module: &mut dyn NativeModule,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
) -> AppResult<RunReport> {
    emit_progress(
        &mut progress_cb,
        RunStage::Assembling,
        started,
        Some(geometry_kind(config.geometry).component_name().to_string()),
    );
    let mut assembly = Assembly::for_config(config)?;

    emit_progress(&mut progress_cb, RunStage::Configuring, started, None);
    assembly.configure(config)?;

    emit_progress(&mut progress_cb, RunStage::CheckingLayout, started, None);
    let layout = assembly.layout()?;
    if let Some(nproc) = options.nproc.or(config.nproc) {
        layout.check_total(nproc as usize)?;
    }

    emit_progress(&mut progress_cb, RunStage::PushingProperties, started, None);
    assembly.push_properties(engine)?;

    let entry_point = assembly.geometry().entry_point();
    emit_progress(
        &mut progress_cb,
        RunStage::Launching,
        started,
        Some(entry_point.to_string()),
    );
    assembly.launch(module)?;

    emit_progress(&mut progress_cb, RunStage::Completed, started, None);
    info!(
        run = %config.name,
        geometry = %assembly.geometry(),
        processes = layout.total(),
        "run launched"
    );

    Ok(RunReport {
        name: config.name.clone(),
        geometry: assembly.geometry(),
        entry_point,
        layout,
        components: assembly.summaries(),
    })
}
