//! Progress events emitted while a run is being set up.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingConfig,
    Assembling,
    Configuring,
    CheckingLayout,
    PushingProperties,
    Launching,
    Completed,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::LoadingConfig => "Loading config",
            RunStage::Assembling => "Assembling components",
            RunStage::Configuring => "Configuring",
            RunStage::CheckingLayout => "Checking processor layout",
            RunStage::PushingProperties => "Pushing properties",
            RunStage::Launching => "Launching solver",
            RunStage::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
        }
    }
}
