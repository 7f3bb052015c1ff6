pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{run_directory, run_photometry, run_photometry_reported};
pub use types::{NoOpReporter, PipelineStage, ProgressReporter, RunSummary};
