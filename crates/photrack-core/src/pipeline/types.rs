/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Loading,
    Tracking,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading frames"),
            Self::Tracking => write!(f, "Tracking"),
            Self::Writing => write!(f, "Writing table"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Counts reported at the end of a directory run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub frames: usize,
    pub objects: usize,
    pub records: usize,
    /// Frames whose first pass was declared lost.
    pub lost_frames: usize,
    /// Lost frames re-measured from a fallback hypothesis round.
    pub reacquired_frames: usize,
    /// Rows whose magnitude is undefined.
    pub undefined_magnitudes: usize,
    /// Final hypothesis round index.
    pub hypothesis_round: usize,
}
