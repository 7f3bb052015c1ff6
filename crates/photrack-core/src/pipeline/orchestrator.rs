use std::sync::Arc;

use tracing::info;

use crate::error::{PhotrackError, Result};
use crate::frame::Frame;
use crate::io::{load_coordinates, FrameSequence};
use crate::table::PhotometryTable;
use crate::tracking::{TrackedObject, TrackingSession};

use super::config::{PhotometryConfig, RunConfig};
use super::types::{NoOpReporter, PipelineStage, ProgressReporter, RunSummary};

/// Track and measure every object through an ordered frame sequence.
///
/// Frames are committed to the session strictly in iteration order. A frame
/// that fails to load aborts the run; per-object tracking failures are
/// recorded and processing continues.
pub fn run_photometry_reported<I>(
    frames: I,
    objects: Vec<TrackedObject>,
    config: &PhotometryConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<(PhotometryTable, RunSummary)>
where
    I: IntoIterator<Item = Result<Frame>>,
{
    let mut session = TrackingSession::new(objects, config.clone())?;
    let mut table = PhotometryTable::new();

    reporter.begin_stage(PipelineStage::Tracking, None);
    for frame in frames {
        let frame = frame?;
        let records = session.process(&frame)?;
        table.push_frame(records);
        reporter.advance(session.frames_seen());
    }
    reporter.finish_stage();

    if table.frame_count() == 0 {
        return Err(PhotrackError::EmptySequence);
    }

    let summary = RunSummary {
        frames: session.frames_seen(),
        objects: session.objects().len(),
        records: table.len(),
        lost_frames: session.lost_frames(),
        reacquired_frames: session.reacquired_frames(),
        undefined_magnitudes: table
            .records()
            .iter()
            .filter(|r| r.magnitude.is_nan())
            .count(),
        hypothesis_round: session.cursor().index(),
    };
    info!(
        frames = summary.frames,
        records = summary.records,
        lost = summary.lost_frames,
        reacquired = summary.reacquired_frames,
        "Photometry complete"
    );
    Ok((table, summary))
}

/// Track and measure every object through an ordered frame sequence.
pub fn run_photometry<I>(
    frames: I,
    objects: Vec<TrackedObject>,
    config: &PhotometryConfig,
) -> Result<PhotometryTable>
where
    I: IntoIterator<Item = Result<Frame>>,
{
    let reporter = Arc::new(NoOpReporter);
    run_photometry_reported(frames, objects, config, reporter).map(|(table, _)| table)
}

/// Reduce one directory of frames into one CSV table.
///
/// The table is written once, after every frame has been measured.
pub fn run_directory(
    config: &RunConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<RunSummary> {
    if !config.frames.is_dir() {
        return Err(PhotrackError::MissingInput(config.frames.clone()));
    }
    let objects = load_coordinates(&config.coordinates)?;

    reporter.begin_stage(PipelineStage::Loading, None);
    let sequence = FrameSequence::open(&config.frames)?;
    reporter.finish_stage();
    info!(
        frames = sequence.len(),
        objects = objects.len(),
        dir = %config.frames.display(),
        "Processing directory"
    );

    let total = sequence.len();
    let tracking_reporter = Arc::new(StageSized {
        inner: reporter.clone(),
        total,
    });
    let (table, summary) =
        run_photometry_reported(sequence, objects, &config.photometry, tracking_reporter)?;

    reporter.begin_stage(PipelineStage::Writing, None);
    table.write_csv(&config.output)?;
    reporter.finish_stage();
    info!(output = %config.output.display(), "Table written");

    Ok(summary)
}

/// Forwards to another reporter, filling in a known item count.
struct StageSized {
    inner: Arc<dyn ProgressReporter>,
    total: usize,
}

impl ProgressReporter for StageSized {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.inner
            .begin_stage(stage, total_items.or(Some(self.total)));
    }

    fn advance(&self, items_done: usize) {
        self.inner.advance(items_done);
    }

    fn finish_stage(&self) {
        self.inner.finish_stage();
    }
}
