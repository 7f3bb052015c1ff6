use tracing::debug;

use crate::error::Result;
use crate::frame::{Frame, PixelPosition};
use crate::photometry::subtract_background;
use crate::pipeline::config::PhotometryConfig;
use crate::table::PhotometryRecord;

use super::objects::{round_seeds, validate_objects, TrackedObject};
use super::reacquire::{measure_frame, HypothesisCursor};

/// Frame-by-frame tracking state: current positions and the hypothesis cursor.
///
/// Frames must be fed in observation order; each frame's centroids seed the
/// next one.
pub struct TrackingSession {
    objects: Vec<TrackedObject>,
    config: PhotometryConfig,
    positions: Vec<PixelPosition>,
    /// Round the current positions were taken from, until the first frame
    /// replaces them with measured centroids.
    seed_round: Option<usize>,
    cursor: HypothesisCursor,
    frames_seen: usize,
    lost_frames: usize,
    reacquired_frames: usize,
}

impl TrackingSession {
    pub fn new(objects: Vec<TrackedObject>, config: PhotometryConfig) -> Result<Self> {
        config.validate()?;
        let rounds = validate_objects(&objects)?;
        let cursor = HypothesisCursor::new(rounds);
        let positions = round_seeds(&objects, cursor.index()).unwrap_or_default();

        Ok(Self {
            objects,
            config,
            positions,
            seed_round: Some(0),
            cursor,
            frames_seen: 0,
            lost_frames: 0,
            reacquired_frames: 0,
        })
    }

    pub fn objects(&self) -> &[TrackedObject] {
        &self.objects
    }

    /// Anchor positions that will seed the next frame.
    pub fn positions(&self) -> &[PixelPosition] {
        &self.positions
    }

    pub fn cursor(&self) -> &HypothesisCursor {
        &self.cursor
    }

    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    pub fn lost_frames(&self) -> usize {
        self.lost_frames
    }

    pub fn reacquired_frames(&self) -> usize {
        self.reacquired_frames
    }

    /// Subtract the sky, track, measure, calibrate, and record one frame.
    ///
    /// Always yields exactly one record per tracked object.
    pub fn process(&mut self, frame: &Frame) -> Result<Vec<PhotometryRecord>> {
        let (subtracted, sky) = subtract_background(frame)?;

        let outcome = measure_frame(
            &subtracted.data,
            &self.positions,
            self.seed_round,
            &self.objects,
            &mut self.cursor,
            &self.config,
        );

        if outcome.lost {
            self.lost_frames += 1;
        }
        if outcome.reacquired {
            self.reacquired_frames += 1;
        }

        let meta = &frame.metadata;
        let calibration = &self.config.calibration;
        let records: Vec<PhotometryRecord> = self
            .objects
            .iter()
            .zip(&outcome.measurements)
            .map(|(object, m)| PhotometryRecord {
                frame_index: meta.frame_index,
                object: object.name.clone(),
                centroid: m.centroid,
                aperture_sum: m.aperture_sum,
                magnitude: calibration.magnitude(m.aperture_sum),
                radius: self.config.aperture.radius,
                sky,
                peak: m.peak,
                status: m.status,
                hypothesis_round: outcome.round,
                timestamp: meta.timestamp,
                jd_utc: meta.jd_utc(),
                jd_mid_utc: meta.jd_mid_utc(),
                exposure_s: meta.exposure_s,
                source: meta.source.clone(),
            })
            .collect();

        for r in &records {
            debug!(
                frame = r.frame_index,
                object = %r.object,
                x = r.centroid.x,
                y = r.centroid.y,
                flux = r.aperture_sum,
                mag = r.magnitude,
                status = %r.status,
                "Measured"
            );
        }

        self.positions = outcome.measurements.iter().map(|m| m.next_seed()).collect();
        self.seed_round = None;
        self.frames_seen += 1;

        Ok(records)
    }
}
