//! Track-loss detection and single-retry re-acquisition.
//!
//! A frame is measured once from the current seeds. If any object's aperture
//! sum comes back negative, the whole frame is considered lost: the shared
//! hypothesis cursor moves to the next round and every object is measured
//! again from that round's coordinates. The second pass is kept whatever it
//! yields. When no round is left the first pass is kept.
//!
//! A failed centroid search only affects its own row. It is recorded with its
//! status and an undefined sum and does not trigger re-acquisition.

use ndarray::Array2;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::TrackError;
use crate::frame::{Centroid, PixelPosition};
use crate::photometry::{aperture_sums, clamp_position, refine_centroid};
use crate::pipeline::config::PhotometryConfig;

use super::objects::{round_seeds, TrackedObject};

/// Outcome of one object's measurement in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementStatus {
    Ok,
    /// Aperture sum below zero, the track-loss signal.
    NegativeFlux,
    DegenerateWindow,
    CentroidOffFrame,
}

impl MeasurementStatus {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl std::fmt::Display for MeasurementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::NegativeFlux => write!(f, "negative flux"),
            Self::DegenerateWindow => write!(f, "degenerate window"),
            Self::CentroidOffFrame => write!(f, "centroid off frame"),
        }
    }
}

impl From<TrackError> for MeasurementStatus {
    fn from(e: TrackError) -> Self {
        match e {
            TrackError::DegenerateWindow { .. } => Self::DegenerateWindow,
            TrackError::CentroidOffFrame { .. } => Self::CentroidOffFrame,
        }
    }
}

/// One object's centroid, peak, and aperture sum in one frame.
#[derive(Clone, Copy, Debug)]
pub struct ObjectMeasurement {
    pub centroid: Centroid,
    pub peak: f32,
    /// NaN when the centroid search failed.
    pub aperture_sum: f64,
    pub status: MeasurementStatus,
    /// Clamped anchor the search window was cut around.
    pub anchor: PixelPosition,
}

impl ObjectMeasurement {
    /// Position that seeds the next frame's search.
    ///
    /// A failed centroid falls back to the anchor so no NaN is carried forward.
    pub fn next_seed(&self) -> PixelPosition {
        match self.status {
            MeasurementStatus::Ok | MeasurementStatus::NegativeFlux => self.centroid.to_pixel(),
            MeasurementStatus::DegenerateWindow | MeasurementStatus::CentroidOffFrame => {
                self.anchor
            }
        }
    }
}

/// Whether a measurement pass can be kept as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackVerdict {
    Ok,
    /// At least one aperture sum is negative.
    Lost,
}

impl TrackVerdict {
    pub fn of(pass: &[ObjectMeasurement]) -> Self {
        if pass.iter().any(|m| m.aperture_sum < 0.0) {
            Self::Lost
        } else {
            Self::Ok
        }
    }
}

/// Process-wide index of the active hypothesis round.
///
/// Owned by the frame loop. Only moves forward.
#[derive(Clone, Debug)]
pub struct HypothesisCursor {
    index: usize,
    rounds: usize,
}

impl HypothesisCursor {
    pub fn new(rounds: usize) -> Self {
        Self { index: 0, rounds }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Move to the next round; returns it if one is configured.
    pub fn advance(&mut self) -> Option<usize> {
        self.index += 1;
        (self.index < self.rounds).then_some(self.index)
    }
}

/// Result of measuring every object in one frame.
#[derive(Clone, Debug)]
pub struct FrameOutcome {
    /// Kept pass, one entry per object in object order.
    pub measurements: Vec<ObjectMeasurement>,
    /// Hypothesis round the kept pass was seeded from, `None` when seeded
    /// from the previous frame.
    pub round: Option<usize>,
    /// The first pass was declared lost.
    pub lost: bool,
    /// The kept pass came from a fallback round.
    pub reacquired: bool,
}

/// Measure all objects from the given seeds: centroid, then aperture sums.
///
/// Objects whose centroid search failed keep their clamped anchor as position
/// and get no aperture sum.
pub fn measure_pass(
    data: &Array2<f32>,
    seeds: &[PixelPosition],
    config: &PhotometryConfig,
) -> Vec<ObjectMeasurement> {
    let (height, width) = data.dim();
    let offset = config.tracking.search_offset;

    let located: Vec<(Centroid, f32, MeasurementStatus, PixelPosition)> = seeds
        .iter()
        .map(|&seed| match refine_centroid(data, seed, offset) {
            Ok(m) => (m.centroid, m.peak, MeasurementStatus::Ok, m.anchor),
            Err(e) => {
                warn!(seed = %seed, error = %e, "Centroid search failed");
                let (anchor, _) = clamp_position(seed, offset, width, height);
                let peak = if anchor.x >= 0 && anchor.y >= 0 {
                    data.get([anchor.y as usize, anchor.x as usize])
                        .copied()
                        .unwrap_or(f32::NAN)
                } else {
                    f32::NAN
                };
                (Centroid::from(anchor), peak, e.into(), anchor)
            }
        })
        .collect();

    let centers: Vec<Centroid> = located.iter().map(|l| l.0).collect();
    let sums = aperture_sums(data, &centers, config.aperture.radius, config.aperture.method);

    located
        .into_iter()
        .zip(sums)
        .map(|((centroid, peak, status, anchor), sum)| {
            let (aperture_sum, status) = match status {
                MeasurementStatus::Ok if sum < 0.0 => (sum, MeasurementStatus::NegativeFlux),
                MeasurementStatus::Ok => (sum, status),
                _ => (f64::NAN, status),
            };
            ObjectMeasurement {
                centroid,
                peak,
                aperture_sum,
                status,
                anchor,
            }
        })
        .collect()
}

/// Measure one frame with at most one re-acquisition retry.
///
/// `seed_round` tags the pass when `seeds` themselves come from a hypothesis
/// round (the first frame).
pub fn measure_frame(
    data: &Array2<f32>,
    seeds: &[PixelPosition],
    seed_round: Option<usize>,
    objects: &[TrackedObject],
    cursor: &mut HypothesisCursor,
    config: &PhotometryConfig,
) -> FrameOutcome {
    let first = measure_pass(data, seeds, config);

    match TrackVerdict::of(&first) {
        TrackVerdict::Ok => FrameOutcome {
            measurements: first,
            round: seed_round,
            lost: false,
            reacquired: false,
        },
        TrackVerdict::Lost => {
            let fallback = cursor
                .advance()
                .and_then(|round| round_seeds(objects, round).map(|s| (round, s)));
            match fallback {
                Some((round, fallback_seeds)) => {
                    info!(round, "Track lost, re-acquiring from next hypothesis round");
                    let retry = measure_pass(data, &fallback_seeds, config);
                    if TrackVerdict::of(&retry) == TrackVerdict::Lost {
                        warn!(round, "Re-acquisition pass still has negative flux");
                    }
                    FrameOutcome {
                        measurements: retry,
                        round: Some(round),
                        lost: true,
                        reacquired: true,
                    }
                }
                None => {
                    debug!(
                        cursor = cursor.index(),
                        "Track lost with no hypothesis round left, keeping first pass"
                    );
                    FrameOutcome {
                        measurements: first,
                        round: seed_round,
                        lost: true,
                        reacquired: false,
                    }
                }
            }
        }
    }
}
