use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_APERTURE_RADIUS, DEFAULT_SEARCH_OFFSET};
use crate::error::{PhotrackError, Result};
use crate::photometry::{ApertureMethod, MagnitudeCalibration};

/// One directory of frames to reduce into one table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory of calibrated frames.
    pub frames: PathBuf,
    /// Coordinate-hypothesis file (`name:(x,y)` per line).
    pub coordinates: PathBuf,
    /// Output CSV table.
    pub output: PathBuf,
    #[serde(default)]
    pub photometry: PhotometryConfig,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PhotometryConfig {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub aperture: ApertureConfig,
    #[serde(default)]
    pub calibration: MagnitudeCalibration,
}

impl PhotometryConfig {
    /// Reject settings that cannot produce a measurement.
    pub fn validate(&self) -> Result<()> {
        if self.tracking.search_offset == 0 {
            return Err(PhotrackError::InvalidConfig(
                "search_offset must be at least 1".into(),
            ));
        }
        let radius = self.aperture.radius;
        if !radius.is_finite() || radius < 0.0 {
            return Err(PhotrackError::InvalidConfig(format!(
                "aperture radius must be finite and non-negative, got {radius}"
            )));
        }
        let zero_point = self.calibration.flux_zero_point;
        if !zero_point.is_finite() || zero_point <= 0.0 {
            return Err(PhotrackError::InvalidConfig(format!(
                "flux_zero_point must be finite and positive, got {zero_point}"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Half-width of the centroid search window in pixels.
    #[serde(default = "default_search_offset")]
    pub search_offset: usize,
}

fn default_search_offset() -> usize {
    DEFAULT_SEARCH_OFFSET
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            search_offset: DEFAULT_SEARCH_OFFSET,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApertureConfig {
    /// Aperture radius in pixels.
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default)]
    pub method: ApertureMethod,
}

fn default_radius() -> f64 {
    DEFAULT_APERTURE_RADIUS
}

impl Default for ApertureConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_APERTURE_RADIUS,
            method: ApertureMethod::default(),
        }
    }
}
