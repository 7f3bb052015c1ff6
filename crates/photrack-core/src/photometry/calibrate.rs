use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FLUX_ZERO_POINT, DEFAULT_MAG_ZERO_POINT};

/// Fixed zero-points mapping aperture flux to a calibrated magnitude.
///
/// Both constants are fit offline and supplied by configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeCalibration {
    /// Flux that maps to `mag_zero_point`.
    #[serde(default = "default_flux_zero_point")]
    pub flux_zero_point: f64,
    #[serde(default = "default_mag_zero_point")]
    pub mag_zero_point: f64,
}

fn default_flux_zero_point() -> f64 {
    DEFAULT_FLUX_ZERO_POINT
}
fn default_mag_zero_point() -> f64 {
    DEFAULT_MAG_ZERO_POINT
}

impl Default for MagnitudeCalibration {
    fn default() -> Self {
        Self {
            flux_zero_point: DEFAULT_FLUX_ZERO_POINT,
            mag_zero_point: DEFAULT_MAG_ZERO_POINT,
        }
    }
}

impl MagnitudeCalibration {
    pub fn new(flux_zero_point: f64, mag_zero_point: f64) -> Self {
        Self {
            flux_zero_point,
            mag_zero_point,
        }
    }

    /// `-2.5 * log10(flux / flux_zero_point) + mag_zero_point`.
    ///
    /// Non-positive flux has no magnitude and yields NaN.
    pub fn magnitude(&self, flux: f64) -> f64 {
        if flux <= 0.0 || !flux.is_finite() {
            return f64::NAN;
        }
        -2.5 * (flux / self.flux_zero_point).log10() + self.mag_zero_point
    }

    /// Inverse of [`magnitude`](Self::magnitude).
    pub fn flux_for_magnitude(&self, magnitude: f64) -> f64 {
        self.flux_zero_point * 10f64.powf((self.mag_zero_point - magnitude) / 2.5)
    }
}
