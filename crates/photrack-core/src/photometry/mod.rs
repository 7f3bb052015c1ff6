pub mod aperture;
pub mod background;
pub mod calibrate;
pub mod centroid;

pub use aperture::{aperture_sum, aperture_sums, ApertureMethod};
pub use background::{estimate_sky, subtract_background};
pub use calibrate::MagnitudeCalibration;
pub use centroid::{clamp_position, refine_centroid, CentroidMeasurement, ClampRule, SearchWindow};
