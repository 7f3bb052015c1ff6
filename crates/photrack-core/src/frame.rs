use hifitime::Epoch;
use ndarray::Array2;
use std::path::PathBuf;

/// A single reduced grayscale frame.
/// Pixel values are raw intensities (counts after calibration), not normalised.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Per-frame metadata
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array2<f32>) -> Self {
        Self {
            data,
            metadata: FrameMetadata::default(),
        }
    }

    pub fn with_metadata(data: Array2<f32>, metadata: FrameMetadata) -> Self {
        Self { data, metadata }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    pub frame_index: usize,
    /// Start of exposure, UTC.
    pub timestamp: Option<Epoch>,
    pub exposure_s: Option<f64>,
    pub source: PathBuf,
}

impl FrameMetadata {
    /// Julian date (UTC) of the exposure start.
    pub fn jd_utc(&self) -> Option<f64> {
        self.timestamp.map(|t| t.to_jde_utc_days())
    }

    /// Julian date (UTC) of mid-exposure, when both time and duration are known.
    pub fn jd_mid_utc(&self) -> Option<f64> {
        let jd = self.jd_utc()?;
        let exposure = self.exposure_s?;
        Some(jd + exposure / 2.0 / crate::consts::SECONDS_PER_DAY)
    }
}

/// Integer pixel coordinate used to anchor a search window.
///
/// Signed so that positions drifting off the frame edge stay representable
/// until they are clamped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelPosition {
    pub x: i64,
    pub y: i64,
}

impl PixelPosition {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for PixelPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Sub-pixel position in global frame coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

impl Centroid {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Truncate toward zero to the pixel that anchors the next search.
    pub fn to_pixel(self) -> PixelPosition {
        PixelPosition::new(self.x.trunc() as i64, self.y.trunc() as i64)
    }
}

impl From<PixelPosition> for Centroid {
    fn from(p: PixelPosition) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}
