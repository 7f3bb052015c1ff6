/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Number of frames decoded simultaneously before they are tracked in order.
/// At 4096x4096 f32, 8 frames = 512 MB.
pub const STREAMING_BATCH_SIZE: usize = 8;

/// Default half-width (pixels) of the centroid search window.
pub const DEFAULT_SEARCH_OFFSET: usize = 10;

/// Default aperture radius in pixels.
pub const DEFAULT_APERTURE_RADIUS: f64 = 5.0;

/// Default flux zero-point. Together with a zero magnitude zero-point this
/// yields instrumental magnitudes.
pub const DEFAULT_FLUX_ZERO_POINT: f64 = 1.0;

/// Default magnitude zero-point.
pub const DEFAULT_MAG_ZERO_POINT: f64 = 0.0;

/// Default sub-pixel split per axis for fractional aperture weighting.
pub const DEFAULT_SUBPIXEL_FACTOR: usize = 5;

/// FITS logical record size in bytes.
pub const FITS_BLOCK_SIZE: usize = 2880;

/// FITS header card size in bytes.
pub const FITS_CARD_SIZE: usize = 80;

/// File extensions recognised as frames, lowercase.
pub const FRAME_EXTENSIONS: &[&str] = &["fits", "fit", "fts", "tif", "tiff", "png"];

/// Seconds per day, used for mid-exposure Julian dates.
pub const SECONDS_PER_DAY: f64 = 86_400.0;
