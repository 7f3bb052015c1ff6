use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotrackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Table write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid FITS file: {0}")]
    InvalidFits(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Missing input: {0}")]
    MissingInput(PathBuf),

    #[error("Malformed coordinate line {line}: {content:?}")]
    MalformedCoordinateLine { line: usize, content: String },

    #[error("No tracked objects in coordinate file")]
    NoTrackedObjects,

    #[error("No complete hypothesis round for all tracked objects")]
    NoHypothesisRounds,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Frame has no pixels")]
    EmptyFrame,

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error(transparent)]
    Track(#[from] TrackError),
}

/// Per-object failure of the centroid search.
///
/// These are recorded on the affected row and never abort a run.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TrackError {
    #[error("Search window at ({x}, {y}) has no usable signal")]
    DegenerateWindow { x: i64, y: i64 },

    #[error("Centroid ({x:.2}, {y:.2}) fell outside the frame")]
    CentroidOffFrame { x: f64, y: f64 },
}

pub type Result<T> = std::result::Result<T, PhotrackError>;
