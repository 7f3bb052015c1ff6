//! Append-only photometry table and its CSV serialization.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use hifitime::Epoch;
use serde::Serialize;

use crate::error::Result;
use crate::frame::Centroid;
use crate::tracking::MeasurementStatus;

/// One object measured in one frame.
#[derive(Clone, Debug)]
pub struct PhotometryRecord {
    pub frame_index: usize,
    pub object: String,
    pub centroid: Centroid,
    pub aperture_sum: f64,
    /// NaN when the aperture sum is not positive.
    pub magnitude: f64,
    pub radius: f64,
    pub sky: f32,
    pub peak: f32,
    pub status: MeasurementStatus,
    pub hypothesis_round: Option<usize>,
    pub timestamp: Option<Epoch>,
    pub jd_utc: Option<f64>,
    pub jd_mid_utc: Option<f64>,
    pub exposure_s: Option<f64>,
    pub source: PathBuf,
}

/// Records of a whole run, grouped by frame in processing order.
#[derive(Clone, Debug, Default)]
pub struct PhotometryTable {
    records: Vec<PhotometryRecord>,
    /// End offset into `records` of each frame group.
    frame_ends: Vec<usize>,
}

impl PhotometryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one frame's records, in object order.
    pub fn push_frame(&mut self, records: Vec<PhotometryRecord>) {
        self.records.extend(records);
        self.frame_ends.push(self.records.len());
    }

    pub fn records(&self) -> &[PhotometryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn frame_count(&self) -> usize {
        self.frame_ends.len()
    }

    /// Per-frame record groups.
    pub fn frames(&self) -> impl Iterator<Item = &[PhotometryRecord]> + '_ {
        let starts = std::iter::once(0).chain(self.frame_ends.iter().copied());
        starts
            .zip(self.frame_ends.iter().copied())
            .map(move |(start, end)| &self.records[start..end])
    }

    /// Records of a single object, in frame order.
    pub fn object<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PhotometryRecord> + 'a {
        self.records.iter().filter(move |r| r.object == name)
    }

    /// Write the table as CSV with a header row.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for record in &self.records {
            csv.serialize(CsvRow::from(record))?;
        }
        csv.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    frame: usize,
    object: &'a str,
    x: f64,
    y: f64,
    aperture_sum: f64,
    magnitude: f64,
    radius: f64,
    sky: f32,
    peak: f32,
    status: MeasurementStatus,
    hypothesis_round: Option<usize>,
    timestamp: Option<String>,
    jd_utc: Option<f64>,
    jd_mid_utc: Option<f64>,
    exposure_s: Option<f64>,
    source: String,
}

impl<'a> From<&'a PhotometryRecord> for CsvRow<'a> {
    fn from(r: &'a PhotometryRecord) -> Self {
        Self {
            frame: r.frame_index,
            object: &r.object,
            x: r.centroid.x,
            y: r.centroid.y,
            aperture_sum: r.aperture_sum,
            magnitude: r.magnitude,
            radius: r.radius,
            sky: r.sky,
            peak: r.peak,
            status: r.status,
            hypothesis_round: r.hypothesis_round,
            timestamp: r.timestamp.map(|t| t.to_string()),
            jd_utc: r.jd_utc,
            jd_mid_utc: r.jd_mid_utc,
            exposure_s: r.exposure_s,
            source: r.source.display().to_string(),
        }
    }
}
