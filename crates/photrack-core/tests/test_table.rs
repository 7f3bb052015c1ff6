use std::path::PathBuf;

use hifitime::Epoch;

use photrack_core::frame::Centroid;
use photrack_core::table::{PhotometryRecord, PhotometryTable};
use photrack_core::tracking::MeasurementStatus;

const HEADER: &str = "frame,object,x,y,aperture_sum,magnitude,radius,sky,peak,status,\
hypothesis_round,timestamp,jd_utc,jd_mid_utc,exposure_s,source";

fn record(frame: usize, object: &str, flux: f64) -> PhotometryRecord {
    PhotometryRecord {
        frame_index: frame,
        object: object.to_string(),
        centroid: Centroid::new(12.5, 40.25),
        aperture_sum: flux,
        magnitude: if flux > 0.0 { 15.0 } else { f64::NAN },
        radius: 5.0,
        sky: 100.0,
        peak: 200.0,
        status: if flux > 0.0 {
            MeasurementStatus::Ok
        } else {
            MeasurementStatus::NegativeFlux
        },
        hypothesis_round: None,
        timestamp: None,
        jd_utc: None,
        jd_mid_utc: None,
        exposure_s: None,
        source: PathBuf::from(format!("frames/f_{frame:03}.fits")),
    }
}

fn to_csv(table: &PhotometryTable) -> String {
    let mut buf = Vec::new();
    table.write_to(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_header_and_row_layout() {
    let mut table = PhotometryTable::new();
    table.push_frame(vec![record(0, "target", 1000.0)]);

    let text = to_csv(&table);
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(HEADER));
    assert_eq!(
        lines.next(),
        Some("0,target,12.5,40.25,1000.0,15.0,5.0,100.0,200.0,ok,,,,,,frames/f_000.fits")
    );
    assert_eq!(lines.next(), None);
}

#[test]
fn test_undefined_magnitude_written_as_nan() {
    let mut table = PhotometryTable::new();
    table.push_frame(vec![record(0, "target", -2500.0)]);

    let text = to_csv(&table);
    let row = text.lines().nth(1).unwrap();
    let fields: Vec<&str> = row.split(',').collect();
    assert_eq!(fields[4], "-2500.0");
    assert_eq!(fields[5], "NaN");
    assert_eq!(fields[9], "negative_flux");
}

#[test]
fn test_time_columns_filled_when_known() {
    let epoch = Epoch::from_gregorian_utc_hms(2024, 5, 1, 3, 4, 5);
    let mut r = record(2, "comp", 500.0);
    r.hypothesis_round = Some(1);
    r.timestamp = Some(epoch);
    r.jd_utc = Some(epoch.to_jde_utc_days());
    r.jd_mid_utc = Some(epoch.to_jde_utc_days() + 0.5);
    r.exposure_s = Some(30.0);

    let mut table = PhotometryTable::new();
    table.push_frame(vec![r]);

    let text = to_csv(&table);
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let row = reader.records().next().unwrap().unwrap();
    assert_eq!(&row[10], "1");
    assert!(row[11].starts_with("2024-05-01T03:04:05"), "{}", &row[11]);
    let jd: f64 = row[12].parse().unwrap();
    assert!((jd - epoch.to_jde_utc_days()).abs() < 1e-9);
    assert_eq!(&row[14], "30.0");
}

#[test]
fn test_frames_group_records() {
    let mut table = PhotometryTable::new();
    table.push_frame(vec![record(0, "a", 1.0), record(0, "b", 2.0)]);
    table.push_frame(vec![record(1, "a", 3.0), record(1, "b", 4.0)]);
    table.push_frame(vec![record(2, "a", 5.0), record(2, "b", 6.0)]);

    assert_eq!(table.len(), 6);
    assert_eq!(table.frame_count(), 3);

    let groups: Vec<Vec<usize>> = table
        .frames()
        .map(|g| g.iter().map(|r| r.frame_index).collect())
        .collect();
    assert_eq!(groups, vec![vec![0, 0], vec![1, 1], vec![2, 2]]);

    let a: Vec<f64> = table.object("a").map(|r| r.aperture_sum).collect();
    assert_eq!(a, vec![1.0, 3.0, 5.0]);
}

#[test]
fn test_write_csv_to_file() {
    let mut table = PhotometryTable::new();
    table.push_frame(vec![record(0, "a", 1.0)]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    table.write_csv(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(HEADER));
    assert_eq!(text.lines().count(), 2);
}
