#[allow(dead_code)]
mod common;

use approx::assert_abs_diff_eq;
use hifitime::Epoch;
use ndarray::Array2;

use photrack_core::consts::FITS_BLOCK_SIZE;
use photrack_core::error::PhotrackError;
use photrack_core::io::{load_frame, FitsReader};

fn ramp(h: usize, w: usize) -> Array2<f32> {
    Array2::from_shape_fn((h, w), |(r, c)| (r * 100 + c) as f32 + 0.25)
}

#[test]
fn test_read_f32_frame_with_time_cards() {
    let data = ramp(6, 9);
    let bytes = common::build_fits_f32(
        &data,
        &[
            ("DATE-OBS", "'2024-05-01T03:04:05'"),
            ("EXPTIME", "30.0"),
        ],
    );
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(dir.path(), "f.fits", &bytes);

    let reader = FitsReader::open(&path).unwrap();
    assert_eq!(reader.header.bitpix, -32);
    assert_eq!(reader.header.width(), 9);
    assert_eq!(reader.header.height(), 6);
    assert_eq!(reader.header.header_bytes, FITS_BLOCK_SIZE);

    let frame = reader.read_frame(&path, 4).unwrap();
    assert_eq!(frame.data, data);
    assert_eq!(frame.metadata.frame_index, 4);
    assert_eq!(frame.metadata.source, path);
    assert_eq!(frame.metadata.exposure_s, Some(30.0));

    let expected = Epoch::from_gregorian_utc_hms(2024, 5, 1, 3, 4, 5);
    let jd = frame.metadata.jd_utc().unwrap();
    assert_abs_diff_eq!(jd, expected.to_jde_utc_days(), epsilon = 1e-9);
    assert_abs_diff_eq!(jd, 2_460_431.627_835_648, epsilon = 1e-6);

    let mid = frame.metadata.jd_mid_utc().unwrap();
    assert_abs_diff_eq!((mid - jd) * 86_400.0, 15.0, epsilon = 1e-3);
}

#[test]
fn test_date_and_time_in_separate_cards() {
    let data = ramp(2, 2);
    let bytes = common::build_fits_f32(
        &data,
        &[("DATE-OBS", "'2024-05-01'"), ("TIME-OBS", "'03:04:05'")],
    );
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(dir.path(), "split.fits", &bytes);

    let frame = load_frame(&path, 0).unwrap();
    let expected = Epoch::from_gregorian_utc_hms(2024, 5, 1, 3, 4, 5);
    assert_abs_diff_eq!(
        frame.metadata.jd_utc().unwrap(),
        expected.to_jde_utc_days(),
        epsilon = 1e-9
    );
    // No exposure card, so no mid-exposure time.
    assert_eq!(frame.metadata.exposure_s, None);
    assert_eq!(frame.metadata.jd_mid_utc(), None);
}

#[test]
fn test_missing_or_bad_date_leaves_timestamp_empty() {
    let data = ramp(2, 2);
    let dir = tempfile::tempdir().unwrap();

    let plain = common::write_file(dir.path(), "plain.fits", &common::build_fits_f32(&data, &[]));
    assert!(load_frame(&plain, 0).unwrap().metadata.timestamp.is_none());

    let bad = common::write_file(
        dir.path(),
        "bad.fits",
        &common::build_fits_f32(&data, &[("DATE-OBS", "'yesterday'")]),
    );
    let frame = load_frame(&bad, 0).unwrap();
    assert!(frame.metadata.timestamp.is_none());
    assert_eq!(frame.data, data);
}

#[test]
fn test_read_u16_with_bzero() {
    let data = Array2::from_shape_vec((2, 3), vec![0u16, 1, 1000, 32768, 40000, 65535]).unwrap();
    let bytes = common::build_fits_u16(&data, &[("EXPOSURE", "2.5")]);
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(dir.path(), "u16.fit", &bytes);

    let frame = load_frame(&path, 0).unwrap();
    let expected = data.mapv(|v| v as f32);
    assert_eq!(frame.data, expected);
    assert_eq!(frame.metadata.exposure_s, Some(2.5));
}

#[test]
fn test_header_card_lookup() {
    let data = ramp(2, 2);
    let bytes = common::build_fits_f32(
        &data,
        &[("OBJECT", "'M 1 ''crab'''"), ("GAIN", "1.8 / e-/ADU")],
    );
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(dir.path(), "cards.fits", &bytes);

    let reader = FitsReader::open(&path).unwrap();
    assert_eq!(reader.header.get("OBJECT"), Some("M 1 'crab'"));
    assert_eq!(reader.header.get_f64("GAIN"), Some(1.8));
    assert_eq!(reader.header.get("MISSING"), None);
}

#[test]
fn test_bad_magic_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(dir.path(), "junk.fits", &vec![0u8; FITS_BLOCK_SIZE]);
    assert!(matches!(
        FitsReader::open(&path),
        Err(PhotrackError::InvalidFits(_))
    ));
}

#[test]
fn test_too_small_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(dir.path(), "tiny.fits", b"SIMPLE  =");
    assert!(matches!(
        FitsReader::open(&path),
        Err(PhotrackError::InvalidFits(_))
    ));
}

#[test]
fn test_truncated_data_is_rejected() {
    let header = common::build_fits_header(16, 16, -32, &[]);
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(dir.path(), "short.fits", &header);
    match FitsReader::open(&path) {
        Err(PhotrackError::InvalidFits(msg)) => assert!(msg.contains("truncated"), "{msg}"),
        Err(other) => panic!("expected InvalidFits, got {other:?}"),
        Ok(_) => panic!("expected InvalidFits, got a reader"),
    }
}

#[test]
fn test_unsupported_bitpix_is_rejected() {
    let mut bytes = common::build_fits_header(2, 2, 12, &[]);
    bytes.extend(vec![0u8; FITS_BLOCK_SIZE]);
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(dir.path(), "bitpix.fits", &bytes);
    assert!(matches!(
        FitsReader::open(&path),
        Err(PhotrackError::InvalidFits(_))
    ));
}

#[test]
fn test_oversized_axes_are_rejected() {
    let header = common::build_fits_header(4_294_967_296, 4_294_967_296, -32, &[]);
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(dir.path(), "huge.fits", &header);
    match FitsReader::open(&path) {
        Err(PhotrackError::InvalidFits(msg)) => assert!(msg.contains("overflows"), "{msg}"),
        Err(other) => panic!("expected InvalidFits, got {other:?}"),
        Ok(_) => panic!("expected InvalidFits, got a reader"),
    }
}
