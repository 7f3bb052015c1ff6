#[allow(dead_code)]
mod common;

use ndarray::Array2;

use photrack_core::error::PhotrackError;
use photrack_core::frame::Frame;
use photrack_core::io::image_io::{load_image, save_tiff};
use photrack_core::io::sequence::is_frame_file;
use photrack_core::io::{list_frames, load_frame, FrameSequence};

#[test]
fn test_tiff_keeps_raw_counts() {
    let data = Array2::from_shape_vec((2, 3), vec![0.0f32, 1234.0, 65535.0, 70000.0, -5.0, 12.4])
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.tiff");

    save_tiff(&Frame::new(data), &path).unwrap();
    let loaded = load_image(&path, 3).unwrap();

    assert_eq!(loaded.width(), 3);
    assert_eq!(loaded.height(), 2);
    let values: Vec<f32> = loaded.data.iter().copied().collect();
    assert_eq!(values, [0.0, 1234.0, 65535.0, 65535.0, 0.0, 12.0]);
    assert_eq!(loaded.metadata.frame_index, 3);
    assert!(loaded.metadata.timestamp.is_none());
    assert!(loaded.metadata.exposure_s.is_none());
}

#[test]
fn test_png_8bit_keeps_raw_counts() {
    let img = image::GrayImage::from_fn(4, 2, |x, y| image::Luma([(x * 10 + y * 100) as u8]));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("g.png");
    img.save(&path).unwrap();

    let frame = load_frame(&path, 0).unwrap();
    assert_eq!(frame.data[[0, 3]], 30.0);
    assert_eq!(frame.data[[1, 2]], 120.0);
}

#[test]
fn test_frame_extensions() {
    use std::path::Path;
    assert!(is_frame_file(Path::new("a.fits")));
    assert!(is_frame_file(Path::new("a.FIT")));
    assert!(is_frame_file(Path::new("a.fts")));
    assert!(is_frame_file(Path::new("a.tif")));
    assert!(is_frame_file(Path::new("a.png")));
    assert!(!is_frame_file(Path::new("a.txt")));
    assert!(!is_frame_file(Path::new("fits")));
}

#[test]
fn test_list_frames_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    let frame = common::build_fits_f32(&common::flat(2, 2, 1.0), &[]);
    for name in ["b_002.fits", "a_010.fits", "a_002.fits"] {
        common::write_file(dir.path(), name, &frame);
    }
    common::write_file(dir.path(), "notes.txt", b"not a frame");
    std::fs::create_dir(dir.path().join("sub.fits")).unwrap();

    let paths = list_frames(dir.path()).unwrap();
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a_002.fits", "a_010.fits", "b_002.fits"]);
}

#[test]
fn test_list_frames_missing_dir() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone");
    assert!(matches!(
        list_frames(&missing),
        Err(PhotrackError::MissingInput(_))
    ));
}

#[test]
fn test_list_frames_without_frames() {
    let dir = tempfile::tempdir().unwrap();
    common::write_file(dir.path(), "readme.md", b"#");
    assert!(matches!(
        list_frames(dir.path()),
        Err(PhotrackError::EmptySequence)
    ));
}

#[test]
fn test_sequence_yields_frames_in_order_across_batches() {
    let dir = tempfile::tempdir().unwrap();
    let count = 19;
    for i in 0..count {
        let frame = Frame::new(common::flat(4, 5, (i * 10 + 1) as f32));
        save_tiff(&frame, &dir.path().join(format!("frame_{i:03}.tiff"))).unwrap();
    }

    let sequence = FrameSequence::open(dir.path()).unwrap();
    assert_eq!(sequence.len(), count);

    let frames: Vec<Frame> = sequence.map(|f| f.unwrap()).collect();
    assert_eq!(frames.len(), count);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.metadata.frame_index, i);
        assert_eq!(frame.data[[0, 0]], (i * 10 + 1) as f32);
        assert_eq!(
            frame.metadata.source.file_name().unwrap().to_string_lossy(),
            format!("frame_{i:03}.tiff")
        );
    }
}

#[test]
fn test_sequence_surfaces_decode_errors_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let good = common::build_fits_f32(&common::flat(2, 2, 5.0), &[]);
    common::write_file(dir.path(), "0.fits", &good);
    common::write_file(dir.path(), "1.fits", b"garbage");
    common::write_file(dir.path(), "2.fits", &good);

    let results: Vec<_> = FrameSequence::open(dir.path()).unwrap().collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
}
