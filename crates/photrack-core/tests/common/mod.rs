use ndarray::Array2;

use photrack_core::consts::{FITS_BLOCK_SIZE, FITS_CARD_SIZE};
use photrack_core::frame::Frame;

/// Uniform frame of the given value.
pub fn flat(h: usize, w: usize, value: f32) -> Array2<f32> {
    Array2::from_elem((h, w), value)
}

/// Add a sampled 2-D Gaussian of peak `amplitude` centered at `(cx, cy)`.
pub fn add_gaussian(data: &mut Array2<f32>, cx: f64, cy: f64, sigma: f64, amplitude: f64) {
    let (h, w) = data.dim();
    for row in 0..h {
        for col in 0..w {
            let dx = col as f64 - cx;
            let dy = row as f64 - cy;
            let v = amplitude * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
            data[[row, col]] += v as f32;
        }
    }
}

/// Add a symmetric 3x3 source of total flux 1000 centered on `(x, y)`:
/// 200 in the middle, 100 on each of the eight neighbours.
pub fn add_point_source(data: &mut Array2<f32>, x: usize, y: usize) {
    for row in y - 1..=y + 1 {
        for col in x - 1..=x + 1 {
            data[[row, col]] += 100.0;
        }
    }
    data[[y, x]] += 100.0;
}

/// Set a square block to a constant value.
pub fn fill_block(data: &mut Array2<f32>, x: usize, y: usize, half: usize, value: f32) {
    for row in y - half..=y + half {
        for col in x - half..=x + half {
            data[[row, col]] = value;
        }
    }
}

/// Frame on a flat sky of 100 with the 1000-count source at `(x, y)`.
pub fn point_source_frame(h: usize, w: usize, x: usize, y: usize, index: usize) -> Frame {
    let mut data = flat(h, w, 100.0);
    add_point_source(&mut data, x, y);
    let mut frame = Frame::new(data);
    frame.metadata.frame_index = index;
    frame
}

fn card(text: &str) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    assert!(bytes.len() <= FITS_CARD_SIZE, "card too long: {text}");
    bytes.resize(FITS_CARD_SIZE, b' ');
    bytes
}

fn value_card(key: &str, value: &str) -> Vec<u8> {
    card(&format!("{:<8}= {:>20}", key, value))
}

fn pad_to_block(buf: &mut Vec<u8>, fill: u8) {
    let rem = buf.len() % FITS_BLOCK_SIZE;
    if rem != 0 {
        buf.resize(buf.len() + FITS_BLOCK_SIZE - rem, fill);
    }
}

/// Build a FITS file header. `extra` entries are `(keyword, raw value)`,
/// where string values must carry their own quotes.
pub fn build_fits_header(width: usize, height: usize, bitpix: i32, extra: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend(value_card("SIMPLE", "T"));
    buf.extend(value_card("BITPIX", &bitpix.to_string()));
    buf.extend(value_card("NAXIS", "2"));
    buf.extend(value_card("NAXIS1", &width.to_string()));
    buf.extend(value_card("NAXIS2", &height.to_string()));
    for (key, value) in extra {
        buf.extend(value_card(key, value));
    }
    buf.extend(card("END"));
    pad_to_block(&mut buf, b' ');
    buf
}

/// Complete single-precision FITS file for a frame.
pub fn build_fits_f32(data: &Array2<f32>, extra: &[(&str, &str)]) -> Vec<u8> {
    let (h, w) = data.dim();
    let mut buf = build_fits_header(w, h, -32, extra);
    for v in data.iter() {
        buf.extend_from_slice(&v.to_be_bytes());
    }
    pad_to_block(&mut buf, 0);
    buf
}

/// Complete 16-bit unsigned FITS file (BZERO = 32768 convention).
pub fn build_fits_u16(data: &Array2<u16>, extra: &[(&str, &str)]) -> Vec<u8> {
    let (h, w) = data.dim();
    let mut cards: Vec<(&str, &str)> = vec![("BZERO", "32768"), ("BSCALE", "1")];
    cards.extend_from_slice(extra);
    let mut buf = build_fits_header(w, h, 16, &cards);
    for &v in data.iter() {
        let stored = (v as i32 - 32768) as i16;
        buf.extend_from_slice(&stored.to_be_bytes());
    }
    pad_to_block(&mut buf, 0);
    buf
}

/// Write bytes to a path inside a temp dir.
pub fn write_file(dir: &std::path::Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write test file");
    path
}
