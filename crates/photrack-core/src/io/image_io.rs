use std::path::Path;

use image::DynamicImage;
use ndarray::Array2;

use crate::error::Result;
use crate::frame::{Frame, FrameMetadata};

/// Load a grayscale TIFF/PNG frame, keeping raw pixel counts.
///
/// Mono 8- and 16-bit images keep their stored values; anything else is
/// converted to 16-bit luminance first. These formats carry no exposure
/// metadata, so timestamp and exposure are left empty.
pub fn load_image(path: &Path, index: usize) -> Result<Frame> {
    let img = image::open(path)?;
    let data = match img {
        DynamicImage::ImageLuma8(gray) => {
            let (w, h) = gray.dimensions();
            Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
                gray.get_pixel(col as u32, row as u32).0[0] as f32
            })
        }
        other => {
            let gray = other.to_luma16();
            let (w, h) = gray.dimensions();
            Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
                gray.get_pixel(col as u32, row as u32).0[0] as f32
            })
        }
    };

    let metadata = FrameMetadata {
        frame_index: index,
        timestamp: None,
        exposure_s: None,
        source: path.to_path_buf(),
    };
    Ok(Frame::with_metadata(data, metadata))
}

/// Save a frame as 16-bit grayscale TIFF, clamping values to `0..=65535`.
pub fn save_tiff(frame: &Frame, path: &Path) -> Result<()> {
    let h = frame.height();
    let w = frame.width();

    let pixels: Vec<u16> = frame
        .data
        .iter()
        .map(|v| v.round().clamp(0.0, 65535.0) as u16)
        .collect();

    let img = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .ok_or(crate::error::PhotrackError::InvalidDimensions {
            width: w,
            height: h,
        })?;
    img.save(path)?;
    Ok(())
}
