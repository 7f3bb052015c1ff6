use ndarray::{Array2, Zip};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{PhotrackError, Result};
use crate::frame::Frame;

/// Estimate the sky level of a frame as the median of all pixels.
///
/// Uses `select_nth_unstable` for O(n) median without full sort.
pub fn estimate_sky(data: &Array2<f32>) -> Result<f32> {
    if data.is_empty() {
        return Err(PhotrackError::EmptyFrame);
    }
    let mut values: Vec<f32> = data.iter().copied().collect();
    Ok(compute_median(&mut values))
}

/// Subtract the median sky level from a frame.
///
/// Returns the background-subtracted frame (same metadata) and the sky value.
/// Parallelizes at the row level for images >= 256x256.
pub fn subtract_background(frame: &Frame) -> Result<(Frame, f32)> {
    let sky = estimate_sky(&frame.data)?;
    let (h, w) = frame.data.dim();

    let mut data = frame.data.clone();
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        Zip::from(&mut data).par_for_each(|v| *v -= sky);
    } else {
        data.mapv_inplace(|v| v - sky);
    }

    Ok((Frame::with_metadata(data, frame.metadata.clone()), sky))
}

fn compute_median(values: &mut [f32]) -> f32 {
    let n = values.len();
    if n == 1 {
        values[0]
    } else if n % 2 == 1 {
        let mid = n / 2;
        *values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1
    } else {
        let mid = n / 2;
        values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        let upper = values[mid];
        let lower = *values[..mid]
            .select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b))
            .1;
        (lower + upper) / 2.0
    }
}
