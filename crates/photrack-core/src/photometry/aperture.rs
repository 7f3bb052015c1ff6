use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::frame::Centroid;

/// How pixels on the aperture boundary are weighted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ApertureMethod {
    /// A pixel counts fully when its center lies within the radius.
    #[default]
    Center,
    /// Each pixel is split into `factor x factor` sub-pixels and weighted by
    /// the fraction of sub-pixel centers inside the radius.
    Subpixel { factor: usize },
}

impl std::fmt::Display for ApertureMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Center => write!(f, "Center"),
            Self::Subpixel { factor } => write!(f, "Subpixel ({factor}x{factor})"),
        }
    }
}

/// Sum pixel intensities within `radius` of `center`.
///
/// The aperture is clipped at the frame edge. A negative or non-finite radius
/// or center sums nothing.
pub fn aperture_sum(data: &Array2<f32>, center: Centroid, radius: f64, method: ApertureMethod) -> f64 {
    let (height, width) = data.dim();
    if radius < 0.0 || !radius.is_finite() || !center.x.is_finite() || !center.y.is_finite() {
        return 0.0;
    }

    let reach = (radius.ceil() as i64).saturating_add(1);
    let (cy, cx) = (center.y.floor() as i64, center.x.floor() as i64);
    let row_min = cy.saturating_sub(reach).max(0);
    let row_max = cy.saturating_add(reach).saturating_add(1).min(height as i64);
    let col_min = cx.saturating_sub(reach).max(0);
    let col_max = cx.saturating_add(reach).saturating_add(1).min(width as i64);

    let mut total = 0.0f64;
    for row in row_min..row_max {
        for col in col_min..col_max {
            let weight = pixel_weight(col as f64, row as f64, center, radius, method);
            if weight > 0.0 {
                total += weight * data[[row as usize, col as usize]] as f64;
            }
        }
    }
    total
}

/// Aperture sums for several centers, in input order.
pub fn aperture_sums(
    data: &Array2<f32>,
    centers: &[Centroid],
    radius: f64,
    method: ApertureMethod,
) -> Vec<f64> {
    centers
        .iter()
        .map(|&c| aperture_sum(data, c, radius, method))
        .collect()
}

/// Fraction of the pixel centered at `(px, py)` that lies inside the aperture.
fn pixel_weight(px: f64, py: f64, center: Centroid, radius: f64, method: ApertureMethod) -> f64 {
    let r_sq = radius * radius;
    match method {
        ApertureMethod::Center => {
            let dx = px - center.x;
            let dy = py - center.y;
            if dx * dx + dy * dy <= r_sq { 1.0 } else { 0.0 }
        }
        ApertureMethod::Subpixel { factor } => {
            let n = factor.max(1);
            let step = 1.0 / n as f64;
            let mut inside = 0usize;
            for i in 0..n {
                let sy = py - 0.5 + (i as f64 + 0.5) * step;
                for j in 0..n {
                    let sx = px - 0.5 + (j as f64 + 0.5) * step;
                    let dx = sx - center.x;
                    let dy = sy - center.y;
                    if dx * dx + dy * dy <= r_sq {
                        inside += 1;
                    }
                }
            }
            inside as f64 / (n * n) as f64
        }
    }
}
