//! Windowed centroid refinement.
//!
//! Given the previous position of an object, a square window of half-width
//! `offset` is cut around it and the intensity-weighted center of mass inside
//! that window becomes the new position. Cheap (O(offset²)) and naturally
//! sub-pixel for isolated point sources on a subtracted background.

use ndarray::{s, Array2, ArrayView2};

use crate::error::TrackError;
use crate::frame::{Centroid, PixelPosition};

/// Edge rule applied to a search anchor before the window is cut.
///
/// Rules are evaluated in declaration order and only the first match is
/// applied. The set is intentionally asymmetric: the left-edge rule moves `x`
/// to 0 rather than to `offset`, and the `x` rules are never reached once a
/// `y` rule has matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClampRule {
    /// `y - offset < 0` sets `y = offset`.
    Top,
    /// `y + offset >= height` sets `y = height - offset - 1`.
    Bottom,
    /// `x - offset < 0` sets `x = 0`.
    Left,
    /// `x + offset >= width` sets `x = width - offset - 1`.
    Right,
}

/// Evaluation order of the clamp rules.
pub const CLAMP_RULES: [ClampRule; 4] = [
    ClampRule::Top,
    ClampRule::Bottom,
    ClampRule::Left,
    ClampRule::Right,
];

impl ClampRule {
    fn matches(self, p: PixelPosition, offset: i64, width: i64, height: i64) -> bool {
        match self {
            Self::Top => p.y.saturating_sub(offset) < 0,
            Self::Bottom => p.y.saturating_add(offset) >= height,
            Self::Left => p.x.saturating_sub(offset) < 0,
            Self::Right => p.x.saturating_add(offset) >= width,
        }
    }

    fn apply(self, p: PixelPosition, offset: i64, width: i64, height: i64) -> PixelPosition {
        match self {
            Self::Top => PixelPosition::new(p.x, offset),
            Self::Bottom => PixelPosition::new(p.x, height - offset - 1),
            Self::Left => PixelPosition::new(0, p.y),
            Self::Right => PixelPosition::new(width - offset - 1, p.y),
        }
    }
}

/// Move a search anchor away from the frame edge using the first matching rule.
pub fn clamp_position(
    position: PixelPosition,
    offset: usize,
    width: usize,
    height: usize,
) -> (PixelPosition, Option<ClampRule>) {
    let (offset, width, height) = (offset as i64, width as i64, height as i64);
    CLAMP_RULES
        .iter()
        .find(|rule| rule.matches(position, offset, width, height))
        .map(|&rule| (rule.apply(position, offset, width, height), Some(rule)))
        .unwrap_or((position, None))
}

/// Half-open pixel bounds of a search window, already intersected with the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchWindow {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl SearchWindow {
    /// Window `[y-offset, y+offset) x [x-offset, x+offset)` cropped to the frame.
    ///
    /// Returns `None` when nothing of the window lies inside the frame.
    pub fn around(anchor: PixelPosition, offset: usize, width: usize, height: usize) -> Option<Self> {
        let offset = offset as i64;
        let row_start = anchor.y.saturating_sub(offset).max(0);
        let row_end = anchor.y.saturating_add(offset).min(height as i64);
        let col_start = anchor.x.saturating_sub(offset).max(0);
        let col_end = anchor.x.saturating_add(offset).min(width as i64);

        if row_start >= row_end || col_start >= col_end {
            return None;
        }
        Some(Self {
            row_start: row_start as usize,
            row_end: row_end as usize,
            col_start: col_start as usize,
            col_end: col_end as usize,
        })
    }

    pub fn view<'a>(&self, data: &'a Array2<f32>) -> ArrayView2<'a, f32> {
        data.slice(s![self.row_start..self.row_end, self.col_start..self.col_end])
    }
}

/// Result of one successful centroid refinement.
#[derive(Clone, Copy, Debug)]
pub struct CentroidMeasurement {
    pub centroid: Centroid,
    /// Pixel value at the truncated centroid.
    pub peak: f32,
    /// Anchor the window was cut around, after clamping.
    pub anchor: PixelPosition,
    pub clamp: Option<ClampRule>,
}

/// Refine an object position to the intensity-weighted centroid of its
/// search window.
///
/// `data` is expected to be background-subtracted.
pub fn refine_centroid(
    data: &Array2<f32>,
    position: PixelPosition,
    offset: usize,
) -> Result<CentroidMeasurement, TrackError> {
    let (height, width) = data.dim();
    let (anchor, clamp) = clamp_position(position, offset, width, height);

    let window = SearchWindow::around(anchor, offset, width, height).ok_or(
        TrackError::DegenerateWindow {
            x: anchor.x,
            y: anchor.y,
        },
    )?;

    let (local_x, local_y) =
        weighted_center(&window.view(data)).ok_or(TrackError::DegenerateWindow {
            x: anchor.x,
            y: anchor.y,
        })?;

    let centroid = Centroid::new(
        local_x + window.col_start as f64,
        local_y + window.row_start as f64,
    );
    if !centroid.x.is_finite() || !centroid.y.is_finite() {
        return Err(TrackError::CentroidOffFrame {
            x: centroid.x,
            y: centroid.y,
        });
    }

    let pixel = centroid.to_pixel();
    let peak = if pixel.x >= 0 && pixel.y >= 0 {
        data.get([pixel.y as usize, pixel.x as usize]).copied()
    } else {
        None
    }
    .ok_or(TrackError::CentroidOffFrame {
        x: centroid.x,
        y: centroid.y,
    })?;

    Ok(CentroidMeasurement {
        centroid,
        peak,
        anchor,
        clamp,
    })
}

/// First moments of a window divided by its total intensity.
///
/// Returns `(x_com, y_com)` in window-local coordinates, or `None` when the
/// total is zero or not finite.
fn weighted_center(window: &ArrayView2<f32>) -> Option<(f64, f64)> {
    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;
    let mut sum_w = 0.0f64;

    for ((row, col), &val) in window.indexed_iter() {
        let weight = val as f64;
        sum_x += col as f64 * weight;
        sum_y += row as f64 * weight;
        sum_w += weight;
    }

    if sum_w == 0.0 || !sum_w.is_finite() {
        return None;
    }
    Some((sum_x / sum_w, sum_y / sum_w))
}
