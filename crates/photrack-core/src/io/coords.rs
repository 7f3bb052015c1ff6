//! Coordinate-hypothesis files.
//!
//! One `name:(x,y)` entry per line. A name may repeat; each repetition adds
//! that object's next hypothesis round, so line order is priority order.
//! Blank lines and `#` comments are ignored.

use std::path::Path;

use crate::error::{PhotrackError, Result};
use crate::frame::PixelPosition;
use crate::tracking::TrackedObject;

/// Read and parse a coordinate-hypothesis file.
pub fn load_coordinates(path: &Path) -> Result<Vec<TrackedObject>> {
    if !path.is_file() {
        return Err(PhotrackError::MissingInput(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    parse_coordinates(&text)
}

/// Parse coordinate-hypothesis text into objects in first-appearance order.
pub fn parse_coordinates(text: &str) -> Result<Vec<TrackedObject>> {
    let mut objects: Vec<TrackedObject> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (name, position) =
            parse_line(trimmed).ok_or_else(|| PhotrackError::MalformedCoordinateLine {
                line: i + 1,
                content: line.to_string(),
            })?;

        match objects.iter_mut().find(|o| o.name == name) {
            Some(object) => object.hypotheses.push(position),
            None => objects.push(TrackedObject::new(name, vec![position])),
        }
    }

    if objects.is_empty() {
        return Err(PhotrackError::NoTrackedObjects);
    }
    Ok(objects)
}

/// `name:(x,y)` with optional whitespace around each token.
///
/// Coordinates must fit in an `i32`.
fn parse_line(line: &str) -> Option<(&str, PixelPosition)> {
    let (name, coords) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let inner = coords.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (x, y) = inner.split_once(',')?;
    let x = x.trim().parse::<i32>().ok()?;
    let y = y.trim().parse::<i32>().ok()?;
    Some((name, PixelPosition::new(x.into(), y.into())))
}
