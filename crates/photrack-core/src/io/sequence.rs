use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::consts::{FRAME_EXTENSIONS, STREAMING_BATCH_SIZE};
use crate::error::{PhotrackError, Result};
use crate::frame::Frame;

use super::fits::FitsReader;
use super::image_io::load_image;

/// Whether the path has a recognised frame extension.
pub fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Frame files of a directory, sorted by file name.
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PhotrackError::MissingInput(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_frame_file(p))
        .collect();

    if paths.is_empty() {
        return Err(PhotrackError::EmptySequence);
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Load one frame, choosing the decoder from the file extension.
pub fn load_frame(path: &Path, index: usize) -> Result<Frame> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("fits" | "fit" | "fts") => FitsReader::open(path)?.read_frame(path, index),
        _ => load_image(path, index),
    }
}

/// Frames of a sequence decoded in parallel batches and yielded in order.
///
/// Only one batch is resident at a time. Frame indices follow the order of
/// `paths`.
pub struct FrameSequence {
    paths: Vec<PathBuf>,
    next: usize,
    batch: std::vec::IntoIter<Result<Frame>>,
}

impl FrameSequence {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            next: 0,
            batch: Vec::new().into_iter(),
        }
    }

    pub fn open(dir: &Path) -> Result<Self> {
        Ok(Self::new(list_frames(dir)?))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn fill_batch(&mut self) {
        let end = (self.next + STREAMING_BATCH_SIZE).min(self.paths.len());
        let decoded: Vec<Result<Frame>> = (self.next..end)
            .into_par_iter()
            .map(|i| load_frame(&self.paths[i], i))
            .collect();
        self.next = end;
        self.batch = decoded.into_iter();
    }
}

impl Iterator for FrameSequence {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(frame) = self.batch.next() {
            return Some(frame);
        }
        if self.next >= self.paths.len() {
            return None;
        }
        self.fill_batch();
        self.batch.next()
    }
}
