use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use byteorder::{BigEndian, ReadBytesExt};
use hifitime::Epoch;
use memmap2::Mmap;
use ndarray::Array2;
use tracing::{debug, warn};

use crate::consts::{FITS_BLOCK_SIZE, FITS_CARD_SIZE};
use crate::error::{PhotrackError, Result};
use crate::frame::{Frame, FrameMetadata};

/// Primary-HDU header of a FITS image.
#[derive(Clone, Debug)]
pub struct FitsHeader {
    pub bitpix: i32,
    /// NAXISn values in FITS order (NAXIS1 = width first).
    pub axes: Vec<usize>,
    pub bzero: f64,
    pub bscale: f64,
    /// Raw `(keyword, value)` pairs in header order.
    pub cards: Vec<(String, String)>,
    /// Size of the header in bytes, a multiple of the block size.
    pub header_bytes: usize,
}

impl FitsHeader {
    pub fn width(&self) -> usize {
        self.axes.first().copied().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.axes.get(1).copied().unwrap_or(0)
    }

    pub fn bytes_per_sample(&self) -> usize {
        (self.bitpix.unsigned_abs() / 8) as usize
    }

    /// Bytes of the first image plane, `None` if the axes overflow `usize`.
    pub fn plane_byte_size(&self) -> Option<usize> {
        self.width()
            .checked_mul(self.height())?
            .checked_mul(self.bytes_per_sample())
    }

    /// Value of the first card with this keyword.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cards
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Observation start from `DATE-OBS`, joined with `TIME-OBS` when the
    /// date carries no time part.
    pub fn timestamp(&self) -> Option<Epoch> {
        let date = self.get("DATE-OBS")?;
        let iso = if date.contains('T') {
            date.to_string()
        } else if let Some(time) = self.get("TIME-OBS") {
            format!("{date}T{time}")
        } else {
            format!("{date}T00:00:00")
        };
        match Epoch::from_str(&iso) {
            Ok(epoch) => Some(epoch),
            Err(e) => {
                warn!(value = %iso, error = %e, "Unparseable DATE-OBS");
                None
            }
        }
    }

    /// Exposure time in seconds from `EXPTIME` or `EXPOSURE`.
    pub fn exposure_s(&self) -> Option<f64> {
        self.get_f64("EXPTIME").or_else(|| self.get_f64("EXPOSURE"))
    }
}

/// Memory-mapped reader for the primary image of a FITS file.
pub struct FitsReader {
    mmap: Mmap,
    pub header: FitsHeader,
}

impl FitsReader {
    /// Open a FITS file and parse its primary header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < FITS_BLOCK_SIZE {
            return Err(PhotrackError::InvalidFits(
                "File too small for a FITS header".into(),
            ));
        }
        if &mmap[0..6] != b"SIMPLE" {
            return Err(PhotrackError::InvalidFits("Missing SIMPLE card".into()));
        }

        let header = parse_header(&mmap)?;

        let expected = header
            .plane_byte_size()
            .and_then(|n| n.checked_add(header.header_bytes))
            .ok_or_else(|| {
                PhotrackError::InvalidFits(format!(
                    "Image size {}x{} overflows",
                    header.width(),
                    header.height()
                ))
            })?;
        if mmap.len() < expected {
            return Err(PhotrackError::InvalidFits(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    /// Decode the first image plane into physical values (`BZERO + BSCALE * raw`).
    pub fn read_data(&self) -> Result<Array2<f32>> {
        let h = self.header.height();
        let w = self.header.width();
        let start = self.header.header_bytes;
        let raw = self
            .header
            .plane_byte_size()
            .and_then(|n| self.mmap.get(start..start.checked_add(n)?))
            .ok_or_else(|| PhotrackError::InvalidFits("Image data out of range".into()))?;
        decode_plane(raw, h, w, &self.header)
    }

    /// Read the image together with its time metadata.
    pub fn read_frame(&self, path: &Path, index: usize) -> Result<Frame> {
        let data = self.read_data()?;
        let metadata = FrameMetadata {
            frame_index: index,
            timestamp: self.header.timestamp(),
            exposure_s: self.header.exposure_s(),
            source: path.to_path_buf(),
        };
        Ok(Frame::with_metadata(data, metadata))
    }
}

fn parse_header(buf: &[u8]) -> Result<FitsHeader> {
    let mut cards = Vec::new();
    let mut offset = 0;
    let mut found_end = false;

    while offset + FITS_CARD_SIZE <= buf.len() {
        let card = &buf[offset..offset + FITS_CARD_SIZE];
        offset += FITS_CARD_SIZE;

        let keyword = String::from_utf8_lossy(&card[..8]).trim().to_string();
        if keyword == "END" {
            found_end = true;
            break;
        }
        if &card[8..10] == b"= " {
            cards.push((keyword, parse_card_value(&card[10..])));
        }
    }

    if !found_end {
        return Err(PhotrackError::InvalidFits("Header has no END card".into()));
    }
    let header_bytes = offset.div_ceil(FITS_BLOCK_SIZE) * FITS_BLOCK_SIZE;

    let find = |key: &str| cards.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());
    let int = |key: &str| -> Result<i64> {
        find(key)
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| PhotrackError::InvalidFits(format!("Missing or invalid {key}")))
    };

    let bitpix = int("BITPIX")? as i32;
    if !matches!(bitpix, 8 | 16 | 32 | 64 | -32 | -64) {
        return Err(PhotrackError::InvalidFits(format!("Unsupported BITPIX {bitpix}")));
    }

    let naxis = int("NAXIS")? as usize;
    let axes = (1..=naxis)
        .map(|n| int(&format!("NAXIS{n}")).map(|v| v.max(0) as usize))
        .collect::<Result<Vec<_>>>()?;

    if naxis < 2 || axes[0] == 0 || axes[1] == 0 {
        return Err(PhotrackError::InvalidDimensions {
            width: axes.first().copied().unwrap_or(0),
            height: axes.get(1).copied().unwrap_or(0),
        });
    }
    if naxis > 2 {
        debug!(naxis, "Multi-plane FITS image, using the first plane");
    }

    let bzero = find("BZERO").and_then(|v| v.parse().ok()).unwrap_or(0.0);
    let bscale = find("BSCALE").and_then(|v| v.parse().ok()).unwrap_or(1.0);

    Ok(FitsHeader {
        bitpix,
        axes,
        bzero,
        bscale,
        cards,
        header_bytes,
    })
}

/// Value field of a card: quoted string (with `''` escapes) or a bare token
/// up to the `/` comment.
fn parse_card_value(field: &[u8]) -> String {
    let text = String::from_utf8_lossy(field);
    let trimmed = text.trim_start();

    if let Some(rest) = trimmed.strip_prefix('\'') {
        let mut value = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    value.push('\'');
                    chars.next();
                } else {
                    break;
                }
            } else {
                value.push(c);
            }
        }
        return value.trim_end().to_string();
    }

    trimmed
        .split('/')
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

fn decode_plane(raw: &[u8], height: usize, width: usize, header: &FitsHeader) -> Result<Array2<f32>> {
    let mut cursor = std::io::Cursor::new(raw);
    let mut data = Array2::<f32>::zeros((height, width));
    let (bzero, bscale) = (header.bzero, header.bscale);

    for row in 0..height {
        for col in 0..width {
            let val = match header.bitpix {
                8 => cursor.read_u8()? as f64,
                16 => cursor.read_i16::<BigEndian>()? as f64,
                32 => cursor.read_i32::<BigEndian>()? as f64,
                64 => cursor.read_i64::<BigEndian>()? as f64,
                -32 => cursor.read_f32::<BigEndian>()? as f64,
                _ => cursor.read_f64::<BigEndian>()?,
            };
            data[[row, col]] = (bzero + bscale * val) as f32;
        }
    }

    Ok(data)
}
