use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use photrack_core::io::fits::FitsReader;
use photrack_core::io::load_frame;
use photrack_core::photometry::estimate_sky;

#[derive(Args)]
pub struct InfoArgs {
    /// Input frame (FITS, TIFF or PNG)
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let frame = load_frame(&args.file, 0)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let meta = &frame.metadata;

    println!("File:        {}", meta.source.display());
    println!("Dimensions:  {}x{}", frame.width(), frame.height());

    if let Ok(reader) = FitsReader::open(&args.file) {
        println!("BITPIX:      {}", reader.header.bitpix);
        if reader.header.bzero != 0.0 || reader.header.bscale != 1.0 {
            println!(
                "Scaling:     BZERO={} BSCALE={}",
                reader.header.bzero, reader.header.bscale
            );
        }
    }

    match meta.timestamp {
        Some(t) => println!("Timestamp:   {}", t),
        None => println!("Timestamp:   unknown"),
    }
    if let Some(jd) = meta.jd_mid_utc() {
        println!("Mid JD:      {:.6}", jd);
    }
    match meta.exposure_s {
        Some(e) => println!("Exposure:    {} s", e),
        None => println!("Exposure:    unknown"),
    }

    let min = frame.data.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = frame.data.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let sky = estimate_sky(&frame.data)?;
    println!("Range:       {} .. {}", min, max);
    println!("Sky median:  {}", sky);

    Ok(())
}
