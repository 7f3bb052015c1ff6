use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use photrack_core::consts::DEFAULT_SUBPIXEL_FACTOR;
use photrack_core::photometry::{ApertureMethod, MagnitudeCalibration};
use photrack_core::pipeline::config::{ApertureConfig, PhotometryConfig, RunConfig, TrackingConfig};
use photrack_core::pipeline::{run_directory, PipelineStage, ProgressReporter};

use crate::summary::{print_run_header, print_run_result};

#[derive(Clone, ValueEnum)]
pub enum ApertureMethodArg {
    Center,
    Subpixel,
}

#[derive(Args)]
pub struct RunArgs {
    /// Directories of calibrated frames; one table is written per directory
    pub dirs: Vec<PathBuf>,

    /// Coordinate-hypothesis file (`name:(x,y)` per line)
    #[arg(long)]
    pub coords: Option<PathBuf>,

    /// Run config file (TOML); replaces all other options
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Half-width of the centroid search window in pixels
    #[arg(long, default_value = "10")]
    pub offset: usize,

    /// Aperture radius in pixels
    #[arg(long, default_value = "5")]
    pub radius: f64,

    /// Aperture edge weighting
    #[arg(long, value_enum, default_value = "center")]
    pub aperture: ApertureMethodArg,

    /// Sub-pixel split per axis (subpixel aperture only)
    #[arg(long, default_value_t = DEFAULT_SUBPIXEL_FACTOR)]
    pub subpixel: usize,

    /// Flux that maps to the magnitude zero-point
    #[arg(long, default_value = "1.0")]
    pub flux_zero: f64,

    /// Magnitude zero-point
    #[arg(long, default_value = "0.0")]
    pub mag_zero: f64,

    /// Directory the tables are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let configs = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        let config: RunConfig = toml::from_str(&contents).context("Invalid run config")?;
        vec![config]
    } else {
        build_configs_from_args(args)?
    };

    for config in &configs {
        print_run_header(config);

        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:16} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        let reporter = Arc::new(BarReporter { pb: pb.clone() });

        let summary = run_directory(config, reporter)
            .with_context(|| format!("Failed to process {}", config.frames.display()))?;
        pb.finish_with_message("Done");

        print_run_result(config, &summary);
    }

    Ok(())
}

fn build_configs_from_args(args: &RunArgs) -> Result<Vec<RunConfig>> {
    if args.dirs.is_empty() {
        bail!("No frame directories given");
    }
    let Some(ref coords) = args.coords else {
        bail!("No coordinate file given (--coords)");
    };

    let method = match args.aperture {
        ApertureMethodArg::Center => ApertureMethod::Center,
        ApertureMethodArg::Subpixel => ApertureMethod::Subpixel {
            factor: args.subpixel,
        },
    };
    let photometry = PhotometryConfig {
        tracking: TrackingConfig {
            search_offset: args.offset,
        },
        aperture: ApertureConfig {
            radius: args.radius,
            method,
        },
        calibration: MagnitudeCalibration::new(args.flux_zero, args.mag_zero),
    };

    Ok(args
        .dirs
        .iter()
        .map(|dir| RunConfig {
            frames: dir.clone(),
            coordinates: coords.clone(),
            output: table_path(&args.output_dir, dir),
            photometry: photometry.clone(),
        })
        .collect())
}

/// `<output_dir>/<dir name>_photometry.csv`
fn table_path(output_dir: &Path, frames_dir: &Path) -> PathBuf {
    let stem = frames_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frames".to_string());
    output_dir.join(format!("{stem}_photometry.csv"))
}

/// Drives an indicatif bar from pipeline progress.
struct BarReporter {
    pb: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.pb.set_message(stage.to_string());
        self.pb.set_length(total_items.unwrap_or(0) as u64);
        self.pb.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.pb.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        if let Some(len) = self.pb.length() {
            self.pb.set_position(len);
        }
    }
}
