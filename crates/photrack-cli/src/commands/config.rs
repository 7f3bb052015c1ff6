use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use photrack_core::pipeline::config::{PhotometryConfig, RunConfig};

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full default RunConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = RunConfig {
        frames: PathBuf::from("frames"),
        coordinates: PathBuf::from("coords.txt"),
        output: PathBuf::from("photometry.csv"),
        photometry: PhotometryConfig::default(),
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
