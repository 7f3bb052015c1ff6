use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use photrack_core::io::load_coordinates;
use photrack_core::tracking::hypothesis_rounds;

#[derive(Args)]
pub struct CoordsArgs {
    /// Coordinate-hypothesis file (`name:(x,y)` per line)
    pub file: PathBuf,
}

pub fn run(args: &CoordsArgs) -> Result<()> {
    let objects = load_coordinates(&args.file)?;
    let rounds = hypothesis_rounds(&objects);

    println!("Objects:     {}", objects.len());
    println!("Rounds:      {}", rounds);
    println!();
    for object in &objects {
        let hypotheses: Vec<String> = object.hypotheses.iter().map(|p| p.to_string()).collect();
        println!("  {:<16}{}", object.name, hypotheses.join("  "));
    }

    Ok(())
}
