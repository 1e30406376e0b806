use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use patch_dataset_preprocessing::{DatasetBuilder, DatasetConfig};

#[derive(Parser, Debug)]
#[command(name = "patch-dataset-preprocessing", version)]
struct Args {
    /// Path to the TOML dataset description
    #[arg(long)]
    config: PathBuf,

    /// Override the configured output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();
    info!("=== patch-dataset-preprocessing start ===");

    let args = Args::parse();
    info!("Parsed command-line args: {:?}", args);

    let mut config = DatasetConfig::from_toml_file(&args.config)
        .with_context(|| format!("loading dataset config from {:?}", args.config))?;
    if let Some(output_dir) = args.output_dir {
        config = config.with_output_dir(output_dir);
    }

    let builder = DatasetBuilder::new(config)?;
    builder.run()?;

    info!("=== Done. Check your output_dir for files. ===");
    Ok(())
}
