use clap::Parser;
use std::path::PathBuf;

use crate::report::ReportFormat;

/// Input processed when no image is given on the command line
pub const DEFAULT_INPUT: &str = "galaxy.tif";

#[derive(Parser, Debug)]
#[command(
    name = "galaxy-scan",
    version,
    about = "Threshold, object and bright-point analysis for astronomical images"
)]
pub struct Cli {
    /// Images to analyse (default: galaxy.tif in the working directory)
    #[arg(value_name = "IMAGE")]
    pub images: Vec<PathBuf>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory for the mask and annotated images
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Number of concurrent image workers (default: CPU count)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Write the effective configuration to this TOML file
    #[arg(long, value_name = "FILE")]
    pub write_config: Option<String>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: ReportFormat,
}

impl Cli {
    pub fn input_paths(&self) -> Vec<PathBuf> {
        if self.images.is_empty() {
            vec![PathBuf::from(DEFAULT_INPUT)]
        } else {
            self.images.clone()
        }
    }
}
