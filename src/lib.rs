pub mod bright_points;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod models;
pub mod objects;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod threshold;

// Main entry point
pub mod cli_main;

// Re-export commonly used items
pub use dispatch::run_batch;
pub use error::AnalysisError;
pub use models::{BatchResults, BrightPoint, ImageOutcome, ImageReport, ObjectStat};
pub use pipeline::{analyze_image, AnalysisSettings, ImageJob};
