use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;

use crate::cli::Cli;
use crate::config::Config;
use crate::dispatch::run_batch;
use crate::report::{write_report, ReportFormat};

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    run(cli)
}

/// Logs go to stderr so stdout carries only the report.
/// Set RUST_LOG=debug for per-stage counts; defaults to info.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> Result<()> {
    // Load configuration from file or use defaults
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config file: {}", config_path))?
    } else {
        Config::default()
    };

    config.merge_with_cli(cli.output_dir.clone(), cli.workers);
    config
        .validate()
        .context("Configuration validation failed")?;

    if let Some(config_out) = &cli.write_config {
        config
            .to_file(config_out)
            .with_context(|| format!("Failed to save config file: {}", config_out))?;
        tracing::info!("💾 Effective configuration written to {}", config_out);
    }

    let output_dir = config.get_output_directory();
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let paths = cli.input_paths();
    if cli.format == ReportFormat::Text {
        for path in &paths {
            println!("Starting analysis of image {}...", path.display());
        }
    }

    let start_time = Instant::now();
    let results = run_batch(
        &paths,
        &config.analysis_settings(),
        config.get_worker_count(),
    )?;
    tracing::info!(
        "🏁 Batch finished in {}",
        humantime::format_duration(std::time::Duration::from_millis(
            start_time.elapsed().as_millis() as u64
        ))
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, &results, cli.format)?;

    Ok(())
}
