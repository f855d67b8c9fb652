use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::bright_points::{MarkerStyle, BRIGHT_THRESHOLD};
use crate::pipeline::AnalysisSettings;
use crate::threshold::OBJECT_THRESHOLD;

/// Main configuration structure for Galaxy Scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Intensity cutoffs
    pub thresholds: ThresholdConfig,
    /// Bright point marker appearance
    pub markers: MarkerConfig,
    /// Where output images go
    pub output: OutputConfig,
    /// Worker pool sizing
    pub workers: WorkersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Object mask cutoff, pixel must be strictly brighter (default: 200)
    pub object: Option<u8>,
    /// Bright point cutoff, pixel must be strictly brighter (default: 240)
    pub bright: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Disc radius in pixels (default: 3)
    pub radius: Option<i32>,
    /// RGB colour (default: red)
    pub color: Option<[u8; 3]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: current directory)
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkersConfig {
    /// Number of concurrent image workers (default: num_cpus)
    pub count: Option<usize>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            object: Some(OBJECT_THRESHOLD),
            bright: Some(BRIGHT_THRESHOLD),
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        let style = MarkerStyle::default();
        Self {
            radius: Some(style.radius),
            color: Some(style.color),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: Some(".".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml_edit::de::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml_edit::ser::to_string_pretty(self)
            .context("Failed to serialize configuration to TOML")?;

        std::fs::write(&path, toml_string)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Merge configuration with command line arguments, prioritizing CLI values
    pub fn merge_with_cli(&mut self, output_dir: Option<String>, workers: Option<usize>) {
        if let Some(dir) = output_dir {
            self.output.directory = Some(dir);
        }

        if let Some(count) = workers {
            self.workers.count = Some(count);
        }
    }

    pub fn get_object_threshold(&self) -> u8 {
        self.thresholds.object.unwrap_or(OBJECT_THRESHOLD)
    }

    pub fn get_bright_threshold(&self) -> u8 {
        self.thresholds.bright.unwrap_or(BRIGHT_THRESHOLD)
    }

    pub fn get_marker_style(&self) -> MarkerStyle {
        let defaults = MarkerStyle::default();
        MarkerStyle {
            radius: self.markers.radius.unwrap_or(defaults.radius),
            color: self.markers.color.unwrap_or(defaults.color),
        }
    }

    pub fn get_output_directory(&self) -> PathBuf {
        PathBuf::from(self.output.directory.as_deref().unwrap_or("."))
    }

    pub fn get_worker_count(&self) -> usize {
        self.workers.count.unwrap_or_else(num_cpus::get)
    }

    /// Settings handed to every per-image worker
    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            object_threshold: self.get_object_threshold(),
            bright_threshold: self.get_bright_threshold(),
            marker: self.get_marker_style(),
            output_dir: self.get_output_directory(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let radius = self.get_marker_style().radius;
        if radius < 1 {
            return Err(anyhow::anyhow!(
                "Marker radius must be at least 1, got: {}",
                radius
            ));
        }

        if let Some(0) = self.workers.count {
            return Err(anyhow::anyhow!("Worker count must be greater than 0"));
        }

        let dir = self.get_output_directory();
        if dir.exists() && !dir.is_dir() {
            return Err(anyhow::anyhow!(
                "Output path is not a directory: {}",
                dir.display()
            ));
        }

        Ok(())
    }
}
