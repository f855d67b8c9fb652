use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Integer pixel coordinate, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

/// One external object found in the binary mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStat {
    /// Floor-truncated centroid `(m10 / m00, m01 / m00)`
    pub center: PixelCoord,
    /// Raw zeroth moment (pixel count of the filled region)
    pub area: f64,
}

/// A pixel whose grayscale intensity exceeded the bright threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrightPoint {
    pub x: u32,
    pub y: u32,
}

/// Files written for one analysed image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPaths {
    pub mask: PathBuf,
    pub annotated: PathBuf,
}

/// Success payload for a single image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub width: u32,
    pub height: u32,
    pub object_stats: Vec<ObjectStat>,
    pub bright_points: Vec<BrightPoint>,
    pub outputs: OutputPaths,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Decode,
    VisionOp,
    Write,
    WorkerPanic,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Decode => "decode",
            FailureKind::VisionOp => "vision-op",
            FailureKind::Write => "write",
            FailureKind::WorkerPanic => "worker-panic",
        }
    }
}

/// Per-image outcome. A failure is never folded into an empty success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageOutcome {
    Succeeded(ImageAnalysis),
    Failed { kind: FailureKind, reason: String },
}

/// The single tagged entry a worker pushes onto the result channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReport {
    /// Position of the image in the submitted batch (0-based)
    pub index: usize,
    pub path: PathBuf,
    pub outcome: ImageOutcome,
}

impl ImageReport {
    pub fn analysis(&self) -> Option<&ImageAnalysis> {
        match &self.outcome {
            ImageOutcome::Succeeded(analysis) => Some(analysis),
            ImageOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, ImageOutcome::Failed { .. })
    }
}

/// Aggregated reports for a whole batch, ordered by input index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResults {
    pub reports: Vec<ImageReport>,
}

impl BatchResults {
    /// Build from reports in arrival order; pairs results by image identity.
    pub fn from_unordered(mut reports: Vec<ImageReport>) -> Self {
        reports.sort_by_key(|r| r.index);
        Self { reports }
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ImageReport> {
        self.reports.iter().filter(|r| !r.is_failure())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ImageReport> {
        self.reports.iter().filter(|r| r.is_failure())
    }

    pub fn total_objects(&self) -> usize {
        self.reports
            .iter()
            .filter_map(|r| r.analysis())
            .map(|a| a.object_stats.len())
            .sum()
    }

    pub fn total_bright_points(&self) -> usize {
        self.reports
            .iter()
            .filter_map(|r| r.analysis())
            .map(|a| a.bright_points.len())
            .sum()
    }
}
