use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::bright_points::{annotate_bright_points, MarkerStyle};
use crate::error::AnalysisResult;
use crate::loader::load_rgb;
use crate::models::{ImageAnalysis, ImageOutcome, ImageReport, OutputPaths};
use crate::objects::extract_objects;
use crate::output::write_png;
use crate::threshold::{binary_mask, to_grayscale};

/// Parameters shared by every worker in a batch
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub object_threshold: u8,
    pub bright_threshold: u8,
    pub marker: MarkerStyle,
    pub output_dir: PathBuf,
}

/// One unit of work: an input image and where its results go
#[derive(Debug, Clone)]
pub struct ImageJob {
    pub index: usize,
    pub path: PathBuf,
    pub outputs: OutputPaths,
}

/// Run the full load → threshold → extract → scan → write chain for one file.
pub fn run_pipeline(
    path: &Path,
    outputs: &OutputPaths,
    settings: &AnalysisSettings,
) -> AnalysisResult<ImageAnalysis> {
    let rgb = load_rgb(path)?;
    let gray = to_grayscale(&rgb);

    let mask = binary_mask(&gray, settings.object_threshold);
    let object_stats = extract_objects(&mask);

    write_png(&mask, &outputs.mask)?;

    let (bright_points, annotated) =
        annotate_bright_points(&gray, &rgb, settings.bright_threshold, &settings.marker)?;

    write_png(&annotated, &outputs.annotated)?;

    Ok(ImageAnalysis {
        width: rgb.width(),
        height: rgb.height(),
        object_stats,
        bright_points,
        outputs: outputs.clone(),
    })
}

/// Analyse one image and contain any failure in the returned report.
pub fn analyze_image(job: &ImageJob, settings: &AnalysisSettings) -> ImageReport {
    let start_time = Instant::now();
    tracing::info!("🔍 Analysing image {}: {}", job.index + 1, job.path.display());

    let outcome = match run_pipeline(&job.path, &job.outputs, settings) {
        Ok(analysis) => {
            tracing::info!(
                "✅ {} done in {:?}: {} objects, {} bright points",
                job.path.display(),
                start_time.elapsed(),
                analysis.object_stats.len(),
                analysis.bright_points.len()
            );
            ImageOutcome::Succeeded(analysis)
        }
        Err(e) => {
            tracing::error!("❌ Failed to process {}: {}", job.path.display(), e);
            ImageOutcome::Failed {
                kind: e.kind(),
                reason: e.to_string(),
            }
        }
    };

    ImageReport {
        index: job.index,
        path: job.path.clone(),
        outcome,
    }
}
