use anyhow::Result;
use std::io::Write;

use crate::models::{BatchResults, ImageOutcome};

/// Output format for the batch report
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

pub fn write_report<W: Write>(
    out: &mut W,
    results: &BatchResults,
    format: ReportFormat,
) -> Result<()> {
    match format {
        ReportFormat::Text => write_text(out, results),
        ReportFormat::Json => write_json(out, results),
    }
}

/// Human-readable summary: every image gets its own section, failures included.
pub fn write_text<W: Write>(out: &mut W, results: &BatchResults) -> Result<()> {
    for report in &results.reports {
        let number = report.index + 1;
        match &report.outcome {
            ImageOutcome::Succeeded(analysis) => {
                writeln!(
                    out,
                    "Image {} ({}) - objects found: {}",
                    number,
                    report.path.display(),
                    analysis.object_stats.len()
                )?;
                for object in &analysis.object_stats {
                    writeln!(
                        out,
                        "  Centroid: ({}, {}), Area: {:.1}",
                        object.center.x, object.center.y, object.area
                    )?;
                }
                writeln!(out, "  Mask saved as {}", analysis.outputs.mask.display())?;
                writeln!(
                    out,
                    "  Bright point image saved as {}",
                    analysis.outputs.annotated.display()
                )?;
                writeln!(
                    out,
                    "Image {} - bright points found: {}",
                    number,
                    analysis.bright_points.len()
                )?;
                for point in &analysis.bright_points {
                    writeln!(out, "  Bright point: ({}, {})", point.x, point.y)?;
                }
            }
            ImageOutcome::Failed { kind, reason } => {
                writeln!(
                    out,
                    "Image {} ({}) - processing failed [{}]: {}",
                    number,
                    report.path.display(),
                    kind.as_str(),
                    reason
                )?;
            }
        }
    }

    let failed = results.failed().count();
    if results.reports.len() > 1 || failed > 0 {
        writeln!(
            out,
            "Processed {} image(s): {} succeeded, {} failed",
            results.reports.len(),
            results.reports.len() - failed,
            failed
        )?;
        writeln!(
            out,
            "Totals: {} object(s), {} bright point(s)",
            results.total_objects(),
            results.total_bright_points()
        )?;
    }
    Ok(())
}

pub fn write_json<W: Write>(out: &mut W, results: &BatchResults) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BrightPoint, FailureKind, ImageAnalysis, ImageReport, ObjectStat, OutputPaths, PixelCoord,
    };
    use std::path::PathBuf;

    fn sample_results() -> BatchResults {
        BatchResults::from_unordered(vec![
            ImageReport {
                index: 1,
                path: PathBuf::from("broken.tif"),
                outcome: ImageOutcome::Failed {
                    kind: FailureKind::Decode,
                    reason: "unsupported format".to_string(),
                },
            },
            ImageReport {
                index: 0,
                path: PathBuf::from("galaxy.tif"),
                outcome: ImageOutcome::Succeeded(ImageAnalysis {
                    width: 10,
                    height: 10,
                    object_stats: vec![ObjectStat {
                        center: PixelCoord { x: 4, y: 5 },
                        area: 12.0,
                    }],
                    bright_points: vec![BrightPoint { x: 4, y: 5 }, BrightPoint { x: 5, y: 5 }],
                    outputs: OutputPaths {
                        mask: PathBuf::from("processed_image.png"),
                        annotated: PathBuf::from("image_with_bright_points.png"),
                    },
                }),
            },
        ])
    }

    #[test]
    fn test_text_report_covers_every_image() {
        let mut buffer = Vec::new();
        write_report(&mut buffer, &sample_results(), ReportFormat::Text).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("Image 1 (galaxy.tif) - objects found: 1"));
        assert!(text.contains("  Centroid: (4, 5), Area: 12.0"));
        assert!(text.contains("Image 1 - bright points found: 2"));
        assert!(text.contains("  Bright point: (5, 5)"));
        assert!(text
            .contains("Image 2 (broken.tif) - processing failed [decode]: unsupported format"));
        assert!(text.contains("Processed 2 image(s): 1 succeeded, 1 failed"));
        assert!(text.contains("Totals: 1 object(s), 2 bright point(s)"));

        let first = text.find("Image 1").unwrap();
        let second = text.find("Image 2").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_single_success_has_no_batch_footer() {
        let mut results = sample_results();
        results.reports.truncate(1);
        let mut buffer = Vec::new();
        write_text(&mut buffer, &results).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(!text.contains("Processed"));
        assert!(!text.contains("Totals"));
    }

    #[test]
    fn test_json_report_parses() {
        let mut buffer = Vec::new();
        write_report(&mut buffer, &sample_results(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        let reports = value["reports"].as_array().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["outcome"]["status"], "succeeded");
        assert_eq!(reports[0]["outcome"]["object_stats"][0]["area"], 12.0);
        assert_eq!(reports[1]["outcome"]["status"], "failed");
        assert_eq!(reports[1]["outcome"]["kind"], "decode");
    }
}
