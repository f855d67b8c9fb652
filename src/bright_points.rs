use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::BrightPoint;

/// Default intensity a pixel must exceed to count as a bright point
pub const BRIGHT_THRESHOLD: u8 = 240;

/// Filled disc drawn at every bright point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub radius: i32,
    pub color: [u8; 3],
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 3,
            color: [255, 0, 0],
        }
    }
}

/// Full row-major scan for pixels with intensity strictly above `cutoff`.
pub fn scan_bright_points(gray: &GrayImage, cutoff: u8) -> Vec<BrightPoint> {
    let points: Vec<BrightPoint> = gray
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > cutoff)
        .map(|(x, y, _)| BrightPoint { x, y })
        .collect();

    tracing::debug!(
        "✨ Found {} pixels brighter than {} in {}x{} image",
        points.len(),
        cutoff,
        gray.width(),
        gray.height()
    );
    points
}

/// Draw one marker per point, in place. Adjacent points each get their own disc.
pub fn draw_markers(
    canvas: &mut RgbImage,
    points: &[BrightPoint],
    style: &MarkerStyle,
) -> AnalysisResult<()> {
    let color = Rgb(style.color);
    for point in points {
        let center = (
            i32::try_from(point.x)
                .map_err(|_| AnalysisError::vision("draw marker", "x coordinate out of range"))?,
            i32::try_from(point.y)
                .map_err(|_| AnalysisError::vision("draw marker", "y coordinate out of range"))?,
        );
        draw_filled_circle_mut(canvas, center, style.radius, color);
    }
    Ok(())
}

/// Scan `gray` and return the bright points together with an annotated copy
/// of `color`. The source colour image is left untouched.
pub fn annotate_bright_points(
    gray: &GrayImage,
    color: &RgbImage,
    cutoff: u8,
    style: &MarkerStyle,
) -> AnalysisResult<(Vec<BrightPoint>, RgbImage)> {
    if gray.dimensions() != color.dimensions() {
        return Err(AnalysisError::vision(
            "bright point scan",
            format!(
                "grayscale {:?} and colour {:?} dimensions differ",
                gray.dimensions(),
                color.dimensions()
            ),
        ));
    }

    let points = scan_bright_points(gray, cutoff);
    let mut canvas = color.clone();
    draw_markers(&mut canvas, &points, style)?;
    Ok((points, canvas))
}
