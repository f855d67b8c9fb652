use image::RgbImage;
use std::path::Path;

use crate::error::{AnalysisError, AnalysisResult};

/// Decode an image file into an 8-bit RGB buffer.
///
/// The format is guessed from the file contents. Grayscale and alpha layouts
/// are expanded to RGB and 16-bit samples are narrowed to 8 bits by the codec;
/// no resizing or colour management is applied.
pub fn load_rgb(path: &Path) -> AnalysisResult<RgbImage> {
    let image = image::ImageReader::open(path)
        .map_err(|e| AnalysisError::Decode {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(e),
        })?
        .with_guessed_format()
        .map_err(|e| AnalysisError::Decode {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(e),
        })?
        .decode()
        .map_err(|source| AnalysisError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let rgb = image.into_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(AnalysisError::vision(
            "load",
            format!("image has no pixels ({}x{})", rgb.width(), rgb.height()),
        ));
    }

    tracing::debug!(
        "📷 Decoded {} ({}x{})",
        path.display(),
        rgb.width(),
        rgb.height()
    );
    Ok(rgb)
}
