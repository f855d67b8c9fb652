use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{
    EncodableLayout, ExtendedColorType, ImageBuffer, ImageEncoder, ImageError, PixelWithColorType,
};
use std::fs::File;
use std::io::BufWriter;
use std::ops::Deref;
use std::path::Path;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::OutputPaths;

pub const MASK_FILE_NAME: &str = "processed_image.png";
pub const ANNOTATED_FILE_NAME: &str = "image_with_bright_points.png";

/// Derive the two output paths for the image at `index` in a batch of
/// `batch_len` images.
///
/// A batch of one keeps the fixed legacy names. Larger batches prefix both
/// names with the input stem and 1-based position so concurrent workers never
/// write to the same file.
pub fn output_paths(dir: &Path, index: usize, input: &Path, batch_len: usize) -> OutputPaths {
    if batch_len <= 1 {
        return OutputPaths {
            mask: dir.join(MASK_FILE_NAME),
            annotated: dir.join(ANNOTATED_FILE_NAME),
        };
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().replace(['.', ' '], "_"))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());
    let prefix = format!("{}_{}", stem, index + 1);

    OutputPaths {
        mask: dir.join(format!("{}_{}", prefix, MASK_FILE_NAME)),
        annotated: dir.join(format!("{}_{}", prefix, ANNOTATED_FILE_NAME)),
    }
}

/// Encode `image` as PNG at `path`, replacing any existing file.
pub fn write_png<P, C>(image: &ImageBuffer<P, C>, path: &Path) -> AnalysisResult<()>
where
    P: PixelWithColorType,
    [P::Subpixel]: EncodableLayout,
    C: Deref<Target = [P::Subpixel]>,
{
    let to_write_error = |source: ImageError| AnalysisError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(|e| to_write_error(ImageError::IoError(e)))?;
    let writer = BufWriter::new(file);
    let encoder =
        PngEncoder::new_with_quality(writer, CompressionType::Default, FilterType::Adaptive);

    let color: ExtendedColorType = P::COLOR_TYPE;
    encoder
        .write_image(image.as_raw().as_bytes(), image.width(), image.height(), color)
        .map_err(to_write_error)?;

    tracing::info!("💾 Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_single_image_uses_fixed_names() {
        let paths = output_paths(Path::new("out"), 0, Path::new("data/galaxy.tif"), 1);
        assert_eq!(paths.mask, PathBuf::from("out/processed_image.png"));
        assert_eq!(
            paths.annotated,
            PathBuf::from("out/image_with_bright_points.png")
        );
    }

    #[test]
    fn test_batch_names_are_unique_per_image() {
        let a = output_paths(Path::new("."), 0, Path::new("a/galaxy.tif"), 2);
        let b = output_paths(Path::new("."), 1, Path::new("b/galaxy.tif"), 2);
        assert_eq!(a.mask, PathBuf::from("./galaxy_1_processed_image.png"));
        assert_eq!(
            b.annotated,
            PathBuf::from("./galaxy_2_image_with_bright_points.png")
        );
        assert_ne!(a.mask, b.mask);
        assert_ne!(a.annotated, b.annotated);
    }

    #[test]
    fn test_batch_name_sanitizes_stem() {
        let paths = output_paths(Path::new("."), 4, Path::new("m 31.v2.tif"), 6);
        assert_eq!(paths.mask, PathBuf::from("./m_31_v2_5_processed_image.png"));
    }

    #[test]
    fn test_write_png_roundtrip_and_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MASK_FILE_NAME);
        std::fs::write(&path, b"stale").unwrap();

        let mut mask = GrayImage::new(8, 8);
        mask.put_pixel(3, 3, Luma([255]));
        write_png(&mask, &path).unwrap();

        let loaded = image::open(&path).unwrap().into_luma8();
        assert_eq!(loaded, mask);
    }

    #[test]
    fn test_unwritable_destination_is_write_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing_dir").join("mask.png");
        let err = write_png(&GrayImage::new(2, 2), &path).unwrap_err();
        assert_eq!(err.kind(), crate::models::FailureKind::Write);
        assert!(err.to_string().contains("mask.png"));
    }
}
