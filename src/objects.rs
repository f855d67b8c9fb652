//! External object extraction from a binary mask.
//!
//! Foreground pixels are grouped with 8-connectivity and the background with
//! 4-connectivity. Background regions that cannot reach the image border are
//! holes; they are filled into the surrounding object before labelling, so
//! each reported object covers the full interior of its outer boundary and
//! anything nested inside a hole is absorbed rather than reported separately.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::{HashMap, HashSet};

use crate::models::{ObjectStat, PixelCoord};

const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

/// Raw raster moments accumulated for one labelled region
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RasterMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl RasterMoments {
    fn add_pixel(&mut self, x: u32, y: u32) {
        self.m00 += 1.0;
        self.m10 += x as f64;
        self.m01 += y as f64;
    }

    /// Floor-truncated centroid, `None` for a degenerate (zero-area) region.
    pub fn centroid(&self) -> Option<PixelCoord> {
        if self.m00 == 0.0 {
            return None;
        }
        Some(PixelCoord {
            x: (self.m10 / self.m00).floor() as u32,
            y: (self.m01 / self.m00).floor() as u32,
        })
    }
}

/// Find external objects in `mask` and compute their centroid and area.
///
/// Any non-zero mask value counts as foreground. Objects come back in raster
/// order of each object's first pixel (top-most row, then left-most column).
pub fn extract_objects(mask: &GrayImage) -> Vec<ObjectStat> {
    // connected_components cannot label a single-pixel image
    if let Some(lit) = single_pixel(mask) {
        return if lit {
            vec![ObjectStat {
                center: PixelCoord { x: 0, y: 0 },
                area: 1.0,
            }]
        } else {
            Vec::new()
        };
    }

    let filled = fill_holes(mask);
    let labels = connected_components(&filled, Connectivity::Eight, Luma([BACKGROUND]));

    let moments = accumulate_moments(&labels);
    let objects: Vec<ObjectStat> = moments
        .iter()
        .filter_map(|(_, m)| {
            m.centroid().map(|center| ObjectStat {
                center,
                area: m.m00,
            })
        })
        .collect();

    tracing::debug!("🔭 Extracted {} external objects", objects.len());
    objects
}

/// `Some(is_foreground)` for a 1x1 mask, `None` otherwise.
fn single_pixel(mask: &GrayImage) -> Option<bool> {
    if mask.dimensions() != (1, 1) {
        return None;
    }
    Some(mask.get_pixel(0, 0)[0] != BACKGROUND)
}

/// Moments per non-zero label, in the order each label is first met while
/// scanning rows top to bottom.
pub fn accumulate_moments(
    labels: &ImageBuffer<Luma<u32>, Vec<u32>>,
) -> Vec<(u32, RasterMoments)> {
    let mut slots: HashMap<u32, usize> = HashMap::new();
    let mut moments: Vec<(u32, RasterMoments)> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label[0];
        if label == 0 {
            continue;
        }
        let slot = *slots.entry(label).or_insert_with(|| {
            moments.push((label, RasterMoments::default()));
            moments.len() - 1
        });
        moments[slot].1.add_pixel(x, y);
    }
    moments
}

/// Return a copy of `mask` with every enclosed background region set to
/// foreground.
pub fn fill_holes(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 || single_pixel(mask).is_some() {
        return mask.clone();
    }

    // Label the background: invert so sky becomes the labelled value.
    let inverted = GrayImage::from_fn(width, height, |x, y| {
        if mask.get_pixel(x, y)[0] == BACKGROUND {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    });
    let sky_labels = connected_components(&inverted, Connectivity::Four, Luma([BACKGROUND]));

    let mut outside: HashSet<u32> = HashSet::new();
    for x in 0..width {
        outside.insert(sky_labels.get_pixel(x, 0)[0]);
        outside.insert(sky_labels.get_pixel(x, height - 1)[0]);
    }
    for y in 0..height {
        outside.insert(sky_labels.get_pixel(0, y)[0]);
        outside.insert(sky_labels.get_pixel(width - 1, y)[0]);
    }

    GrayImage::from_fn(width, height, |x, y| {
        if mask.get_pixel(x, y)[0] != BACKGROUND {
            return Luma([FOREGROUND]);
        }
        let label = sky_labels.get_pixel(x, y)[0];
        if outside.contains(&label) {
            Luma([BACKGROUND])
        } else {
            Luma([FOREGROUND])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with(width: u32, height: u32, lit: impl Fn(u32, u32) -> bool) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if lit(x, y) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_black_mask_has_no_objects() {
        let mask = GrayImage::new(32, 32);
        assert!(extract_objects(&mask).is_empty());
    }

    #[test]
    fn test_single_square() {
        let mask = mask_with(50, 50, |x, y| (20..30).contains(&x) && (20..30).contains(&y));
        let objects = extract_objects(&mask);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].area, 100.0);
        // mean of 20..=29 is 24.5
        assert_eq!(objects[0].center, PixelCoord { x: 24, y: 24 });
    }

    #[test]
    fn test_single_pixel_object() {
        let mask = mask_with(9, 9, |x, y| x == 4 && y == 7);
        let objects = extract_objects(&mask);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].area, 1.0);
        assert_eq!(objects[0].center, PixelCoord { x: 4, y: 7 });
    }

    #[test]
    fn test_separate_objects_in_raster_order() {
        let mask = mask_with(40, 40, |x, y| {
            let lower_left = (2..6).contains(&x) && (30..34).contains(&y);
            let upper_right = (30..33).contains(&x) && (3..6).contains(&y);
            lower_left || upper_right
        });
        let objects = extract_objects(&mask);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].area, 9.0);
        assert_eq!(objects[0].center, PixelCoord { x: 31, y: 4 });
        assert_eq!(objects[1].area, 16.0);
        assert_eq!(objects[1].center, PixelCoord { x: 3, y: 31 });
    }

    #[test]
    fn test_diagonal_neighbours_are_one_object() {
        let mask = mask_with(10, 10, |x, y| x == y && x < 4);
        let objects = extract_objects(&mask);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].area, 4.0);
    }

    #[test]
    fn test_ring_area_includes_hole() {
        let mask = mask_with(30, 30, |x, y| {
            let outer = (10..20).contains(&x) && (10..20).contains(&y);
            let hole = (13..17).contains(&x) && (13..17).contains(&y);
            outer && !hole
        });
        let objects = extract_objects(&mask);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].area, 100.0);
        assert_eq!(objects[0].center, PixelCoord { x: 14, y: 14 });
    }

    #[test]
    fn test_island_inside_hole_is_not_reported() {
        let mask = mask_with(30, 30, |x, y| {
            let outer = (5..25).contains(&x) && (5..25).contains(&y);
            let hole = (8..22).contains(&x) && (8..22).contains(&y);
            let island = (14..16).contains(&x) && (14..16).contains(&y);
            (outer && !hole) || island
        });
        let objects = extract_objects(&mask);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].area, 400.0);
    }

    #[test]
    fn test_border_touching_background_is_not_filled() {
        // U shape open to the top edge: the notch stays background
        let mask = mask_with(10, 10, |x, y| {
            let block = (2..8).contains(&x) && y < 6;
            let notch = (4..6).contains(&x) && y < 4;
            block && !notch
        });
        let filled = fill_holes(&mask);
        assert_eq!(filled.get_pixel(4, 0)[0], 0);
        assert_eq!(filled.get_pixel(5, 3)[0], 0);
        let objects = extract_objects(&mask);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].area, 36.0 - 8.0);
    }

    #[test]
    fn test_one_by_one_masks() {
        let lit = GrayImage::from_pixel(1, 1, Luma([255]));
        assert_eq!(
            extract_objects(&lit),
            vec![ObjectStat {
                center: PixelCoord { x: 0, y: 0 },
                area: 1.0,
            }]
        );
        assert_eq!(fill_holes(&lit), lit);

        let dark = GrayImage::from_pixel(1, 1, Luma([0]));
        assert!(extract_objects(&dark).is_empty());
        assert_eq!(fill_holes(&dark), dark);
    }

    #[test]
    fn test_thin_strips() {
        let row = mask_with(5, 1, |x, _| x >= 2);
        let objects = extract_objects(&row);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].area, 3.0);
        assert_eq!(objects[0].center, PixelCoord { x: 3, y: 0 });

        let column = mask_with(1, 2, |_, y| y == 1);
        let objects = extract_objects(&column);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].center, PixelCoord { x: 0, y: 1 });
    }

    #[test]
    fn test_degenerate_moments_have_no_centroid() {
        assert_eq!(RasterMoments::default().centroid(), None);
    }
}
