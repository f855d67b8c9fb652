//! Grayscale conversion and fixed global thresholding.
//!
//! The luma weights are the BT.601 coefficients in 14-bit fixed point, the
//! same integer formula common vision libraries use for RGB to gray, so a
//! neutral pixel `(v, v, v)` always maps to exactly `v`.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::map::map_pixels;

/// Default cutoff separating objects from sky background
pub const OBJECT_THRESHOLD: u8 = 200;

const LUMA_SHIFT: u32 = 14;
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;

#[inline]
pub fn luma(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    let weighted = LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32;
    ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    map_pixels(image, |p| Luma([luma(&p)]))
}

/// Binary mask: 255 where `gray > cutoff`, 0 elsewhere.
pub fn binary_mask(gray: &GrayImage, cutoff: u8) -> GrayImage {
    threshold(gray, cutoff, ThresholdType::Binary)
}
