use image::{DynamicImage, GrayImage, Luma};

use super::morphology::{StructuringElement, gradient};

/// Fixed level applied to the morphological gradient during coarse localization
pub const GRADIENT_LEVEL: u8 = 20;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Morphological gradient with an elliptical element of the given size
pub fn morphological_gradient(img: &GrayImage, se_size: u32) -> GrayImage {
    gradient(img, &StructuringElement::disk(se_size))
}

/// Map every pixel through a 256-entry lookup table
pub fn apply_lut(img: &GrayImage, lut: &[u8; 256]) -> GrayImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        p[0] = lut[p[0] as usize];
    }
    out
}

/// Lookup table sending values above `level` to 255 and the rest to 0.
/// Levels below zero select everything, levels of 255 or more select nothing.
pub fn binary_lut(level: i32) -> [u8; 256] {
    std::array::from_fn(|v| if v as i32 > level { 255 } else { 0 })
}

/// Binary threshold: `v > level` becomes 255, everything else 0
pub fn threshold_binary(img: &GrayImage, level: i32) -> GrayImage {
    apply_lut(img, &binary_lut(level))
}

/// Zero every pixel where `mask` is zero
pub fn apply_mask(img: &GrayImage, mask: &GrayImage) -> GrayImage {
    let mut out = img.clone();
    for (p, m) in out.pixels_mut().zip(mask.pixels()) {
        if m[0] == 0 {
            *p = Luma([0]);
        }
    }
    out
}

pub fn count_foreground(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] > 0).count()
}
