//! Merge of the high and low candidate masks by ratio-histogram backprojection.

use image::{GrayImage, ImageBuffer, Luma};

/// Real-valued per-pixel likelihood map
pub type BackprojectionMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Histogram bucket of an intensity for `bins` equal-width bins over 0..=255
pub fn bin_of(value: u8, bins: usize) -> usize {
    value as usize * bins / 256
}

/// Intensity histogram of `gray` under the non-zero pixels of `mask`
pub fn masked_histogram(gray: &GrayImage, mask: &GrayImage, bins: usize) -> Vec<f64> {
    let mut hist = vec![0.0; bins];
    for (p, m) in gray.pixels().zip(mask.pixels()) {
        if m[0] > 0 {
            hist[bin_of(p[0], bins)] += 1.0;
        }
    }
    hist
}

/// Element-wise `high / low`, truncated to 1.0. Empty `low` bins give 0.
pub fn ratio_histogram(high: &[f64], low: &[f64]) -> Vec<f64> {
    high.iter()
        .zip(low)
        .map(|(&h, &l)| if l > 0.0 { (h / l).min(1.0) } else { 0.0 })
        .collect()
}

/// Replace each pixel by the histogram value of its intensity bucket
pub fn backproject(gray: &GrayImage, hist: &[f64]) -> BackprojectionMap {
    let bins = hist.len();
    let lut: [f32; 256] = std::array::from_fn(|v| hist[bin_of(v as u8, bins)] as f32);
    let (width, height) = gray.dimensions();
    ImageBuffer::from_fn(width, height, |x, y| {
        Luma([lut[gray.get_pixel(x, y)[0] as usize]])
    })
}

/// Binary mask of map values strictly above `theta` (compared at map precision)
pub fn threshold_map(map: &BackprojectionMap, theta: f64) -> GrayImage {
    let theta = theta as f32;
    let (width, height) = map.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if map.get_pixel(x, y)[0] > theta {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// OR `src` into `dst`, touching only pixels where `region` is non-zero.
/// Returns the number of pixels newly set.
pub fn merge_within(dst: &mut GrayImage, src: &GrayImage, region: &GrayImage) -> usize {
    let mut added = 0;
    for ((d, s), r) in dst.pixels_mut().zip(src.pixels()).zip(region.pixels()) {
        if r[0] > 0 && s[0] > 0 && d[0] == 0 {
            *d = Luma([255]);
            added += 1;
        }
    }
    added
}

/// Fuse one region's high/low masks into the foreground accumulator.
///
/// Returns the thresholded backprojection (before the region restriction)
/// together with the number of foreground pixels it added.
pub fn update_by_backprojection(
    gray: &GrayImage,
    high: &GrayImage,
    low: &GrayImage,
    foreground: &mut GrayImage,
    region: &GrayImage,
    bins: usize,
    theta: f64,
) -> (GrayImage, usize) {
    let ratio = ratio_histogram(
        &masked_histogram(gray, high, bins),
        &masked_histogram(gray, low, bins),
    );
    let fused = threshold_map(&backproject(gray, &ratio), theta);
    let added = merge_within(foreground, &fused, region);
    (fused, added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_cover_full_range() {
        assert_eq!(bin_of(0, 16), 0);
        assert_eq!(bin_of(15, 16), 0);
        assert_eq!(bin_of(16, 16), 1);
        assert_eq!(bin_of(255, 16), 15);
        assert_eq!(bin_of(255, 1), 0);
        assert_eq!(bin_of(255, 256), 255);
    }

    #[test]
    fn ratio_is_clipped_and_guarded() {
        let ratio = ratio_histogram(&[4.0, 2.0, 3.0, 0.0], &[2.0, 4.0, 0.0, 0.0]);
        assert_eq!(ratio, vec![1.0, 0.5, 0.0, 0.0]);
    }
}
