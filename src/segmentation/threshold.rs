//! Otsu-style threshold search restricted to a region of interest, and the
//! high/low threshold pair derived from it.

use image::GrayImage;
use imageproc::filter::median_filter;

use super::preprocessing::{apply_mask, threshold_binary};

/// Result of the threshold search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OtsuSplit {
    /// First intensity of the upper class
    pub threshold: i32,
    /// Mean intensity of the lower class at the chosen split
    pub lower_mean: f64,
}

/// High (strict) and low (permissive) threshold levels for one region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPair {
    pub high: i32,
    pub low: i32,
}

/// 256-bin intensity histogram of the pixels where `roi` is non-zero
pub fn roi_histogram(gray: &GrayImage, roi: &GrayImage) -> [f64; 256] {
    let mut hist = [0.0; 256];
    for (p, m) in gray.pixels().zip(roi.pixels()) {
        if m[0] > 0 {
            hist[p[0] as usize] += 1.0;
        }
    }
    hist
}

/// Threshold search over the pixels selected by `roi`, splits in `(lower, upper)`
pub fn otsu_threshold(
    gray: &GrayImage,
    roi: &GrayImage,
    lower: u8,
    upper: u8,
) -> Option<OtsuSplit> {
    otsu_threshold_from_histogram(&roi_histogram(gray, roi), lower, upper)
}

/// Maximise `w1 * w2 * (u1 - u2)^2` over splits `i` with `lower < i < upper`.
///
/// The lower class covers `[lower, i)`, the upper class `[i, upper]`. Splits
/// leaving either class empty are skipped; `None` means no split had two
/// populated classes. Ties keep the first (smallest) split.
pub fn otsu_threshold_from_histogram(
    hist: &[f64; 256],
    lower: u8,
    upper: u8,
) -> Option<OtsuSplit> {
    let (lower, upper) = (lower as usize, upper as usize);
    if upper <= lower + 1 {
        return None;
    }

    let total: f64 = hist.iter().sum();
    if total <= 0.0 {
        return None;
    }

    // running sums of the lower class, full sums of [lower, upper]
    let range_mass: f64 = hist[lower..=upper].iter().sum();
    let range_moment: f64 = (lower..=upper).map(|j| j as f64 * hist[j]).sum();
    let mut mass1 = 0.0;
    let mut moment1 = 0.0;

    let mut best: Option<(f64, OtsuSplit)> = None;
    for i in lower + 1..upper {
        mass1 += hist[i - 1];
        moment1 += (i - 1) as f64 * hist[i - 1];
        let mass2 = range_mass - mass1;
        if mass1 <= 0.0 || mass2 <= 0.0 {
            continue;
        }

        let w1 = mass1 / total;
        let w2 = 1.0 - w1;
        let u1 = moment1 / mass1;
        let u2 = (range_moment - moment1) / mass2;
        let score = w1 * w2 * (u1 - u2) * (u1 - u2);

        if best.is_none_or(|(max, _)| score > max) {
            best = Some((
                score,
                OtsuSplit {
                    threshold: i as i32,
                    lower_mean: u1,
                },
            ));
        }
    }

    best.map(|(_, split)| split)
}

impl ThresholdPair {
    /// `t - trunc(p * (t - u1))` for both offsets, `u1` rounded to the nearest level
    pub fn from_split(split: &OtsuSplit, p_high: f64, p_low: f64) -> Self {
        let t = split.threshold;
        let u = (split.lower_mean + 0.5).floor() as i32;
        let gap = (t - u) as f64;
        Self {
            high: t - (p_high * gap) as i32,
            low: t - (p_low * gap) as i32,
        }
    }
}

/// High and low foreground masks of one local region.
///
/// Pixels outside `roi` are zeroed before thresholding, and each mask is
/// smoothed with a 3x3 median. Returns `None` when the region holds no
/// usable split (empty or single-valued).
pub fn double_local_threshold(
    gray: &GrayImage,
    roi: &GrayImage,
    p_high: f64,
    p_low: f64,
) -> Option<(GrayImage, GrayImage, ThresholdPair)> {
    let split = otsu_threshold(gray, roi, 0, 255)?;
    let levels = ThresholdPair::from_split(&split, p_high, p_low);

    let masked = apply_mask(gray, roi);
    let high = median_filter(&threshold_binary(&masked, levels.high), 1, 1);
    let low = median_filter(&threshold_binary(&masked, levels.low), 1, 1);

    tracing::debug!(
        threshold = split.threshold,
        lower_mean = split.lower_mean,
        high = levels.high,
        low = levels.low,
        "local threshold"
    );

    Some((high, low, levels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_truncates_offsets_toward_threshold() {
        let split = OtsuSplit {
            threshold: 100,
            lower_mean: 39.6,
        };
        // gap = 100 - 40 = 60, 0.25 * 60 = 15
        let pair = ThresholdPair::from_split(&split, 0.25, 1.0);
        assert_eq!(pair, ThresholdPair { high: 85, low: 40 });
        // 0.1 * 55 = 5.5 truncates to 5
        let split = OtsuSplit {
            threshold: 100,
            lower_mean: 45.0,
        };
        assert_eq!(ThresholdPair::from_split(&split, 0.1, 0.5).high, 95);
    }

    #[test]
    fn narrow_range_has_no_split() {
        let mut hist = [0.0; 256];
        hist[10] = 5.0;
        hist[11] = 5.0;
        assert_eq!(otsu_threshold_from_histogram(&hist, 10, 11), None);
    }
}
