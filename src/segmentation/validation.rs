use image::GrayImage;

use super::contours::{fill_contour, find_external_contours, for_each_pixel_in};
use super::morphology::{StructuringElement, close};
use crate::models::Contour;

/// Single-pass mean/variance accumulator (Welford)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance; `None` below two samples
    pub fn sample_variance(&self) -> Option<f64> {
        (self.count >= 2).then(|| self.m2 / (self.count - 1) as f64)
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        for v in iter {
            stats.push(v);
        }
        stats
    }
}

/// Outcome of the checks on one component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentVerdict {
    pub area: f64,
    pub variance: Option<f64>,
    pub pass_area: bool,
    pub pass_variance: bool,
}

impl ComponentVerdict {
    pub fn accepted(&self) -> bool {
        self.pass_area && self.pass_variance
    }
}

/// Intensity statistics of `gray` under the filled contour
pub fn component_stats(gray: &GrayImage, contour: &Contour) -> RunningStats {
    let mut stats = RunningStats::new();
    let (width, height) = gray.dimensions();
    for_each_pixel_in(contour, width, height, |x, y| {
        stats.push(gray.get_pixel(x, y)[0] as f64);
    });
    stats
}

pub fn judge_component(
    gray: &GrayImage,
    contour: &Contour,
    min_area: f64,
    max_area: f64,
    min_var: f64,
) -> ComponentVerdict {
    let area = contour.area();
    let variance = component_stats(gray, contour).sample_variance();
    ComponentVerdict {
        area,
        variance,
        pass_area: area >= min_area && area <= max_area,
        pass_variance: variance.is_some_and(|v| v >= min_var),
    }
}

/// Close the mask with an elliptical element, then erase every component
/// failing the area or variance test. Returns the filtered mask and the
/// number of components kept.
pub fn threshold_by_area_var(
    gray: &GrayImage,
    foreground: &GrayImage,
    se_size: u32,
    min_area: f64,
    max_area: f64,
    min_var: f64,
) -> (GrayImage, usize) {
    let mut out = close(foreground, &StructuringElement::disk(se_size));
    let contours = find_external_contours(&out);

    let mut kept = 0;
    for contour in &contours {
        let verdict = judge_component(gray, contour, min_area, max_area, min_var);
        tracing::debug!(
            area = verdict.area,
            variance = ?verdict.variance,
            accepted = verdict.accepted(),
            "component check"
        );
        if verdict.accepted() {
            kept += 1;
        } else {
            fill_contour(&mut out, contour, 0);
        }
    }

    (out, kept)
}
