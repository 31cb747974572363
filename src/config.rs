use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of the double local thresholding segmentation.
///
/// Immutable once handed to a [`crate::ForegroundExtractor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Smallest accepted object area in pixels
    pub min_area: f64,
    /// Largest accepted object area in pixels (None means the frame's pixel count)
    pub max_area: Option<f64>,
    /// Minimum intensity variance of an accepted object
    pub min_var: f64,
    /// Offset fraction of the strict (high) threshold
    pub p_high: f64,
    /// Offset fraction of the permissive (low) threshold
    pub p_low: f64,
    /// Backprojection acceptance level
    pub theta: f64,
    /// Number of histogram bins used for mask fusion
    pub bin_count: usize,
    /// Structuring element size of the coarse morphological gradient
    pub grad_se_size: u32,
    /// Structuring element size of the closing applied before validation
    pub area_se_size: u32,
    /// Structuring element size of the post-processing filters
    pub post_se_size: u32,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_area: 1000.0,
            max_area: None,
            min_var: 30.0,
            p_high: 0.7,
            p_low: 1.0,
            theta: 0.3,
            bin_count: 16,
            grad_se_size: 5,
            area_se_size: 7,
            post_se_size: 5,
        }
    }
}

impl SegmentationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a (possibly partial) configuration from a JSON file.
    /// Missing fields keep their default values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_area_range(mut self, min_area: f64, max_area: Option<f64>) -> Self {
        self.min_area = min_area;
        self.max_area = max_area;
        self
    }

    pub fn with_min_var(mut self, min_var: f64) -> Self {
        self.min_var = min_var;
        self
    }

    pub fn with_offsets(mut self, p_high: f64, p_low: f64) -> Self {
        self.p_high = p_high;
        self.p_low = p_low;
        self
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_bin_count(mut self, bin_count: usize) -> Self {
        self.bin_count = bin_count;
        self
    }

    pub fn with_se_sizes(mut self, grad: u32, area: u32, post: u32) -> Self {
        self.grad_se_size = grad;
        self.area_se_size = area;
        self.post_se_size = post;
        self
    }

    /// Upper area bound for a frame with the given dimensions
    pub fn max_area_for(&self, width: u32, height: u32) -> f64 {
        self.max_area
            .unwrap_or(width as f64 * height as f64)
    }

    /// Check every parameter, failing with a descriptive message on the first violation
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min_area.is_finite() && self.min_area >= 0.0,
            "min_area must be a non-negative number, got {}",
            self.min_area
        );
        if let Some(max_area) = self.max_area {
            ensure!(
                max_area.is_finite() && max_area >= 0.0,
                "max_area must be a non-negative number, got {}",
                max_area
            );
            ensure!(
                self.min_area <= max_area,
                "min_area ({}) must not exceed max_area ({})",
                self.min_area,
                max_area
            );
        }
        ensure!(
            self.min_var.is_finite() && self.min_var >= 0.0,
            "min_var must be a non-negative number, got {}",
            self.min_var
        );
        ensure!(
            (0.0..=1.0).contains(&self.p_high),
            "p_high must lie in [0, 1], got {}",
            self.p_high
        );
        ensure!(
            (0.0..=1.0).contains(&self.p_low),
            "p_low must lie in [0, 1], got {}",
            self.p_low
        );
        ensure!(self.theta.is_finite(), "theta must be finite, got {}", self.theta);
        ensure!(
            (1..=256).contains(&self.bin_count),
            "bin_count must lie in 1..=256, got {}",
            self.bin_count
        );
        for (name, size) in [
            ("grad_se_size", self.grad_se_size),
            ("area_se_size", self.area_se_size),
            ("post_se_size", self.post_se_size),
        ] {
            ensure!(size > 0, "{} must be positive", name);
        }

        if self.p_high > self.p_low {
            tracing::warn!(
                p_high = self.p_high,
                p_low = self.p_low,
                "p_high exceeds p_low; the high mask will be the more permissive one"
            );
        }

        Ok(())
    }
}
