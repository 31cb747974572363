pub mod contours;
pub mod fusion;
pub mod morphology;
pub mod postprocess;
pub mod preprocessing;
pub mod region;
pub mod steps;
pub mod threshold;
pub mod validation;

use anyhow::Result;
use image::{DynamicImage, GrayImage};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::SegmentationConfig;
use crate::models::Contour;
use crate::pipeline::{DebugConfig, Frame, Pipeline, prepare_debug_dir};
use region::{RegionMask, local_region};

/// Parameters of the per-candidate threshold-and-fuse loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionParams {
    pub p_high: f64,
    pub p_low: f64,
    pub theta: f64,
    pub bin_count: usize,
}

impl From<&SegmentationConfig> for FusionParams {
    fn from(config: &SegmentationConfig) -> Self {
        Self {
            p_high: config.p_high,
            p_low: config.p_low,
            theta: config.theta,
            bin_count: config.bin_count,
        }
    }
}

/// Intermediate masks of one candidate, handed to the loop's observer.
/// `high`, `low` and `fused` are `None` when the region had no usable split.
pub struct CandidateTrace<'a> {
    pub contour: &'a Contour,
    pub region: &'a GrayImage,
    pub high: Option<&'a GrayImage>,
    pub low: Option<&'a GrayImage>,
    pub fused: Option<&'a GrayImage>,
    pub added_pixels: usize,
}

/// Double local thresholding over every candidate, in order.
///
/// Each candidate's enlarged PCA ellipse is admitted into the shared region
/// mask, thresholded and fused into the foreground accumulator, then retired
/// before the next candidate is looked at. `observe` sees every candidate
/// while its region is still admitted; an error from it aborts the loop.
pub fn segment_candidates(
    gray: &GrayImage,
    candidates: &[Contour],
    params: &FusionParams,
    mut observe: impl FnMut(usize, &CandidateTrace<'_>) -> Result<()>,
) -> Result<GrayImage> {
    let (width, height) = gray.dimensions();
    let mut foreground = GrayImage::new(width, height);
    let mut regions = RegionMask::new(width, height);

    for (idx, contour) in candidates.iter().enumerate() {
        let region = local_region(&contour.oriented_box());
        regions.admit(&region);

        let local = threshold::double_local_threshold(
            gray,
            regions.as_image(),
            params.p_high,
            params.p_low,
        );

        match local {
            Some((high, low, _levels)) => {
                let (fused, added) = fusion::update_by_backprojection(
                    gray,
                    &high,
                    &low,
                    &mut foreground,
                    regions.as_image(),
                    params.bin_count,
                    params.theta,
                );
                tracing::debug!(
                    candidate = idx,
                    center = ?region.center,
                    width = region.width,
                    height = region.height,
                    angle = region.angle,
                    added,
                    "candidate fused"
                );
                observe(
                    idx,
                    &CandidateTrace {
                        contour,
                        region: regions.as_image(),
                        high: Some(&high),
                        low: Some(&low),
                        fused: Some(&fused),
                        added_pixels: added,
                    },
                )?;
            }
            None => {
                tracing::debug!(candidate = idx, "region has no usable split, skipped");
                observe(
                    idx,
                    &CandidateTrace {
                        contour,
                        region: regions.as_image(),
                        high: None,
                        low: None,
                        fused: None,
                        added_pixels: 0,
                    },
                )?;
            }
        }

        regions.retire(&region);
    }

    Ok(foreground)
}

/// Foreground extraction orchestrator
pub struct ForegroundExtractor {
    config: SegmentationConfig,
    verbose: bool,
    debug: Option<DebugConfig>,
}

impl ForegroundExtractor {
    /// Validate `config` and build an extractor around it
    pub fn new(config: SegmentationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            verbose: false,
            debug: None,
        })
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Save intermediate masks under `output_dir` (must be empty or absent)
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.debug = Some(prepare_debug_dir(output_dir)?);
        Ok(self)
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// The stage sequence: coarse localization, local thresholding,
    /// area/variance validation, post-processing, final area filter
    pub fn pipeline(&self) -> Pipeline {
        use steps::*;
        let c = &self.config;

        Pipeline::new()
            .with_verbose(self.verbose)
            .with_debug_config(self.debug.clone())
            .add_step(Arc::new(CoarseLocalizationStep {
                se_size: c.grad_se_size,
                min_area: c.min_area,
                max_area: c.max_area,
            }))
            .add_step(Arc::new(LocalThresholdStep {
                params: FusionParams::from(c),
            }))
            .add_step(Arc::new(AreaVarianceFilterStep {
                se_size: c.area_se_size,
                min_area: c.min_area,
                max_area: c.max_area,
                min_var: c.min_var,
            }))
            .add_step(Arc::new(PostProcessStep {
                se_size: c.post_se_size,
            }))
            .add_step(Arc::new(AreaFilterStep {
                min_area: c.min_area,
                max_area: c.max_area,
            }))
    }

    /// Segment a frame of any color type; color input is reduced to luma first
    pub fn extract_foreground(&self, img: &DynamicImage) -> Result<GrayImage> {
        self.extract_foreground_gray(&preprocessing::to_grayscale(img))
    }

    pub fn extract_foreground_gray(&self, gray: &GrayImage) -> Result<GrayImage> {
        Ok(self.run(gray.clone())?.mask)
    }

    /// Run the full pipeline and keep the frame's stage statistics
    pub fn run(&self, gray: GrayImage) -> Result<Frame> {
        let (width, height) = gray.dimensions();
        let frame = self.pipeline().run(gray)?;
        tracing::info!(
            width,
            height,
            candidates = frame.get_int("candidates").unwrap_or(0),
            components = frame.get_int("components").unwrap_or(0),
            "frame segmented"
        );
        Ok(frame)
    }
}
