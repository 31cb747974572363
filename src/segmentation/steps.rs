use crate::pipeline::{Frame, MetadataValue, PipelineContext, PipelineStep, lineage_filename};
use crate::segmentation::{contours, postprocess, preprocessing, validation};
use crate::segmentation::{FusionParams, segment_candidates};
use anyhow::Result;

fn resolve_max_area(max_area: Option<f64>, frame: &Frame) -> f64 {
    let (width, height) = frame.dimensions();
    max_area.unwrap_or(width as f64 * height as f64)
}

/// Coarse object localization: thresholded morphological gradient,
/// with components outside the area range erased
pub struct CoarseLocalizationStep {
    pub se_size: u32,
    pub min_area: f64,
    pub max_area: Option<f64>,
}

impl PipelineStep for CoarseLocalizationStep {
    fn process(&self, frame: Frame, context: &PipelineContext) -> Result<Frame> {
        let max_area = resolve_max_area(self.max_area, &frame);

        let gradient = preprocessing::morphological_gradient(&frame.gray, self.se_size);
        let mut mask =
            preprocessing::threshold_binary(&gradient, preprocessing::GRADIENT_LEVEL as i32);
        context.save_debug_image(frame.step_index, self.name(), "gradient.png", &mask)?;

        let erased = contours::filter_by_area(&mut mask, self.min_area, max_area);
        let candidates = contours::find_external_contours(&mask).len();

        if context.verbose {
            tracing::info!("  → {} candidates ({} rejected by area)", candidates, erased);
        }

        Ok(frame
            .with_mask(mask)
            .with_metadata("candidates", MetadataValue::Int(candidates as i64)))
    }

    fn name(&self) -> &str {
        "Coarse Localization"
    }
}

/// Per-candidate double local thresholding merged by histogram backprojection.
/// Consumes the coarse mask and produces the fused foreground mask.
pub struct LocalThresholdStep {
    pub params: FusionParams,
}

impl PipelineStep for LocalThresholdStep {
    fn process(&self, frame: Frame, context: &PipelineContext) -> Result<Frame> {
        let candidates = contours::find_external_contours(&frame.mask);
        let step_index = frame.step_index;
        let name = self.name();

        let foreground = segment_candidates(
            &frame.gray,
            &candidates,
            &self.params,
            |idx, trace| {
                let lineage = [idx + 1];
                context.save_debug_image(
                    step_index,
                    name,
                    &lineage_filename(&lineage, "region", "png"),
                    trace.region,
                )?;
                if let (Some(high), Some(low), Some(fused)) = (trace.high, trace.low, trace.fused) {
                    for (label, img) in [("high", high), ("low", low), ("fused", fused)] {
                        context.save_debug_image(
                            step_index,
                            name,
                            &lineage_filename(&lineage, label, "png"),
                            img,
                        )?;
                    }
                }
                Ok(())
            },
        )?;

        let pixels = preprocessing::count_foreground(&foreground);
        if context.verbose {
            tracing::info!(
                "  → {} foreground pixels from {} candidates",
                pixels,
                candidates.len()
            );
        }

        Ok(frame
            .with_mask(foreground)
            .with_metadata("fused_pixels", MetadataValue::Int(pixels as i64)))
    }

    fn name(&self) -> &str {
        "Local Threshold"
    }
}

/// Keep components whose area and intensity variance pass the thresholds
pub struct AreaVarianceFilterStep {
    pub se_size: u32,
    pub min_area: f64,
    pub max_area: Option<f64>,
    pub min_var: f64,
}

impl PipelineStep for AreaVarianceFilterStep {
    fn process(&self, frame: Frame, context: &PipelineContext) -> Result<Frame> {
        let max_area = resolve_max_area(self.max_area, &frame);
        let (mask, kept) = validation::threshold_by_area_var(
            &frame.gray,
            &frame.mask,
            self.se_size,
            self.min_area,
            max_area,
            self.min_var,
        );

        if context.verbose {
            tracing::info!("  → {} components pass area and variance", kept);
        }

        Ok(frame
            .with_mask(mask)
            .with_metadata("validated_components", MetadataValue::Int(kept as i64)))
    }

    fn name(&self) -> &str {
        "Area Variance Filter"
    }
}

/// Morphological smoothing: close, open, close
pub struct PostProcessStep {
    pub se_size: u32,
}

impl PipelineStep for PostProcessStep {
    fn process(&self, frame: Frame, _context: &PipelineContext) -> Result<Frame> {
        let mask = postprocess::post_process(&frame.mask, self.se_size);
        Ok(frame.with_mask(mask))
    }

    fn name(&self) -> &str {
        "Post Processing"
    }
}

/// Final pass dropping components that smoothing pushed outside the area range
pub struct AreaFilterStep {
    pub min_area: f64,
    pub max_area: Option<f64>,
}

impl PipelineStep for AreaFilterStep {
    fn process(&self, mut frame: Frame, context: &PipelineContext) -> Result<Frame> {
        let max_area = resolve_max_area(self.max_area, &frame);
        let erased = contours::filter_by_area(&mut frame.mask, self.min_area, max_area);
        let kept = contours::find_external_contours(&frame.mask).len();

        if context.verbose {
            tracing::info!("  → {} components kept ({} erased)", kept, erased);
        }

        Ok(frame.with_metadata("components", MetadataValue::Int(kept as i64)))
    }

    fn name(&self) -> &str {
        "Area Filter"
    }
}
