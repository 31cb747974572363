use anyhow::Result;
use image::GrayImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Data that flows through the pipeline.
/// One frame: the grayscale input and the working mask the stages refine.
#[derive(Clone)]
pub struct Frame {
    /// The grayscale input (shared, never modified by the stages)
    pub gray: Arc<GrayImage>,

    /// Current binary mask, same dimensions as `gray`
    pub mask: GrayImage,

    /// Index of the step about to run (0 before the first step)
    pub step_index: usize,

    /// Per-stage statistics (e.g., "candidates", "kept_components")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Float(f64),
    String(String),
    Int(i64),
}

impl Frame {
    /// Create a frame with an empty mask
    pub fn from_gray(gray: GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        Self {
            gray: Arc::new(gray),
            mask: GrayImage::new(width, height),
            step_index: 0,
            metadata: HashMap::new(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.gray.dimensions()
    }

    /// True when the frame has no pixels at all
    pub fn is_empty(&self) -> bool {
        let (width, height) = self.dimensions();
        width == 0 || height == 0
    }

    /// Same frame with a new working mask
    pub fn with_mask(mut self, mask: GrayImage) -> Self {
        self.mask = mask;
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get metadata as int
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as float
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as bool
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    fn debug_dir(&self) -> Option<&Path> {
        self.debug
            .as_ref()
            .filter(|d| d.enabled)
            .map(|d| d.output_dir.as_path())
    }

    /// Directory name for a step's outputs, e.g. "02_local_threshold"
    pub fn step_dir_name(step_index: usize, step_name: &str) -> String {
        format!(
            "{:02}_{}",
            step_index + 1,
            step_name.to_lowercase().replace(' ', "_")
        )
    }

    /// Save an intermediate image under the step's directory if debug mode is enabled
    pub fn save_debug_image(
        &self,
        step_index: usize,
        step_name: &str,
        filename: &str,
        image: &GrayImage,
    ) -> Result<()> {
        let Some(root) = self.debug_dir() else {
            return Ok(());
        };

        let step_dir_name = Self::step_dir_name(step_index, step_name);
        let step_dir = root.join(&step_dir_name);
        std::fs::create_dir_all(&step_dir)?;

        let output_path = step_dir.join(filename);
        image
            .save(&output_path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;

        if self.verbose {
            tracing::info!("Debug: saved {}/{}", step_dir_name, filename);
        }
        Ok(())
    }

    fn save_input(&self, gray: &GrayImage) -> Result<()> {
        let Some(root) = self.debug_dir() else {
            return Ok(());
        };
        let input_dir = root.join("00_input");
        std::fs::create_dir_all(&input_dir)?;
        gray.save(input_dir.join("01.png"))
            .map_err(|e| anyhow::anyhow!("Failed to save debug input: {}", e))?;
        if self.verbose {
            tracing::info!("Debug: saved 00_input/01.png");
        }
        Ok(())
    }
}

/// Generate a lineage-style file name, e.g. `[3]` + "high" -> "03-high.png"
pub fn lineage_filename(lineage: &[usize], label: &str, extension: &str) -> String {
    let ids: Vec<String> = lineage.iter().map(|id| format!("{:02}", id)).collect();
    if ids.is_empty() {
        format!("{}.{}", label, extension)
    } else {
        format!("{}-{}.{}", ids.join("-"), label, extension)
    }
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Consume the frame and return it with an updated mask
    fn process(&self, frame: Frame, context: &PipelineContext) -> Result<Frame>;

    /// Human-readable name for this step (used in logs and debug directories)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.context.debug = Some(prepare_debug_dir(output_dir)?);
        Ok(self)
    }

    /// Use an already prepared debug configuration
    pub fn with_debug_config(mut self, debug: Option<DebugConfig>) -> Self {
        self.context.debug = debug;
        self
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Run every step on one grayscale frame
    pub fn run(&self, gray: GrayImage) -> Result<Frame> {
        self.run_partial(gray, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging).
    /// An empty frame is returned untouched.
    pub fn run_partial(&self, gray: GrayImage, num_steps: usize) -> Result<Frame> {
        let mut frame = Frame::from_gray(gray);
        if frame.is_empty() {
            tracing::debug!("empty frame, nothing to segment");
            return Ok(frame);
        }

        self.context.save_input(&frame.gray)?;

        for (step_idx, step) in self.steps.iter().enumerate().take(num_steps) {
            let step_name = step.name();
            if self.context.verbose {
                tracing::info!("Running step {}: {}", step_idx + 1, step_name);
            }

            frame.step_index = step_idx;
            frame = step.process(frame, &self.context)?;

            self.context
                .save_debug_image(step_idx, step_name, "01.png", &frame.mask)?;
        }

        Ok(frame)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a debug output directory: it must be empty or absent (then it is created)
pub fn prepare_debug_dir(output_dir: PathBuf) -> Result<DebugConfig> {
    if output_dir.exists() {
        let entries = std::fs::read_dir(&output_dir)?;
        if entries.count() > 0 {
            return Err(anyhow::anyhow!(
                "Debug directory is not empty: {}",
                output_dir.display()
            ));
        }
    } else {
        std::fs::create_dir_all(&output_dir)?;
    }

    Ok(DebugConfig {
        output_dir,
        enabled: true,
    })
}
