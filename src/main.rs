use clap::Parser;
use image::ImageReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use dlt_segment::{ForegroundExtractor, SegmentationConfig};

#[derive(Parser)]
#[command(name = "dlt-segment")]
#[command(about = "Extract foreground objects from a grayscale frame by double local thresholding")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Where to write the binary mask (default: seg_<input name> next to the input)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// JSON file with segmentation parameters; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Smallest accepted object area in pixels
    #[arg(long)]
    min_area: Option<f64>,

    /// Largest accepted object area in pixels (default: frame size)
    #[arg(long)]
    max_area: Option<f64>,

    /// Minimum intensity variance of an accepted object
    #[arg(long)]
    min_var: Option<f64>,

    /// Offset fraction of the high threshold
    #[arg(long)]
    p_high: Option<f64>,

    /// Offset fraction of the low threshold
    #[arg(long)]
    p_low: Option<f64>,

    /// Backprojection acceptance level
    #[arg(long)]
    theta: Option<f64>,

    /// Histogram bins used for mask fusion
    #[arg(long)]
    bins: Option<usize>,

    /// Structuring element size of the coarse gradient
    #[arg(long)]
    grad_se: Option<u32>,

    /// Structuring element size of the closing before validation
    #[arg(long)]
    area_se: Option<u32>,

    /// Structuring element size of post-processing
    #[arg(long)]
    post_se: Option<u32>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

impl Cli {
    fn segmentation_config(&self) -> anyhow::Result<SegmentationConfig> {
        let mut config = match &self.config {
            Some(path) => SegmentationConfig::from_json_file(path)?,
            None => SegmentationConfig::default(),
        };

        if let Some(v) = self.min_area {
            config.min_area = v;
        }
        if self.max_area.is_some() {
            config.max_area = self.max_area;
        }
        if let Some(v) = self.min_var {
            config.min_var = v;
        }
        if let Some(v) = self.p_high {
            config.p_high = v;
        }
        if let Some(v) = self.p_low {
            config.p_low = v;
        }
        if let Some(v) = self.theta {
            config.theta = v;
        }
        if let Some(v) = self.bins {
            config.bin_count = v;
        }
        if let Some(v) = self.grad_se {
            config.grad_se_size = v;
        }
        if let Some(v) = self.area_se {
            config.area_se_size = v;
        }
        if let Some(v) = self.post_se {
            config.post_se_size = v;
        }

        Ok(config)
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame.png".to_string());
    input.with_file_name(format!("seg_{}", name))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let config = args.segmentation_config()?;

    tracing::info!("Loading image: {:?}", args.image_path);

    // Load image
    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

    tracing::info!("Image loaded: {}x{}", img.width(), img.height());

    // Build extractor
    let mut extractor = ForegroundExtractor::new(config)?.with_verbose(args.verbose);

    // Enable debug mode if requested
    if let Some(debug_dir) = args.debug_out.clone() {
        extractor = extractor.with_debug(debug_dir)?;
    }

    let frame = extractor.run(img.to_luma8())?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.image_path));
    frame
        .mask
        .save(&output)
        .map_err(|e| anyhow::anyhow!("Failed to save mask to {}: {}", output.display(), e))?;

    let foreground = frame.mask.pixels().filter(|p| p[0] > 0).count();
    println!("\n=== Foreground Extraction Results ===");
    println!("Objects retained: {}", frame.get_int("components").unwrap_or(0));
    println!("Foreground pixels: {}", foreground);
    println!("Mask written to: {}", output.display());

    Ok(())
}
