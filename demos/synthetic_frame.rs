use dlt_segment::{ForegroundExtractor, SegmentationConfig};
use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

/// Objects drawn into the frame: center, semi-axes, brightness above background
const OBJECTS: [((f32, f32), (f32, f32), f32); 3] = [
    ((80.0, 70.0), (40.0, 18.0), 55.0),
    ((230.0, 90.0), (25.0, 25.0), 40.0),
    ((160.0, 180.0), (50.0, 22.0), 35.0),
];

fn synthetic_frame(width: u32, height: u32, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    GrayImage::from_fn(width, height, |x, y| {
        // uneven lighting: brighter towards the top-left
        let mut v = 70.0 - 30.0 * (x as f32 / width as f32) - 20.0 * (y as f32 / height as f32);
        for &((cx, cy), (a, b), gain) in &OBJECTS {
            let u = (x as f32 - cx) / a;
            let w = (y as f32 - cy) / b;
            if u * u + w * w <= 1.0 {
                v += gain + rng.random_range(-15.0..15.0);
            }
        }
        v += rng.random_range(-3.0..3.0);
        Luma([v.clamp(0.0, 255.0) as u8])
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let gray = synthetic_frame(320, 240, 7);
    gray.save("synthetic_frame.png")
        .map_err(|e| anyhow::anyhow!("Failed to save frame: {}", e))?;
    println!("Created synthetic_frame.png (320x240, {} objects)\n", OBJECTS.len());

    // Create debug output directory
    let debug_dir = PathBuf::from("debug_output");

    // Remove directory if it exists (for testing)
    if debug_dir.exists() {
        std::fs::remove_dir_all(&debug_dir)?;
    }

    let config = SegmentationConfig::default()
        .with_area_range(500.0, Some(20_000.0))
        .with_min_var(10.0);
    let extractor = ForegroundExtractor::new(config)?
        .with_verbose(true)
        .with_debug(debug_dir.clone())?;

    println!("Running pipeline with debug mode...");
    let frame = extractor.run(gray)?;
    frame
        .mask
        .save("seg_synthetic_frame.png")
        .map_err(|e| anyhow::anyhow!("Failed to save mask: {}", e))?;

    println!("\n✓ Pipeline completed!");
    println!("  Candidates: {}", frame.get_int("candidates").unwrap_or(0));
    println!("  Objects retained: {}", frame.get_int("components").unwrap_or(0));
    println!("\nDebug outputs saved to: {}/", debug_dir.display());
    println!("\nDirectory structure:");
    println!("  00_input/                 - Grayscale input");
    println!("  01_coarse_localization/   - Gradient mask and area-filtered candidates");
    println!("  02_local_threshold/       - Per-candidate region/high/low/fused masks");
    println!("  03_area_variance_filter/  - Components passing area and variance");
    println!("  04_post_processing/       - Close/open/close smoothing");
    println!("  05_area_filter/           - Final mask");

    Ok(())
}
