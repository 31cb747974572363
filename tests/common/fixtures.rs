#![allow(dead_code)]

use dlt_segment::SegmentationConfig;
use image::{GrayImage, Luma};
use imageproc::point::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Background level of the synthetic frames
pub const BACKGROUND: u8 = 50;
/// Foreground level of the synthetic frames
pub const OBJECT: u8 = 200;
/// Semi-axes of the test ellipse, area about 1980 pixels
pub const SEMI_AXES: (f32, f32) = (30.0, 21.0);

/// Creates a frame with every pixel at `value`.
pub fn uniform_frame(width: u32, height: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
}

fn inside_ellipse(x: u32, y: u32, center: (f32, f32), semi_axes: (f32, f32)) -> bool {
    let u = (x as f32 - center.0) / semi_axes.0;
    let v = (y as f32 - center.1) / semi_axes.1;
    u * u + v * v <= 1.0
}

/// Creates a 100x100 dark frame with one uniformly bright axis-aligned ellipse
/// at the centre.
pub fn ellipse_frame() -> GrayImage {
    GrayImage::from_fn(100, 100, |x, y| {
        if inside_ellipse(x, y, (50.0, 50.0), SEMI_AXES) {
            Luma([OBJECT])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// Same as [`ellipse_frame`] but the ellipse carries uniform noise of
/// +/- `amplitude` around its level (variance about amplitude^2 / 3).
pub fn noisy_ellipse_frame(amplitude: i32, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    GrayImage::from_fn(100, 100, |x, y| {
        if inside_ellipse(x, y, (50.0, 50.0), SEMI_AXES) {
            let v = OBJECT as i32 + rng.random_range(-amplitude..=amplitude);
            Luma([v.clamp(0, 255) as u8])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// Number of pixels of an ellipse frame's object
pub fn ellipse_pixel_count() -> usize {
    ellipse_frame().pixels().filter(|p| p[0] == OBJECT).count()
}

/// Creates a binary mask holding a filled disk.
pub fn disk_mask(width: u32, height: u32, center: (f32, f32), radius: f32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        if inside_ellipse(x, y, center, (radius, radius)) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Sets the given rectangle (inclusive) of `img` to `value`.
pub fn fill_rect(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, value: u8) {
    for y in y0..=y1 {
        for x in x0..=x1 {
            img.put_pixel(x, y, Luma([value]));
        }
    }
}

pub fn count_foreground(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] > 0).count()
}

pub fn points(coords: &[(i32, i32)]) -> Vec<Point<i32>> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

/// Parameters suited to the 100x100 synthetic frames
pub fn test_config() -> SegmentationConfig {
    SegmentationConfig::default().with_area_range(1000.0, Some(5000.0))
}

pub fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}
