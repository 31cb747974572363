use image::{GrayImage, Luma};

use crate::geometry::OrientedBox;

/// Margin applied to a candidate's oriented box before it becomes a local region
pub const REGION_SCALE: f32 = 1.5;

/// Semi-axes shorter than this are widened so degenerate boxes still cover a stroke
const MIN_SEMI_AXIS: f64 = 0.5;

/// Shared local-region mask of the per-candidate loop.
///
/// A candidate's ellipse is admitted before its local statistics are taken
/// and retired right after, so the next candidate never sees pixels of an
/// already-resolved object.
#[derive(Debug, Clone)]
pub struct RegionMask {
    mask: GrayImage,
}

impl RegionMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            mask: GrayImage::new(width, height),
        }
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.mask
    }

    pub fn is_empty(&self) -> bool {
        self.mask.pixels().all(|p| p[0] == 0)
    }

    /// OR the ellipse inscribed in `region` into the mask
    pub fn admit(&mut self, region: &OrientedBox) {
        fill_rotated_ellipse(&mut self.mask, region, 255);
    }

    /// Clear the ellipse inscribed in `region`
    pub fn retire(&mut self, region: &OrientedBox) {
        fill_rotated_ellipse(&mut self.mask, region, 0);
    }
}

/// Local region for a candidate box: same center and angle, enlarged extents
pub fn local_region(candidate: &OrientedBox) -> OrientedBox {
    candidate.scaled(REGION_SCALE)
}

/// Set every pixel whose centre lies inside the ellipse inscribed in `obb`
pub fn fill_rotated_ellipse(img: &mut GrayImage, obb: &OrientedBox, value: u8) {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let a = (obb.width as f64 / 2.0).max(MIN_SEMI_AXIS);
    let b = (obb.height as f64 / 2.0).max(MIN_SEMI_AXIS);
    let (sin, cos) = (obb.angle as f64).to_radians().sin_cos();
    let (cx, cy) = (obb.center.0 as f64, obb.center.1 as f64);

    let ex = (a * a * cos * cos + b * b * sin * sin).sqrt();
    let ey = (a * a * sin * sin + b * b * cos * cos).sqrt();
    let x0 = (cx - ex).floor().max(0.0) as u32;
    let y0 = (cy - ey).floor().max(0.0) as u32;
    let x1 = (cx + ex).ceil().min((width - 1) as f64);
    let y1 = (cy + ey).ceil().min((height - 1) as f64);
    if x1 < 0.0 || y1 < 0.0 {
        return;
    }
    let (x1, y1) = (x1 as u32, y1 as u32);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let u = (dx * cos + dy * sin) / a;
            let v = (-dx * sin + dy * cos) / b;
            if u * u + v * v <= 1.0 {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }
}
