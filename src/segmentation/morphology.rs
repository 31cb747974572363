//! Grayscale morphology with elliptical structuring elements.
//!
//! The element follows the usual digital ellipse construction (row half-widths
//! rounded from the continuous ellipse), anchored at `(width / 2, height / 2)`.
//! Pixels outside the image never take part in a min/max, so borders neither
//! erode nor dilate the frame edge.

use image::{GrayImage, Luma};

/// Binary neighbourhood shape, stored as offsets relative to its anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    width: u32,
    height: u32,
    offsets: Vec<(i32, i32)>,
}

impl StructuringElement {
    /// Filled ellipse inscribed in a `width` x `height` box
    pub fn ellipse(width: u32, height: u32) -> Self {
        let r = (height / 2) as i32;
        let c = (width / 2) as i32;
        let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

        let mut offsets = Vec::new();
        for i in 0..height as i32 {
            let dy = i - r;
            let (j1, j2) = if dy.abs() <= r {
                let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i32;
                ((c - dx).max(0), (c + dx + 1).min(width as i32))
            } else {
                (0, 0)
            };
            for j in j1..j2 {
                offsets.push((j - c, dy));
            }
        }

        Self {
            width,
            height,
            offsets,
        }
    }

    /// Square ellipse of side `size`
    pub fn disk(size: u32) -> Self {
        Self::ellipse(size, size)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    /// Render the element as a 0/255 image (anchor at `(width / 2, height / 2)`)
    pub fn to_image(&self) -> GrayImage {
        let mut img = GrayImage::new(self.width, self.height);
        let (cx, cy) = ((self.width / 2) as i32, (self.height / 2) as i32);
        for &(dx, dy) in &self.offsets {
            img.put_pixel((cx + dx) as u32, (cy + dy) as u32, Luma([255]));
        }
        img
    }
}

fn rank_filter(img: &GrayImage, se: &StructuringElement, dilate: bool) -> GrayImage {
    let (width, height) = img.dimensions();
    let (w, h) = (width as i32, height as i32);

    GrayImage::from_fn(width, height, |x, y| {
        let mut acc: Option<u8> = None;
        for &(dx, dy) in se.offsets() {
            // dilation uses the reflected element; erode/dilate form an adjoint pair
            let (sx, sy) = if dilate {
                (x as i32 - dx, y as i32 - dy)
            } else {
                (x as i32 + dx, y as i32 + dy)
            };
            if sx < 0 || sy < 0 || sx >= w || sy >= h {
                continue;
            }
            let v = img.get_pixel(sx as u32, sy as u32)[0];
            acc = Some(match acc {
                None => v,
                Some(a) if dilate => a.max(v),
                Some(a) => a.min(v),
            });
        }
        Luma([acc.unwrap_or(img.get_pixel(x, y)[0])])
    })
}

pub fn erode(img: &GrayImage, se: &StructuringElement) -> GrayImage {
    rank_filter(img, se, false)
}

pub fn dilate(img: &GrayImage, se: &StructuringElement) -> GrayImage {
    rank_filter(img, se, true)
}

pub fn open(img: &GrayImage, se: &StructuringElement) -> GrayImage {
    dilate(&erode(img, se), se)
}

pub fn close(img: &GrayImage, se: &StructuringElement) -> GrayImage {
    erode(&dilate(img, se), se)
}

/// Dilation minus erosion
pub fn gradient(img: &GrayImage, se: &StructuringElement) -> GrayImage {
    let dilated = dilate(img, se);
    let eroded = erode(img, se);
    let mut out = dilated;
    for (d, e) in out.pixels_mut().zip(eroded.pixels()) {
        d[0] = d[0].saturating_sub(e[0]);
    }
    out
}
