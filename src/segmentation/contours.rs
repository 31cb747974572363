use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};

use crate::models::Contour;

/// Outer boundaries of the top-level connected components in a binary image.
/// Any non-zero pixel counts as foreground; holes and anything nested inside
/// them are not reported separately.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour::new(c.points))
        .collect()
}

/// Fill the polygon bounded by `contour`, boundary pixels included.
///
/// Interior pixels are found by an even-odd scanline test on pixel centres,
/// counting each non-horizontal edge over the half-open span `[y_top, y_bottom)`.
/// Boundary pixels are painted afterwards, which also covers one-pixel-wide
/// parts that enclose no area.
pub fn fill_contour(img: &mut GrayImage, contour: &Contour, value: u8) {
    let color = Luma([value]);
    let (w, h) = img.dimensions();
    let poly = &contour.points;
    if poly.is_empty() || w == 0 || h == 0 {
        return;
    }

    let y_min = poly.iter().map(|p| p.y).min().unwrap_or(0).max(0);
    let y_max = poly.iter().map(|p| p.y).max().unwrap_or(0).min(h as i32 - 1);

    let mut crossings: Vec<f64> = Vec::new();
    for y in y_min..=y_max {
        crossings.clear();
        for (i, &p0) in poly.iter().enumerate() {
            let p1 = poly[(i + 1) % poly.len()];
            if p0.y == p1.y {
                continue;
            }
            let (top, bottom) = if p0.y < p1.y { (p0, p1) } else { (p1, p0) };
            if y < top.y || y >= bottom.y {
                continue;
            }
            let t = (y - top.y) as f64 / (bottom.y - top.y) as f64;
            crossings.push(top.x as f64 + t * (bottom.x - top.x) as f64);
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let from = span[0].ceil().max(0.0);
            let to = span[1].floor().min((w - 1) as f64);
            if from > to {
                continue;
            }
            for x in from as u32..=to as u32 {
                img.put_pixel(x, y as u32, color);
            }
        }
    }

    for p in poly {
        if p.x >= 0 && p.y >= 0 && (p.x as u32) < w && (p.y as u32) < h {
            img.put_pixel(p.x as u32, p.y as u32, color);
        }
    }
}

/// Erase every component whose area falls outside `[min_area, max_area]`.
/// Returns the number of components erased.
pub fn filter_by_area(mask: &mut GrayImage, min_area: f64, max_area: f64) -> usize {
    let contours = find_external_contours(mask);
    let mut erased = 0;
    for contour in &contours {
        if !contour.is_within_area(min_area, max_area) {
            fill_contour(mask, contour, 0);
            erased += 1;
        }
    }
    erased
}

/// Visit the pixels covered by the filled contour, row-major
pub fn for_each_pixel_in(
    contour: &Contour,
    width: u32,
    height: u32,
    mut visit: impl FnMut(u32, u32),
) {
    let Some(bbox) = contour.bounding_box() else {
        return;
    };
    let mut scratch = GrayImage::new(width, height);
    fill_contour(&mut scratch, contour, 255);

    let x0 = bbox.min_x.max(0) as u32;
    let y0 = bbox.min_y.max(0) as u32;
    let x1 = (bbox.max_x.max(0) as u32).min(width.saturating_sub(1));
    let y1 = (bbox.max_y.max(0) as u32).min(height.saturating_sub(1));
    for y in y0..=y1 {
        for x in x0..=x1 {
            if scratch.get_pixel(x, y)[0] > 0 {
                visit(x, y);
            }
        }
    }
}
