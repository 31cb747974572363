use imageproc::point::Point;

/// Rotated rectangle fitted to a point set.
///
/// `width` runs along the direction given by `angle` (degrees, counter-clockwise
/// from the +x axis in image coordinates), `height` along the perpendicular.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientedBox {
    pub center: (f32, f32),
    pub width: f32,
    pub height: f32,
    pub angle: f32,
}

impl OrientedBox {
    /// Same box with both extents multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
            ..*self
        }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Oriented bounding box of `points` along their principal axes.
///
/// The first axis is the eigenvector of the larger eigenvalue of the 2x2
/// covariance matrix, normalised to point into the right half-plane (or
/// straight down when vertical) so the result does not depend on solver sign.
pub fn oriented_bounding_box(points: &[Point<i32>]) -> OrientedBox {
    match points {
        [] => OrientedBox::default(),
        [p] => OrientedBox {
            center: (p.x as f32, p.y as f32),
            ..OrientedBox::default()
        },
        [p0, p1] => {
            let dx = (p1.x - p0.x) as f64;
            let dy = (p1.y - p0.y) as f64;
            OrientedBox {
                center: (
                    0.5 * (p0.x + p1.x) as f32,
                    0.5 * (p0.y + p1.y) as f32,
                ),
                width: dx.hypot(dy) as f32,
                height: 0.0,
                angle: dy.atan2(dx).to_degrees() as f32,
            }
        }
        _ => pca_box(points),
    }
}

fn pca_box(points: &[Point<i32>]) -> OrientedBox {
    let n = points.len() as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    let mean = (sum_x / n, sum_y / n);

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for p in points {
        let dx = p.x as f64 - mean.0;
        let dy = p.y as f64 - mean.1;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    sxx /= n;
    sxy /= n;
    syy /= n;

    let major = principal_axis(sxx, sxy, syy);
    let minor = (-major.1, major.0);

    let (mut min_u, mut max_u) = (0.0f64, 0.0f64);
    let (mut min_v, mut max_v) = (0.0f64, 0.0f64);
    for p in points {
        let dx = p.x as f64 - mean.0;
        let dy = p.y as f64 - mean.1;
        let u = dx * major.0 + dy * major.1;
        let v = dx * minor.0 + dy * minor.1;
        min_u = min_u.min(u);
        max_u = max_u.max(u);
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }

    let cu = 0.5 * (min_u + max_u);
    let cv = 0.5 * (min_v + max_v);
    let center = (
        mean.0 + cu * major.0 + cv * minor.0,
        mean.1 + cu * major.1 + cv * minor.1,
    );

    OrientedBox {
        center: (center.0 as f32, center.1 as f32),
        width: (max_u - min_u) as f32,
        height: (max_v - min_v) as f32,
        angle: major.1.atan2(major.0).to_degrees() as f32,
    }
}

/// Unit eigenvector of the larger eigenvalue of [[sxx, sxy], [sxy, syy]].
fn principal_axis(sxx: f64, sxy: f64, syy: f64) -> (f64, f64) {
    let scale = sxx.abs().max(syy.abs()).max(sxy.abs());
    // Off-diagonal negligible: the axes are the coordinate axes
    if scale == 0.0 || sxy.abs() <= 1e-12 * scale {
        return if sxx >= syy { (1.0, 0.0) } else { (0.0, 1.0) };
    }

    let half_trace = 0.5 * (sxx + syy);
    let half_diff = 0.5 * (sxx - syy);
    let lambda = half_trace + half_diff.hypot(sxy);

    // pick the better-conditioned of the two equivalent eigenvector forms
    let (mut ex, mut ey) = if sxx >= syy {
        (lambda - syy, sxy)
    } else {
        (sxy, lambda - sxx)
    };
    let norm = ex.hypot(ey);
    ex /= norm;
    ey /= norm;

    if ex < 0.0 || (ex == 0.0 && ey < 0.0) {
        ex = -ex;
        ey = -ey;
    }
    (ex, ey)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point<i32>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn principal_axis_follows_dominant_variance() {
        assert_eq!(principal_axis(4.0, 0.0, 1.0), (1.0, 0.0));
        assert_eq!(principal_axis(1.0, 0.0, 4.0), (0.0, 1.0));
        let (ex, ey) = principal_axis(1.0, 1.0, 1.0);
        assert!((ex - ey).abs() < 1e-9);
        assert!(ex > 0.0);
    }

    #[test]
    fn coincident_points_give_zero_box() {
        let obb = oriented_bounding_box(&pts(&[(4, 7), (4, 7), (4, 7)]));
        assert_eq!(obb.center, (4.0, 7.0));
        assert_eq!(obb.width, 0.0);
        assert_eq!(obb.height, 0.0);
    }
}
