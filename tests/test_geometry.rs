//! Oriented bounding box tests, degenerate point sets included.

mod common;

use dlt_segment::oriented_bounding_box;
use dlt_segment::segmentation::region::local_region;

use common::*;

#[test]
fn test_empty_point_set_gives_default_box() {
    assert_eq!(oriented_bounding_box(&[]), OrientedBox::default());
}

#[test]
fn test_single_point_gives_zero_size_box() {
    let obb = oriented_bounding_box(&points(&[(7, -3)]));
    assert_eq!(obb.center, (7.0, -3.0));
    assert_eq!(obb.width, 0.0);
    assert_eq!(obb.height, 0.0);
}

#[test]
fn test_two_points_give_segment_box() {
    let obb = oriented_bounding_box(&points(&[(0, 0), (3, 4)]));
    assert_eq!(obb.center, (1.5, 2.0));
    assert!(approx_eq(obb.width, 5.0, 1e-5));
    assert_eq!(obb.height, 0.0);
    assert!(approx_eq(obb.angle, 53.130_1, 1e-3));
}

#[test]
fn test_horizontal_collinear_points() {
    let pts: Vec<(i32, i32)> = (0..=10).map(|x| (x, 5)).collect();
    let obb = oriented_bounding_box(&points(&pts));

    assert!(obb.width.is_finite() && obb.height.is_finite() && obb.angle.is_finite());
    assert!(approx_eq(obb.center.0, 5.0, 1e-4));
    assert!(approx_eq(obb.center.1, 5.0, 1e-4));
    assert!(approx_eq(obb.width, 10.0, 1e-4));
    assert_eq!(obb.height, 0.0);
    assert_eq!(obb.angle, 0.0);
}

#[test]
fn test_vertical_collinear_points() {
    let pts: Vec<(i32, i32)> = (0..=8).map(|y| (3, y)).collect();
    let obb = oriented_bounding_box(&points(&pts));

    assert!(approx_eq(obb.angle, 90.0, 1e-4));
    assert!(approx_eq(obb.width, 8.0, 1e-4));
    assert!(approx_eq(obb.height, 0.0, 1e-4));
    assert!(approx_eq(obb.center.0, 3.0, 1e-4));
    assert!(approx_eq(obb.center.1, 4.0, 1e-4));
}

#[test]
fn test_diagonal_line() {
    let pts: Vec<(i32, i32)> = (0..=10).map(|i| (i, i)).collect();
    let obb = oriented_bounding_box(&points(&pts));

    assert!(approx_eq(obb.angle, 45.0, 1e-3));
    assert!(approx_eq(obb.width, 10.0 * std::f32::consts::SQRT_2, 1e-3));
    assert!(approx_eq(obb.height, 0.0, 1e-3));
}

#[test]
fn test_rectangle_boundary() {
    // perimeter of the rectangle x in 0..=20, y in 0..=10
    let mut pts = Vec::new();
    for x in 0..=20 {
        pts.push((x, 0));
        pts.push((x, 10));
    }
    for y in 1..10 {
        pts.push((0, y));
        pts.push((20, y));
    }
    let obb = oriented_bounding_box(&points(&pts));

    assert_eq!(obb.angle, 0.0);
    assert!(approx_eq(obb.width, 20.0, 1e-4));
    assert!(approx_eq(obb.height, 10.0, 1e-4));
    assert!(approx_eq(obb.center.0, 10.0, 1e-4));
    assert!(approx_eq(obb.center.1, 5.0, 1e-4));
}

#[test]
fn test_box_is_deterministic_under_point_order() {
    let pts = points(&[(0, 0), (10, 2), (12, 7), (3, 9), (1, 4)]);
    let mut reversed = pts.clone();
    reversed.reverse();

    let a = oriented_bounding_box(&pts);
    let b = oriented_bounding_box(&reversed);
    assert!(approx_eq(a.angle, b.angle, 1e-4));
    assert!(approx_eq(a.width, b.width, 1e-3));
    assert!(approx_eq(a.height, b.height, 1e-3));
}

#[test]
fn test_local_region_scales_extents_only() {
    let obb = OrientedBox {
        center: (40.0, 30.0),
        width: 20.0,
        height: 8.0,
        angle: 30.0,
    };
    let region = local_region(&obb);
    assert_eq!(region.center, obb.center);
    assert_eq!(region.angle, obb.angle);
    assert_eq!(region.width, 30.0);
    assert_eq!(region.height, 12.0);
}

#[test]
fn test_contour_area_and_box() {
    // square boundary 0..=10
    let mut pts = Vec::new();
    for x in 0..10 {
        pts.push((x, 0));
    }
    for y in 0..10 {
        pts.push((10, y));
    }
    for x in (1..=10).rev() {
        pts.push((x, 10));
    }
    for y in (1..=10).rev() {
        pts.push((0, y));
    }
    let contour = Contour::new(points(&pts));

    assert_eq!(contour.area(), 100.0);
    let bbox = contour.bounding_box().expect("non-empty contour");
    assert_eq!((bbox.width(), bbox.height()), (11, 11));
    assert!(contour.is_within_area(50.0, 100.0));
    assert!(!contour.is_within_area(101.0, 200.0));
    assert_eq!(Contour::new(points(&[(1, 1)])).area(), 0.0);
}
