//! Threshold search and double local thresholding.

mod common;

use dlt_segment::segmentation::threshold::{
    OtsuSplit, ThresholdPair, double_local_threshold, otsu_threshold,
    otsu_threshold_from_histogram,
};
use image::{GrayImage, Luma};

use common::*;

#[test]
fn test_two_unit_spikes_split_between_them() {
    for (a, b) in [(40usize, 180usize), (0, 255), (10, 12), (100, 101)] {
        let mut hist = [0.0; 256];
        hist[a] = 1.0;
        hist[b] = 1.0;

        let split = otsu_threshold_from_histogram(&hist, 0, 255).expect("two populated classes");
        assert!(
            split.threshold > a as i32 && split.threshold <= b as i32,
            "split {} outside ({}, {}]",
            split.threshold,
            a,
            b
        );
        assert_eq!(split.lower_mean, a as f64);
    }
}

#[test]
fn test_spike_split_is_first_maximiser() {
    let mut hist = [0.0; 256];
    hist[40] = 1.0;
    hist[180] = 1.0;
    let split = otsu_threshold_from_histogram(&hist, 0, 255);
    assert_eq!(
        split,
        Some(OtsuSplit {
            threshold: 41,
            lower_mean: 40.0
        })
    );
}

#[test]
fn test_single_intensity_has_no_split() {
    let mut hist = [0.0; 256];
    hist[90] = 500.0;
    assert_eq!(otsu_threshold_from_histogram(&hist, 0, 255), None);
    assert_eq!(otsu_threshold_from_histogram(&[0.0; 256], 0, 255), None);
}

#[test]
fn test_bimodal_histogram_split_lies_in_gap() {
    let mut hist = [0.0; 256];
    for v in 30..=50 {
        hist[v] = 10.0;
    }
    for v in 150..=170 {
        hist[v] = 4.0;
    }
    let split = otsu_threshold_from_histogram(&hist, 0, 255).expect("bimodal");
    assert!(split.threshold > 50 && split.threshold <= 150);
    assert!((split.lower_mean - 40.0).abs() < 1e-9);
}

#[test]
fn test_roi_restricts_histogram() {
    // left half 20, right half 220; ROI covers a dark strip and a bright strip
    let gray = GrayImage::from_fn(40, 10, |x, _| if x < 20 { Luma([20]) } else { Luma([220]) });
    let roi = GrayImage::from_fn(40, 10, |x, _| {
        if (15..25).contains(&x) { Luma([255]) } else { Luma([0]) }
    });
    let split = otsu_threshold(&gray, &roi, 0, 255).expect("two classes in ROI");
    assert_eq!(split.threshold, 21);
    assert_eq!(split.lower_mean, 20.0);

    // ROI on the dark half only: one intensity, no split
    let dark_roi = GrayImage::from_fn(40, 10, |x, _| if x < 10 { Luma([255]) } else { Luma([0]) });
    assert_eq!(otsu_threshold(&gray, &dark_roi, 0, 255), None);
}

#[test]
fn test_high_threshold_not_below_low() {
    for (p_high, p_low) in [(0.0, 0.0), (0.3, 0.8), (0.7, 1.0), (1.0, 1.0)] {
        for (t, u) in [(120, 40.2), (10, 9.6), (200, 0.0), (1, 0.0)] {
            let split = OtsuSplit {
                threshold: t,
                lower_mean: u,
            };
            let pair = ThresholdPair::from_split(&split, p_high, p_low);
            assert!(pair.high >= pair.low, "{:?} for p=({}, {})", pair, p_high, p_low);
            assert!(pair.high <= t);
        }
    }
}

#[test]
fn test_high_mask_is_subset_of_low_mask() {
    // horizontal ramp, everything inside the ROI
    let gray = GrayImage::from_fn(128, 32, |x, _| Luma([(x * 2) as u8]));
    let roi = uniform_frame(128, 32, 255);

    let (high, low, levels) =
        double_local_threshold(&gray, &roi, 0.3, 0.8).expect("ramp has a split");

    assert!(levels.high >= levels.low);
    assert!(count_foreground(&high) <= count_foreground(&low));
    assert!(count_foreground(&high) > 0);
    for (h, l) in high.pixels().zip(low.pixels()) {
        assert!(h[0] == 0 || l[0] == 255);
    }
}

#[test]
fn test_pixels_outside_roi_are_background() {
    let gray = noisy_ellipse_frame(30, 3);
    let roi = disk_mask(100, 100, (50.0, 50.0), 35.0);

    let (high, low, _) = double_local_threshold(&gray, &roi, 0.7, 1.0).expect("split");
    for ((h, l), r) in high.pixels().zip(low.pixels()).zip(roi.pixels()) {
        if r[0] == 0 {
            assert_eq!(h[0], 0);
            assert_eq!(l[0], 0);
        }
    }
    // the object is found by both masks
    assert!(count_foreground(&high) > ellipse_pixel_count() * 9 / 10);
}

#[test]
fn test_uniform_region_yields_none() {
    let gray = uniform_frame(30, 30, 120);
    let roi = uniform_frame(30, 30, 255);
    assert!(double_local_threshold(&gray, &roi, 0.7, 1.0).is_none());
}
