use jtrig_core::Axis;
use jtrig_hist::{
    check_bin_boundaries, find_extrema, find_extrema_full, normalize_matrix, rebin_2d,
    rebin_asymmetric, rotate, suppress_single_bin_fluctuations, to_absolute_uncertainty,
    to_relative_uncertainty, Direction, Hist1D, Hist2D,
};

fn density_spectrum() -> Hist1D {
    let axis = Axis::uniform("pt", 20, 0.0, 200.0).unwrap();
    let mut hist = Hist1D::new("jetPt", axis);
    for i in 0..400 {
        let pt = (i as f64 * 0.49) % 200.0;
        hist.fill_weighted(pt, 1.0 + (i % 3) as f64);
    }
    hist.scale_width(1.0);
    hist
}

fn width_weighted_sum(hist: &Hist1D) -> f64 {
    (1..=hist.n_bins())
        .map(|cell| hist.content(cell) * hist.axis().width(cell))
        .sum()
}

fn width_weighted_variance(hist: &Hist1D) -> f64 {
    (1..=hist.n_bins())
        .map(|cell| {
            let w = hist.axis().width(cell);
            hist.variance(cell) * w * w
        })
        .sum()
}

#[test]
fn rebinning_conserves_mass_and_variance() {
    let hist = density_spectrum();
    let rebinned = rebin_asymmetric(&hist, &[0.0, 50.0, 100.0, 150.0, 200.0]);
    assert_eq!(rebinned.name, "jetPt_rebinned");
    assert_eq!(rebinned.n_bins(), 4);
    assert!((width_weighted_sum(&rebinned) - width_weighted_sum(&hist)).abs() < 1e-9);
    assert!((width_weighted_variance(&rebinned) - width_weighted_variance(&hist)).abs() < 1e-9);
}

#[test]
fn rebinning_with_foreign_edge_returns_original() {
    let hist = density_spectrum();
    let mismatch = check_bin_boundaries(&[0.0, 55.0, 200.0], hist.axis()).unwrap_err();
    assert_eq!(mismatch.edge, 55.0);
    let result = rebin_asymmetric(&hist, &[0.0, 55.0, 200.0]);
    assert_eq!(result, hist);
}

#[test]
fn boundary_check_accepts_edges_within_tolerance() {
    let axis = Axis::uniform("pt", 4, 0.0, 200.0).unwrap();
    assert!(check_bin_boundaries(&[0.00005, 100.0, 199.99995], &axis).is_ok());
    assert!(check_bin_boundaries(&[0.0, 100.001], &axis).is_err());
}

fn matrix() -> Hist2D {
    let x = Axis::uniform("x", 4, 0.0, 4.0).unwrap();
    let y = Axis::uniform("y", 3, 0.0, 3.0).unwrap();
    let mut hist = Hist2D::new("response", x, y);
    for cx in 1..=4 {
        for cy in 1..=3 {
            if cx == 2 {
                continue;
            }
            hist.fill_cell(cx, cy, (cx * cy) as f64);
        }
    }
    hist
}

#[test]
fn column_normalization_is_idempotent_and_skips_empty_columns() {
    let mut hist = matrix();
    normalize_matrix(&mut hist, 1.0, Direction::Columns);
    let first = hist.clone();
    for cx in [1, 3, 4] {
        let sum: f64 = (1..=3).map(|cy| hist.content(cx, cy)).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }
    for cy in 1..=3 {
        assert_eq!(hist.content(2, cy), 0.0);
    }
    normalize_matrix(&mut hist, 1.0, Direction::Columns);
    for cx in 0..6 {
        for cy in 0..5 {
            assert!((hist.content(cx, cy) - first.content(cx, cy)).abs() < 1e-12);
            assert!((hist.error(cx, cy) - first.error(cx, cy)).abs() < 1e-12);
        }
    }
}

#[test]
fn row_normalization_preserves_relative_errors() {
    let mut hist = matrix();
    let before = hist.error(3, 2) / hist.content(3, 2);
    normalize_matrix(&mut hist, 5.0, Direction::Rows);
    let sum: f64 = (1..=4).map(|cx| hist.content(cx, 2)).sum();
    assert!((sum - 5.0).abs() < 1e-12);
    let after = hist.error(3, 2) / hist.content(3, 2);
    assert!((before - after).abs() < 1e-12);
}

#[test]
fn two_dimensional_rebin_merges_cells() {
    let hist = matrix();
    let rebinned = rebin_2d(&hist, &[0.0, 2.0, 4.0], &[0.0, 3.0], false, false);
    assert_eq!(rebinned.name, "responseRebinned");
    // x in [0, 2) holds column 1 only: 1 + 2 + 3
    assert!((rebinned.content(1, 1) - 6.0).abs() < 1e-12);
    // x in [2, 4) holds columns 3 and 4: 3*6 + 4*6 = 42
    assert!((rebinned.content(2, 1) - 42.0).abs() < 1e-12);
    let var: f64 = [3.0f64, 6.0, 9.0, 4.0, 8.0, 12.0].iter().map(|v| v * v).sum();
    assert!((rebinned.error(2, 1) - var.sqrt()).abs() < 1e-12);

    let normalized = rebin_2d(&hist, &[0.0, 2.0, 4.0], &[0.0, 3.0], true, true);
    assert!((normalized.content(2, 1) - 42.0 / 6.0).abs() < 1e-12);

    let rejected = rebin_2d(&hist, &[0.0, 2.5, 4.0], &[0.0, 3.0], false, false);
    assert_eq!(rejected, hist);
}

#[test]
fn suppression_never_touches_range_boundaries() {
    let axis = Axis::uniform("x", 6, 0.0, 6.0).unwrap();
    let mut hist = Hist1D::new("spiky", axis);
    for (cell, value) in [(1, 100.0), (2, 1.0), (3, 50.0), (4, 2.0), (5, 1.0), (6, 90.0)] {
        hist.set_content(cell, value);
    }
    suppress_single_bin_fluctuations(&mut hist, (0.0, 6.0), 0.0, 0.5);
    assert_eq!(hist.content(1), 100.0);
    assert_eq!(hist.content(6), 90.0);

    let mut hist2 = Hist1D::new("spiky", Axis::uniform("x", 6, 0.0, 6.0).unwrap());
    for (cell, value) in [(1, 1.0), (2, 1.0), (3, 50.0), (4, 2.0), (5, 1.0), (6, 1.0)] {
        hist2.set_content(cell, value);
    }
    suppress_single_bin_fluctuations(&mut hist2, (0.0, 6.0), 3.0, 0.5);
    assert!((hist2.content(3) - 3.0).abs() < 1e-12);
    assert_eq!(hist2.content(4), 2.0);
    assert_eq!(hist2.content(1), 1.0);
}

fn flat(values: &[f64]) -> Hist1D {
    let axis = Axis::uniform("x", values.len(), 0.0, values.len() as f64).unwrap();
    let mut hist = Hist1D::new("flat", axis);
    for (i, value) in values.iter().enumerate() {
        hist.set_content(i + 1, *value);
    }
    hist
}

#[test]
fn extrema_only_widen() {
    let wide = flat(&[2.0, 7.0, 20.0, 11.0]);
    let first = find_extrema_full(&wide, (5.0, 10.0));
    assert_eq!(first, (2.0, 20.0));
    let narrow = flat(&[6.0, 9.0, 7.5]);
    assert_eq!(find_extrema_full(&narrow, first), (2.0, 20.0));
    // search range restricted to the second and third bin
    assert_eq!(find_extrema(&wide, (100.0, -100.0), (1.0, 3.0)), (7.0, 20.0));
}

#[test]
fn rotation_swaps_axes() {
    let hist = matrix();
    let rotated = rotate(&hist);
    assert_eq!(rotated.name, "responseRotated");
    assert_eq!(rotated.x_axis().n_bins(), 3);
    assert_eq!(rotated.content(2, 4), hist.content(4, 2));
    assert_eq!(rotated.error(1, 3), hist.error(3, 1));
}

#[test]
fn uncertainty_transforms_invert_each_other() {
    let mut hist = flat(&[4.0, 0.0, 10.0]);
    hist.set_error(1, 1.0);
    hist.set_error(3, 5.0);
    let relative = to_relative_uncertainty(&hist, true);
    assert_eq!(relative.content(1), 1.0);
    assert!((relative.error(1) - 0.25).abs() < 1e-12);
    assert_eq!(relative.error(2), 0.0);
    let absolute = to_absolute_uncertainty(&relative, &hist, true);
    assert!((absolute.error(3) - 5.0).abs() < 1e-12);
    assert_eq!(absolute.content(3), 10.0);

    let plain = to_relative_uncertainty(&hist, false);
    assert!((plain.content(3) - 0.5).abs() < 1e-12);
    assert_eq!(plain.error(3), 0.0);
    assert_eq!(plain.content(2), 0.0);
}

#[test]
fn division_propagates_uncorrelated_errors() {
    let axis = Axis::uniform("pt", 2, 0.0, 2.0).unwrap();
    let mut numerator = Hist1D::new("num", axis.clone());
    let mut denominator = Hist1D::new("den", axis);
    numerator.fill_weighted(0.5, 2.0);
    denominator.fill_weighted(0.5, 4.0);
    denominator.fill_weighted(1.5, 1.0);
    numerator.divide(&denominator).unwrap();
    assert!((numerator.content(1) - 0.5).abs() < 1e-12);
    let expected = ((4.0 * 16.0 + 16.0 * 4.0) / 256.0f64).sqrt();
    assert!((numerator.error(1) - expected).abs() < 1e-12);
    assert_eq!(numerator.content(2), 0.0);
}
