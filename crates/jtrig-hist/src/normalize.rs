//! Normalization and uncertainty transforms for dense histograms.

use serde::{Deserialize, Serialize};

use crate::hist1d::Hist1D;
use crate::hist2d::Hist2D;

/// Which lines of a 2-D histogram [`normalize_matrix`] normalizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Each x-bin is normalized over its y-bins.
    Columns,
    /// Each y-bin is normalized over its x-bins.
    Rows,
}

/// Scales every column or row so its regular-bin contents sum to `target`.
///
/// Lines whose sum is exactly zero are left as they are. Errors scale with the
/// content, so relative uncertainties are unchanged.
pub fn normalize_matrix(hist: &mut Hist2D, target: f64, direction: Direction) {
    let nx = hist.x_axis().n_bins();
    let ny = hist.y_axis().n_bins();
    let (outer, inner) = match direction {
        Direction::Columns => (nx, ny),
        Direction::Rows => (ny, nx),
    };
    let cell = |line: usize, along: usize| match direction {
        Direction::Columns => (line, along),
        Direction::Rows => (along, line),
    };

    for line in 1..=outer {
        let sum: f64 = (1..=inner)
            .map(|along| {
                let (cx, cy) = cell(line, along);
                hist.content(cx, cy)
            })
            .sum();
        if sum == 0.0 {
            continue;
        }
        let factor = target / sum;
        for along in 1..=inner {
            let (cx, cy) = cell(line, along);
            let content = hist.content(cx, cy) * factor;
            let error = hist.error(cx, cy) * factor;
            hist.set_content(cx, cy, content);
            hist.set_error(cx, cy, error);
        }
    }
}

/// Returns a copy of `hist` with x and y exchanged, named `{name}Rotated`.
pub fn rotate(hist: &Hist2D) -> Hist2D {
    let mut rotated = Hist2D::new(
        format!("{}Rotated", hist.name),
        hist.y_axis().clone(),
        hist.x_axis().clone(),
    );
    for cx in 1..=hist.x_axis().n_bins() {
        for cy in 1..=hist.y_axis().n_bins() {
            rotated.set_content(cy, cx, hist.content(cx, cy));
            rotated.set_error(cy, cx, hist.error(cx, cy));
        }
    }
    rotated
}

/// Replaces each bin by its relative uncertainty.
///
/// With `center_at_one` the content becomes 1 and the error the relative
/// uncertainty; otherwise the content is the relative uncertainty and the error is
/// zero.
///
/// An empty bin has no defined relative uncertainty; it is reported as zero instead
/// of the infinite or NaN value a plain division would give.
pub fn to_relative_uncertainty(hist: &Hist1D, center_at_one: bool) -> Hist1D {
    let mut out = hist.clone();
    for cell in 1..=hist.n_bins() {
        let content = hist.content(cell);
        let relative = if content == 0.0 {
            0.0
        } else {
            hist.error(cell) / content
        };
        if center_at_one {
            out.set_content(cell, 1.0);
            out.set_error(cell, relative);
        } else {
            out.set_content(cell, relative);
            out.set_error(cell, 0.0);
        }
    }
    out
}

/// Inverse of [`to_relative_uncertainty`]: takes contents from `scale` and errors
/// as `scale content × relative uncertainty`.
pub fn to_absolute_uncertainty(relative: &Hist1D, scale: &Hist1D, center_at_one: bool) -> Hist1D {
    let mut out = relative.clone();
    for cell in 1..=relative.n_bins() {
        let uncertainty = if center_at_one {
            relative.error(cell)
        } else {
            relative.content(cell)
        };
        let content = scale.content(cell);
        out.set_content(cell, content);
        out.set_error(cell, content * uncertainty);
    }
    out
}
