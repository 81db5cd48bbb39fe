//! Asymmetric rebinning onto a subset of existing bin edges.
//!
//! Both rebinning routines validate the requested edges first and hand back an
//! unmodified copy of the input when any edge is not an edge of the original axis.
//! Content is never split between new bins.

use std::fmt;

use jtrig_core::Axis;

use crate::hist1d::Hist1D;
use crate::hist2d::Hist2D;

/// Absolute distance within which a requested edge matches an existing one.
pub const EDGE_TOLERANCE: f64 = 1e-4;

/// First requested edge that is not an edge of the original axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeMismatch {
    /// Offending edge value.
    pub edge: f64,
}

impl fmt::Display for EdgeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the bin boundary {} is not a bin boundary in the original histogram",
            self.edge
        )
    }
}

/// Checks that every value of `candidate` lies within [`EDGE_TOLERANCE`] of an edge
/// of `original`, including its upper edge.
pub fn check_bin_boundaries(candidate: &[f64], original: &Axis) -> Result<(), EdgeMismatch> {
    for edge in candidate {
        let found = original
            .edges()
            .iter()
            .any(|old| (old - edge).abs() < EDGE_TOLERANCE);
        if !found {
            return Err(EdgeMismatch { edge: *edge });
        }
    }
    Ok(())
}

/// Rebins a bin-width normalized histogram onto `edges`.
///
/// Each original regular bin is multiplied back by its width, added to the new bin
/// containing its center (variances add), and every new regular bin is divided by
/// its width at the end. Original flow cells are dropped; original bins whose center
/// falls outside the new range land in the new flow cells without width division.
pub fn rebin_asymmetric(hist: &Hist1D, edges: &[f64]) -> Hist1D {
    let axis = match prepare_axis(hist.axis(), edges, &hist.name) {
        Some(axis) => axis,
        None => {
            log::warn!(
                "Cannot rebin histogram {} because given bin borders do not match with the bin borders of the original histogram!",
                hist.name
            );
            return hist.clone();
        }
    };

    let mut rebinned = Hist1D::new(format!("{}_rebinned", hist.name), axis);
    let old_axis = hist.axis();
    for cell in 1..=old_axis.n_bins() {
        let width = old_axis.width(cell);
        let content = hist.content(cell) * width;
        let error = hist.error(cell) * width;
        let target = rebinned.find_cell(old_axis.center(cell));
        rebinned.accumulate(target, content, error * error);
    }
    for cell in 1..=rebinned.n_bins() {
        let width = rebinned.axis().width(cell);
        let content = rebinned.content(cell) / width;
        let error = rebinned.error(cell) / width;
        rebinned.set_content(cell, content);
        rebinned.set_error(cell, error);
    }
    rebinned
}

/// Rebins a two-dimensional histogram onto new x and y edges.
///
/// With `undo_bin_area` every original bin is first multiplied by its area; with
/// `normalize_bin_area` every new bin is divided by its area at the end. Variances of
/// original bins mapped to the same new bin always add.
pub fn rebin_2d(
    hist: &Hist2D,
    x_edges: &[f64],
    y_edges: &[f64],
    undo_bin_area: bool,
    normalize_bin_area: bool,
) -> Hist2D {
    let Some(x_axis) = prepare_axis(hist.x_axis(), x_edges, &hist.name) else {
        log::warn!(
            "Cannot rebin histogram {} because of a bin edge problem in x-axis!",
            hist.name
        );
        return hist.clone();
    };
    let Some(y_axis) = prepare_axis(hist.y_axis(), y_edges, &hist.name) else {
        log::warn!(
            "Cannot rebin histogram {} because of a bin edge problem in y-axis!",
            hist.name
        );
        return hist.clone();
    };

    let mut rebinned = Hist2D::new(format!("{}Rebinned", hist.name), x_axis, y_axis);
    let (old_x, old_y) = (hist.x_axis(), hist.y_axis());
    for cx in 1..=old_x.n_bins() {
        let target_x = rebinned.x_axis().find_cell(old_x.center(cx));
        for cy in 1..=old_y.n_bins() {
            let area = if undo_bin_area {
                old_x.width(cx) * old_y.width(cy)
            } else {
                1.0
            };
            let content = hist.content(cx, cy) * area;
            let error = hist.error(cx, cy) * area;
            let target_y = rebinned.y_axis().find_cell(old_y.center(cy));
            rebinned.accumulate(target_x, target_y, content, error * error);
        }
    }

    if normalize_bin_area {
        let (nx, ny) = (rebinned.x_axis().n_bins(), rebinned.y_axis().n_bins());
        for cx in 1..=nx {
            for cy in 1..=ny {
                let area = rebinned.x_axis().width(cx) * rebinned.y_axis().width(cy);
                let content = rebinned.content(cx, cy) / area;
                let error = rebinned.error(cx, cy) / area;
                rebinned.set_content(cx, cy, content);
                rebinned.set_error(cx, cy, error);
            }
        }
    }
    rebinned
}

fn prepare_axis(original: &Axis, edges: &[f64], name: &str) -> Option<Axis> {
    if let Err(mismatch) = check_bin_boundaries(edges, original) {
        log::warn!("{name}: {mismatch}");
        return None;
    }
    match Axis::variable(original.name.clone(), edges) {
        Ok(axis) => Some(axis.with_title(original.title.clone())),
        Err(err) => {
            log::warn!("{name}: {err}");
            None
        }
    }
}
