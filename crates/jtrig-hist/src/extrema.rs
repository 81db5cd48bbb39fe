use crate::hist1d::Hist1D;

const RANGE_EPSILON: f64 = 1e-5;

fn cell_range(hist: &Hist1D, range: (f64, f64)) -> (usize, usize) {
    (
        hist.find_cell(range.0 + RANGE_EPSILON),
        hist.find_cell(range.1 - RANGE_EPSILON),
    )
}

/// Widens `current` with `content ∓ error` of every bin inside `search`.
///
/// The returned pair is never narrower than `current`, so the function can be
/// folded over several histograms to find a common drawing range.
pub fn find_extrema(hist: &Hist1D, current: (f64, f64), search: (f64, f64)) -> (f64, f64) {
    let (first, last) = cell_range(hist, search);
    let mut extrema = current;
    for cell in first..=last {
        let content = hist.content(cell);
        let error = hist.error(cell);
        extrema.0 = extrema.0.min(content - error);
        extrema.1 = extrema.1.max(content + error);
    }
    extrema
}

/// [`find_extrema`] over all regular bins.
pub fn find_extrema_full(hist: &Hist1D, current: (f64, f64)) -> (f64, f64) {
    let axis = hist.axis();
    find_extrema(hist, current, (axis.min(), axis.max()))
}

/// Caps isolated spikes inside `range`.
///
/// A bin whose content exceeds `threshold` times both neighbours is set to
/// `(1 + level)` times the larger neighbour. The first and last bins of the range are
/// never changed. Bins are visited once from low to high, so a capped bin is the
/// left neighbour seen by the next one.
pub fn suppress_single_bin_fluctuations(
    hist: &mut Hist1D,
    range: (f64, f64),
    threshold: f64,
    level: f64,
) {
    let (first, last) = cell_range(hist, range);
    for cell in (first + 1)..last {
        let previous = hist.content(cell - 1);
        let current = hist.content(cell);
        let next = hist.content(cell + 1);
        if current > threshold * previous && current > threshold * next {
            let biggest = previous.max(next);
            hist.set_content(cell, biggest * (1.0 + level));
        }
    }
}
