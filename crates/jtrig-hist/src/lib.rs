#![deny(missing_docs)]
#![doc = "Sparse N-dimensional accumulator, dense projections and the rebinning and normalization library of jtrig."]

/// Extremum search and spike suppression.
pub mod extrema;
/// Dense one-dimensional histogram.
pub mod hist1d;
/// Dense two-dimensional histogram.
pub mod hist2d;
pub mod normalize;
pub mod rebin;
pub mod sparse;

pub use extrema::{find_extrema, find_extrema_full, suppress_single_bin_fluctuations};
pub use hist1d::Hist1D;
pub use hist2d::Hist2D;
pub use normalize::{
    normalize_matrix, rotate, to_absolute_uncertainty, to_relative_uncertainty, Direction,
};
pub use rebin::{check_bin_boundaries, rebin_2d, rebin_asymmetric, EdgeMismatch, EDGE_TOLERANCE};
pub use sparse::{AxisRange, BinCell, ScaleMode, SparseHistogram};
