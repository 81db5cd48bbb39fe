//! N-dimensional sparse weighted accumulator.
//!
//! Only populated cells are stored. A cell is addressed by one cell index per axis
//! (flow cells included), linearised with the first axis varying fastest.

use std::collections::BTreeMap;

use jtrig_core::{Axis, ErrorInfo, TrigError};
use serde::{Deserialize, Serialize};

use crate::hist1d::Hist1D;
use crate::hist2d::Hist2D;

fn histogram_error(code: &str, message: impl Into<String>, name: &str) -> TrigError {
    TrigError::Histogram(ErrorInfo::new(code, message).with_context("histogram", name))
}

/// Accumulated content and variance of one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BinCell {
    /// Sum of weights.
    pub content: f64,
    /// Sum of squared weights.
    pub variance: f64,
}

impl BinCell {
    /// Statistical error, the square root of the variance.
    pub fn error(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Inclusive cell-index restriction on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRange {
    /// Axis the restriction applies to.
    pub axis: usize,
    /// First accepted cell.
    pub low: usize,
    /// Last accepted cell.
    pub high: usize,
}

impl AxisRange {
    /// Builds a restriction on `axis` covering cells `low..=high`.
    pub fn new(axis: usize, low: usize, high: usize) -> Self {
        Self { axis, low, high }
    }

    fn accepts(&self, cell: usize) -> bool {
        cell >= self.low && cell <= self.high
    }
}

/// Normalization applied by [`SparseHistogram::scale`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleMode {
    /// Multiply every cell by the factor.
    PerBin,
    /// Multiply every cell by the factor divided by the product of its widths along
    /// the listed axes.
    PerBinWidth(Vec<usize>),
}

/// Sparse weighted histogram over an arbitrary number of axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseHistogram {
    /// Histogram name.
    pub name: String,
    axes: Vec<Axis>,
    cells: BTreeMap<u64, BinCell>,
    entries: u64,
}

impl SparseHistogram {
    /// Creates an empty accumulator over `axes`.
    pub fn new(name: impl Into<String>, axes: Vec<Axis>) -> Result<Self, TrigError> {
        let name = name.into();
        if axes.is_empty() {
            return Err(histogram_error(
                "sparse_no_axes",
                "at least one axis is required",
                &name,
            ));
        }
        let total = axes
            .iter()
            .try_fold(1u64, |acc, axis| acc.checked_mul(axis.n_cells() as u64));
        if total.is_none() {
            return Err(histogram_error(
                "sparse_too_large",
                "cell space does not fit a 64-bit index",
                &name,
            ));
        }
        Ok(Self {
            name,
            axes,
            cells: BTreeMap::new(),
            entries: 0,
        })
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    /// Axis definitions.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Axis `index`, if present.
    pub fn axis(&self, index: usize) -> Option<&Axis> {
        self.axes.get(index)
    }

    /// Number of fills recorded.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Number of allocated cells.
    pub fn n_filled_cells(&self) -> usize {
        self.cells.len()
    }

    /// Adds `weight` at the point `values`, one value per axis.
    pub fn fill(&mut self, values: &[f64], weight: f64) -> Result<(), TrigError> {
        if values.len() != self.axes.len() {
            return Err(TrigError::Histogram(
                ErrorInfo::new("sparse_fill_dim", "fill point has wrong dimensionality")
                    .with_context("histogram", self.name.clone())
                    .with_context("expected", self.axes.len().to_string())
                    .with_context("got", values.len().to_string()),
            ));
        }
        let mut key = 0u64;
        let mut stride = 1u64;
        for (axis, value) in self.axes.iter().zip(values) {
            key += axis.find_cell(*value) as u64 * stride;
            stride *= axis.n_cells() as u64;
        }
        let cell = self.cells.entry(key).or_default();
        cell.content += weight;
        cell.variance += weight * weight;
        self.entries += 1;
        Ok(())
    }

    fn linearise(&self, cells: &[usize]) -> Option<u64> {
        if cells.len() != self.axes.len() {
            return None;
        }
        let mut key = 0u64;
        let mut stride = 1u64;
        for (axis, cell) in self.axes.iter().zip(cells) {
            if *cell >= axis.n_cells() {
                return None;
            }
            key += *cell as u64 * stride;
            stride *= axis.n_cells() as u64;
        }
        Some(key)
    }

    fn decode(&self, mut key: u64, out: &mut [usize]) {
        for (slot, axis) in out.iter_mut().zip(&self.axes) {
            let n = axis.n_cells() as u64;
            *slot = (key % n) as usize;
            key /= n;
        }
    }

    /// Cell at the given per-axis cell indices, zero when unpopulated.
    pub fn cell(&self, cells: &[usize]) -> BinCell {
        self.linearise(cells)
            .and_then(|key| self.cells.get(&key).copied())
            .unwrap_or_default()
    }

    /// Content at the given per-axis cell indices.
    pub fn content(&self, cells: &[usize]) -> f64 {
        self.cell(cells).content
    }

    /// Error at the given per-axis cell indices.
    pub fn error(&self, cells: &[usize]) -> f64 {
        self.cell(cells).error()
    }

    /// Sum of content over every cell, flows included.
    pub fn total_content(&self) -> f64 {
        self.cells.values().map(|cell| cell.content).sum()
    }

    /// Visits every populated cell with its per-axis indices.
    pub fn for_each_cell<F>(&self, mut visit: F)
    where
        F: FnMut(&[usize], &BinCell),
    {
        let mut index = vec![0usize; self.axes.len()];
        for (key, cell) in &self.cells {
            self.decode(*key, &mut index);
            visit(&index, cell);
        }
    }

    /// Name a projection under `restrictions` receives: the source name followed by
    /// `_{axis}={low}-{high}` for every restriction.
    pub fn restricted_name(&self, restrictions: &[AxisRange]) -> String {
        let mut name = self.name.clone();
        for range in restrictions {
            name.push_str(&format!("_{}={}-{}", range.axis, range.low, range.high));
        }
        name
    }

    fn check_restrictions(&self, restrictions: &[AxisRange]) -> Result<(), TrigError> {
        for range in restrictions {
            let axis = self.axes.get(range.axis).ok_or_else(|| {
                histogram_error("restriction_axis", "restricted axis does not exist", &self.name)
            })?;
            if range.low > range.high || range.low >= axis.n_cells() {
                return Err(TrigError::Histogram(
                    ErrorInfo::new("restriction_range", "restriction selects no cells")
                        .with_context("histogram", self.name.clone())
                        .with_context("axis", range.axis.to_string())
                        .with_context("low", range.low.to_string())
                        .with_context("high", range.high.to_string()),
                ));
            }
        }
        Ok(())
    }

    fn accepted(restrictions: &[AxisRange], index: &[usize]) -> bool {
        restrictions
            .iter()
            .all(|range| range.accepts(index[range.axis]))
    }

    /// Sums out every axis not in `retained`, keeping only cells inside
    /// `restrictions`. Axes without a restriction contribute all their cells,
    /// flows included. Variances add, so errors combine in quadrature.
    pub fn project(
        &self,
        retained: &[usize],
        restrictions: &[AxisRange],
    ) -> Result<SparseHistogram, TrigError> {
        if retained.is_empty() {
            return Err(histogram_error(
                "project_empty",
                "projection needs at least one retained axis",
                &self.name,
            ));
        }
        for (position, axis) in retained.iter().enumerate() {
            if *axis >= self.axes.len() || retained[..position].contains(axis) {
                return Err(TrigError::Histogram(
                    ErrorInfo::new("project_axis", "retained axis is invalid or repeated")
                        .with_context("histogram", self.name.clone())
                        .with_context("axis", axis.to_string()),
                ));
            }
        }
        self.check_restrictions(restrictions)?;

        let axes = retained.iter().map(|axis| self.axes[*axis].clone()).collect();
        let mut projected = SparseHistogram::new(self.restricted_name(restrictions), axes)?;
        let mut target = vec![0usize; retained.len()];
        self.for_each_cell(|index, cell| {
            if !Self::accepted(restrictions, index) {
                return;
            }
            for (slot, axis) in target.iter_mut().zip(retained) {
                *slot = index[*axis];
            }
            if let Some(key) = projected.linearise(&target) {
                let out = projected.cells.entry(key).or_default();
                out.content += cell.content;
                out.variance += cell.variance;
            }
        });
        projected.entries = self.entries;
        Ok(projected)
    }

    /// Projects onto a single axis. Returns `None` when `axis` is outside the
    /// dimensionality or the restrictions are invalid.
    pub fn project_1d(&self, axis: usize, restrictions: &[AxisRange]) -> Option<Hist1D> {
        if axis >= self.axes.len() {
            log::warn!(
                "Cannot project {} onto axis {axis}: it has {} axes",
                self.name,
                self.axes.len()
            );
            return None;
        }
        if let Err(err) = self.check_restrictions(restrictions) {
            log::warn!("Cannot project {} onto axis {axis}: {err}", self.name);
            return None;
        }
        let mut hist = Hist1D::new(self.restricted_name(restrictions), self.axes[axis].clone());
        self.for_each_cell(|index, cell| {
            if Self::accepted(restrictions, index) {
                hist.accumulate(index[axis], cell.content, cell.variance);
            }
        });
        Some(hist)
    }

    /// Projects onto two axes, `x` horizontal and `y` vertical. Returns `None` when
    /// either axis is outside the dimensionality.
    pub fn project_2d(&self, x: usize, y: usize, restrictions: &[AxisRange]) -> Option<Hist2D> {
        if x >= self.axes.len() || y >= self.axes.len() || x == y {
            log::warn!(
                "Cannot project {} onto axes ({x}, {y}): it has {} axes",
                self.name,
                self.axes.len()
            );
            return None;
        }
        if let Err(err) = self.check_restrictions(restrictions) {
            log::warn!("Cannot project {} onto axes ({x}, {y}): {err}", self.name);
            return None;
        }
        let mut hist = Hist2D::new(
            self.restricted_name(restrictions),
            self.axes[x].clone(),
            self.axes[y].clone(),
        );
        self.for_each_cell(|index, cell| {
            if Self::accepted(restrictions, index) {
                hist.accumulate(index[x], index[y], cell.content, cell.variance);
            }
        });
        Some(hist)
    }

    /// Multiplies content and error of every cell by `factor`, optionally divided
    /// by the cell widths along the axes named in the mode. Flow cells on those axes
    /// only receive `factor`.
    pub fn scale(&mut self, factor: f64, mode: &ScaleMode) -> Result<(), TrigError> {
        let width_axes: &[usize] = match mode {
            ScaleMode::PerBin => &[],
            ScaleMode::PerBinWidth(axes) => axes,
        };
        if let Some(bad) = width_axes.iter().find(|axis| **axis >= self.axes.len()) {
            return Err(TrigError::Histogram(
                ErrorInfo::new("scale_axis", "width axis does not exist")
                    .with_context("histogram", self.name.clone())
                    .with_context("axis", bad.to_string()),
            ));
        }
        let mut index = vec![0usize; self.axes.len()];
        let keys: Vec<u64> = self.cells.keys().copied().collect();
        for key in keys {
            self.decode(key, &mut index);
            let mut f = factor;
            for axis in width_axes {
                let definition = &self.axes[*axis];
                let cell = index[*axis];
                if cell >= 1 && cell <= definition.n_bins() {
                    f /= definition.width(cell);
                }
            }
            if let Some(cell) = self.cells.get_mut(&key) {
                cell.content *= f;
                cell.variance *= f * f;
            }
        }
        Ok(())
    }

    /// Adds every cell of `other` into `self`. Both must share identical axes.
    pub fn add(&mut self, other: &SparseHistogram) -> Result<(), TrigError> {
        let compatible = self.axes.len() == other.axes.len()
            && self
                .axes
                .iter()
                .zip(&other.axes)
                .all(|(a, b)| a.same_binning(b));
        if !compatible {
            return Err(TrigError::Histogram(
                ErrorInfo::new("merge_binning", "cannot merge histograms with different axes")
                    .with_context("left", self.name.clone())
                    .with_context("right", other.name.clone()),
            ));
        }
        for (key, cell) in &other.cells {
            let out = self.cells.entry(*key).or_default();
            out.content += cell.content;
            out.variance += cell.variance;
        }
        self.entries += other.entries;
        Ok(())
    }
}
