//! Histogram axis model with explicit edges and flow cells.
//!
//! Cells are addressed the same way on every axis: cell `0` collects underflow,
//! cells `1..=n` are the regular bins and cell `n + 1` collects overflow.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, TrigError};

fn binning_error(code: &str, message: impl Into<String>) -> TrigError {
    TrigError::Binning(ErrorInfo::new(code, message))
}

/// Ordered, named histogram dimension.
///
/// Deserialized axes go through the same edge and label checks as
/// [`Axis::variable`] and [`Axis::with_labels`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAxis")]
pub struct Axis {
    /// Axis name used in diagnostics and projected histogram names.
    pub name: String,
    /// Display title, empty when unset.
    #[serde(default)]
    pub title: String,
    edges: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct RawAxis {
    name: String,
    #[serde(default)]
    title: String,
    edges: Vec<f64>,
    #[serde(default)]
    labels: Vec<String>,
}

impl TryFrom<RawAxis> for Axis {
    type Error = TrigError;

    fn try_from(raw: RawAxis) -> Result<Self, Self::Error> {
        let axis = Axis::variable(raw.name, &raw.edges)?.with_title(raw.title);
        if raw.labels.is_empty() {
            Ok(axis)
        } else {
            axis.with_labels(raw.labels)
        }
    }
}

impl Axis {
    /// Builds an axis with `bins` equal-width bins spanning `[low, high)`.
    pub fn uniform(
        name: impl Into<String>,
        bins: usize,
        low: f64,
        high: f64,
    ) -> Result<Self, TrigError> {
        if bins == 0 {
            return Err(binning_error("axis_empty", "axis requires at least one bin"));
        }
        if !(low.is_finite() && high.is_finite()) || high <= low {
            return Err(TrigError::Binning(
                ErrorInfo::new("axis_range", "axis range must be finite and increasing")
                    .with_context("low", low.to_string())
                    .with_context("high", high.to_string()),
            ));
        }
        let step = (high - low) / bins as f64;
        let mut edges: Vec<f64> = (0..bins).map(|i| low + step * i as f64).collect();
        edges.push(high);
        Ok(Self {
            name: name.into(),
            title: String::new(),
            edges,
            labels: Vec::new(),
        })
    }

    /// Builds an axis from explicit, strictly increasing bin edges.
    pub fn variable(name: impl Into<String>, edges: &[f64]) -> Result<Self, TrigError> {
        let name = name.into();
        validate_edges(&name, edges)?;
        Ok(Self {
            name,
            title: String::new(),
            edges: edges.to_vec(),
            labels: Vec::new(),
        })
    }

    /// Sets the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Attaches one label per regular bin.
    pub fn with_labels<I, S>(mut self, labels: I) -> Result<Self, TrigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.len() != self.n_bins() {
            return Err(TrigError::Binning(
                ErrorInfo::new("axis_labels", "label count must match bin count")
                    .with_context("axis", self.name.clone())
                    .with_context("labels", labels.len().to_string())
                    .with_context("bins", self.n_bins().to_string()),
            ));
        }
        self.labels = labels;
        Ok(self)
    }

    /// Number of regular bins.
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Number of cells including both flow cells.
    pub fn n_cells(&self) -> usize {
        self.edges.len() + 1
    }

    /// Bin edges, `n_bins() + 1` values.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Lower edge of the first regular bin.
    pub fn min(&self) -> f64 {
        self.edges[0]
    }

    /// Upper edge of the last regular bin.
    pub fn max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Label of a regular cell, if labels are attached.
    pub fn label(&self, cell: usize) -> Option<&str> {
        if cell == 0 {
            return None;
        }
        self.labels.get(cell - 1).map(String::as_str)
    }

    /// Locates the cell containing `value`.
    pub fn find_cell(&self, value: f64) -> usize {
        if value.is_nan() || value < self.min() {
            return 0;
        }
        if value >= self.max() {
            return self.n_bins() + 1;
        }
        // partition_point gives the count of edges <= value, which is the cell index
        self.edges.partition_point(|edge| *edge <= value)
    }

    /// Lower edge of a cell. Underflow reports the first edge.
    pub fn low_edge(&self, cell: usize) -> f64 {
        match cell {
            0 => self.min(),
            c if c > self.n_bins() => self.max(),
            c => self.edges[c - 1],
        }
    }

    /// Upper edge of a cell. Overflow reports the last edge.
    pub fn high_edge(&self, cell: usize) -> f64 {
        if cell >= self.n_bins() {
            self.max()
        } else {
            self.edges[cell]
        }
    }

    /// Width of a cell. Flow cells borrow the width of their neighbouring bin.
    pub fn width(&self, cell: usize) -> f64 {
        let cell = cell.clamp(1, self.n_bins());
        self.edges[cell] - self.edges[cell - 1]
    }

    /// Center of a regular cell.
    pub fn center(&self, cell: usize) -> f64 {
        if cell == 0 {
            return self.min() - 0.5 * self.width(0);
        }
        if cell > self.n_bins() {
            return self.max() + 0.5 * self.width(cell);
        }
        0.5 * (self.edges[cell - 1] + self.edges[cell])
    }

    /// Returns true when both axes have the same edges.
    pub fn same_binning(&self, other: &Axis) -> bool {
        self.edges == other.edges
    }
}

/// Checks that an edge list has at least two finite, strictly increasing values.
pub fn validate_edges(name: &str, edges: &[f64]) -> Result<(), TrigError> {
    if edges.len() < 2 {
        return Err(TrigError::Binning(
            ErrorInfo::new("edges_short", "at least two edges are required")
                .with_context("axis", name),
        ));
    }
    for (index, pair) in edges.windows(2).enumerate() {
        if !(pair[0].is_finite() && pair[1].is_finite()) || pair[1] <= pair[0] {
            return Err(TrigError::Binning(
                ErrorInfo::new("edges_order", "edges must be finite and strictly increasing")
                    .with_context("axis", name)
                    .with_context("index", (index + 1).to_string())
                    .with_hint("sort the edges and remove duplicates"),
            ));
        }
    }
    Ok(())
}
