use jtrig_core::{Axis, ErrorInfo, TrigError};
use serde::{Deserialize, Serialize};

/// Dense two-dimensional weighted histogram with flow cells on both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist2D {
    /// Histogram name.
    pub name: String,
    x: Axis,
    y: Axis,
    contents: Vec<f64>,
    variances: Vec<f64>,
}

impl Hist2D {
    /// Creates an empty histogram over the two axes.
    pub fn new(name: impl Into<String>, x: Axis, y: Axis) -> Self {
        let cells = x.n_cells() * y.n_cells();
        Self {
            name: name.into(),
            x,
            y,
            contents: vec![0.0; cells],
            variances: vec![0.0; cells],
        }
    }

    /// Horizontal axis.
    pub fn x_axis(&self) -> &Axis {
        &self.x
    }

    /// Vertical axis.
    pub fn y_axis(&self) -> &Axis {
        &self.y
    }

    fn index(&self, cx: usize, cy: usize) -> Option<usize> {
        if cx < self.x.n_cells() && cy < self.y.n_cells() {
            Some(cy * self.x.n_cells() + cx)
        } else {
            None
        }
    }

    /// Adds `weight` at `(x, y)`.
    pub fn fill_weighted(&mut self, x: f64, y: f64, weight: f64) {
        let cx = self.x.find_cell(x);
        let cy = self.y.find_cell(y);
        self.fill_cell(cx, cy, weight);
    }

    /// Adds `weight` directly to cell `(cx, cy)`.
    pub fn fill_cell(&mut self, cx: usize, cy: usize, weight: f64) {
        if let Some(index) = self.index(cx, cy) {
            self.contents[index] += weight;
            self.variances[index] += weight * weight;
        }
    }

    pub(crate) fn accumulate(&mut self, cx: usize, cy: usize, content: f64, variance: f64) {
        if let Some(index) = self.index(cx, cy) {
            self.contents[index] += content;
            self.variances[index] += variance;
        }
    }

    /// Content of a cell.
    pub fn content(&self, cx: usize, cy: usize) -> f64 {
        self.index(cx, cy).map_or(0.0, |i| self.contents[i])
    }

    /// Error of a cell.
    pub fn error(&self, cx: usize, cy: usize) -> f64 {
        self.index(cx, cy).map_or(0.0, |i| self.variances[i].sqrt())
    }

    /// Overwrites the content of a cell.
    pub fn set_content(&mut self, cx: usize, cy: usize, value: f64) {
        if let Some(index) = self.index(cx, cy) {
            self.contents[index] = value;
        }
    }

    /// Overwrites the error of a cell.
    pub fn set_error(&mut self, cx: usize, cy: usize, error: f64) {
        if let Some(index) = self.index(cx, cy) {
            self.variances[index] = error * error;
        }
    }

    /// Sum of all cell contents including flows.
    pub fn total(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Multiplies content and error of every cell by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for (content, variance) in self.contents.iter_mut().zip(self.variances.iter_mut()) {
            *content *= factor;
            *variance *= factor * factor;
        }
    }

    /// Multiplies every regular cell by `factor / area`. Cells touching a flow row or
    /// column only get `factor`.
    pub fn scale_width(&mut self, factor: f64) {
        let (nx, ny) = (self.x.n_bins(), self.y.n_bins());
        for cy in 0..self.y.n_cells() {
            for cx in 0..self.x.n_cells() {
                let regular = (1..=nx).contains(&cx) && (1..=ny).contains(&cy);
                let f = if regular {
                    factor / (self.x.width(cx) * self.y.width(cy))
                } else {
                    factor
                };
                let index = cy * self.x.n_cells() + cx;
                self.contents[index] *= f;
                self.variances[index] *= f * f;
            }
        }
    }

    /// Adds another histogram with identical binning.
    pub fn add(&mut self, other: &Hist2D) -> Result<(), TrigError> {
        if !(self.x.same_binning(&other.x) && self.y.same_binning(&other.y)) {
            return Err(TrigError::Histogram(
                ErrorInfo::new("binning_mismatch", "histograms have different binning")
                    .with_context("left", self.name.clone())
                    .with_context("right", other.name.clone()),
            ));
        }
        for index in 0..self.contents.len() {
            self.contents[index] += other.contents[index];
            self.variances[index] += other.variances[index];
        }
        Ok(())
    }
}
