use jtrig_core::{Axis, ErrorInfo, TrigError};
use serde::{Deserialize, Serialize};

/// Dense one-dimensional weighted histogram.
///
/// Content and variance are stored per cell including the two flow cells; see
/// [`Axis`] for the cell convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist1D {
    /// Histogram name.
    pub name: String,
    axis: Axis,
    contents: Vec<f64>,
    variances: Vec<f64>,
    entries: u64,
}

impl Hist1D {
    /// Creates an empty histogram over `axis`.
    pub fn new(name: impl Into<String>, axis: Axis) -> Self {
        let cells = axis.n_cells();
        Self {
            name: name.into(),
            axis,
            contents: vec![0.0; cells],
            variances: vec![0.0; cells],
            entries: 0,
        }
    }

    /// Axis of the histogram.
    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// Number of regular bins.
    pub fn n_bins(&self) -> usize {
        self.axis.n_bins()
    }

    /// Number of fills recorded.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Adds a unit-weight entry.
    pub fn fill(&mut self, value: f64) {
        self.fill_weighted(value, 1.0);
    }

    /// Adds `weight` at `value`, updating content and variance together.
    pub fn fill_weighted(&mut self, value: f64, weight: f64) {
        let cell = self.axis.find_cell(value);
        self.contents[cell] += weight;
        self.variances[cell] += weight * weight;
        self.entries += 1;
    }

    /// Adds `weight` directly to a cell.
    pub fn fill_cell(&mut self, cell: usize, weight: f64) {
        if let Some(content) = self.contents.get_mut(cell) {
            *content += weight;
            self.variances[cell] += weight * weight;
            self.entries += 1;
        }
    }

    pub(crate) fn accumulate(&mut self, cell: usize, content: f64, variance: f64) {
        if let Some(slot) = self.contents.get_mut(cell) {
            *slot += content;
            self.variances[cell] += variance;
        }
    }

    /// Content of a cell, zero outside the cell range.
    pub fn content(&self, cell: usize) -> f64 {
        self.contents.get(cell).copied().unwrap_or(0.0)
    }

    /// Statistical error of a cell.
    pub fn error(&self, cell: usize) -> f64 {
        self.variance(cell).sqrt()
    }

    /// Variance (sum of squared weights) of a cell.
    pub fn variance(&self, cell: usize) -> f64 {
        self.variances.get(cell).copied().unwrap_or(0.0)
    }

    /// Overwrites the content of a cell.
    pub fn set_content(&mut self, cell: usize, value: f64) {
        if let Some(content) = self.contents.get_mut(cell) {
            *content = value;
        }
    }

    /// Overwrites the error of a cell.
    pub fn set_error(&mut self, cell: usize, error: f64) {
        if let Some(variance) = self.variances.get_mut(cell) {
            *variance = error * error;
        }
    }

    /// Cell containing `value`.
    pub fn find_cell(&self, value: f64) -> usize {
        self.axis.find_cell(value)
    }

    /// Sum of contents over cells `first..=last`, optionally weighted by cell width.
    pub fn integral(&self, first: usize, last: usize, width: bool) -> f64 {
        let last = last.min(self.contents.len() - 1);
        (first..=last)
            .map(|cell| {
                let content = self.contents[cell];
                if width {
                    content * self.axis.width(cell)
                } else {
                    content
                }
            })
            .sum()
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

    /// Multiplies every regular cell by `factor / width`. Flow cells only get `factor`.
    pub fn scale_width(&mut self, factor: f64) {
        let n_bins = self.axis.n_bins();
        for cell in 0..self.contents.len() {
            let f = if cell == 0 || cell > n_bins {
                factor
            } else {
                factor / self.axis.width(cell)
            };
            self.contents[cell] *= f;
            self.variances[cell] *= f * f;
        }
    }

    /// Adds another histogram with identical binning cell by cell.
    pub fn add(&mut self, other: &Hist1D) -> Result<(), TrigError> {
        self.check_compatible(other, "add")?;
        for cell in 0..self.contents.len() {
            self.contents[cell] += other.contents[cell];
            self.variances[cell] += other.variances[cell];
        }
        self.entries += other.entries;
        Ok(())
    }

    /// Divides by `denominator` assuming uncorrelated inputs. Cells with a zero
    /// denominator are set to zero.
    pub fn divide(&mut self, denominator: &Hist1D) -> Result<(), TrigError> {
        self.check_compatible(denominator, "divide")?;
        for cell in 0..self.contents.len() {
            let a = self.contents[cell];
            let b = denominator.contents[cell];
            if b == 0.0 {
                self.contents[cell] = 0.0;
                self.variances[cell] = 0.0;
                continue;
            }
            let b2 = b * b;
            self.contents[cell] = a / b;
            self.variances[cell] =
                (self.variances[cell] * b2 + denominator.variances[cell] * a * a) / (b2 * b2);
        }
        Ok(())
    }

    /// Returns a renamed copy.
    pub fn renamed(&self, name: impl Into<String>) -> Hist1D {
        let mut copy = self.clone();
        copy.name = name.into();
        copy
    }

    fn check_compatible(&self, other: &Hist1D, operation: &str) -> Result<(), TrigError> {
        if self.axis.same_binning(&other.axis) {
            return Ok(());
        }
        Err(TrigError::Histogram(
            ErrorInfo::new("binning_mismatch", "histograms have different binning")
                .with_context("operation", operation)
                .with_context("left", self.name.clone())
                .with_context("right", other.name.clone()),
        ))
    }
}
