//! Named edge lists shared by the accumulator and the rebinning library.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::axis::{validate_edges, Axis};
use crate::errors::{ErrorInfo, TrigError};

/// Collection of named bin-edge lists.
///
/// Entries populated from configuration are write-once. Names registered as derived
/// may be written any number of times, which is how bin edges chosen after a rebinning
/// decision are recorded next to the configured ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinningDescriptor {
    entries: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    derived: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    projection_hash: Option<String>,
}

impl BinningDescriptor {
    /// Creates an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a configured edge list. Fails if the name is already populated.
    pub fn set_configured(&mut self, name: &str, edges: &[f64]) -> Result<(), TrigError> {
        if self.entries.contains_key(name) {
            return Err(TrigError::Binning(
                ErrorInfo::new("descriptor_write_once", "configured edges are write-once")
                    .with_context("entry", name),
            ));
        }
        validate_edges(name, edges)?;
        self.entries.insert(name.to_string(), edges.to_vec());
        Ok(())
    }

    /// Stores or replaces a derived edge list. Configured names are rejected.
    pub fn set_derived(&mut self, name: &str, edges: &[f64]) -> Result<(), TrigError> {
        if self.entries.contains_key(name) && !self.derived.contains(name) {
            return Err(TrigError::Binning(
                ErrorInfo::new(
                    "descriptor_configured",
                    "cannot overwrite a configured entry with derived edges",
                )
                .with_context("entry", name),
            ));
        }
        if edges.is_empty() {
            return Err(TrigError::Binning(
                ErrorInfo::new("descriptor_empty", "derived entry needs at least one value")
                    .with_context("entry", name),
            ));
        }
        self.derived.insert(name.to_string());
        self.entries.insert(name.to_string(), edges.to_vec());
        Ok(())
    }

    /// Records the hash of the configuration used for projection.
    pub fn set_projection_hash(&mut self, hash: impl Into<String>) {
        self.projection_hash = Some(hash.into());
    }

    /// Hash recorded by [`Self::set_projection_hash`].
    pub fn projection_hash(&self) -> Option<&str> {
        self.projection_hash.as_deref()
    }

    /// Returns true when the entry was written through [`Self::set_derived`].
    pub fn is_derived(&self, name: &str) -> bool {
        self.derived.contains(name)
    }

    /// Raw edges of an entry.
    pub fn edges(&self, name: &str) -> Option<&[f64]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Names of all populated entries in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of bins described by an entry, zero when absent.
    pub fn n_bins(&self, name: &str) -> usize {
        self.entries
            .get(name)
            .map(|edges| edges.len().saturating_sub(1))
            .unwrap_or(0)
    }

    /// Lower edge of bin `bin`. `bin == n_bins` yields the top edge.
    pub fn low_edge(&self, name: &str, bin: usize) -> Option<f64> {
        let edges = self.entries.get(name)?;
        if bin > edges.len().saturating_sub(1) {
            return None;
        }
        edges.get(bin).copied()
    }

    /// Upper edge of bin `bin`.
    pub fn high_edge(&self, name: &str, bin: usize) -> Option<f64> {
        if bin >= self.n_bins(name) {
            return None;
        }
        self.entries.get(name)?.get(bin + 1).copied()
    }

    /// Zero-based bin containing `value`, `None` below the first edge or at and above
    /// the last one.
    pub fn bin_index(&self, name: &str, value: f64) -> Option<usize> {
        let edges = self.entries.get(name)?;
        let first = *edges.first()?;
        if value < first {
            return None;
        }
        edges
            .iter()
            .skip(1)
            .position(|edge| value < *edge)
    }

    /// Builds an [`Axis`] over a populated entry.
    pub fn axis(&self, name: &str) -> Result<Axis, TrigError> {
        let edges = self.entries.get(name).ok_or_else(|| {
            TrigError::Binning(
                ErrorInfo::new("descriptor_missing", "no edges stored under this name")
                    .with_context("entry", name),
            )
        })?;
        Axis::variable(name, edges)
    }
}
