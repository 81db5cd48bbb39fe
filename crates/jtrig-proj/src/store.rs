//! Named histogram storage.
//!
//! A store maps names to typed histograms plus one configuration card. Names may
//! contain `/` to group histograms; [`JsonDirStore`] turns those into directories.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use globset::Glob;
use jtrig_core::serde_io::{from_json_slice, to_canonical_json_bytes};
use jtrig_core::{ErrorInfo, TrigError};
use jtrig_hist::{Hist1D, Hist2D, SparseHistogram};
use jtrig_select::{Card, JetKind, TriggerHistograms};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

/// Name under which the card is stored.
pub const CARD_NAME: &str = "JCard";

const EXTENSION: &str = "json";

fn store_error(code: &str, err: impl ToString) -> TrigError {
    TrigError::Store(ErrorInfo::new(code, err.to_string()))
}

/// Histogram of any supported shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "histogram", rename_all = "snake_case")]
pub enum StoredHistogram {
    /// N-dimensional accumulator.
    Sparse(SparseHistogram),
    /// One-dimensional histogram.
    OneD(Hist1D),
    /// Two-dimensional histogram.
    TwoD(Hist2D),
}

impl StoredHistogram {
    /// Name carried by the histogram itself.
    pub fn name(&self) -> &str {
        match self {
            StoredHistogram::Sparse(hist) => &hist.name,
            StoredHistogram::OneD(hist) => &hist.name,
            StoredHistogram::TwoD(hist) => &hist.name,
        }
    }

    /// The accumulator, if this is one.
    pub fn as_sparse(&self) -> Option<&SparseHistogram> {
        match self {
            StoredHistogram::Sparse(hist) => Some(hist),
            _ => None,
        }
    }

    /// The one-dimensional histogram, if this is one.
    pub fn as_1d(&self) -> Option<&Hist1D> {
        match self {
            StoredHistogram::OneD(hist) => Some(hist),
            _ => None,
        }
    }

    /// The two-dimensional histogram, if this is one.
    pub fn as_2d(&self) -> Option<&Hist2D> {
        match self {
            StoredHistogram::TwoD(hist) => Some(hist),
            _ => None,
        }
    }
}

/// Named get and put of histograms and the card.
pub trait HistogramStore {
    /// Histogram stored under `name`, `None` when absent.
    fn get(&self, name: &str) -> Result<Option<StoredHistogram>, TrigError>;

    /// Stores `histogram` under `name`, replacing any previous entry.
    fn put(&mut self, name: &str, histogram: StoredHistogram) -> Result<(), TrigError>;

    /// Sorted names of every stored histogram. The card is not listed.
    fn names(&self) -> Result<Vec<String>, TrigError>;

    /// Stored card, `None` when absent.
    fn get_card(&self) -> Result<Option<Card>, TrigError>;

    /// Stores the card.
    fn put_card(&mut self, card: &Card) -> Result<(), TrigError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    histograms: BTreeMap<String, StoredHistogram>,
    card: Option<Card>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored histograms.
    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    /// True when no histogram is stored.
    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }
}

impl HistogramStore for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<StoredHistogram>, TrigError> {
        Ok(self.histograms.get(name).cloned())
    }

    fn put(&mut self, name: &str, histogram: StoredHistogram) -> Result<(), TrigError> {
        check_name(name)?;
        self.histograms.insert(name.to_string(), histogram);
        Ok(())
    }

    fn names(&self) -> Result<Vec<String>, TrigError> {
        Ok(self.histograms.keys().cloned().collect())
    }

    fn get_card(&self) -> Result<Option<Card>, TrigError> {
        Ok(self.card.clone())
    }

    fn put_card(&mut self, card: &Card) -> Result<(), TrigError> {
        self.card = Some(card.clone());
        Ok(())
    }
}

/// Store keeping one canonical JSON file per histogram below a root directory.
///
/// `inclusiveJet/inclusiveJetPt_C0` lives at `root/inclusiveJet/inclusiveJetPt_C0.json`;
/// the card at `root/JCard.json`.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Opens a store rooted at `root`, creating the directory.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, TrigError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| {
            TrigError::Store(
                ErrorInfo::new("store_create", err.to_string())
                    .with_context("path", root.display().to_string()),
            )
        })?;
        Ok(Self { root })
    }

    /// Opens an existing store.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, TrigError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(TrigError::Store(
                ErrorInfo::new("store_missing", "store directory does not exist")
                    .with_context("path", root.display().to_string()),
            ));
        }
        Ok(Self { root })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{EXTENSION}"))
    }

    fn read<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<Option<T>, TrigError> {
        check_name(name)?;
        let path = self.path_for(name);
        if !path.is_file() {
            return Ok(None);
        }
        let data = fs::read(&path).map_err(|err| {
            TrigError::Store(
                ErrorInfo::new("store_read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        from_json_slice(&data).map(Some)
    }

    fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<(), TrigError> {
        check_name(name)?;
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| store_error("store_mkdir", err))?;
        }
        let bytes = to_canonical_json_bytes(value)?;
        fs::write(&path, bytes).map_err(|err| {
            TrigError::Store(
                ErrorInfo::new("store_write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

impl HistogramStore for JsonDirStore {
    fn get(&self, name: &str) -> Result<Option<StoredHistogram>, TrigError> {
        self.read(name)
    }

    fn put(&mut self, name: &str, histogram: StoredHistogram) -> Result<(), TrigError> {
        self.write(name, &histogram)
    }

    fn names(&self) -> Result<Vec<String>, TrigError> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).into_iter() {
            let entry = entry.map_err(|err| store_error("store_walk", err))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Ok(rel) = path.strip_prefix(&self.root) else {
                continue;
            };
            let name = rel
                .with_extension("")
                .components()
                .filter_map(|component| match component {
                    Component::Normal(part) => part.to_str(),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/");
            if name != CARD_NAME {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn get_card(&self) -> Result<Option<Card>, TrigError> {
        self.read(CARD_NAME)
    }

    fn put_card(&mut self, card: &Card) -> Result<(), TrigError> {
        self.write(CARD_NAME, card)
    }
}

// Names become relative paths, so parent and root components are refused.
fn check_name(name: &str) -> Result<(), TrigError> {
    let valid = !name.is_empty()
        && !name.starts_with('/')
        && name
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..");
    if valid {
        Ok(())
    } else {
        Err(TrigError::Store(
            ErrorInfo::new("store_name", "histogram name is not a valid relative path")
                .with_context("name", name)
                .with_hint("use '/'-separated names without empty, '.' or '..' parts"),
        ))
    }
}

/// Stored histogram names matching a glob pattern such as `leadingJet*/*_C0`.
pub fn matching_names(
    store: &dyn HistogramStore,
    pattern: &str,
) -> Result<Vec<String>, TrigError> {
    let matcher = Glob::new(pattern)
        .map_err(|err| store_error("store_glob", err))?
        .compile_matcher();
    Ok(store
        .names()?
        .into_iter()
        .filter(|name| matcher.is_match(name))
        .collect())
}

/// Writes the output of a fill: both jet accumulators, the event histograms and
/// the card.
pub fn write_fill_output(
    store: &mut dyn HistogramStore,
    histograms: &TriggerHistograms,
    card: &Card,
) -> Result<(), TrigError> {
    for kind in JetKind::ALL {
        let sparse = histograms.jet_histogram(kind);
        store.put(kind.name(), StoredHistogram::Sparse(sparse.clone()))?;
    }
    for hist in histograms.event_histograms() {
        store.put(&hist.name, StoredHistogram::OneD(hist.clone()))?;
    }
    store.put_card(card)?;
    log::info!(
        "wrote {} jet accumulators and {} event histograms",
        JetKind::ALL.len(),
        histograms.event_histograms().len()
    );
    Ok(())
}
