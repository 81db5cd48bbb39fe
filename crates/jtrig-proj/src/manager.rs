//! Projection of the filled jet accumulators into per-centrality, per-trigger
//! distributions, and the processed layout they are written in.

use std::collections::BTreeMap;

use jtrig_core::{BinningDescriptor, ErrorInfo, TrigError};
use jtrig_hist::{AxisRange, Hist1D, Hist2D, SparseHistogram};
use jtrig_select::histograms::names;
use jtrig_select::{
    Card, DataLevel, DataType, EventStage, JetKind, LabelTables, ANY_TRIGGER, AXIS_CENTRALITY,
    AXIS_ETA, AXIS_LEVEL, AXIS_PHI, AXIS_PT, AXIS_TRIGGER, COUNTER_NAME, N_TRIGGERS,
};

use crate::store::{HistogramStore, StoredHistogram};

/// Largest number of centrality bins the manager projects.
pub const MAX_CENTRALITY_BINS: usize = 5;

/// Descriptor entry recording the centrality borders used for projection.
pub const PROJECTED_CENTRALITY_EDGES: &str = "projected_centrality";

const EVENT_INFORMATION: [&str; 6] = [
    names::VERTEX_Z,
    names::VERTEX_Z_WEIGHTED,
    names::CENTRALITY,
    names::CENTRALITY_WEIGHTED,
    names::PT_HAT,
    names::PT_HAT_WEIGHTED,
];

/// Composite key of one projected jet distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JetHistKey {
    /// Accumulator the distribution comes from.
    pub kind: JetKind,
    /// Projection centrality bin.
    pub centrality: usize,
    /// Reconstructed or generator level.
    pub level: DataLevel,
    /// Trigger slot, [`ANY_TRIGGER`] for the inclusive one.
    pub trigger: usize,
}

impl JetHistKey {
    /// Builds a key.
    pub fn new(kind: JetKind, centrality: usize, level: DataLevel, trigger: usize) -> Self {
        Self {
            kind,
            centrality,
            level,
            trigger,
        }
    }
}

/// Projected jet quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Jet pT.
    Pt,
    /// Jet φ.
    Phi,
    /// Jet η.
    Eta,
    /// Two-dimensional η-φ map.
    EtaPhi,
}

impl Quantity {
    /// All quantities in write order.
    pub const ALL: [Quantity; 4] = [Quantity::Pt, Quantity::Phi, Quantity::Eta, Quantity::EtaPhi];

    /// Name fragment used in processed histogram names.
    pub fn name(self) -> &'static str {
        match self {
            Quantity::Pt => "Pt",
            Quantity::Phi => "Phi",
            Quantity::Eta => "Eta",
            Quantity::EtaPhi => "EtaPhi",
        }
    }
}

/// Processed name of one distribution, for example
/// `inclusiveJetGeneratorLevel/inclusiveJetPt_CaloJet80_C1`. The any-trigger slot
/// carries no trigger suffix.
pub fn processed_name(tables: &LabelTables, key: &JetHistKey, quantity: Quantity) -> String {
    let kind = key.kind.name();
    let trigger = if key.trigger == ANY_TRIGGER {
        String::new()
    } else {
        format!("_{}", tables.trigger_name(key.trigger))
    };
    format!(
        "{kind}{}/{kind}{}{trigger}_C{}",
        key.level.suffix(),
        quantity.name(),
        key.centrality
    )
}

/// Distributions projected for one key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JetHistograms {
    /// Jet pT, always loaded.
    pub pt: Option<Hist1D>,
    /// Jet φ.
    pub phi: Option<Hist1D>,
    /// Jet η.
    pub eta: Option<Hist1D>,
    /// η-φ map with φ on x.
    pub eta_phi: Option<Hist2D>,
}

impl JetHistograms {
    fn one_d(&self, quantity: Quantity) -> Option<&Hist1D> {
        match quantity {
            Quantity::Pt => self.pt.as_ref(),
            Quantity::Phi => self.phi.as_ref(),
            Quantity::Eta => self.eta.as_ref(),
            Quantity::EtaPhi => None,
        }
    }
}

/// Which groups of histograms are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadFlags {
    /// Vertex, centrality and pT-hat histograms.
    pub event_information: bool,
    /// Jet φ and η on top of jet pT.
    pub jets: bool,
    /// The η-φ maps. Only used together with `jets`.
    pub two_dimensional: bool,
    /// Divide projections by bin width.
    pub normalize_width: bool,
}

impl Default for LoadFlags {
    fn default() -> Self {
        Self {
            event_information: false,
            jets: false,
            two_dimensional: false,
            normalize_width: true,
        }
    }
}

/// Clamps a loaded bin range into `0..n_bins`.
pub fn bin_sanity_check(n_bins: usize, first: i64, last: i64) -> (usize, usize) {
    let top = n_bins.saturating_sub(1) as i64;
    let first = first.max(0);
    let last = last.max(first).min(top);
    (first.min(top) as usize, last as usize)
}

/// Loads projections from a store holding filled accumulators or processed
/// histograms, and writes them back in the processed layout.
#[derive(Debug, Clone)]
pub struct ProjectionManager {
    card: Card,
    data_type: DataType,
    tables: LabelTables,
    flags: LoadFlags,
    centrality_borders: Vec<f64>,
    first_centrality_bin: usize,
    last_centrality_bin: usize,
    projection_hash: Option<String>,
    event_histograms: BTreeMap<String, Hist1D>,
    jet_histograms: BTreeMap<JetHistKey, JetHistograms>,
}

impl ProjectionManager {
    /// Manager using the centrality binning of `card`.
    ///
    /// Samples without centrality only load bin 0, whose lower border moves to -0.5
    /// so events filled at centrality -0.5 are inside it.
    pub fn new(card: Card) -> Self {
        let data_type = card.data_type();
        let mut borders = card.centrality_bin_edges.clone();
        if borders.len() > MAX_CENTRALITY_BINS + 1 {
            log::warn!(
                "Too many centrality bins in the card. Only the first {MAX_CENTRALITY_BINS} are projected."
            );
            borders.truncate(MAX_CENTRALITY_BINS + 1);
        }
        let n_bins = borders.len().saturating_sub(1);
        let mut last = n_bins.saturating_sub(1);
        if !data_type.is_heavy_ion() {
            last = 0;
            if let Some(first) = borders.first_mut() {
                *first = -0.5;
            }
        }
        Self {
            tables: LabelTables::new(card.jet_type),
            card,
            data_type,
            flags: LoadFlags::default(),
            centrality_borders: borders,
            first_centrality_bin: 0,
            last_centrality_bin: last,
            projection_hash: None,
            event_histograms: BTreeMap::new(),
            jet_histograms: BTreeMap::new(),
        }
    }

    /// Manager for the card stored in `store`.
    pub fn from_store(store: &dyn HistogramStore) -> Result<Self, TrigError> {
        let card = store.get_card()?.ok_or_else(|| {
            TrigError::Store(
                ErrorInfo::new("card_missing", "the store holds no card")
                    .with_hint("fill the store with `jtrig fill` first"),
            )
        })?;
        Ok(Self::new(card))
    }

    /// Card the manager was built from.
    pub fn card(&self) -> &Card {
        &self.card
    }

    /// Data type of the sample.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Label tables for the card's jet type.
    pub fn tables(&self) -> &LabelTables {
        &self.tables
    }

    /// Current load flags.
    pub fn flags(&self) -> LoadFlags {
        self.flags
    }

    /// Replaces the load flags.
    pub fn set_flags(&mut self, flags: LoadFlags) {
        self.flags = flags;
    }

    /// Loads the vertex, centrality and pT-hat histograms.
    pub fn set_load_event_information(&mut self, load: bool) {
        self.flags.event_information = load;
    }

    /// Loads jet φ and η.
    pub fn set_load_jets(&mut self, load: bool) {
        self.flags.jets = load;
    }

    /// Loads the η-φ maps.
    pub fn set_load_2d(&mut self, load: bool) {
        self.flags.two_dimensional = load;
    }

    /// Records the hash written into the card on [`Self::write`].
    pub fn set_projection_hash(&mut self, hash: impl Into<String>) {
        self.projection_hash = Some(hash.into());
    }

    /// Number of projection centrality bins.
    pub fn n_centrality_bins(&self) -> usize {
        self.centrality_borders.len().saturating_sub(1)
    }

    /// Border `index` of the projection centrality bins.
    pub fn centrality_bin_border(&self, index: usize) -> Option<f64> {
        self.centrality_borders.get(index).copied()
    }

    /// First loaded centrality bin.
    pub fn first_centrality_bin(&self) -> usize {
        self.first_centrality_bin
    }

    /// Last loaded centrality bin.
    pub fn last_centrality_bin(&self) -> usize {
        self.last_centrality_bin
    }

    /// Replaces the projection centrality borders. More than
    /// [`MAX_CENTRALITY_BINS`] bins are refused and the current borders kept.
    pub fn set_centrality_bins(&mut self, borders: &[f64]) -> bool {
        let n_bins = borders.len().saturating_sub(1);
        if n_bins > MAX_CENTRALITY_BINS {
            log::warn!(
                "Too many centrality bins given. Maximum number is {MAX_CENTRALITY_BINS}. Will not set bins."
            );
            return false;
        }
        if n_bins == 0 {
            log::warn!("At least two centrality bin borders are needed. Will not set bins.");
            return false;
        }
        self.centrality_borders = borders.to_vec();
        self.set_centrality_bin_range(
            self.first_centrality_bin as i64,
            self.last_centrality_bin as i64,
        );
        true
    }

    /// Restricts the loaded centrality bins to `first..=last` after clamping.
    pub fn set_centrality_bin_range(&mut self, first: i64, last: i64) {
        let (first, last) = bin_sanity_check(self.n_centrality_bins(), first, last);
        self.first_centrality_bin = first;
        self.last_centrality_bin = last;
    }

    /// Card descriptor with the projection borders and hash added.
    pub fn descriptor(&self) -> Result<BinningDescriptor, TrigError> {
        let mut descriptor = self.card.descriptor()?;
        descriptor.set_derived(PROJECTED_CENTRALITY_EDGES, &self.centrality_borders)?;
        if let Some(hash) = &self.projection_hash {
            descriptor.set_projection_hash(hash.clone());
        }
        Ok(descriptor)
    }

    /// Projects the filled accumulators in `store`.
    ///
    /// The selection counter is always loaded. Jet pT is projected for every
    /// centrality bin, data level, trigger slot and jet kind; φ, η and η-φ follow
    /// the load flags. Absent accumulators are logged and skipped.
    pub fn load(&mut self, store: &dyn HistogramStore) -> Result<(), TrigError> {
        self.load_event_histograms(store)?;

        for kind in JetKind::ALL {
            let Some(sparse) = find_sparse(store, kind.name())? else {
                continue;
            };
            let Some(centrality_axis) = sparse.axis(AXIS_CENTRALITY) else {
                log::warn!("{} has no centrality axis. Skipping it.", sparse.name);
                continue;
            };
            for centrality in self.first_centrality_bin..=self.last_centrality_bin {
                let (Some(low_border), Some(high_border)) = (
                    self.centrality_bin_border(centrality),
                    self.centrality_bin_border(centrality + 1),
                ) else {
                    continue;
                };
                let low = centrality_axis.find_cell(low_border);
                let high = centrality_axis.find_cell(high_border).saturating_sub(1);
                for level in DataLevel::ALL {
                    for trigger in 0..=N_TRIGGERS {
                        let restrictions = [
                            AxisRange::new(AXIS_CENTRALITY, low, high),
                            AxisRange::new(AXIS_LEVEL, level.index() + 1, level.index() + 1),
                            AxisRange::new(AXIS_TRIGGER, trigger + 1, trigger + 1),
                        ];
                        let key = JetHistKey::new(kind, centrality, level, trigger);
                        let projected = self.project_key(&sparse, &restrictions);
                        self.jet_histograms.insert(key, projected);
                    }
                }
            }
            log::debug!(
                "projected {} for centrality bins {}..={}",
                kind.name(),
                self.first_centrality_bin,
                self.last_centrality_bin
            );
        }
        Ok(())
    }

    fn project_key(&self, sparse: &SparseHistogram, restrictions: &[AxisRange]) -> JetHistograms {
        let normalize = self.flags.normalize_width;
        let one_d = |axis: usize| {
            sparse.project_1d(axis, restrictions).map(|mut hist| {
                if normalize {
                    hist.scale_width(1.0);
                }
                hist
            })
        };
        let mut projected = JetHistograms {
            pt: one_d(AXIS_PT),
            ..JetHistograms::default()
        };
        if !self.flags.jets {
            return projected;
        }
        projected.phi = one_d(AXIS_PHI);
        projected.eta = one_d(AXIS_ETA);
        if self.flags.two_dimensional {
            projected.eta_phi = sparse
                .project_2d(AXIS_PHI, AXIS_ETA, restrictions)
                .map(|mut hist| {
                    if normalize {
                        hist.scale_width(1.0);
                    }
                    hist
                });
        }
        projected
    }

    fn load_event_histograms(&mut self, store: &dyn HistogramStore) -> Result<(), TrigError> {
        let mut wanted = vec![COUNTER_NAME];
        if self.flags.event_information {
            wanted.extend(EVENT_INFORMATION);
        }
        for name in wanted {
            if let Some(hist) = find_1d(store, name)? {
                self.event_histograms.insert(name.to_string(), hist);
            }
        }
        Ok(())
    }

    /// Loads histograms already written in the processed layout.
    pub fn load_processed(&mut self, store: &dyn HistogramStore) -> Result<(), TrigError> {
        self.load_event_histograms(store)?;
        for kind in JetKind::ALL {
            for level in DataLevel::ALL {
                for centrality in self.first_centrality_bin..=self.last_centrality_bin {
                    for trigger in 0..=N_TRIGGERS {
                        let key = JetHistKey::new(kind, centrality, level, trigger);
                        let name = |quantity| processed_name(&self.tables, &key, quantity);
                        let mut loaded = JetHistograms {
                            pt: get_1d(store, &name(Quantity::Pt))?,
                            ..JetHistograms::default()
                        };
                        if self.flags.jets {
                            loaded.phi = get_1d(store, &name(Quantity::Phi))?;
                            loaded.eta = get_1d(store, &name(Quantity::Eta))?;
                            if self.flags.two_dimensional {
                                loaded.eta_phi = store
                                    .get(&name(Quantity::EtaPhi))?
                                    .and_then(|stored| stored.as_2d().cloned());
                            }
                        }
                        self.jet_histograms.insert(key, loaded);
                    }
                }
            }
        }
        Ok(())
    }

    /// Writes the loaded histograms in the processed layout, followed by the card.
    ///
    /// Keys without a jet pT histogram are reported and skipped.
    pub fn write(&self, store: &mut dyn HistogramStore) -> Result<(), TrigError> {
        for (name, hist) in &self.event_histograms {
            store.put(name, StoredHistogram::OneD(hist.clone()))?;
        }

        for (key, histograms) in &self.jet_histograms {
            if histograms.pt.is_none() {
                log::warn!(
                    "Could not find histograms of type {} to write. Will skip writing these.",
                    key.kind.name()
                );
                continue;
            }
            for quantity in [Quantity::Pt, Quantity::Phi, Quantity::Eta] {
                if let Some(hist) = histograms.one_d(quantity) {
                    let name = processed_name(&self.tables, key, quantity);
                    store.put(&name, StoredHistogram::OneD(hist.renamed(leaf(&name))))?;
                }
            }
            if !self.flags.two_dimensional {
                continue;
            }
            if let Some(hist) = &histograms.eta_phi {
                let name = processed_name(&self.tables, key, Quantity::EtaPhi);
                let mut hist = hist.clone();
                hist.name = leaf(&name).to_string();
                store.put(&name, StoredHistogram::TwoD(hist))?;
            }
        }

        let mut card = self.card.clone();
        if let Some(hash) = &self.projection_hash {
            card.projection_hash = Some(hash.clone());
        }
        store.put_card(&card)
    }

    /// Loaded event histogram by name.
    pub fn event_histogram(&self, name: &str) -> Option<&Hist1D> {
        self.event_histograms.get(name)
    }

    /// Distributions for a key. Samples without centrality always answer from bin 0.
    pub fn jet_histograms(&self, key: &JetHistKey) -> Option<&JetHistograms> {
        let mut key = *key;
        if !self.data_type.is_heavy_ion() {
            key.centrality = 0;
        }
        self.jet_histograms.get(&key)
    }

    /// Jet pT distribution for a key.
    pub fn jet_pt(&self, key: &JetHistKey) -> Option<&Hist1D> {
        self.jet_histograms(key)?.pt.as_ref()
    }

    /// Every loaded key in order.
    pub fn keys(&self) -> impl Iterator<Item = &JetHistKey> {
        self.jet_histograms.keys()
    }

    /// Events passing the full event selection.
    pub fn n_events(&self) -> Option<f64> {
        let counter = self.event_histograms.get(COUNTER_NAME)?;
        let cell = counter.find_cell(EventStage::VzCut.index() as f64);
        Some(counter.content(cell))
    }

    /// Width-weighted jet pT integral over all regular bins and the overflow.
    pub fn jet_pt_integral(&self, key: &JetHistKey) -> Option<f64> {
        let hist = self.jet_pt(key)?;
        Some(hist.integral(1, hist.n_bins() + 1, true))
    }

    /// Width-weighted jet pT integral over the bins covering `min_pt..max_pt`.
    pub fn jet_pt_integral_range(&self, key: &JetHistKey, min_pt: f64, max_pt: f64) -> Option<f64> {
        let hist = self.jet_pt(key)?;
        let first = hist.find_cell(min_pt + 0.001);
        let last = hist.find_cell(max_pt - 0.001);
        Some(hist.integral(first, last, true))
    }
}

// Histograms carry the last path component of their stored name.
fn leaf(name: &str) -> &str {
    name.rsplit_once('/').map_or(name, |(_, leaf)| leaf)
}

fn find_sparse(
    store: &dyn HistogramStore,
    name: &str,
) -> Result<Option<SparseHistogram>, TrigError> {
    match store.get(name)? {
        Some(StoredHistogram::Sparse(hist)) => Ok(Some(hist)),
        _ => {
            log::warn!("Could not find {name}. Skipping loading this histogram.");
            Ok(None)
        }
    }
}

fn find_1d(store: &dyn HistogramStore, name: &str) -> Result<Option<Hist1D>, TrigError> {
    let found = get_1d(store, name)?;
    if found.is_none() {
        log::warn!("Could not find {name}. Skipping loading this histogram.");
    }
    Ok(found)
}

fn get_1d(store: &dyn HistogramStore, name: &str) -> Result<Option<Hist1D>, TrigError> {
    Ok(store
        .get(name)?
        .and_then(|stored| stored.as_1d().cloned()))
}
