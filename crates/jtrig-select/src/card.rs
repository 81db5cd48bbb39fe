use std::fs;
use std::path::Path;

use jtrig_core::serde_io::from_yaml_slice;
use jtrig_core::{stable_hash_string, BinningDescriptor, ErrorInfo, TrigError};
use serde::{Deserialize, Serialize};

use crate::tables::{DataType, N_TRIGGERS};

/// Descriptor entry holding the centrality edges of the jet accumulators.
pub const CENTRALITY_EDGES: &str = "centrality";
/// Descriptor entry holding the pT-hat edges of the `pthat` histogram.
pub const PT_HAT_EDGES: &str = "pt_hat";

fn config_error(code: &str, err: impl ToString) -> TrigError {
    TrigError::Config(ErrorInfo::new(code, err.to_string()))
}

/// Analysis configuration card.
///
/// Read from YAML; every field may be omitted. The card travels with the filled
/// histograms so the projection step sees the same cuts and binning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Data type code: 0 pp, 1 PbPb, 2 pp MC, 3 PbPb MC, 4 local test.
    #[serde(default)]
    pub data_type: i64,
    /// Index of the trigger defining the sample.
    #[serde(default)]
    pub base_trigger: usize,
    /// 0 calorimeter jets, 1 particle-flow jets.
    #[serde(default)]
    pub jet_type: u8,
    /// 0 E-scheme axis, 1 leading-candidate axis, 2 WTA axis.
    #[serde(default)]
    pub jet_axis: u8,
    /// Jets with `|eta| >= jet_eta_cut` are rejected.
    #[serde(default = "default_jet_eta_cut")]
    pub jet_eta_cut: f64,
    /// Lowest accepted jet pT.
    #[serde(default)]
    pub min_jet_pt_cut: f64,
    /// Highest accepted jet pT.
    #[serde(default = "default_max_jet_pt_cut")]
    pub max_jet_pt_cut: f64,
    /// Reject jets in the azimuthal region with poor tracking.
    #[serde(default)]
    pub cut_bad_phi: bool,
    /// Jets whose leading track carries at most this pT fraction are rejected.
    #[serde(default = "default_min_max_track_pt_fraction")]
    pub min_max_track_pt_fraction: f64,
    /// Jets whose leading track carries at least this pT fraction are rejected.
    #[serde(default = "default_max_max_track_pt_fraction")]
    pub max_max_track_pt_fraction: f64,
    /// Largest accepted `|vz|`.
    #[serde(default = "default_z_vertex_cut")]
    pub z_vertex_cut: f64,
    /// Events with pT hat below this value are dropped.
    #[serde(default)]
    pub low_pt_hat_cut: f64,
    /// Events with pT hat at or above this value are dropped.
    #[serde(default = "default_high_pt_hat_cut")]
    pub high_pt_hat_cut: f64,
    /// Centrality edges of the jet accumulators.
    #[serde(default = "default_centrality_bin_edges")]
    pub centrality_bin_edges: Vec<f64>,
    /// Edges of the `pthat` histogram.
    #[serde(default = "default_pt_hat_bin_edges")]
    pub pt_hat_bin_edges: Vec<f64>,
    /// Verbosity of per-event diagnostics.
    #[serde(default)]
    pub debug_level: u8,
    /// Inputs the histograms were filled from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_files: Vec<String>,
    /// Hash of the card used for projection, recorded by the projection step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_hash: Option<String>,
}

fn default_jet_eta_cut() -> f64 {
    1.6
}

fn default_max_jet_pt_cut() -> f64 {
    5020.0
}

fn default_min_max_track_pt_fraction() -> f64 {
    0.01
}

fn default_max_max_track_pt_fraction() -> f64 {
    0.98
}

fn default_z_vertex_cut() -> f64 {
    15.0
}

fn default_high_pt_hat_cut() -> f64 {
    10_000.0
}

fn default_centrality_bin_edges() -> Vec<f64> {
    vec![0.0, 10.0, 30.0, 50.0, 90.0]
}

fn default_pt_hat_bin_edges() -> Vec<f64> {
    vec![0.0, 30.0, 50.0, 80.0, 120.0, 170.0, 220.0, 280.0, 370.0, 460.0]
}

impl Default for Card {
    fn default() -> Self {
        Self {
            data_type: 0,
            base_trigger: 0,
            jet_type: 0,
            jet_axis: 0,
            jet_eta_cut: default_jet_eta_cut(),
            min_jet_pt_cut: 0.0,
            max_jet_pt_cut: default_max_jet_pt_cut(),
            cut_bad_phi: false,
            min_max_track_pt_fraction: default_min_max_track_pt_fraction(),
            max_max_track_pt_fraction: default_max_max_track_pt_fraction(),
            z_vertex_cut: default_z_vertex_cut(),
            low_pt_hat_cut: 0.0,
            high_pt_hat_cut: default_high_pt_hat_cut(),
            centrality_bin_edges: default_centrality_bin_edges(),
            pt_hat_bin_edges: default_pt_hat_bin_edges(),
            debug_level: 0,
            input_files: Vec::new(),
            projection_hash: None,
        }
    }
}

impl Card {
    /// Resolved data type. Unknown codes fall back to pp.
    pub fn data_type(&self) -> DataType {
        DataType::from_code(self.data_type).unwrap_or_else(|| {
            log::warn!(
                "Unknown data type code {}, falling back to pp",
                self.data_type
            );
            DataType::Pp
        })
    }

    /// Returns a copy with out-of-domain values replaced.
    ///
    /// Unknown data type, base trigger and jet type codes are reset to zero, negative
    /// cuts are made positive and inverted windows are swapped. Every change is
    /// logged.
    pub fn sanitised(&self) -> Card {
        let mut card = self.clone();
        if DataType::from_code(card.data_type).is_none() {
            log::warn!(
                "Unknown data type code {}, falling back to pp",
                card.data_type
            );
            card.data_type = DataType::Pp.code();
        }
        if card.base_trigger >= N_TRIGGERS {
            log::warn!(
                "Base trigger index {} out of range, using 0",
                card.base_trigger
            );
            card.base_trigger = 0;
        }
        if card.jet_type > 1 {
            log::warn!("Unknown jet type {}, using calorimeter jets", card.jet_type);
            card.jet_type = 0;
        }
        card.jet_eta_cut = card.jet_eta_cut.abs();
        card.z_vertex_cut = card.z_vertex_cut.abs();
        if card.min_jet_pt_cut > card.max_jet_pt_cut {
            log::warn!("Jet pT window inverted, swapping limits");
            std::mem::swap(&mut card.min_jet_pt_cut, &mut card.max_jet_pt_cut);
        }
        if card.low_pt_hat_cut > card.high_pt_hat_cut {
            log::warn!("pT hat window inverted, swapping limits");
            std::mem::swap(&mut card.low_pt_hat_cut, &mut card.high_pt_hat_cut);
        }
        card
    }

    /// Number of centrality bins of the jet accumulators.
    pub fn n_centrality_bins(&self) -> usize {
        self.centrality_bin_edges.len().saturating_sub(1)
    }

    /// Builds the binning descriptor holding the configured edge lists.
    pub fn descriptor(&self) -> Result<BinningDescriptor, TrigError> {
        let mut descriptor = BinningDescriptor::new();
        descriptor.set_configured(CENTRALITY_EDGES, &self.centrality_bin_edges)?;
        descriptor.set_configured(PT_HAT_EDGES, &self.pt_hat_bin_edges)?;
        if let Some(hash) = &self.projection_hash {
            descriptor.set_projection_hash(hash.clone());
        }
        Ok(descriptor)
    }

    /// Stable hash of the analysis settings. Bookkeeping fields are excluded.
    pub fn card_hash(&self) -> Result<String, TrigError> {
        let mut settings = self.clone();
        settings.input_files.clear();
        settings.projection_hash = None;
        stable_hash_string(&settings)
    }
}

/// Loads and sanitises a YAML card.
pub fn load_card(path: &Path) -> Result<Card, TrigError> {
    let data = fs::read(path).map_err(|err| {
        TrigError::Config(
            ErrorInfo::new("card_read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let card: Card = from_yaml_slice(&data)?;
    let card = card.sanitised();
    card.descriptor()
        .map_err(|err| config_error("card_binning", err))?;
    Ok(card)
}
