use serde::{Deserialize, Serialize};

use crate::tables::N_TRIGGERS;

fn default_true() -> bool {
    true
}

fn default_one() -> f64 {
    1.0
}

fn default_prescale() -> u32 {
    1
}

fn default_hi_bin() -> i32 {
    -1
}

/// Event-quality filter bits as read from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilters {
    /// Primary vertex quality.
    #[serde(default = "default_true")]
    pub primary_vertex: bool,
    /// Forward calorimeter coincidence.
    #[serde(default = "default_true")]
    pub hf_coincidence: bool,
    /// Vertex and pixel cluster compatibility.
    #[serde(default = "default_true")]
    pub cluster_compatibility: bool,
    /// Beam scraping veto.
    #[serde(default = "default_true")]
    pub beam_scraping: bool,
}

impl Default for EventFilters {
    fn default() -> Self {
        Self {
            primary_vertex: true,
            hf_coincidence: true,
            cluster_compatibility: true,
            beam_scraping: true,
        }
    }
}

/// Decision and prescale of one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRecord {
    /// Whether the trigger fired.
    #[serde(default)]
    pub fired: bool,
    /// Prescale numerator.
    #[serde(default = "default_prescale")]
    pub prescale_numerator: u32,
    /// Prescale denominator.
    #[serde(default = "default_prescale")]
    pub prescale_denominator: u32,
}

impl TriggerRecord {
    /// A fired trigger with unit prescale.
    pub fn fired() -> Self {
        Self {
            fired: true,
            ..Self::default()
        }
    }

    /// Prescale as `numerator / denominator`; a zero denominator counts as one.
    pub fn prescale(&self) -> f64 {
        let numerator = f64::from(self.prescale_numerator);
        if self.prescale_denominator == 0 {
            numerator
        } else {
            numerator / f64::from(self.prescale_denominator)
        }
    }
}

impl Default for TriggerRecord {
    fn default() -> Self {
        Self {
            fired: false,
            prescale_numerator: 1,
            prescale_denominator: 1,
        }
    }
}

/// Reconstructed jet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Jet {
    /// Transverse momentum.
    pub pt: f64,
    /// Azimuthal angle.
    pub phi: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Uncorrected transverse momentum.
    #[serde(default)]
    pub raw_pt: f64,
    /// pT of the highest-pT track in the jet.
    #[serde(default)]
    pub max_track_pt: f64,
}

impl Jet {
    /// Fraction of the raw pT carried by the leading track, zero without a raw pT.
    pub fn max_track_fraction(&self) -> f64 {
        if self.raw_pt > 0.0 {
            self.max_track_pt / self.raw_pt
        } else {
            0.0
        }
    }
}

/// Generator-level jet with both axis definitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenJet {
    /// Transverse momentum.
    pub pt: f64,
    /// Azimuthal angle of the E-scheme axis.
    pub phi: f64,
    /// Pseudorapidity of the E-scheme axis.
    pub eta: f64,
    /// Azimuthal angle of the winner-takes-all axis.
    #[serde(default)]
    pub wta_phi: f64,
    /// Pseudorapidity of the winner-takes-all axis.
    #[serde(default)]
    pub wta_eta: f64,
}

/// One collision event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Vertex z position.
    #[serde(default)]
    pub vz: f64,
    /// Centrality bin in half-percent units, −1 when not available.
    #[serde(default = "default_hi_bin")]
    pub hi_bin: i32,
    /// Hard-scattering scale, simulation only.
    #[serde(default)]
    pub pt_hat: f64,
    /// Generator event weight, simulation only.
    #[serde(default = "default_one")]
    pub weight: f64,
    /// Event-quality filter bits.
    #[serde(default)]
    pub filters: EventFilters,
    /// Trigger records by trigger index. Missing entries did not fire.
    #[serde(default)]
    pub triggers: Vec<TriggerRecord>,
    /// Reconstructed jets.
    #[serde(default)]
    pub jets: Vec<Jet>,
    /// Generator-level jets.
    #[serde(default)]
    pub gen_jets: Vec<GenJet>,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            vz: 0.0,
            hi_bin: default_hi_bin(),
            pt_hat: 0.0,
            weight: 1.0,
            filters: EventFilters::default(),
            triggers: Vec::new(),
            jets: Vec::new(),
            gen_jets: Vec::new(),
        }
    }
}

impl Event {
    /// Record of trigger `index`, a non-fired record when absent.
    pub fn trigger(&self, index: usize) -> TriggerRecord {
        self.triggers.get(index).copied().unwrap_or_default()
    }

    /// Marks trigger `index` as fired with unit prescale.
    pub fn fire(&mut self, index: usize) {
        if index >= N_TRIGGERS {
            return;
        }
        if self.triggers.len() <= index {
            self.triggers.resize(index + 1, TriggerRecord::default());
        }
        self.triggers[index] = TriggerRecord::fired();
    }

    /// Value filled on the centrality axis, `hi_bin / 2` without clamping.
    pub fn centrality(&self) -> f64 {
        f64::from(self.hi_bin) / 2.0
    }
}
