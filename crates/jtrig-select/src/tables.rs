//! Fixed lookup tables: triggers, selection stages, data levels, data types and jet
//! kinds.

use serde::{Deserialize, Serialize};

/// Number of jet triggers.
pub const N_TRIGGERS: usize = 7;

/// Trigger-axis slot holding jets regardless of which trigger fired.
pub const ANY_TRIGGER: usize = N_TRIGGERS;

const TRIGGER_NAMES: [&str; N_TRIGGERS] = [
    "CaloJet40",
    "CaloJet60",
    "CaloJet80",
    "CaloJet100",
    "PFJet60",
    "PFJet80",
    "PFJet100",
];

const STAGE_LABELS: [&str; 7] = [
    "All",
    "PrimVertex",
    "HfCoin2Th4",
    "ClustCompt",
    "BeamScrape",
    "CaloJet",
    "v_{z} cut",
];

/// Jet triggers in axis order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Calorimeter jet, 40 GeV threshold.
    CaloJet40,
    /// Calorimeter jet, 60 GeV threshold.
    CaloJet60,
    /// Calorimeter jet, 80 GeV threshold.
    CaloJet80,
    /// Calorimeter jet, 100 GeV threshold.
    CaloJet100,
    /// Particle-flow jet, 60 GeV threshold.
    PfJet60,
    /// Particle-flow jet, 80 GeV threshold.
    PfJet80,
    /// Particle-flow jet, 100 GeV threshold.
    PfJet100,
}

impl Trigger {
    /// All triggers in index order.
    pub const ALL: [Trigger; N_TRIGGERS] = [
        Trigger::CaloJet40,
        Trigger::CaloJet60,
        Trigger::CaloJet80,
        Trigger::CaloJet100,
        Trigger::PfJet60,
        Trigger::PfJet80,
        Trigger::PfJet100,
    ];

    /// Position on the trigger axis.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Trigger at `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Trigger name used in histogram names.
    pub fn name(self) -> &'static str {
        TRIGGER_NAMES[self.index()]
    }
}

/// Event selection stages, in the order the counter records them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventStage {
    /// Every event inside the pT-hat window.
    All,
    /// Primary vertex quality.
    PrimaryVertex,
    /// Forward calorimeter coincidence.
    HfCoincidence,
    /// Vertex and pixel cluster compatibility.
    ClusterCompatibility,
    /// Beam scraping veto.
    BeamScraping,
    /// Base trigger fired.
    BaseTrigger,
    /// Vertex z window.
    VzCut,
}

impl EventStage {
    /// All stages in counter order.
    pub const ALL: [EventStage; 7] = [
        EventStage::All,
        EventStage::PrimaryVertex,
        EventStage::HfCoincidence,
        EventStage::ClusterCompatibility,
        EventStage::BeamScraping,
        EventStage::BaseTrigger,
        EventStage::VzCut,
    ];

    /// Zero-based counter bin.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Reconstructed or generator-level jets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataLevel {
    /// Detector-level jets.
    Reconstructed,
    /// Generator-level jets, simulation only.
    GeneratorLevel,
}

impl DataLevel {
    /// Both levels in axis order.
    pub const ALL: [DataLevel; 2] = [DataLevel::Reconstructed, DataLevel::GeneratorLevel];

    /// Position on the data-level axis.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Value filled on the data-level axis.
    pub fn axis_value(self) -> f64 {
        self.index() as f64
    }

    /// Suffix used in processed directory and histogram names.
    pub fn suffix(self) -> &'static str {
        match self {
            DataLevel::Reconstructed => "",
            DataLevel::GeneratorLevel => "GeneratorLevel",
        }
    }
}

/// Kind of collision data in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Proton-proton data.
    Pp,
    /// Lead-lead data.
    PbPb,
    /// Proton-proton simulation.
    PpMc,
    /// Lead-lead simulation.
    PbPbMc,
    /// Small local test sample.
    LocalTest,
}

impl DataType {
    /// Looks up a card code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(DataType::Pp),
            1 => Some(DataType::PbPb),
            2 => Some(DataType::PpMc),
            3 => Some(DataType::PbPbMc),
            4 => Some(DataType::LocalTest),
            _ => None,
        }
    }

    /// Card code of the data type.
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Display string.
    pub fn label(self) -> &'static str {
        match self {
            DataType::Pp => "pp",
            DataType::PbPb => "PbPb",
            DataType::PpMc => "pp MC",
            DataType::PbPbMc => "PbPb MC",
            DataType::LocalTest => "localTest",
        }
    }

    /// Alternative display string naming the generator for simulation.
    pub fn alternative_label(self) -> &'static str {
        match self {
            DataType::PpMc => "Pythia8",
            DataType::PbPbMc => "Pythia+Hydjet",
            other => other.label(),
        }
    }

    /// True for simulated samples.
    pub fn is_simulation(self) -> bool {
        matches!(self, DataType::PpMc | DataType::PbPbMc)
    }

    /// True for lead-lead samples, data or simulation.
    pub fn is_heavy_ion(self) -> bool {
        matches!(self, DataType::PbPb | DataType::PbPbMc)
    }
}

/// Jet accumulator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JetKind {
    /// Every accepted jet.
    InclusiveJet,
    /// Highest-pT accepted jet of each event.
    LeadingJet,
}

impl JetKind {
    /// Both kinds.
    pub const ALL: [JetKind; 2] = [JetKind::InclusiveJet, JetKind::LeadingJet];

    /// Histogram name of the accumulator.
    pub fn name(self) -> &'static str {
        match self {
            JetKind::InclusiveJet => "inclusiveJet",
            JetKind::LeadingJet => "leadingJet",
        }
    }
}

/// Label lookups that depend on the configured jet type.
///
/// Built once per run and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTables {
    stage_labels: [&'static str; 7],
}

impl LabelTables {
    /// Builds the tables; jet type 1 relabels the base-trigger stage `PFJet`.
    pub fn new(jet_type: u8) -> Self {
        let mut stage_labels = STAGE_LABELS;
        if jet_type == 1 {
            stage_labels[EventStage::BaseTrigger.index()] = "PFJet";
        }
        Self { stage_labels }
    }

    /// Trigger name for an axis index, `IndexOutOfBounds` when the index is not a
    /// trigger.
    pub fn trigger_name(&self, index: usize) -> &'static str {
        Trigger::from_index(index).map_or("IndexOutOfBounds", Trigger::name)
    }

    /// Counter label of a stage.
    pub fn stage_label(&self, stage: EventStage) -> &'static str {
        self.stage_labels[stage.index()]
    }

    /// Counter labels in bin order.
    pub fn stage_labels(&self) -> &[&'static str] {
        &self.stage_labels
    }
}

impl Default for LabelTables {
    fn default() -> Self {
        Self::new(0)
    }
}
