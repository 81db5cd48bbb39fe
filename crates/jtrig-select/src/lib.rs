#![deny(missing_docs)]
#![doc = "Event selection, composite weighting and file-parallel histogram filling for jtrig."]

/// Configuration card.
pub mod card;
/// Selection stage counter.
pub mod counter;
/// File-parallel fill dispatcher.
pub mod dispatch;
/// Event records.
pub mod event;
pub mod histograms;
pub mod pipeline;
pub mod source;
pub mod synth;
pub mod tables;
pub mod weights;

pub use card::{load_card, Card, CENTRALITY_EDGES, PT_HAT_EDGES};
pub use counter::{SelectionCounter, COUNTER_NAME};
pub use dispatch::{fill_sources, FailurePolicy, FillOpts, FillReport, SourceReport, SourceStatus};
pub use event::{Event, EventFilters, GenJet, Jet, TriggerRecord};
pub use histograms::{
    TriggerHistograms, AXIS_CENTRALITY, AXIS_ETA, AXIS_LEVEL, AXIS_PHI, AXIS_PT, AXIS_TRIGGER,
};
pub use pipeline::{delta_r, AcceptedEvent, EventOutcome, Selection, WeightedJet};
pub use source::{write_json_lines, EventSource, EventStream, JsonLinesSource, MemorySource};
pub use synth::{generate_events, SyntheticConfig};
pub use tables::{
    DataLevel, DataType, EventStage, JetKind, LabelTables, Trigger, ANY_TRIGGER, N_TRIGGERS,
};
pub use weights::{EventWeights, Polynomial, WeightTable};
