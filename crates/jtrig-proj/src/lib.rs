#![deny(missing_docs)]
#![doc = "Histogram storage, projection of the jet accumulators and trigger turn-on curves for jtrig."]

pub mod manager;
pub mod store;
pub mod turnon;

pub use manager::{
    bin_sanity_check, processed_name, JetHistKey, JetHistograms, LoadFlags, ProjectionManager,
    Quantity, MAX_CENTRALITY_BINS, PROJECTED_CENTRALITY_EDGES,
};
pub use store::{
    matching_names, write_fill_output, HistogramStore, JsonDirStore, MemoryStore,
    StoredHistogram, CARD_NAME,
};
pub use turnon::{turn_on, turn_on_curves, TurnOnCurve};
