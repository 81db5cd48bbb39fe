#![deny(missing_docs)]
#![doc = "Core error, axis and binning-descriptor types for the jtrig jet-trigger histogram engine."]

/// Histogram axes with flow cells.
pub mod axis;
/// Named, write-once bin edge lists.
pub mod binning;
pub mod errors;
/// Stable hashing of serializable values.
pub mod hash;
/// Canonical JSON and YAML helpers.
#[path = "serde.rs"]
pub mod serde_io;

pub use axis::{validate_edges, Axis};
pub use binning::BinningDescriptor;
pub use errors::{ErrorInfo, TrigError, MALFORMED_EVENT};
pub use hash::stable_hash_string;
