use jtrig_core::{Axis, TrigError};
use jtrig_hist::Hist1D;

use crate::tables::{EventStage, LabelTables};

/// Name of the counter histogram.
pub const COUNTER_NAME: &str = "nEvents";

/// Per-stage event counts stored as a labelled histogram.
///
/// Bin `i + 1` counts the events that survived stage `i`. Counts only grow.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionCounter {
    hist: Hist1D,
}

impl SelectionCounter {
    /// Empty counter with stage labels from `tables`.
    pub fn new(tables: &LabelTables) -> Result<Self, TrigError> {
        let n = EventStage::ALL.len();
        let axis = Axis::uniform("eventCut", n, -0.5, n as f64 - 0.5)?
            .with_labels(tables.stage_labels().iter().copied())?;
        Ok(Self {
            hist: Hist1D::new(COUNTER_NAME, axis),
        })
    }

    /// Counts one event surviving `stage`.
    pub fn record(&mut self, stage: EventStage) {
        self.hist.fill_cell(stage.index() + 1, 1.0);
    }

    /// Counts one event surviving every stage before `failed`.
    pub fn record_until(&mut self, failed: EventStage) {
        for stage in EventStage::ALL.iter().take(failed.index()) {
            self.record(*stage);
        }
    }

    /// Counts one event surviving every stage.
    pub fn record_all(&mut self) {
        for stage in EventStage::ALL {
            self.record(stage);
        }
    }

    /// Events that survived `stage`.
    pub fn count(&self, stage: EventStage) -> f64 {
        self.hist.content(stage.index() + 1)
    }

    /// Adds the counts of another counter.
    pub fn merge(&mut self, other: &SelectionCounter) -> Result<(), TrigError> {
        self.hist.add(&other.hist)
    }

    /// Underlying histogram.
    pub fn histogram(&self) -> &Hist1D {
        &self.hist
    }
}
