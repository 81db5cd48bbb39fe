//! The histogram set filled from accepted events.

use std::f64::consts::PI;

use jtrig_core::{Axis, TrigError};
use jtrig_hist::{Hist1D, SparseHistogram};

use crate::card::Card;
use crate::counter::SelectionCounter;
use crate::event::Event;
use crate::pipeline::{AcceptedEvent, EventOutcome, Selection, WeightedJet};
use crate::tables::{DataLevel, JetKind, LabelTables, ANY_TRIGGER, N_TRIGGERS};

/// Jet accumulator axis holding jet pT.
pub const AXIS_PT: usize = 0;
/// Jet accumulator axis holding jet φ.
pub const AXIS_PHI: usize = 1;
/// Jet accumulator axis holding jet η.
pub const AXIS_ETA: usize = 2;
/// Jet accumulator axis holding centrality.
pub const AXIS_CENTRALITY: usize = 3;
/// Jet accumulator axis holding the data level.
pub const AXIS_LEVEL: usize = 4;
/// Jet accumulator axis holding the trigger slot.
pub const AXIS_TRIGGER: usize = 5;

/// Names of the one-dimensional event histograms.
pub mod names {
    /// Vertex z.
    pub const VERTEX_Z: &str = "vertexZ";
    /// Vertex z weighted with the vertex weight.
    pub const VERTEX_Z_WEIGHTED: &str = "vertexZweighted";
    /// Centrality.
    pub const CENTRALITY: &str = "centrality";
    /// Centrality weighted with the centrality weight.
    pub const CENTRALITY_WEIGHTED: &str = "centralityWeighted";
    /// pT hat.
    pub const PT_HAT: &str = "pthat";
    /// pT hat weighted with the cross-section weight.
    pub const PT_HAT_WEIGHTED: &str = "pthatWeighted";
    /// Axis distance of generator jets.
    pub const GEN_JET_DELTA_R: &str = "genJetDeltaR";
}

fn jet_axes(card: &Card) -> Result<Vec<Axis>, TrigError> {
    Ok(vec![
        Axis::uniform("pt", 100, 0.0, 500.0)?.with_title("p_{T}"),
        Axis::uniform("phi", 64, -PI, PI)?.with_title("#varphi"),
        Axis::uniform("eta", 50, -2.5, 2.5)?.with_title("#eta"),
        Axis::variable("centrality", &card.centrality_bin_edges)?.with_title("centrality"),
        Axis::uniform("level", DataLevel::ALL.len(), -0.5, DataLevel::ALL.len() as f64 - 0.5)?
            .with_title("data level"),
        Axis::uniform("trigger", N_TRIGGERS + 1, -0.5, N_TRIGGERS as f64 + 0.5)?
            .with_title("trigger"),
    ])
}

fn centrality_axis(name: &str) -> Result<Axis, TrigError> {
    Axis::uniform(name, 202, -0.75, 100.25)
}

/// Jet accumulators, event histograms and the selection counter of one fill.
///
/// Each file-level job owns one set; sets are combined with [`Self::merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerHistograms {
    /// Every accepted jet.
    pub inclusive_jet: SparseHistogram,
    /// Leading jet of each accepted event.
    pub leading_jet: SparseHistogram,
    /// Vertex z of accepted events.
    pub vertex_z: Hist1D,
    /// Vertex z weighted with the vertex weight.
    pub vertex_z_weighted: Hist1D,
    /// Centrality of accepted events.
    pub centrality: Hist1D,
    /// Centrality weighted with the centrality weight.
    pub centrality_weighted: Hist1D,
    /// pT hat on the configured edges.
    pub pt_hat: Hist1D,
    /// pT hat weighted with the cross-section weight.
    pub pt_hat_weighted: Hist1D,
    /// Distance between generator jet axes.
    pub gen_jet_delta_r: Hist1D,
    /// Events surviving each selection stage.
    pub counter: SelectionCounter,
}

impl TriggerHistograms {
    /// Empty set with the binning of `card`.
    pub fn new(card: &Card) -> Result<Self, TrigError> {
        let tables = LabelTables::new(card.jet_type);
        let axes = jet_axes(card)?;
        Ok(Self {
            inclusive_jet: SparseHistogram::new(JetKind::InclusiveJet.name(), axes.clone())?,
            leading_jet: SparseHistogram::new(JetKind::LeadingJet.name(), axes)?,
            vertex_z: Hist1D::new(names::VERTEX_Z, Axis::uniform("vz", 80, -20.0, 20.0)?),
            vertex_z_weighted: Hist1D::new(
                names::VERTEX_Z_WEIGHTED,
                Axis::uniform("vz", 80, -20.0, 20.0)?,
            ),
            centrality: Hist1D::new(names::CENTRALITY, centrality_axis("centrality")?),
            centrality_weighted: Hist1D::new(
                names::CENTRALITY_WEIGHTED,
                centrality_axis("centrality")?,
            ),
            pt_hat: Hist1D::new(
                names::PT_HAT,
                Axis::variable("pthat", &card.pt_hat_bin_edges)?,
            ),
            pt_hat_weighted: Hist1D::new(
                names::PT_HAT_WEIGHTED,
                Axis::uniform("pthat", 230, 0.0, 460.0)?,
            ),
            gen_jet_delta_r: Hist1D::new(
                names::GEN_JET_DELTA_R,
                Axis::uniform("deltaR", 80, 0.0, 4.0)?,
            ),
            counter: SelectionCounter::new(&tables)?,
        })
    }

    /// Jet accumulator of a kind.
    pub fn jet_histogram(&self, kind: JetKind) -> &SparseHistogram {
        match kind {
            JetKind::InclusiveJet => &self.inclusive_jet,
            JetKind::LeadingJet => &self.leading_jet,
        }
    }

    /// One-dimensional event histograms, counter included.
    pub fn event_histograms(&self) -> Vec<&Hist1D> {
        vec![
            &self.vertex_z,
            &self.vertex_z_weighted,
            self.counter.histogram(),
            &self.centrality,
            &self.centrality_weighted,
            &self.pt_hat,
            &self.pt_hat_weighted,
            &self.gen_jet_delta_r,
        ]
    }

    /// Runs one event through `selection` and fills the result.
    pub fn process_event(
        &mut self,
        selection: &Selection,
        event: &Event,
    ) -> Result<EventOutcome, TrigError> {
        let outcome = selection.apply(event, &mut self.counter);
        if let EventOutcome::Accepted(accepted) = &outcome {
            self.fill_accepted(accepted)?;
        }
        Ok(outcome)
    }

    /// Fills the event histograms and jet accumulators for an accepted event.
    pub fn fill_accepted(&mut self, event: &AcceptedEvent) -> Result<(), TrigError> {
        let weights = &event.weights;
        self.vertex_z.fill(event.vz);
        self.vertex_z_weighted.fill_weighted(event.vz, weights.vertex);
        self.centrality.fill(event.centrality);
        self.centrality_weighted
            .fill_weighted(event.centrality, weights.centrality);
        self.pt_hat.fill(event.pt_hat);
        self.pt_hat_weighted
            .fill_weighted(event.pt_hat, weights.cross_section);

        for jet in &event.jets {
            fill_jet(&mut self.inclusive_jet, event, jet, DataLevel::Reconstructed)?;
        }
        fill_jet(
            &mut self.leading_jet,
            event,
            &event.leading,
            DataLevel::Reconstructed,
        )?;

        if let Some((gen_jets, leading)) = &event.generator {
            for jet in gen_jets {
                fill_jet(&mut self.inclusive_jet, event, jet, DataLevel::GeneratorLevel)?;
                if let Some(delta_r) = jet.axis_delta_r {
                    self.gen_jet_delta_r.fill_weighted(delta_r, jet.weight);
                }
            }
            fill_jet(&mut self.leading_jet, event, leading, DataLevel::GeneratorLevel)?;
        }
        Ok(())
    }

    /// Adds another set filled with the same card.
    pub fn merge(&mut self, other: &TriggerHistograms) -> Result<(), TrigError> {
        self.inclusive_jet.add(&other.inclusive_jet)?;
        self.leading_jet.add(&other.leading_jet)?;
        self.vertex_z.add(&other.vertex_z)?;
        self.vertex_z_weighted.add(&other.vertex_z_weighted)?;
        self.centrality.add(&other.centrality)?;
        self.centrality_weighted.add(&other.centrality_weighted)?;
        self.pt_hat.add(&other.pt_hat)?;
        self.pt_hat_weighted.add(&other.pt_hat_weighted)?;
        self.gen_jet_delta_r.add(&other.gen_jet_delta_r)?;
        self.counter.merge(&other.counter)
    }
}

// One fill in the any-trigger slot, then one per fired trigger scaled by its prescale.
fn fill_jet(
    hist: &mut SparseHistogram,
    event: &AcceptedEvent,
    jet: &WeightedJet,
    level: DataLevel,
) -> Result<(), TrigError> {
    let mut point = [
        jet.pt,
        jet.phi,
        jet.eta,
        event.centrality,
        level.axis_value(),
        ANY_TRIGGER as f64,
    ];
    hist.fill(&point, jet.weight)?;
    for (index, fired) in event.fired.iter().enumerate() {
        if *fired {
            point[AXIS_TRIGGER] = index as f64;
            hist.fill(&point, jet.weight * event.prescales[index])?;
        }
    }
    Ok(())
}
