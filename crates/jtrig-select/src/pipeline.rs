//! Event and jet selection with the composite weighting model.
//!
//! [`Selection::evaluate`] is pure: it decides the fate of one event and computes all
//! weights but touches no histogram. [`Selection::apply`] additionally records the
//! surviving stages in a [`SelectionCounter`].

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::counter::SelectionCounter;
use crate::event::{Event, EventFilters, GenJet, Jet};
use crate::tables::{DataType, EventStage, N_TRIGGERS};
use crate::weights::{EventWeights, WeightTable};

/// Lower edge of the rejected azimuthal region.
pub const BAD_PHI_LOW: f64 = -0.1;
/// Upper edge of the rejected azimuthal region.
pub const BAD_PHI_HIGH: f64 = 1.2;

/// Accepted jet with its fill weight before prescales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedJet {
    /// Transverse momentum.
    pub pt: f64,
    /// Azimuthal angle.
    pub phi: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Event weight times jet spectrum weight.
    pub weight: f64,
    /// Distance between the E-scheme and WTA axes, generator jets only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis_delta_r: Option<f64>,
}

/// Everything filled for an event that passed the event selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedEvent {
    /// Weight factors of the event.
    pub weights: EventWeights,
    /// Value for the centrality axis.
    pub centrality: f64,
    /// Vertex z position.
    pub vz: f64,
    /// pT hat of the event.
    pub pt_hat: f64,
    /// Which triggers fired.
    pub fired: [bool; N_TRIGGERS],
    /// Prescale per trigger, one for the base trigger.
    pub prescales: [f64; N_TRIGGERS],
    /// Reconstructed jets passing all jet predicates.
    pub jets: Vec<WeightedJet>,
    /// Highest-pT reconstructed jet, all zero when no jet passed.
    pub leading: WeightedJet,
    /// Generator-level jets and their leading jet, simulation only.
    pub generator: Option<(Vec<WeightedJet>, WeightedJet)>,
}

/// Result of running one event through the selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventOutcome {
    /// pT hat outside the configured window; the event is not counted at all.
    Dropped,
    /// The event failed `stage`; all earlier stages passed.
    Rejected {
        /// First failing stage.
        stage: EventStage,
    },
    /// The event passed every stage.
    Accepted(AcceptedEvent),
}

impl EventOutcome {
    /// True for accepted events.
    pub fn is_accepted(&self) -> bool {
        matches!(self, EventOutcome::Accepted(_))
    }
}

/// Event and jet selection configured from a card.
#[derive(Debug, Clone)]
pub struct Selection {
    data_type: DataType,
    base_trigger: usize,
    jet_eta_cut: f64,
    min_jet_pt: f64,
    max_jet_pt: f64,
    cut_bad_phi: bool,
    min_track_fraction: f64,
    max_track_fraction: f64,
    vz_cut: f64,
    pt_hat_window: (f64, f64),
    weights: WeightTable,
}

impl Selection {
    /// Selection for the cuts of `card`.
    pub fn from_card(card: &Card) -> Self {
        let data_type = card.data_type();
        Self {
            data_type,
            base_trigger: card.base_trigger.min(N_TRIGGERS - 1),
            jet_eta_cut: card.jet_eta_cut,
            min_jet_pt: card.min_jet_pt_cut,
            max_jet_pt: card.max_jet_pt_cut,
            cut_bad_phi: card.cut_bad_phi,
            min_track_fraction: card.min_max_track_pt_fraction,
            max_track_fraction: card.max_max_track_pt_fraction,
            vz_cut: card.z_vertex_cut,
            pt_hat_window: (card.low_pt_hat_cut, card.high_pt_hat_cut),
            weights: WeightTable::for_data_type(data_type),
        }
    }

    /// Data type the selection was built for.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Weight curves in use.
    pub fn weight_table(&self) -> &WeightTable {
        &self.weights
    }

    /// True when the event's pT hat lies in `[low, high)`.
    pub fn in_pt_hat_window(&self, event: &Event) -> bool {
        let (low, high) = self.pt_hat_window;
        event.pt_hat >= low && event.pt_hat < high
    }

    /// Filter bits after the data-type overrides: pp samples have no forward
    /// coincidence or cluster requirement, heavy-ion samples no beam scraping veto,
    /// and simulation always has a good primary vertex.
    pub fn effective_filters(&self, event: &Event) -> EventFilters {
        let mut filters = event.filters;
        if self.data_type.is_heavy_ion() {
            filters.beam_scraping = true;
        } else {
            filters.hf_coincidence = true;
            filters.cluster_compatibility = true;
        }
        if self.data_type.is_simulation() {
            filters.primary_vertex = true;
        }
        filters
    }

    /// First event stage the event fails, `None` when it passes all.
    pub fn first_failed_stage(&self, event: &Event) -> Option<EventStage> {
        let filters = self.effective_filters(event);
        let checks = [
            (EventStage::PrimaryVertex, filters.primary_vertex),
            (EventStage::HfCoincidence, filters.hf_coincidence),
            (EventStage::ClusterCompatibility, filters.cluster_compatibility),
            (EventStage::BeamScraping, filters.beam_scraping),
            (EventStage::BaseTrigger, event.trigger(self.base_trigger).fired),
            (EventStage::VzCut, event.vz.abs() <= self.vz_cut),
        ];
        checks
            .into_iter()
            .find(|(_, passed)| !passed)
            .map(|(stage, _)| stage)
    }

    /// Weight factors of an event.
    pub fn event_weights(&self, event: &Event) -> EventWeights {
        EventWeights {
            vertex: self.weights.vertex_weight(event.vz),
            centrality: self.weights.centrality_weight(event.hi_bin),
            cross_section: if self.data_type.is_simulation() {
                event.weight
            } else {
                1.0
            },
        }
    }

    /// Reconstructed-jet predicates.
    pub fn passes_jet(&self, jet: &Jet) -> bool {
        if jet.eta.abs() >= self.jet_eta_cut {
            return false;
        }
        if self.cut_bad_phi && jet.phi > BAD_PHI_LOW && jet.phi < BAD_PHI_HIGH {
            return false;
        }
        let fraction = jet.max_track_fraction();
        if self.min_track_fraction >= fraction || self.max_track_fraction <= fraction {
            return false;
        }
        self.in_pt_window(jet.pt)
    }

    /// Generator-jet predicates: acceptance and pT window only.
    pub fn passes_gen_jet(&self, jet: &GenJet) -> bool {
        jet.eta.abs() < self.jet_eta_cut && self.in_pt_window(jet.pt)
    }

    fn in_pt_window(&self, pt: f64) -> bool {
        pt >= self.min_jet_pt && pt <= self.max_jet_pt
    }

    /// Decides the fate of one event.
    pub fn evaluate(&self, event: &Event) -> EventOutcome {
        if !self.in_pt_hat_window(event) {
            return EventOutcome::Dropped;
        }
        if let Some(stage) = self.first_failed_stage(event) {
            return EventOutcome::Rejected { stage };
        }

        let weights = self.event_weights(event);
        let total = weights.total();

        let mut fired = [false; N_TRIGGERS];
        let mut prescales = [1.0; N_TRIGGERS];
        for index in 0..N_TRIGGERS {
            let record = event.trigger(index);
            fired[index] = record.fired;
            prescales[index] = record.prescale();
        }
        prescales[self.base_trigger] = 1.0;

        let jets: Vec<WeightedJet> = event
            .jets
            .iter()
            .filter(|jet| self.passes_jet(jet))
            .map(|jet| self.weighted(jet.pt, jet.phi, jet.eta, total, None))
            .collect();
        let leading = self.leading(&jets, total);

        let generator = self.data_type.is_simulation().then(|| {
            let gen_jets: Vec<WeightedJet> = event
                .gen_jets
                .iter()
                .filter(|jet| self.passes_gen_jet(jet))
                .map(|jet| {
                    let delta_r = delta_r(jet.eta, jet.phi, jet.wta_eta, jet.wta_phi);
                    self.weighted(jet.pt, jet.phi, jet.eta, total, Some(delta_r))
                })
                .collect();
            let leading = self.leading(&gen_jets, total);
            (gen_jets, leading)
        });

        EventOutcome::Accepted(AcceptedEvent {
            weights,
            centrality: event.centrality(),
            vz: event.vz,
            pt_hat: event.pt_hat,
            fired,
            prescales,
            jets,
            leading,
            generator,
        })
    }

    /// Evaluates the event and records the stages it survived in `counter`.
    pub fn apply(&self, event: &Event, counter: &mut SelectionCounter) -> EventOutcome {
        let outcome = self.evaluate(event);
        match &outcome {
            EventOutcome::Dropped => {}
            EventOutcome::Rejected { stage } => counter.record_until(*stage),
            EventOutcome::Accepted(_) => counter.record_all(),
        }
        outcome
    }

    fn weighted(
        &self,
        pt: f64,
        phi: f64,
        eta: f64,
        total: f64,
        axis_delta_r: Option<f64>,
    ) -> WeightedJet {
        WeightedJet {
            pt,
            phi,
            eta,
            weight: total * self.weights.jet_pt_weight(pt),
            axis_delta_r,
        }
    }

    // The first of equal-pT jets wins; with no jet the zero jet is still filled.
    fn leading(&self, jets: &[WeightedJet], total: f64) -> WeightedJet {
        let mut best: Option<&WeightedJet> = None;
        for jet in jets {
            if jet.pt > best.map_or(0.0, |b| b.pt) {
                best = Some(jet);
            }
        }
        match best {
            Some(jet) => WeightedJet {
                axis_delta_r: None,
                ..*jet
            },
            None => self.weighted(0.0, 0.0, 0.0, total, None),
        }
    }
}

/// Distance in (eta, phi) with the azimuthal difference wrapped to `[-π, π]`.
pub fn delta_r(eta1: f64, phi1: f64, eta2: f64, phi2: f64) -> f64 {
    let delta_eta = eta1 - eta2;
    let mut delta_phi = phi1 - phi2;
    if delta_phi.abs() > PI {
        delta_phi = (delta_phi + PI).rem_euclid(2.0 * PI) - PI;
    }
    (delta_eta * delta_eta + delta_phi * delta_phi).sqrt()
}
