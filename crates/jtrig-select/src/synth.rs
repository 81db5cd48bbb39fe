//! Seeded synthetic events for smoke runs and benchmarks.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::event::{Event, GenJet, Jet, TriggerRecord};
use crate::tables::{DataType, N_TRIGGERS};

fn default_events() -> usize {
    1000
}

fn default_max_jets() -> usize {
    4
}

fn default_trigger_thresholds() -> [f64; N_TRIGGERS] {
    [40.0, 60.0, 80.0, 100.0, 60.0, 80.0, 100.0]
}

/// Settings of the synthetic event generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Number of events.
    #[serde(default = "default_events")]
    pub events: usize,
    /// Upper bound on jets per event.
    #[serde(default = "default_max_jets")]
    pub max_jets: usize,
    /// Kind of sample to imitate.
    #[serde(default = "SyntheticConfig::default_data_type")]
    pub data_type: DataType,
    /// Leading-jet pT above which each trigger fires.
    #[serde(default = "default_trigger_thresholds")]
    pub trigger_thresholds: [f64; N_TRIGGERS],
    /// Seed of the generator.
    #[serde(default)]
    pub seed: u64,
}

impl SyntheticConfig {
    fn default_data_type() -> DataType {
        DataType::Pp
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            events: default_events(),
            max_jets: default_max_jets(),
            data_type: Self::default_data_type(),
            trigger_thresholds: default_trigger_thresholds(),
            seed: 0,
        }
    }
}

/// Generates events with a falling jet spectrum and threshold-like triggers.
///
/// Every trigger fires when the leading jet exceeds its threshold; the first trigger
/// additionally fires in every event so that samples built with base trigger 0 pass
/// the trigger stage.
pub fn generate_events(config: &SyntheticConfig) -> Vec<Event> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let simulation = config.data_type.is_simulation();
    (0..config.events)
        .map(|_| {
            let n_jets = rng.gen_range(0..=config.max_jets);
            let jets: Vec<Jet> = (0..n_jets)
                .map(|_| {
                    let pt = 20.0 + 30.0 * (-rng.gen_range(1e-6f64..1.0).ln());
                    let raw_pt = pt * rng.gen_range(0.8..1.0);
                    Jet {
                        pt,
                        phi: rng.gen_range(-PI..PI),
                        eta: rng.gen_range(-2.4..2.4),
                        raw_pt,
                        max_track_pt: raw_pt * rng.gen_range(0.05..0.9),
                    }
                })
                .collect();
            let leading = jets.iter().map(|jet| jet.pt).fold(0.0, f64::max);
            let mut triggers = vec![TriggerRecord::default(); N_TRIGGERS];
            for (index, record) in triggers.iter_mut().enumerate() {
                record.fired = index == 0 || leading > config.trigger_thresholds[index];
                record.prescale_numerator = if index == 0 { 1 } else { rng.gen_range(1..=3) };
            }
            let gen_jets = if simulation {
                jets.iter()
                    .map(|jet| GenJet {
                        pt: jet.pt * rng.gen_range(0.9..1.1),
                        phi: jet.phi,
                        eta: jet.eta,
                        wta_phi: jet.phi + rng.gen_range(-0.05..0.05),
                        wta_eta: jet.eta + rng.gen_range(-0.05..0.05),
                    })
                    .collect()
            } else {
                Vec::new()
            };
            let hi_bin = if config.data_type.is_heavy_ion() {
                rng.gen_range(0..200)
            } else {
                -1
            };
            Event {
                vz: rng.gen_range(-20.0..20.0),
                hi_bin,
                pt_hat: if simulation { rng.gen_range(15.0..400.0) } else { 0.0 },
                weight: if simulation { rng.gen_range(0.1..2.0) } else { 1.0 },
                triggers,
                jets,
                gen_jets,
                ..Event::default()
            }
        })
        .collect()
}
