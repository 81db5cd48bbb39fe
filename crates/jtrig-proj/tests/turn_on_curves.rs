mod common;

use common::{event, filled_store, pp_card};
use jtrig_core::Axis;
use jtrig_hist::Hist1D;
use jtrig_proj::{turn_on, turn_on_curves, ProjectionManager};
use jtrig_select::{DataLevel, JetKind, Trigger, N_TRIGGERS};

#[test]
fn ratio_uses_uncorrelated_errors() {
    let axis = Axis::uniform("pt", 2, 0.0, 2.0).unwrap();
    let mut passing = Hist1D::new("passing", axis.clone());
    let mut all = Hist1D::new("all", axis);
    for _ in 0..5 {
        passing.fill(0.5);
    }
    for _ in 0..10 {
        all.fill(0.5);
    }
    let ratio = turn_on(&passing, &all).unwrap();
    assert_eq!(ratio.name, "passingTurnOn");
    assert!((ratio.content(1) - 0.5).abs() < 1e-12);
    // (5 * 100 + 10 * 25) / 10^4
    assert!((ratio.variance(1) - 0.075).abs() < 1e-12);
    assert_eq!(ratio.content(2), 0.0);
}

#[test]
fn mismatched_binning_is_an_error() {
    let passing = Hist1D::new("passing", Axis::uniform("pt", 2, 0.0, 2.0).unwrap());
    let all = Hist1D::new("all", Axis::uniform("pt", 4, 0.0, 2.0).unwrap());
    assert!(turn_on(&passing, &all).is_err());
}

#[test]
fn curves_cover_every_trigger() {
    let events = (0..10)
        .map(|i| {
            if i % 2 == 0 {
                event(75.0, &[0, 2])
            } else {
                event(75.0, &[0])
            }
        })
        .collect();
    let store = filled_store(&pp_card(), events);
    let mut manager = ProjectionManager::from_store(&store).unwrap();
    manager.load(&store).unwrap();

    let edges = [0.0, 50.0, 100.0, 500.0];
    let curves = turn_on_curves(&manager, DataLevel::Reconstructed, Some(&edges)).unwrap();
    assert_eq!(curves.len(), JetKind::ALL.len() * N_TRIGGERS);

    let find = |kind: JetKind, trigger: Trigger| {
        curves
            .iter()
            .find(|curve| curve.kind == kind && curve.trigger == trigger)
            .unwrap()
    };
    let base = find(JetKind::InclusiveJet, Trigger::CaloJet40);
    assert!((base.curve.content(2) - 1.0).abs() < 1e-12);
    let half = find(JetKind::LeadingJet, Trigger::CaloJet80);
    assert_eq!(half.curve.name, "leadingJetTriggerTurnOnCaloJet80_C0");
    assert!((half.curve.content(2) - 0.5).abs() < 1e-12);
    let never = find(JetKind::InclusiveJet, Trigger::PfJet100);
    assert_eq!(never.curve.content(2), 0.0);
    assert_eq!(half.curve.axis().edges(), &edges[..]);
}
