use jtrig_select::{
    delta_r, Card, DataType, Event, EventFilters, EventOutcome, EventStage, GenJet, Jet,
    LabelTables, Selection, SelectionCounter, TriggerHistograms, TriggerRecord, ANY_TRIGGER,
    AXIS_TRIGGER,
};

fn good_jet(pt: f64) -> Jet {
    Jet {
        pt,
        phi: 2.0,
        eta: 0.1,
        raw_pt: pt,
        max_track_pt: 0.4 * pt,
    }
}

fn triggered_event() -> Event {
    let mut event = Event {
        jets: vec![good_jet(80.0)],
        ..Event::default()
    };
    event.fire(0);
    event
}

fn card_for(data_type: DataType) -> Card {
    Card {
        data_type: data_type.code(),
        ..Card::default()
    }
}

#[test]
fn stages_fail_in_fixed_order() {
    let selection = Selection::from_card(&card_for(DataType::Pp));
    let mut event = triggered_event();
    event.filters.primary_vertex = false;
    event.vz = 30.0;
    assert_eq!(
        selection.evaluate(&event),
        EventOutcome::Rejected {
            stage: EventStage::PrimaryVertex
        }
    );

    let mut counter = SelectionCounter::new(&LabelTables::default()).expect("counter");
    let mut late = triggered_event();
    late.vz = 30.0;
    selection.apply(&late, &mut counter);
    for stage in EventStage::ALL {
        let expected = if stage == EventStage::VzCut { 0.0 } else { 1.0 };
        assert_eq!(counter.count(stage), expected, "{stage:?}");
    }
}

#[test]
fn data_type_overrides_filter_bits() {
    let mut event = triggered_event();
    event.filters = EventFilters {
        primary_vertex: false,
        hf_coincidence: false,
        cluster_compatibility: false,
        beam_scraping: false,
    };
    let pp = Selection::from_card(&card_for(DataType::Pp)).effective_filters(&event);
    assert!(pp.hf_coincidence && pp.cluster_compatibility);
    assert!(!pp.primary_vertex && !pp.beam_scraping);

    let pbpb = Selection::from_card(&card_for(DataType::PbPb)).effective_filters(&event);
    assert!(pbpb.beam_scraping);
    assert!(!pbpb.hf_coincidence);

    let sim = Selection::from_card(&card_for(DataType::PbPbMc)).effective_filters(&event);
    assert!(sim.primary_vertex && sim.beam_scraping);
    assert!(!sim.cluster_compatibility);
}

#[test]
fn pt_hat_window_drops_before_counting() {
    let card = Card {
        data_type: DataType::PpMc.code(),
        low_pt_hat_cut: 50.0,
        high_pt_hat_cut: 100.0,
        ..Card::default()
    };
    let selection = Selection::from_card(&card);
    let mut counter = SelectionCounter::new(&LabelTables::default()).expect("counter");
    let mut event = triggered_event();
    for (pt_hat, kept) in [(49.9, false), (50.0, true), (99.9, true), (100.0, false)] {
        event.pt_hat = pt_hat;
        let outcome = selection.apply(&event, &mut counter);
        assert_eq!(outcome != EventOutcome::Dropped, kept, "pt hat {pt_hat}");
    }
    assert_eq!(counter.count(EventStage::All), 2.0);
}

#[test]
fn jet_predicates_follow_the_cut_boundaries() {
    let card = Card {
        jet_eta_cut: 1.6,
        min_jet_pt_cut: 30.0,
        max_jet_pt_cut: 300.0,
        cut_bad_phi: true,
        min_max_track_pt_fraction: 0.1,
        max_max_track_pt_fraction: 0.9,
        ..Card::default()
    };
    let selection = Selection::from_card(&card);
    assert!(selection.passes_jet(&good_jet(30.0)));
    assert!(selection.passes_jet(&good_jet(300.0)));
    assert!(!selection.passes_jet(&good_jet(29.9)));
    assert!(!selection.passes_jet(&Jet {
        eta: -1.6,
        ..good_jet(50.0)
    }));
    assert!(!selection.passes_jet(&Jet {
        phi: 0.5,
        ..good_jet(50.0)
    }));
    assert!(selection.passes_jet(&Jet {
        phi: -0.1,
        ..good_jet(50.0)
    }));
    assert!(!selection.passes_jet(&Jet {
        max_track_pt: 5.0,
        ..good_jet(50.0)
    }));
    assert!(!selection.passes_jet(&Jet {
        max_track_pt: 45.0,
        ..good_jet(50.0)
    }));

    let gen = GenJet {
        pt: 50.0,
        phi: 0.5,
        eta: 0.0,
        wta_phi: 0.5,
        wta_eta: 0.0,
    };
    assert!(selection.passes_gen_jet(&gen));
}

#[test]
fn base_trigger_prescale_is_forced_to_one() {
    let card = Card {
        base_trigger: 1,
        ..Card::default()
    };
    let selection = Selection::from_card(&card);
    let mut event = triggered_event();
    event.triggers = vec![
        TriggerRecord {
            fired: true,
            prescale_numerator: 4,
            prescale_denominator: 1,
        },
        TriggerRecord {
            fired: true,
            prescale_numerator: 7,
            prescale_denominator: 2,
        },
    ];
    let EventOutcome::Accepted(accepted) = selection.evaluate(&event) else {
        panic!("event should pass");
    };
    assert_eq!(accepted.prescales[0], 4.0);
    assert_eq!(accepted.prescales[1], 1.0);
    assert!(accepted.fired[0] && accepted.fired[1] && !accepted.fired[2]);

    let mut histograms = TriggerHistograms::new(&card).expect("histograms");
    histograms.fill_accepted(&accepted).expect("fill");
    let by_trigger = histograms
        .inclusive_jet
        .project(&[AXIS_TRIGGER], &[])
        .expect("projection");
    assert_eq!(by_trigger.content(&[1]), 4.0);
    assert_eq!(by_trigger.content(&[2]), 1.0);
    assert_eq!(by_trigger.content(&[ANY_TRIGGER + 1]), 1.0);
}

#[test]
fn leading_jet_is_filled_even_without_accepted_jets() {
    let card = Card {
        min_jet_pt_cut: 100.0,
        ..Card::default()
    };
    let selection = Selection::from_card(&card);
    let EventOutcome::Accepted(accepted) = selection.evaluate(&triggered_event()) else {
        panic!("event should pass");
    };
    assert!(accepted.jets.is_empty());
    assert_eq!(accepted.leading.pt, 0.0);
    assert_eq!(accepted.leading.weight, 1.0);
}

#[test]
fn generator_jets_only_for_simulation() {
    let mut event = triggered_event();
    event.gen_jets = vec![GenJet {
        pt: 90.0,
        phi: 3.1,
        eta: 0.2,
        wta_phi: -3.1,
        wta_eta: 0.2,
    }];
    let data = Selection::from_card(&card_for(DataType::Pp));
    let EventOutcome::Accepted(accepted) = data.evaluate(&event) else {
        panic!("event should pass");
    };
    assert!(accepted.generator.is_none());

    let sim = Selection::from_card(&card_for(DataType::PpMc));
    let EventOutcome::Accepted(accepted) = sim.evaluate(&event) else {
        panic!("event should pass");
    };
    let (gen_jets, leading) = accepted.generator.expect("generator jets");
    assert_eq!(gen_jets.len(), 1);
    assert_eq!(leading.pt, 90.0);
    let wrapped = gen_jets[0].axis_delta_r.expect("delta r");
    assert!((wrapped - (2.0 * std::f64::consts::PI - 6.2)).abs() < 1e-9);
}

#[test]
fn delta_r_wraps_azimuth() {
    assert!((delta_r(0.0, 0.1, 0.0, -0.1) - 0.2).abs() < 1e-12);
    assert!((delta_r(0.3, 0.0, 0.0, 0.4) - 0.5).abs() < 1e-12);
    assert!(delta_r(0.0, 3.0, 0.0, -3.0) < 0.3);
}
