use jtrig_hist::{rebin_asymmetric, AxisRange};
use jtrig_select::{
    fill_sources, Card, Event, EventStage, FillOpts, Jet, MemorySource, ANY_TRIGGER, AXIS_LEVEL,
    AXIS_PT, AXIS_TRIGGER,
};

fn synthetic_events() -> Vec<Event> {
    (0..1000)
        .map(|i| {
            let pt = 10.0 + (i % 190) as f64;
            let mut event = Event {
                vz: if i % 2 == 0 { 0.0 } else { 18.0 },
                jets: vec![Jet {
                    pt,
                    phi: 2.0,
                    eta: 0.5,
                    raw_pt: pt,
                    max_track_pt: 0.3 * pt,
                }],
                ..Event::default()
            };
            event.fire(0);
            event
        })
        .collect()
}

fn pp_card() -> Card {
    Card {
        centrality_bin_edges: vec![-0.75, -0.25],
        ..Card::default()
    }
}

#[test]
fn half_of_the_events_reach_the_jet_histogram() {
    let events = synthetic_events();
    let expected_in_range = events
        .iter()
        .filter(|event| event.vz == 0.0)
        .filter(|event| (50.0..100.0).contains(&event.jets[0].pt))
        .count() as f64;

    let source = MemorySource::new("synthetic", events);
    let report = fill_sources(&[source], &pp_card(), &FillOpts::default()).expect("fill");
    let histograms = report.histograms;

    assert_eq!(histograms.counter.count(EventStage::All), 1000.0);
    assert_eq!(histograms.counter.count(EventStage::BaseTrigger), 1000.0);
    assert_eq!(histograms.counter.count(EventStage::VzCut), 500.0);

    let any = ANY_TRIGGER + 1;
    let restrictions = [
        AxisRange::new(AXIS_LEVEL, 1, 1),
        AxisRange::new(AXIS_TRIGGER, any, any),
    ];
    let mut pt = histograms
        .inclusive_jet
        .project_1d(AXIS_PT, &restrictions)
        .expect("pt projection");
    assert!((pt.total() - 500.0).abs() < 1e-9);

    pt.scale_width(1.0);
    let rebinned = rebin_asymmetric(&pt, &[0.0, 50.0, 100.0, 150.0, 200.0]);
    let in_range = rebinned.content(2) * rebinned.axis().width(2);
    assert!((in_range - expected_in_range).abs() < 1e-9);
    // unit weights: variance equals the count
    let variance = rebinned.variance(2) * 50.0 * 50.0;
    assert!((variance - expected_in_range).abs() < 1e-9);
}

#[test]
fn event_histograms_see_only_accepted_events() {
    let source = MemorySource::new("synthetic", synthetic_events());
    let report = fill_sources(&[source], &pp_card(), &FillOpts::default()).expect("fill");
    let histograms = report.histograms;
    assert_eq!(histograms.vertex_z.total(), 500.0);
    assert_eq!(histograms.vertex_z_weighted.total(), 500.0);
    // pp events sit at centrality -0.5
    let cell = histograms.centrality.find_cell(-0.5);
    assert_eq!(histograms.centrality.content(cell), 500.0);
    assert_eq!(histograms.gen_jet_delta_r.total(), 0.0);
    assert_eq!(histograms.leading_jet.total_content(), 1000.0);
}
