#![allow(dead_code)]

use jtrig_proj::{write_fill_output, MemoryStore};
use jtrig_select::{fill_sources, Card, Event, FillOpts, Jet, MemorySource};

pub fn jet(pt: f64) -> Jet {
    Jet {
        pt,
        phi: 2.0,
        eta: 0.5,
        raw_pt: pt,
        max_track_pt: 0.3 * pt,
    }
}

pub fn event(pt: f64, triggers: &[usize]) -> Event {
    let mut event = Event {
        jets: vec![jet(pt)],
        ..Event::default()
    };
    for trigger in triggers {
        event.fire(*trigger);
    }
    event
}

pub fn pp_card() -> Card {
    Card {
        centrality_bin_edges: vec![-0.75, -0.25],
        ..Card::default()
    }
}

pub fn filled_store(card: &Card, events: Vec<Event>) -> MemoryStore {
    let source = MemorySource::new("fixture", events);
    let report = fill_sources(&[source], card, &FillOpts::default()).expect("fill");
    let mut store = MemoryStore::new();
    write_fill_output(&mut store, &report.histograms, card).expect("write fill output");
    store
}
