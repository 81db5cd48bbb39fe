use std::fs;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use jtrig_core::{ErrorInfo, TrigError};
use jtrig_select::{
    fill_sources, generate_events, write_json_lines, Card, DataType, EventSource, EventStage,
    EventStream, FailurePolicy, FillOpts, JsonLinesSource, MemorySource, SourceStatus,
    SyntheticConfig,
};
use tempfile::tempdir;

fn sim_card() -> Card {
    Card {
        data_type: DataType::PbPbMc.code(),
        ..Card::default()
    }
}

fn sources(count: u64) -> Vec<MemorySource> {
    (0..count)
        .map(|seed| {
            let config = SyntheticConfig {
                events: 200,
                data_type: DataType::PbPbMc,
                seed,
                ..SyntheticConfig::default()
            };
            MemorySource::new(format!("file{seed}"), generate_events(&config))
        })
        .collect()
}

struct FlakySource {
    inner: MemorySource,
    failures_left: AtomicU32,
}

impl FlakySource {
    fn new(inner: MemorySource, failures: u32) -> Self {
        Self {
            inner,
            failures_left: AtomicU32::new(failures),
        }
    }
}

impl EventSource for FlakySource {
    fn label(&self) -> String {
        self.inner.label()
    }

    fn open(&self) -> Result<EventStream<'_>, TrigError> {
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(TrigError::Source(ErrorInfo::new("flaky", "transient failure")));
        }
        self.inner.open()
    }
}

#[test]
fn parallel_fill_matches_sequential_fill() {
    let inputs = sources(6);
    let card = sim_card();
    let sequential = fill_sources(&inputs, &card, &FillOpts::default()).expect("sequential");
    let parallel = fill_sources(
        &inputs,
        &card,
        &FillOpts {
            concurrency: 4,
            ..FillOpts::default()
        },
    )
    .expect("parallel");
    assert_eq!(sequential.histograms, parallel.histograms);
    assert_eq!(sequential.sources, parallel.sources);
    assert_eq!(parallel.filled_sources(), 6);
    assert_eq!(parallel.histograms.counter.count(EventStage::All), 1200.0);
}

#[test]
fn merged_fill_equals_single_source_fill() {
    let inputs = sources(2);
    let card = sim_card();
    let split = fill_sources(&inputs, &card, &FillOpts::default()).expect("split");
    let mut events = Vec::new();
    for source in &inputs {
        events.extend(source.open().expect("open").map(|event| event.expect("event")));
    }
    let joined = fill_sources(
        &[MemorySource::new("joined", events)],
        &card,
        &FillOpts::default(),
    )
    .expect("joined");
    let a = &split.histograms.inclusive_jet;
    let b = &joined.histograms.inclusive_jet;
    assert_eq!(a.n_filled_cells(), b.n_filled_cells());
    assert!((a.total_content() - b.total_content()).abs() < 1e-9 * b.total_content().abs());
    assert_eq!(split.histograms.counter, joined.histograms.counter);
}

#[test]
fn transient_failures_are_retried() {
    let flaky = vec![FlakySource::new(sources(1).remove(0), 1)];
    let report = fill_sources(
        &flaky,
        &sim_card(),
        &FillOpts {
            max_retries: 2,
            ..FillOpts::default()
        },
    )
    .expect("retried fill");
    assert_eq!(report.sources[0].attempts, 2);
    assert_eq!(report.sources[0].status, SourceStatus::Filled {
            events: 200,
            skipped: 0
        });
}

#[test]
fn persistent_failure_aborts_by_default() {
    let flaky = vec![FlakySource::new(sources(1).remove(0), 5)];
    let err = fill_sources(&flaky, &sim_card(), &FillOpts::default()).expect_err("abort");
    assert!(matches!(err, TrigError::Source(_)));
    assert!(!err.is_malformed_event());
    assert_eq!(err.info().code, "flaky");
}

#[test]
fn skip_policy_keeps_the_other_sources() {
    let mut inputs: Vec<FlakySource> = sources(3)
        .into_iter()
        .map(|source| FlakySource::new(source, 0))
        .collect();
    inputs[1] = FlakySource::new(sources(2).remove(1), 10);
    let report = fill_sources(
        &inputs,
        &sim_card(),
        &FillOpts {
            concurrency: 2,
            max_retries: 3,
            policy: FailurePolicy::Skip,
            cancel: None,
        },
    )
    .expect("skip fill");
    assert_eq!(report.filled_sources(), 2);
    assert_eq!(report.sources[1].attempts, 3);
    assert!(matches!(report.sources[1].status, SourceStatus::Skipped { .. }));
    assert_eq!(report.histograms.counter.count(EventStage::All), 400.0);
}

#[test]
fn cancelled_runs_start_no_sources() {
    let flag = Arc::new(AtomicBool::new(true));
    let report = fill_sources(
        &sources(2),
        &sim_card(),
        &FillOpts {
            cancel: Some(flag),
            ..FillOpts::default()
        },
    )
    .expect("cancelled fill");
    assert!(report
        .sources
        .iter()
        .all(|source| source.status == SourceStatus::Cancelled));
    assert_eq!(report.histograms.counter.count(EventStage::All), 0.0);
}

#[test]
fn json_lines_source_reads_what_was_written() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("events.jsonl");
    let events = generate_events(&SyntheticConfig {
        events: 25,
        data_type: DataType::PpMc,
        seed: 3,
        ..SyntheticConfig::default()
    });
    write_json_lines(&path, &events).expect("write events");
    let mut text = fs::read_to_string(&path).expect("read back");
    text.push_str("\n\n");
    fs::write(&path, text).expect("append blank lines");

    let source = JsonLinesSource::new(&path);
    let read: Vec<_> = source
        .open()
        .expect("open")
        .collect::<Result<_, _>>()
        .expect("parse");
    assert_eq!(read, events);
}

#[test]
fn json_lines_defaults_and_errors() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("events.jsonl");
    fs::write(&path, "{\"vz\": 1.5}\nnot json\n").expect("write");
    let source = JsonLinesSource::new(&path);
    let mut stream = source.open().expect("open");
    let first = stream.next().expect("first").expect("event");
    assert_eq!(first.hi_bin, -1);
    assert_eq!(first.weight, 1.0);
    assert!(first.filters.primary_vertex);
    assert!(!first.trigger(0).fired);
    let err = stream.next().expect("second").expect_err("parse error");
    assert!(err.is_malformed_event());
    assert_eq!(err.info().context.get("line").map(String::as_str), Some("2"));

    let missing = JsonLinesSource::new(dir.path().join("absent.jsonl"));
    assert!(missing.open().is_err());
}

#[test]
fn malformed_lines_are_skipped_not_fatal() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("events.jsonl");
    let events = generate_events(&SyntheticConfig {
        events: 50,
        data_type: DataType::PbPbMc,
        seed: 11,
        ..SyntheticConfig::default()
    });
    write_json_lines(&path, &events).expect("write events");
    let mut text = fs::read_to_string(&path).expect("read back");
    text.push_str("{not json}\n");
    fs::write(&path, text).expect("append bad line");

    let card = sim_card();
    let report = fill_sources(&[JsonLinesSource::new(&path)], &card, &FillOpts::default())
        .expect("one bad line must not abort the fill");
    assert_eq!(report.filled_sources(), 1);
    assert_eq!(report.sources[0].attempts, 1);
    assert_eq!(
        report.sources[0].status,
        SourceStatus::Filled {
            events: 50,
            skipped: 1
        }
    );

    let clean = fill_sources(
        &[MemorySource::new("clean", events)],
        &card,
        &FillOpts::default(),
    )
    .expect("clean fill");
    assert_eq!(report.histograms.counter, clean.histograms.counter);
    assert_eq!(report.histograms.counter.count(EventStage::All), 50.0);
}
