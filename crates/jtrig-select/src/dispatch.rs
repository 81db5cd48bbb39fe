use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jtrig_core::{ErrorInfo, TrigError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::histograms::TriggerHistograms;
use crate::pipeline::Selection;
use crate::source::EventSource;

fn dispatch_error(code: &str, err: impl ToString) -> TrigError {
    TrigError::Source(ErrorInfo::new(code, err.to_string()))
}

/// What happens to a source that still fails after all retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the whole fill with the source error.
    #[default]
    Abort,
    /// Log a warning and continue without the source.
    Skip,
}

/// Options governing a fill run.
#[derive(Debug, Clone)]
pub struct FillOpts {
    /// Number of sources processed in parallel.
    pub concurrency: usize,
    /// Attempts per source before it counts as failed.
    pub max_retries: u32,
    /// Handling of sources that keep failing.
    pub policy: FailurePolicy,
    /// Set to true to stop starting new sources.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for FillOpts {
    fn default() -> Self {
        Self {
            concurrency: 1,
            max_retries: 2,
            policy: FailurePolicy::Abort,
            cancel: None,
        }
    }
}

/// Final state of one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SourceStatus {
    /// Every event was read and filled.
    Filled {
        /// Events read from the source.
        events: u64,
        /// Malformed event records left out.
        #[serde(default)]
        skipped: u64,
    },
    /// The source failed and was left out.
    Skipped {
        /// Last error.
        error: String,
    },
    /// The run was cancelled before the source started.
    Cancelled,
}

/// Per-source summary of a fill run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    /// Source label.
    pub label: String,
    /// Attempts made.
    pub attempts: u32,
    /// Outcome.
    #[serde(flatten)]
    pub status: SourceStatus,
}

/// Merged histograms and per-source reports, in source order.
#[derive(Debug, Clone)]
pub struct FillReport {
    /// Histograms summed over all filled sources.
    pub histograms: TriggerHistograms,
    /// One report per source.
    pub sources: Vec<SourceReport>,
}

impl FillReport {
    /// Number of sources that were filled.
    pub fn filled_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|report| matches!(report.status, SourceStatus::Filled { .. }))
            .count()
    }
}

struct JobResult {
    report: SourceReport,
    histograms: Option<TriggerHistograms>,
}

struct FillOutcome {
    histograms: TriggerHistograms,
    events: u64,
    skipped: u64,
}

struct JobFailure {
    attempts: u32,
    error: TrigError,
}

/// Fills the histograms of `card` from every source.
///
/// Sources run on a dedicated thread pool, each into its own histogram set. The sets
/// are merged in source order, so the result does not depend on `concurrency`.
pub fn fill_sources<S>(sources: &[S], card: &Card, opts: &FillOpts) -> Result<FillReport, TrigError>
where
    S: EventSource + Sync,
{
    let selection = Selection::from_card(card);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.concurrency.max(1))
        .build()
        .map_err(|err| dispatch_error("thread_pool", err))?;

    let results: Result<Vec<_>, TrigError> = pool.install(|| {
        sources
            .par_iter()
            .enumerate()
            .map(|(index, source)| -> Result<(usize, JobResult), TrigError> {
                let result = process_source(source, card, &selection, opts)?;
                Ok((index, result))
            })
            .collect()
    });

    let mut ordered = results?;
    ordered.sort_by_key(|(index, _)| *index);

    let mut histograms = TriggerHistograms::new(card)?;
    let mut reports = Vec::with_capacity(ordered.len());
    for (_, result) in ordered {
        if let Some(filled) = &result.histograms {
            histograms.merge(filled)?;
        }
        reports.push(result.report);
    }
    Ok(FillReport {
        histograms,
        sources: reports,
    })
}

fn process_source<S: EventSource>(
    source: &S,
    card: &Card,
    selection: &Selection,
    opts: &FillOpts,
) -> Result<JobResult, TrigError> {
    let label = source.label();
    let cancelled = opts
        .cancel
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed));
    if cancelled {
        log::info!("Fill cancelled, not starting {label}");
        return Ok(JobResult {
            report: SourceReport {
                label,
                attempts: 0,
                status: SourceStatus::Cancelled,
            },
            histograms: None,
        });
    }

    match fill_with_retries(source, card, selection, opts.max_retries) {
        Ok((outcome, attempts)) => {
            let FillOutcome {
                histograms,
                events,
                skipped,
            } = outcome;
            if skipped > 0 {
                log::warn!("Filled {events} events from {label}, skipped {skipped} malformed");
            } else {
                log::info!("Filled {events} events from {label}");
            }
            Ok(JobResult {
                report: SourceReport {
                    label,
                    attempts,
                    status: SourceStatus::Filled { events, skipped },
                },
                histograms: Some(histograms),
            })
        }
        Err(failure) => match opts.policy {
            FailurePolicy::Abort => Err(failure.error),
            FailurePolicy::Skip => {
                log::warn!(
                    "Skipping {label} after {} attempts: {}",
                    failure.attempts,
                    failure.error
                );
                Ok(JobResult {
                    report: SourceReport {
                        label,
                        attempts: failure.attempts,
                        status: SourceStatus::Skipped {
                            error: failure.error.to_string(),
                        },
                    },
                    histograms: None,
                })
            }
        },
    }
}

// Every attempt starts from an empty set, so a source failing halfway leaves no
// partial fill behind.
fn fill_with_retries<S: EventSource>(
    source: &S,
    card: &Card,
    selection: &Selection,
    max_retries: u32,
) -> Result<(FillOutcome, u32), JobFailure> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match fill_once(source, card, selection) {
            Ok(outcome) => return Ok((outcome, attempt)),
            Err(err) if attempt < max_retries.max(1) => {
                log::debug!("Attempt {attempt} on {} failed: {err}", source.label());
                continue;
            }
            Err(error) => {
                return Err(JobFailure {
                    attempts: attempt,
                    error,
                })
            }
        }
    }
}

// Undecodable records are dropped one by one; open and read failures end the attempt.
fn fill_once<S: EventSource>(
    source: &S,
    card: &Card,
    selection: &Selection,
) -> Result<FillOutcome, TrigError> {
    let mut histograms = TriggerHistograms::new(card)?;
    let mut events = 0u64;
    let mut skipped = 0u64;
    for event in source.open()? {
        match event {
            Ok(event) => {
                histograms.process_event(selection, &event)?;
                events += 1;
            }
            Err(err) if err.is_malformed_event() => {
                log::warn!("Skipping malformed event in {}: {err}", source.label());
                skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(FillOutcome {
        histograms,
        events,
        skipped,
    })
}
