use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use jtrig_proj::{write_fill_output, JsonDirStore};
use jtrig_select::{fill_sources, load_card, FailurePolicy, FillOpts, JsonLinesSource};
use serde_json::json;

use crate::write_json;

#[derive(Args, Debug)]
pub struct FillArgs {
    /// YAML card with cuts and binning.
    #[arg(long)]
    pub card: PathBuf,
    /// JSON-lines event files.
    #[arg(long = "input", value_name = "PATH", required = true)]
    pub inputs: Vec<PathBuf>,
    /// Output store directory.
    #[arg(long)]
    pub out: PathBuf,
    /// Number of files processed in parallel.
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,
    /// Attempts per file before it counts as failed.
    #[arg(long, default_value_t = 2)]
    pub retries: u32,
    /// Skip files that keep failing instead of aborting.
    #[arg(long)]
    pub skip_failed: bool,
}

pub fn run(args: &FillArgs) -> Result<(), Box<dyn Error>> {
    let mut card = load_card(&args.card)?;
    card.input_files = args
        .inputs
        .iter()
        .map(|path| path.display().to_string())
        .collect();

    let sources: Vec<JsonLinesSource> = args
        .inputs
        .iter()
        .map(|path| JsonLinesSource::new(path.clone()))
        .collect();
    let opts = FillOpts {
        concurrency: args.jobs,
        max_retries: args.retries,
        policy: if args.skip_failed {
            FailurePolicy::Skip
        } else {
            FailurePolicy::Abort
        },
        cancel: None,
    };
    let report = fill_sources(&sources, &card, &opts)?;
    tracing::info!(
        "filled {} of {} files",
        report.filled_sources(),
        report.sources.len()
    );

    let mut store = JsonDirStore::create(&args.out)?;
    write_fill_output(&mut store, &report.histograms, &card)?;

    let summary = json!({
        "card_hash": card.card_hash()?,
        "filled_sources": report.filled_sources(),
        "sources": report.sources,
        "accepted_events": report.histograms.counter.count(jtrig_select::EventStage::VzCut),
    });
    write_json(args.out.join("summary.json"), &summary)?;
    Ok(())
}
