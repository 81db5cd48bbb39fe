use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use jtrig_proj::{JsonDirStore, LoadFlags, ProjectionManager};
use serde_json::json;

use crate::{parse_edges, print_json};

#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Store written by `jtrig fill`.
    #[arg(long)]
    pub input: PathBuf,
    /// Output store for the processed histograms.
    #[arg(long)]
    pub out: PathBuf,
    /// Comma separated centrality borders, at most five bins.
    #[arg(long)]
    pub centrality_bins: Option<String>,
    /// First centrality bin to project.
    #[arg(long)]
    pub first_bin: Option<i64>,
    /// Last centrality bin to project.
    #[arg(long)]
    pub last_bin: Option<i64>,
    /// Skip the vertex, centrality and pT-hat histograms.
    #[arg(long)]
    pub no_event_information: bool,
    /// Only project jet pT.
    #[arg(long)]
    pub pt_only: bool,
    /// Skip the η-φ maps.
    #[arg(long)]
    pub no_2d: bool,
    /// Keep raw counts instead of dividing by bin width.
    #[arg(long)]
    pub no_width_normalization: bool,
}

pub fn run(args: &ProjectArgs) -> Result<(), Box<dyn Error>> {
    let input = JsonDirStore::open(&args.input)?;
    let mut manager = ProjectionManager::from_store(&input)?;
    manager.set_flags(LoadFlags {
        event_information: !args.no_event_information,
        jets: !args.pt_only,
        two_dimensional: !args.pt_only && !args.no_2d,
        normalize_width: !args.no_width_normalization,
    });
    if let Some(raw) = &args.centrality_bins {
        let borders = parse_edges(raw)?;
        if !manager.set_centrality_bins(&borders) {
            return Err(format!("centrality borders '{raw}' were not accepted").into());
        }
    }
    if args.first_bin.is_some() || args.last_bin.is_some() {
        let first = args
            .first_bin
            .unwrap_or(manager.first_centrality_bin() as i64);
        let last = args.last_bin.unwrap_or(manager.last_centrality_bin() as i64);
        manager.set_centrality_bin_range(first, last);
    }
    let hash = manager.card().card_hash()?;
    manager.set_projection_hash(hash.clone());

    manager.load(&input)?;
    let mut output = JsonDirStore::create(&args.out)?;
    manager.write(&mut output)?;

    print_json(&json!({
        "projection_hash": hash,
        "data_type": manager.data_type().label(),
        "first_centrality_bin": manager.first_centrality_bin(),
        "last_centrality_bin": manager.last_centrality_bin(),
        "histograms": manager.keys().count(),
        "events": manager.n_events(),
    }))
}
