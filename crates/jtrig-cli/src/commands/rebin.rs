use std::error::Error;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use jtrig_hist::{check_bin_boundaries, normalize_matrix, rebin_2d, rebin_asymmetric, Direction};
use jtrig_proj::{HistogramStore, JsonDirStore, StoredHistogram};
use serde_json::json;

use crate::{parse_edges, print_json};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Normalize {
    /// Each x column sums to one.
    Columns,
    /// Each y row sums to one.
    Rows,
}

#[derive(Args, Debug)]
pub struct RebinArgs {
    /// Store holding the histogram.
    #[arg(long)]
    pub input: PathBuf,
    /// Histogram name inside the store.
    #[arg(long)]
    pub name: String,
    /// Comma separated new x edges.
    #[arg(long)]
    pub edges: String,
    /// Comma separated new y edges, two-dimensional histograms only.
    #[arg(long)]
    pub y_edges: Option<String>,
    /// Multiply two-dimensional input bins by their area first.
    #[arg(long)]
    pub undo_area: bool,
    /// Divide two-dimensional output bins by their area.
    #[arg(long)]
    pub normalize_area: bool,
    /// Normalize the rebinned two-dimensional histogram along one direction.
    #[arg(long, value_enum)]
    pub normalize: Option<Normalize>,
    /// Store receiving the result; defaults to the input store.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &RebinArgs) -> Result<(), Box<dyn Error>> {
    let input = JsonDirStore::open(&args.input)?;
    let stored = input
        .get(&args.name)?
        .ok_or_else(|| format!("histogram '{}' not found in {}", args.name, args.input.display()))?;
    let x_edges = parse_edges(&args.edges)?;

    let (result, accepted) = match &stored {
        StoredHistogram::OneD(hist) => {
            let accepted = check_bin_boundaries(&x_edges, hist.axis()).is_ok();
            (StoredHistogram::OneD(rebin_asymmetric(hist, &x_edges)), accepted)
        }
        StoredHistogram::TwoD(hist) => {
            let y_edges = match &args.y_edges {
                Some(raw) => parse_edges(raw)?,
                None => hist.y_axis().edges().to_vec(),
            };
            let accepted = check_bin_boundaries(&x_edges, hist.x_axis()).is_ok()
                && check_bin_boundaries(&y_edges, hist.y_axis()).is_ok();
            let mut rebinned =
                rebin_2d(hist, &x_edges, &y_edges, args.undo_area, args.normalize_area);
            match args.normalize {
                Some(Normalize::Columns) => normalize_matrix(&mut rebinned, 1.0, Direction::Columns),
                Some(Normalize::Rows) => normalize_matrix(&mut rebinned, 1.0, Direction::Rows),
                None => {}
            }
            (StoredHistogram::TwoD(rebinned), accepted)
        }
        StoredHistogram::Sparse(_) => {
            return Err(format!(
                "'{}' is an accumulator; project it before rebinning",
                args.name
            )
            .into())
        }
    };

    let target = result.name().to_string();
    if accepted {
        let mut output = JsonDirStore::create(args.out.as_ref().unwrap_or(&args.input))?;
        let stored_name = match args.name.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{target}"),
            None => target.clone(),
        };
        output.put(&stored_name, result)?;
        tracing::info!("wrote {stored_name}");
    }

    print_json(&json!({
        "input": args.name,
        "output": target,
        "accepted": accepted,
    }))
}
