use std::error::Error;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use jtrig_proj::{
    turn_on_curves, HistogramStore, JsonDirStore, LoadFlags, ProjectionManager, StoredHistogram,
};
use jtrig_select::DataLevel;
use serde_json::json;

use crate::{parse_edges, print_json};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Level {
    /// Reconstructed jets.
    Reco,
    /// Generator-level jets.
    Gen,
}

impl From<Level> for DataLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Reco => DataLevel::Reconstructed,
            Level::Gen => DataLevel::GeneratorLevel,
        }
    }
}

#[derive(Args, Debug)]
pub struct TurnOnArgs {
    /// Store written by `jtrig project`.
    #[arg(long)]
    pub input: PathBuf,
    /// Store receiving the curves under `turnOn/`.
    #[arg(long)]
    pub out: PathBuf,
    /// Jet level to use.
    #[arg(long, value_enum, default_value_t = Level::Reco)]
    pub level: Level,
    /// Comma separated jet pT edges applied before dividing.
    #[arg(long)]
    pub rebin: Option<String>,
    /// Also export every curve bin as CSV.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

pub fn run(args: &TurnOnArgs) -> Result<(), Box<dyn Error>> {
    let input = JsonDirStore::open(&args.input)?;
    let mut manager = ProjectionManager::from_store(&input)?;
    manager.set_flags(LoadFlags::default());
    manager.load_processed(&input)?;

    let edges = args.rebin.as_deref().map(parse_edges).transpose()?;
    let curves = turn_on_curves(&manager, args.level.into(), edges.as_deref())?;

    let mut output = JsonDirStore::create(&args.out)?;
    for curve in &curves {
        let name = format!("turnOn/{}", curve.name());
        output.put(&name, StoredHistogram::OneD(curve.curve.clone()))?;
    }

    if let Some(path) = &args.csv {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["curve", "low_edge", "high_edge", "efficiency", "error"])?;
        for curve in &curves {
            let axis = curve.curve.axis();
            for cell in 1..=axis.n_bins() {
                writer.write_record([
                    curve.name(),
                    axis.low_edge(cell).to_string(),
                    axis.high_edge(cell).to_string(),
                    curve.curve.content(cell).to_string(),
                    curve.curve.error(cell).to_string(),
                ])?;
            }
        }
        writer.flush()?;
    }

    print_json(&json!({
        "curves": curves.iter().map(|curve| curve.name()).collect::<Vec<_>>(),
    }))
}
