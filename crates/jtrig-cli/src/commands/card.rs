use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use jtrig_core::serde_io::to_yaml_string;
use jtrig_select::load_card;
use serde_json::json;

use crate::print_json;

#[derive(Args, Debug)]
pub struct CardArgs {
    /// YAML card to validate.
    #[arg(long)]
    pub card: PathBuf,
    /// Write the sanitised card as YAML instead of printing a summary.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &CardArgs) -> Result<(), Box<dyn Error>> {
    let card = load_card(&args.card)?;
    let descriptor = card.descriptor()?;
    if let Some(out) = &args.out {
        std::fs::write(out, to_yaml_string(&card)?)?;
        return Ok(());
    }
    print_json(&json!({
        "card_hash": card.card_hash()?,
        "data_type": card.data_type().label(),
        "centrality_bins": card.n_centrality_bins(),
        "descriptor": descriptor,
        "card": card,
    }))
}
