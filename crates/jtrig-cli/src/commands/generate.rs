use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use jtrig_select::{generate_events, write_json_lines, DataType, SyntheticConfig};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// JSON-lines file to write.
    #[arg(long)]
    pub out: PathBuf,
    /// Number of events.
    #[arg(long, default_value_t = 1000)]
    pub events: usize,
    /// Data type code of the imitated sample.
    #[arg(long, default_value_t = 0)]
    pub data_type: i64,
    /// Generator seed.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let data_type = DataType::from_code(args.data_type)
        .ok_or_else(|| format!("unknown data type code {}", args.data_type))?;
    let config = SyntheticConfig {
        events: args.events,
        data_type,
        seed: args.seed,
        ..SyntheticConfig::default()
    };
    let events = generate_events(&config);
    write_json_lines(&args.out, &events)?;
    tracing::info!("wrote {} events to {}", events.len(), args.out.display());
    Ok(())
}
