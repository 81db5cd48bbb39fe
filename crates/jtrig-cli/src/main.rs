use std::error::Error;
use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand};
use commands::{
    card::{self, CardArgs},
    fill::{self, FillArgs},
    generate::{self, GenerateArgs},
    project::{self, ProjectArgs},
    rebin::{self, RebinArgs},
    turn_on::{self, TurnOnArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "jtrig", version, about = "Jet-trigger histogram filling, projection and rebinning")]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Select events from JSON-lines files and fill the jet accumulators.
    Fill(FillArgs),
    /// Project filled accumulators into the processed layout.
    Project(ProjectArgs),
    /// Compute trigger turn-on curves from processed histograms.
    TurnOn(TurnOnArgs),
    /// Rebin a stored one-dimensional histogram onto existing edges.
    Rebin(RebinArgs),
    /// Validate a card and print it with its hash.
    Card(CardArgs),
    /// Write seeded synthetic events as JSON lines.
    Generate(GenerateArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Fill(args) => fill::run(&args),
        Command::Project(args) => project::run(&args),
        Command::TurnOn(args) => turn_on::run(&args),
        Command::Rebin(args) => rebin::run(&args),
        Command::Card(args) => card::run(&args),
        Command::Generate(args) => generate::run(&args),
    }
}

fn write_json<P: AsRef<Path>, T: serde::Serialize>(
    path: P,
    value: &T,
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_edges(raw: &str) -> Result<Vec<f64>, Box<dyn Error>> {
    raw.split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid bin edge list '{raw}': {err}").into())
}
