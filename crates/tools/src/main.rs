use std::path::PathBuf;

use clap::{Parser, Subcommand};
use demand::severity::legend;
use foundation::ids::StationId;
use map::MapConfig;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stationmap", about = "Render the EV station demand map offline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one map update and print markers, zones and heat points as JSON.
    Render {
        /// JSON array of stations as served by `/api/stations`.
        stations: PathBuf,
        /// Station id to highlight.
        #[arg(long)]
        selected: Option<i64>,
        /// Map configuration (JSON). Defaults are used when omitted.
        #[arg(long, env = "STATIONMAP_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the ranked high-demand zones.
    Zones { stations: PathBuf },
    /// Print the demand legend.
    Legend,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Render {
            stations,
            selected,
            config,
        } => {
            let config = match config {
                Some(path) => MapConfig::from_path(&path).map_err(|e| format!("{path:?}: {e}"))?,
                None => MapConfig::default(),
            };
            let stations = tools::load_stations(&stations)?;
            info!(stations = stations.len(), "rendering station map");
            let report = tools::render(&stations, selected.map(StationId), config)?;
            print_json(&report)
        }
        Command::Zones { stations } => {
            let stations = tools::load_stations(&stations)?;
            print_json(&tools::ranked_zones(&stations))
        }
        Command::Legend => print_json(&legend()),
    }
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}
