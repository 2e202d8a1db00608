use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use caretfix_scintilla::{ScintillaConfig, Simulation};

/// Replay an IME composition script against a simulated Scintilla host and
/// print everything that gets spoken or brailled.
#[derive(Parser)]
#[command(name = "caretfix-sim", version)]
struct Args {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Script to replay; reads stdin when omitted
    #[arg(long)]
    script: Option<PathBuf>,

    /// Emit one JSON object per output event
    #[arg(long)]
    json: bool,

    /// Run the host alone, without the caret tracker
    #[arg(long)]
    no_tracker: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ScintillaConfig::load_toml(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ScintillaConfig::default(),
    };

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let script = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut sim = if args.no_tracker {
        Simulation::without_tracker(config)?
    } else {
        Simulation::new(config)?
    };
    sim.run_script(&script)?;

    for event in sim.finish() {
        if args.json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            println!("{}", event);
        }
    }
    Ok(())
}
