use std::path::PathBuf;

use anyhow::Result;
use challenge_cli::{replay_file, score_file, snapshot_file};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "challenge", about = "Replay, score and snapshot mini-challenge sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded session and print its completion report as JSON.
    Replay { session: PathBuf },
    /// Score a freehand stroke (JSON list of points).
    Score {
        points: PathBuf,
        #[arg(long, default_value = "classic")]
        profile: String,
    },
    /// Replay a grid-board session and write the final board as PNG.
    Snapshot {
        session: PathBuf,
        out: PathBuf,
        /// Cell size in pixels (clamped to 4..=256).
        #[arg(long, default_value_t = 32)]
        cell: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay { session } => {
            let result = replay_file(&session)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Score { points, profile } => {
            let breakdown = score_file(&points, &profile)?;
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
        }
        Commands::Snapshot { session, out, cell } => {
            snapshot_file(&session, &out, cell)?;
        }
    }
    Ok(())
}
