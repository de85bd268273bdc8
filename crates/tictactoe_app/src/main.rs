//! Tic-tac-toe terminal game.

#![warn(missing_docs)]

use anyhow::{Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use tictactoe_app::{AppConfig, Cli, Command, OpponentArg, TerminalGame};
use tokio::io::BufReader;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so they don't interleave with the board
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            mode,
            player1,
            player2,
            config,
            export_dir,
        } => run_play(mode, player1, player2, config, export_dir).await,
        Command::InitConfig { path, force } => init_config(&path, force),
    }
}

/// Run an interactive game on stdin/stdout
#[instrument(skip(player1, player2))]
async fn run_play(
    mode: OpponentArg,
    player1: String,
    player2: String,
    config: Option<PathBuf>,
    export_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = AppConfig::load(config.as_deref())?;
    if let Some(dir) = export_dir {
        config = config.with_export_dir(dir);
    }

    info!(?mode, "Starting terminal game");
    let mut game = TerminalGame::new(config, BufReader::new(tokio::io::stdin()));
    game.run(mode, &player1, &player2).await
}

/// Write the default config as TOML
#[instrument]
fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists, use --force to overwrite", path.display());
    }

    std::fs::write(path, AppConfig::default().to_toml()?)?;
    println!("Wrote {}", path.display());
    Ok(())
}
