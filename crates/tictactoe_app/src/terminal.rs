//! Line-oriented terminal front end.
//!
//! Reads commands from any async line source, drives a [`GameSession`] and
//! prints its snapshots. All game rules live in the core.

use crate::cli::OpponentArg;
use crate::config::{AppConfig, ConfigError};
use crate::llm_source::LlmDecisionSource;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tictactoe_core::{
    DelegatedPolicy, ExportFormat, GameSession, GameStatus, HeuristicPolicy, Mark, OpponentPolicy,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, info, instrument, warn};

/// Number of log entries shown by the `l` command.
const LOG_TAIL: usize = 10;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Play the cell at this index (0-8).
    Cell(usize),
    /// Same players, fresh board.
    Rematch,
    /// Back to player selection.
    NewGame,
    /// Print the latest log entries.
    ShowLog,
    /// Export the log.
    Export(ExportFormat),
    /// Print the command list.
    Help,
    /// Leave.
    Quit,
    /// Anything else.
    Unknown(String),
}

/// Parses a line typed at the prompt. Cells are entered 1-9.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if let Ok(n) = line.parse::<usize>()
        && (1..=9).contains(&n)
    {
        return Input::Cell(n - 1);
    }

    match line.to_lowercase().as_str() {
        "r" | "rematch" => Input::Rematch,
        "n" | "new" => Input::NewGame,
        "l" | "log" => Input::ShowLog,
        "j" | "json" => Input::Export(ExportFormat::Json),
        "t" | "txt" | "text" => Input::Export(ExportFormat::Text),
        "h" | "?" | "help" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

/// Builds the opponent policy for `mode`.
///
/// The LLM mode needs an API key in the environment.
#[instrument(skip(config))]
pub fn build_opponent(
    mode: OpponentArg,
    config: &AppConfig,
) -> Result<Option<OpponentPolicy>, ConfigError> {
    Ok(match mode {
        OpponentArg::TwoPlayer => None,
        OpponentArg::Heuristic => Some(OpponentPolicy::Heuristic(HeuristicPolicy::new())),
        OpponentArg::Llm => {
            let source = LlmDecisionSource::new(config.create_llm_config()?);
            Some(OpponentPolicy::Delegated(DelegatedPolicy::new(Arc::new(
                source,
            ))))
        }
    })
}

/// Terminal game driven by a line reader.
pub struct TerminalGame<R> {
    session: GameSession,
    config: AppConfig,
    input: Lines<R>,
}

impl<R> TerminalGame<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Creates a game reading commands from `reader`.
    pub fn new(config: AppConfig, reader: R) -> Self {
        Self {
            session: GameSession::new(),
            config,
            input: reader.lines(),
        }
    }

    /// The underlying session.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Runs until `q` or end of input.
    #[instrument(skip(self, player1, player2))]
    pub async fn run(&mut self, mode: OpponentArg, player1: &str, player2: &str) -> Result<()> {
        let opponent = build_opponent(mode, &self.config)?;
        self.session.start_game(player1, player2, opponent);
        print_help();

        loop {
            self.render();

            if self.session.awaiting_opponent() {
                println!("{} (O) is thinking...", self.session.player_name(Mark::O));
                tokio::time::sleep(Duration::from_millis(*self.config.opponent_delay_ms())).await;
                match self.session.play_opponent_turn().await {
                    Ok(turn) => {
                        if let Some(cell) = turn.decision.cell {
                            println!("O plays {}: {}", cell + 1, turn.decision.reason);
                        }
                        continue;
                    }
                    Err(e) => {
                        warn!(error = %e, "Opponent turn failed");
                        println!("Opponent could not move: {e}");
                    }
                }
            }

            print!("> ");
            std::io::stdout().flush().context("Failed to flush stdout")?;
            let Some(line) = self.next_line().await? else {
                break;
            };

            match parse_input(&line) {
                Input::Cell(index) => {
                    if let Err(e) = self.session.cell_activated(index) {
                        println!("Invalid move: {e}");
                    }
                }
                Input::Rematch => {
                    if let Err(e) = self.session.rematch() {
                        println!("{e}");
                    }
                }
                Input::NewGame => {
                    self.session.new_game();
                    if !self.setup().await? {
                        break;
                    }
                }
                Input::ShowLog => self.show_log(),
                Input::Export(format) => match self.export(format).await {
                    Ok(path) => println!("Log written to {}", path.display()),
                    Err(e) => println!("Export failed: {e:#}"),
                },
                Input::Help => print_help(),
                Input::Quit => break,
                Input::Unknown(text) => {
                    if !text.is_empty() {
                        println!("Unknown command {text:?}, type h for help");
                    }
                }
            }
        }

        info!(entries = self.session.log().len(), "Leaving game");
        Ok(())
    }

    /// Asks for names and mode, then starts a game. False on end of input.
    async fn setup(&mut self) -> Result<bool> {
        loop {
            println!("Name for X (blank for Player 1):");
            let Some(player1) = self.next_line().await? else {
                return Ok(false);
            };
            println!("Name for O (blank for default):");
            let Some(player2) = self.next_line().await? else {
                return Ok(false);
            };
            println!("Opponent: 1) two-player  2) heuristic  3) llm");
            let Some(answer) = self.next_line().await? else {
                return Ok(false);
            };

            let Some(mode) = OpponentArg::from_answer(&answer) else {
                println!("Unknown opponent {answer:?}");
                continue;
            };

            match build_opponent(mode, &self.config) {
                Ok(opponent) => {
                    self.session.start_game(&player1, &player2, opponent);
                    return Ok(true);
                }
                Err(e) => println!("{}", e.message),
            }
        }
    }

    async fn next_line(&mut self) -> Result<Option<String>> {
        let line = self
            .input
            .next_line()
            .await
            .context("Failed to read input")?;
        debug!(?line, "Input line");
        Ok(line)
    }

    /// Writes an export into the configured directory.
    async fn export(&mut self, format: ExportFormat) -> Result<PathBuf> {
        let out = self.session.export(format)?;
        let dir = self.config.export_dir();
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(&out.file_name);
        tokio::fs::write(&path, &out.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    fn render(&self) {
        let state = self.session.state();
        println!();
        println!("{}", state.board().display());
        match state.status() {
            GameStatus::Playing => {
                let mark = state.turn();
                println!("Current player: {} ({mark})", self.session.player_name(mark));
            }
            GameStatus::Won => {
                if let Some(win) = state.winner() {
                    println!(
                        "Winner: {} ({})! Line {:?}. r = rematch, n = new game",
                        self.session.player_name(win.mark),
                        win.mark,
                        win.line.cells().map(|c| c + 1)
                    );
                }
            }
            GameStatus::Draw => println!("It's a Draw! r = rematch, n = new game"),
            GameStatus::Pending => println!("No game in progress, n = new game"),
        }
    }

    fn show_log(&self) {
        let log = self.session.log();
        if log.is_empty() {
            println!("No game events yet.");
            return;
        }
        for entry in log.newest_first().take(LOG_TAIL) {
            println!("{}", tictactoe_core::export::render_line(entry));
        }
    }
}

fn print_help() {
    println!("1-9 play a cell | r rematch | n new game | l log | j/t export JSON/TXT | q quit");
}
