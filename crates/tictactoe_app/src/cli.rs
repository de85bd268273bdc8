//! Command-line interface for the tic-tac-toe terminal game.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tic-tac-toe in the terminal, against a friend, a rule-based bot or an LLM
#[derive(Parser, Debug)]
#[command(name = "tictactoe")]
#[command(about = "Tic-tac-toe with heuristic and LLM-backed opponents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game in the terminal
    Play {
        /// Who plays O
        #[arg(short, long, value_enum, default_value_t = OpponentArg::TwoPlayer)]
        mode: OpponentArg,

        /// Name of the X player
        #[arg(long, default_value = "")]
        player1: String,

        /// Name of the O player
        #[arg(long, default_value = "")]
        player2: String,

        /// Path to a TOML config file (defaults to ./tictactoe.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory for exported logs (overrides the config)
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Write a default config file
    InitConfig {
        /// Where to write it
        #[arg(default_value = "tictactoe.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Opponent selection on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentArg {
    /// Two humans take turns at the keyboard
    TwoPlayer,
    /// Rule-based computer opponent
    Heuristic,
    /// LLM-backed computer opponent with random fallback
    Llm,
}

impl OpponentArg {
    /// Parses the answer to the interactive mode prompt.
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer.trim().to_lowercase().as_str() {
            "" | "1" | "two-player" | "two" | "2p" => Some(OpponentArg::TwoPlayer),
            "2" | "heuristic" | "bot" | "ai" => Some(OpponentArg::Heuristic),
            "3" | "llm" => Some(OpponentArg::Llm),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play_with_mode() {
        let cli = Cli::parse_from(["tictactoe", "play", "--mode", "heuristic", "--player1", "Ann"]);
        match cli.command {
            Command::Play { mode, player1, .. } => {
                assert_eq!(mode, OpponentArg::Heuristic);
                assert_eq!(player1, "Ann");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_mode_answers() {
        assert_eq!(OpponentArg::from_answer(""), Some(OpponentArg::TwoPlayer));
        assert_eq!(OpponentArg::from_answer(" LLM "), Some(OpponentArg::Llm));
        assert_eq!(OpponentArg::from_answer("2"), Some(OpponentArg::Heuristic));
        assert_eq!(OpponentArg::from_answer("chess"), None);
    }
}
