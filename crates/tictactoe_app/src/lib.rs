//! Terminal front end for `tictactoe_core`.
//!
//! # Architecture
//!
//! - **CLI**: clap commands for playing and writing a default config
//! - **Config**: TOML settings for the LLM provider, opponent delay and
//!   export directory
//! - **LLM**: provider client (OpenAI, Anthropic) wrapped as a core
//!   [`DecisionSource`](tictactoe_core::DecisionSource)
//! - **Terminal**: line-based game loop over a
//!   [`GameSession`](tictactoe_core::GameSession)
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_app::{AppConfig, OpponentArg, TerminalGame};
//! use tokio::io::BufReader;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::load(None)?;
//! let mut game = TerminalGame::new(config, BufReader::new(tokio::io::stdin()));
//! game.run(OpponentArg::Heuristic, "Ann", "").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod llm_client;
pub mod llm_source;
pub mod terminal;

pub use cli::{Cli, Command, OpponentArg};
pub use config::{AppConfig, ConfigError, DEFAULT_CONFIG_FILE};
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};
pub use llm_source::LlmDecisionSource;
pub use terminal::{Input, TerminalGame, build_opponent, parse_input};
