//! Tic-tac-toe game logic with scripted and delegated opponents.
//!
//! # Architecture
//!
//! - **Rules**: pure win/draw detection over a [`Board`]
//! - **Game**: the [`GameState`] machine, `Pending -> Playing -> {Won, Draw}`
//! - **Opponent**: [`OpponentPolicy`], either the deterministic
//!   [`HeuristicPolicy`] or a [`DelegatedPolicy`] around an injected
//!   [`DecisionSource`] with random fallback
//! - **Log**: append-only [`EventLog`] and its JSON / text [`export`]
//! - **Session**: [`GameSession`], the owner of all of the above
//!
//! # Example
//!
//! ```
//! use tictactoe_core::{GameSession, GameStatus, HeuristicPolicy, OpponentPolicy};
//!
//! # async fn example() {
//! let mut session = GameSession::new();
//! session.start_game("Ann", "", Some(OpponentPolicy::Heuristic(HeuristicPolicy::new())));
//!
//! session.cell_activated(0).expect("legal move");
//! let turn = session.play_opponent_turn().await.expect("opponent moves");
//! assert_eq!(turn.decision.cell, Some(4));
//! assert_eq!(session.state().status(), GameStatus::Playing);
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod game;
mod opponent;
mod session;
mod types;

pub mod export;
pub mod log;
pub mod rules;

#[doc(hidden)]
pub use serde_json as __serde_json;

// Crate-level exports - Board types
pub use types::{Board, CELL_COUNT, Mark, Square};

// Crate-level exports - Rules
pub use rules::{WIN_LINES, Win, WinLine, detect_win};

// Crate-level exports - State machine
pub use game::{GameEvent, GameState, GameStatus, MoveError};

// Crate-level exports - Opponent policies
pub use opponent::{
    CENTER, CORNERS, DecisionFailure, DecisionRequest, DecisionRule, DecisionSource,
    DecisionSourceError, DelegatedPolicy, HeuristicPolicy, OpponentDecision, OpponentPolicy,
    RULES_PROMPT, SIDES, parse_reply,
};

// Crate-level exports - Event log and export
pub use export::{ExportError, ExportFormat, LogExport};
pub use log::{Details, EventKind, EventLog, LogEntry};

// Crate-level exports - Session
pub use session::{
    GameSession, HUMAN_MARK, OPPONENT_MARK, OpponentMode, OpponentTurn, Players, SessionError,
};
