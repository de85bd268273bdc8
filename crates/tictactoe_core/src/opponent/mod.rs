//! Opponent move selection.
//!
//! An [`OpponentPolicy`] is picked when a game starts and only ever advises:
//! it returns an [`OpponentDecision`] and the session applies the move
//! through the normal [`GameState::apply_move`](crate::GameState::apply_move)
//! path.

mod delegated;
mod heuristic;

pub use delegated::{
    DecisionFailure, DecisionRequest, DecisionSource, DecisionSourceError, DelegatedPolicy,
    RULES_PROMPT, parse_reply,
};
pub use heuristic::{CENTER, CORNERS, HeuristicPolicy, SIDES};

use crate::types::{Board, Mark};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Which rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DecisionRule {
    /// Completes a line for the policy's own mark.
    Win,
    /// Occupies the cell the other mark needs to complete a line.
    Block,
    /// Takes cell 4.
    Center,
    /// Takes the first free corner.
    Corner,
    /// Takes the first free side.
    Side,
    /// Takes the lowest free cell.
    FirstEmpty,
    /// Nothing left to play.
    NoMoves,
    /// Move supplied by the external decision source.
    Delegated,
    /// Uniform random pick after the external source failed.
    RandomFallback,
}

/// Result of asking a policy for a move.
///
/// `reason` is informational; nothing branches on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentDecision {
    /// Chosen cell, `None` when the board had no empty cell.
    pub cell: Option<usize>,
    /// Rule that fired.
    pub rule: DecisionRule,
    /// Human-readable explanation.
    pub reason: String,
    /// Empty cells at decision time.
    pub possible_moves: Vec<usize>,
    /// The delegated source failed and a random cell was picked instead.
    pub used_fallback: bool,
}

impl OpponentDecision {
    /// The policy was asked to move on a full board.
    pub fn is_exhausted(&self) -> bool {
        self.cell.is_none()
    }
}

/// Strategy used for the computer-controlled seat.
#[derive(Debug)]
pub enum OpponentPolicy {
    /// Deterministic rule ladder.
    Heuristic(HeuristicPolicy),
    /// External decision source with random fallback.
    Delegated(DelegatedPolicy),
}

impl OpponentPolicy {
    /// Chooses a move for `own_mark` on `board`.
    ///
    /// Callers only invoke this while the game is playing and `own_mark` is
    /// to move.
    #[instrument(skip(self, board), fields(policy = self.name()))]
    pub async fn decide(&mut self, board: &Board, own_mark: Mark) -> OpponentDecision {
        match self {
            OpponentPolicy::Heuristic(policy) => policy.decide(board, own_mark),
            OpponentPolicy::Delegated(policy) => policy.decide(board, own_mark).await,
        }
    }

    /// Short label for logs.
    pub fn name(&self) -> &str {
        match self {
            OpponentPolicy::Heuristic(_) => "heuristic",
            OpponentPolicy::Delegated(policy) => policy.source_name(),
        }
    }
}
