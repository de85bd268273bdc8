//! Opponent backed by an external decision source (typically an LLM).
//!
//! The source is an injected capability; it only returns the raw reply body.
//! Parsing and validation live here so every failure mode of the source is
//! handled the same way: a uniformly random empty cell, flagged as fallback.

use super::{DecisionRule, OpponentDecision};
use crate::types::{Board, CELL_COUNT, Mark};
use derive_more::{Display, Error};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Rules handed to the external source as its system prompt.
pub const RULES_PROMPT: &str = "\
You are playing tic-tac-toe. Cells are indexed 0-8 in row-major order:
 0 | 1 | 2
 3 | 4 | 5
 6 | 7 | 8
The board is given as a JSON array of 9 entries, each null (empty), \"X\" or \"O\".
Choose your move with these priorities:
1. Win: if you can complete three in a row, do it.
2. Block: if your opponent could complete three in a row next turn, take that cell.
3. Fork: create two winning threats at once, and prevent your opponent from doing so.
4. Center: take cell 4 if it is empty.
5. Opposite corner: if your opponent holds a corner, take the opposite corner.
6. Empty corner: take any empty corner (0, 2, 6, 8).
7. Side: take any empty side (1, 3, 5, 7).
You may only choose an empty cell.
Reply with JSON only, exactly: {\"move\": <integer 0-8>, \"rationale\": \"<one sentence>\"}";

/// What the external source is asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionRequest {
    /// Current board.
    pub board: Board,
    /// Mark the source plays.
    pub own_mark: Mark,
    /// Mark of the other player.
    pub opponent_mark: Mark,
    /// Empty cells, ascending.
    pub empty_cells: Vec<usize>,
}

impl DecisionRequest {
    /// Builds a request for `own_mark` on `board`.
    pub fn new(board: Board, own_mark: Mark) -> Self {
        Self {
            empty_cells: board.empty_cells(),
            board,
            own_mark,
            opponent_mark: own_mark.opponent(),
        }
    }

    /// System prompt for the source.
    pub fn system_prompt(&self) -> &'static str {
        RULES_PROMPT
    }

    /// User message describing the position.
    pub fn user_message(&self) -> String {
        let board = serde_json::to_string(&self.board).unwrap_or_default();
        let empty = serde_json::to_string(&self.empty_cells).unwrap_or_default();
        format!(
            "You are playing as {}. Your opponent is {}.\nBoard: {}\n{}\nEmpty cells: {}\nWhat is your move?",
            self.own_mark,
            self.opponent_mark,
            board,
            self.board.display(),
            empty
        )
    }
}

/// Failure inside a decision source (transport, credentials, provider error).
#[derive(Debug, Clone, Display, Error)]
#[display("Decision source error: {} at {}:{}", message, file, line)]
pub struct DecisionSourceError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DecisionSourceError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(error_message = %message, "Decision source error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// External provider of moves.
#[async_trait::async_trait]
pub trait DecisionSource: Send + Sync + std::fmt::Debug {
    /// Asks for a move and returns the raw reply body.
    async fn request(&self, request: &DecisionRequest) -> Result<String, DecisionSourceError>;

    /// Label for logs.
    fn name(&self) -> &str;
}

/// Why a delegated decision could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DecisionFailure {
    /// The source itself failed.
    #[display("Decision source failed: {}", _0)]
    Transport(String),

    /// The reply did not contain a JSON object.
    #[display("Reply was not valid JSON: {}", _0)]
    MalformedBody(String),

    /// The reply had no `move` field.
    #[display("Reply had no \"move\" field")]
    MissingMove,

    /// `move` was not an integer.
    #[display("\"move\" was not an integer: {}", _0)]
    NotAnInteger(String),

    /// `move` was outside 0-8.
    #[display("\"move\" {} is outside 0-8", _0)]
    OutOfRange(i64),

    /// `move` named an occupied cell.
    #[display("\"move\" {} targets an occupied cell", _0)]
    Occupied(usize),
}

impl std::error::Error for DecisionFailure {}

/// Parses and validates a reply body against `board`.
///
/// Prose or Markdown fences around the JSON object are tolerated. Returns the
/// cell and the rationale (empty when the source gave none).
#[instrument(skip(body, board), fields(body_len = body.len()))]
pub fn parse_reply(body: &str, board: &Board) -> Result<(usize, String), DecisionFailure> {
    let json = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => return Err(DecisionFailure::MalformedBody(body.trim().to_string())),
    };

    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| DecisionFailure::MalformedBody(e.to_string()))?;

    let raw = value.get("move").ok_or(DecisionFailure::MissingMove)?;
    let index = raw
        .as_i64()
        .ok_or_else(|| DecisionFailure::NotAnInteger(raw.to_string()))?;

    let cell = usize::try_from(index)
        .ok()
        .filter(|&i| i < CELL_COUNT)
        .ok_or(DecisionFailure::OutOfRange(index))?;

    if !board.is_empty(cell) {
        return Err(DecisionFailure::Occupied(cell));
    }

    let rationale = value
        .get("rationale")
        .and_then(|r| r.as_str())
        .unwrap_or_default()
        .to_string();

    debug!(cell, "Reply accepted");
    Ok((cell, rationale))
}

/// Delegates to a [`DecisionSource`], falling back to a random empty cell.
#[derive(Debug)]
pub struct DelegatedPolicy {
    source: Arc<dyn DecisionSource>,
    rng: StdRng,
}

impl DelegatedPolicy {
    /// Creates a policy with an entropy-seeded fallback RNG.
    pub fn new(source: Arc<dyn DecisionSource>) -> Self {
        Self::with_rng(source, StdRng::from_entropy())
    }

    /// Creates a policy with a caller-supplied fallback RNG.
    pub fn with_rng(source: Arc<dyn DecisionSource>, rng: StdRng) -> Self {
        Self { source, rng }
    }

    /// Label of the wrapped source.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Asks the source for a move; never fails.
    #[instrument(skip(self, board), fields(source = self.source.name()))]
    pub async fn decide(&mut self, board: &Board, own_mark: Mark) -> OpponentDecision {
        let request = DecisionRequest::new(*board, own_mark);
        debug!(empty = request.empty_cells.len(), "Requesting delegated decision");

        let outcome = match self.source.request(&request).await {
            Ok(body) => parse_reply(&body, board),
            Err(e) => Err(DecisionFailure::Transport(e.message)),
        };

        match outcome {
            Ok((cell, rationale)) => {
                info!(cell, "Delegated decision accepted");
                OpponentDecision {
                    cell: Some(cell),
                    rule: DecisionRule::Delegated,
                    reason: rationale,
                    possible_moves: request.empty_cells,
                    used_fallback: false,
                }
            }
            Err(failure) => {
                warn!(%failure, "Delegated decision failed, picking at random");
                self.fallback(request.empty_cells, &failure)
            }
        }
    }

    /// Uniform random empty cell.
    fn fallback(&mut self, empties: Vec<usize>, failure: &DecisionFailure) -> OpponentDecision {
        let cell = empties.choose(&mut self.rng).copied();
        let reason = match cell {
            Some(cell) => format!("{failure}. Falling back to random move at index {cell}."),
            None => format!("{failure}. No empty cells left for a fallback move."),
        };

        OpponentDecision {
            cell,
            rule: DecisionRule::RandomFallback,
            reason,
            possible_moves: empties,
            used_fallback: true,
        }
    }
}
