//! Rule-ladder opponent: win, block, center, corner, side.

use super::{DecisionRule, OpponentDecision};
use crate::rules::detect_win;
use crate::types::{Board, Mark};
use tracing::{debug, instrument};

/// Center cell.
pub const CENTER: usize = 4;

/// Corners in preference order.
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// Sides in preference order.
pub const SIDES: [usize; 4] = [1, 3, 5, 7];

/// Deterministic opponent.
///
/// Ties inside a rule go to the lowest index (win/block) or to the fixed
/// corner and side orders above. It plays well but is not unbeatable: forks
/// are neither made nor prevented.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    /// Creates the policy.
    pub fn new() -> Self {
        Self
    }

    /// Picks a move for `own_mark`.
    #[instrument(skip(self, board))]
    pub fn decide(&self, board: &Board, own_mark: Mark) -> OpponentDecision {
        let empties = board.empty_cells();
        let decision = |cell: Option<usize>, rule: DecisionRule, reason: String| {
            debug!(?cell, %rule, "Heuristic rule fired");
            OpponentDecision {
                cell,
                rule,
                reason,
                possible_moves: empties.clone(),
                used_fallback: false,
            }
        };

        if let Some(cell) = completing_cell(board, &empties, own_mark) {
            return decision(
                Some(cell),
                DecisionRule::Win,
                format!("AI takes winning move at index {cell}."),
            );
        }

        if let Some(cell) = completing_cell(board, &empties, own_mark.opponent()) {
            return decision(
                Some(cell),
                DecisionRule::Block,
                format!("AI blocks opponent's winning move at index {cell}."),
            );
        }

        if board.is_empty(CENTER) {
            return decision(
                Some(CENTER),
                DecisionRule::Center,
                "AI takes center square.".to_string(),
            );
        }

        if let Some(cell) = CORNERS.into_iter().find(|&c| board.is_empty(c)) {
            return decision(
                Some(cell),
                DecisionRule::Corner,
                format!("AI takes corner square at index {cell}."),
            );
        }

        if let Some(cell) = SIDES.into_iter().find(|&c| board.is_empty(c)) {
            return decision(
                Some(cell),
                DecisionRule::Side,
                format!("AI takes side square at index {cell}."),
            );
        }

        // Center, corners and sides cover every cell; kept for completeness.
        if let Some(&cell) = empties.first() {
            return decision(
                Some(cell),
                DecisionRule::FirstEmpty,
                format!("AI takes the first available square at index {cell} as a fallback."),
            );
        }

        decision(
            None,
            DecisionRule::NoMoves,
            "No moves available for AI.".to_string(),
        )
    }
}

/// First empty cell where `mark` would complete a line.
fn completing_cell(board: &Board, empties: &[usize], mark: Mark) -> Option<usize> {
    empties.iter().copied().find(|&cell| {
        detect_win(&board.with_mark(cell, mark)).is_some_and(|win| win.mark == mark)
    })
}
