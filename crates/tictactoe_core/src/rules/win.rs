//! Win detection logic for tic-tac-toe.

use crate::types::{Board, Mark, Square};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the eight index triples that wins the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WinLine(pub [usize; 3]);

impl WinLine {
    /// Cell indices of the line.
    pub fn cells(&self) -> [usize; 3] {
        self.0
    }
}

/// Winning lines in scan order: rows top to bottom, columns left to right,
/// then the two diagonals.
pub const WIN_LINES: [WinLine; 8] = [
    // Rows
    WinLine([0, 1, 2]),
    WinLine([3, 4, 5]),
    WinLine([6, 7, 8]),
    // Columns
    WinLine([0, 3, 6]),
    WinLine([1, 4, 7]),
    WinLine([2, 5, 8]),
    // Diagonals
    WinLine([0, 4, 8]),
    WinLine([2, 4, 6]),
];

/// A completed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Win {
    /// The mark that owns the line.
    pub mark: Mark,
    /// The line itself.
    pub line: WinLine,
}

/// Checks if there is a winner on the board.
///
/// Returns the first line in [`WIN_LINES`] order holding three equal marks.
/// Boards with two completed lines can only come from illegal sequences;
/// the scan order decides which one is reported.
#[instrument(skip(board))]
pub fn detect_win(board: &Board) -> Option<Win> {
    for line in WIN_LINES {
        let [a, b, c] = line.cells();
        let sq = board.get(a);
        if let Some(Square::Occupied(mark)) = sq
            && sq == board.get(b)
            && sq == board.get(c)
        {
            return Some(Win { mark, line });
        }
    }

    None
}
