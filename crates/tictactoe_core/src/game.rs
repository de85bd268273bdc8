//! Game state machine for tic-tac-toe.
//!
//! [`GameState`] is the only owner of board and turn. It moves through
//! `Pending -> Playing -> {Won, Draw}`; terminal states are left only through
//! [`GameState::rematch`] or [`GameState::reset`].

use crate::rules::{Win, detect_win, is_full};
use crate::types::{Board, Mark};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Lifecycle of a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Players not yet seated.
    Pending,
    /// Moves are accepted.
    Playing,
    /// A mark completed a line.
    Won,
    /// Board filled without a line.
    Draw,
}

impl GameStatus {
    /// Won or Draw.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Won | GameStatus::Draw)
    }
}

/// Domain event emitted by a successful [`GameState::apply_move`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A mark was placed.
    MoveApplied {
        /// Mark that moved.
        mark: Mark,
        /// Cell index (0-8).
        index: usize,
        /// Board after the move.
        board: Board,
    },
    /// The move completed a line.
    WinDeclared {
        /// Winning mark and line.
        win: Win,
        /// Final board.
        board: Board,
    },
    /// The move filled the board without a line.
    Draw {
        /// Final board.
        board: Board,
    },
    /// The game continues with the other mark.
    TurnSwitched {
        /// Mark to move next.
        next: Mark,
    },
}

/// Reasons a move is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The game is over or has not started.
    #[display("{}", not_playing_reason(*_0))]
    GameNotPlaying(GameStatus),

    /// The index is outside 0-8.
    #[display("Square index {} is out of range", _0)]
    OutOfRange(usize),

    /// The cell already holds a mark.
    #[display("Square already taken")]
    CellOccupied(usize, Mark),

    /// The acting mark is not the mark to move.
    #[display("It is {}'s turn, not {}'s", expected, actual)]
    WrongTurn {
        /// Mark to move.
        expected: Mark,
        /// Mark that tried to move.
        actual: Mark,
    },
}

impl std::error::Error for MoveError {}

fn not_playing_reason(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Won => "Game already won",
        _ => "Game not in playing state",
    }
}

/// Complete game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    turn: Mark,
    status: GameStatus,
    winner: Option<Win>,
    history: Vec<usize>,
}

impl GameState {
    /// Creates a pending game: empty board, X to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Mark::X,
            status: GameStatus::Pending,
            winner: None,
            history: Vec::new(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the mark to move.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Returns the game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the winning mark and line, if any.
    pub fn winner(&self) -> Option<Win> {
        self.winner
    }

    /// Cells played, in order.
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    /// Won or Draw.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Starts play on a fresh board.
    #[instrument(skip(self))]
    pub fn start(&mut self) {
        *self = Self {
            status: GameStatus::Playing,
            ..Self::new()
        };
        info!("Game started");
    }

    /// Fresh board with the same seating; play resumes immediately.
    #[instrument(skip(self))]
    pub fn rematch(&mut self) {
        self.start();
    }

    /// Fresh board, back to Pending.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        *self = Self::new();
        info!("Game reset to pending");
    }

    /// Checks whether `mark` may play `index` without applying anything.
    #[instrument(skip(self))]
    pub fn validate(&self, index: usize, mark: Mark) -> Result<(), MoveError> {
        if self.status != GameStatus::Playing {
            return Err(MoveError::GameNotPlaying(self.status));
        }

        match self.board.get(index) {
            None => return Err(MoveError::OutOfRange(index)),
            Some(square) => {
                if let Some(owner) = square.mark() {
                    return Err(MoveError::CellOccupied(index, owner));
                }
            }
        }

        if mark != self.turn {
            return Err(MoveError::WrongTurn {
                expected: self.turn,
                actual: mark,
            });
        }

        Ok(())
    }

    /// Places `mark` at `index` and derives the next status.
    ///
    /// On success the returned events are `MoveApplied` followed by exactly
    /// one of `WinDeclared`, `Draw` or `TurnSwitched`. On failure nothing
    /// changes.
    #[instrument(skip(self), fields(status = %self.status, turn = %self.turn))]
    pub fn apply_move(&mut self, index: usize, mark: Mark) -> Result<Vec<GameEvent>, MoveError> {
        if let Err(e) = self.validate(index, mark) {
            warn!(error = %e, "Move rejected");
            return Err(e);
        }

        self.board.place(index, mark);
        self.history.push(index);
        debug!(moves = self.history.len(), "Mark placed");

        let mut events = vec![GameEvent::MoveApplied {
            mark,
            index,
            board: self.board,
        }];

        if let Some(win) = detect_win(&self.board) {
            self.status = GameStatus::Won;
            self.winner = Some(win);
            info!(winner = %win.mark, line = ?win.line, "Game won");
            events.push(GameEvent::WinDeclared {
                win,
                board: self.board,
            });
        } else if is_full(&self.board) {
            self.status = GameStatus::Draw;
            info!("Game drawn");
            events.push(GameEvent::Draw { board: self.board });
        } else {
            self.turn = mark.opponent();
            events.push(GameEvent::TurnSwitched { next: self.turn });
        }

        Ok(events)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> GameState {
        let mut state = GameState::new();
        state.start();
        state
    }

    #[test]
    fn test_new_game_is_pending() {
        let state = GameState::new();
        assert_eq!(state.status(), GameStatus::Pending);
        assert_eq!(state.turn(), Mark::X);
        assert!(state.winner().is_none());
    }

    #[test]
    fn test_pending_rejects_moves() {
        let mut state = GameState::new();
        assert_eq!(
            state.apply_move(4, Mark::X),
            Err(MoveError::GameNotPlaying(GameStatus::Pending))
        );
        assert_eq!(state.board(), &Board::new());
    }

    #[test]
    fn test_move_then_turn_switch() {
        let mut state = playing();
        let events = state.apply_move(4, Mark::X).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GameEvent::MoveApplied { index: 4, mark: Mark::X, .. }));
        assert_eq!(events[1], GameEvent::TurnSwitched { next: Mark::O });
        assert_eq!(state.turn(), Mark::O);
    }

    #[test]
    fn test_occupied_cell_leaves_board_unchanged() {
        let mut state = playing();
        state.apply_move(0, Mark::X).unwrap();
        let before = state.clone();
        assert_eq!(
            state.apply_move(0, Mark::O),
            Err(MoveError::CellOccupied(0, Mark::X))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_wrong_turn_rejected() {
        let mut state = playing();
        assert_eq!(
            state.apply_move(0, Mark::O),
            Err(MoveError::WrongTurn {
                expected: Mark::X,
                actual: Mark::O
            })
        );
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut state = playing();
        assert_eq!(state.apply_move(9, Mark::X), Err(MoveError::OutOfRange(9)));
    }

    #[test]
    fn test_win_keeps_turn() {
        let mut state = playing();
        for (index, mark) in [(0, Mark::X), (3, Mark::O), (1, Mark::X), (4, Mark::O)] {
            state.apply_move(index, mark).unwrap();
        }
        let events = state.apply_move(2, Mark::X).unwrap();
        assert!(matches!(events.last(), Some(GameEvent::WinDeclared { .. })));
        assert_eq!(state.status(), GameStatus::Won);
        assert_eq!(state.turn(), Mark::X);
        assert_eq!(state.winner().map(|w| w.mark), Some(Mark::X));
    }

    #[test]
    fn test_draw_is_frozen() {
        let mut state = playing();
        // X O X / X O O / O X X
        let moves = [0, 1, 2, 4, 3, 5, 7, 6, 8];
        for (turn, index) in moves.into_iter().enumerate() {
            let mark = if turn % 2 == 0 { Mark::X } else { Mark::O };
            state.apply_move(index, mark).unwrap();
        }
        assert_eq!(state.status(), GameStatus::Draw);

        let board = *state.board();
        for index in 0..9 {
            assert_eq!(
                state.apply_move(index, state.turn()),
                Err(MoveError::GameNotPlaying(GameStatus::Draw))
            );
        }
        assert_eq!(state.board(), &board);
        assert_eq!(state.history().len(), 9);
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            MoveError::GameNotPlaying(GameStatus::Won).to_string(),
            "Game already won"
        );
        assert_eq!(
            MoveError::GameNotPlaying(GameStatus::Draw).to_string(),
            "Game not in playing state"
        );
        assert_eq!(
            MoveError::CellOccupied(4, Mark::O).to_string(),
            "Square already taken"
        );
    }

    #[test]
    fn test_rematch_clears_board_and_plays() {
        let mut state = playing();
        state.apply_move(4, Mark::X).unwrap();
        state.rematch();
        assert_eq!(state.status(), GameStatus::Playing);
        assert_eq!(state.board(), &Board::new());
        assert!(state.history().is_empty());
        assert_eq!(state.turn(), Mark::X);
    }

    #[test]
    fn test_reset_returns_to_pending() {
        let mut state = playing();
        state.apply_move(4, Mark::X).unwrap();
        state.reset();
        assert_eq!(state, GameState::new());
    }
}
