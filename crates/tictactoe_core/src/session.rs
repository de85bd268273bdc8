//! Game session: the single owner of game state, players and event log.
//!
//! Front ends call the session in response to user actions and render its
//! read-only snapshots. Every transition is recorded in the [`EventLog`].

use crate::details;
use crate::export::{ExportError, ExportFormat, LogExport, export};
use crate::game::{GameEvent, GameState, GameStatus, MoveError};
use crate::log::{EventKind, EventLog};
use crate::opponent::{OpponentDecision, OpponentPolicy};
use crate::types::Mark;
use chrono::Utc;
use derive_more::Display;
use tracing::{info, instrument, warn};

/// Mark played by the human when a computer opponent is seated.
pub const HUMAN_MARK: Mark = Mark::X;

/// Mark played by the computer opponent.
pub const OPPONENT_MARK: Mark = Mark::O;

/// Who controls the O seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum OpponentMode {
    /// Two humans share the board.
    TwoPlayer,
    /// Rule-ladder computer opponent.
    Heuristic,
    /// Externally decided computer opponent.
    Delegated,
}

/// Seated players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Players {
    /// Name of the X player.
    pub x: String,
    /// Name of the O player.
    pub o: String,
}

impl Players {
    /// Name of the player holding `mark`.
    pub fn name(&self, mark: Mark) -> &str {
        match mark {
            Mark::X => &self.x,
            Mark::O => &self.o,
        }
    }
}

/// Errors from session operations.
#[derive(Debug, Display)]
pub enum SessionError {
    /// No game has been started.
    #[display("No game in progress")]
    NotStarted,

    /// The computer opponent was asked to move out of turn.
    #[display("It is not the computer opponent's turn")]
    NotOpponentsTurn,

    /// The opponent was asked to move on a full board.
    #[display("Opponent asked to move with no empty cells: {}", _0)]
    ExhaustedBoard(String),

    /// The move was rejected.
    #[display("{}", _0)]
    Move(MoveError),

    /// Export failed.
    #[display("{}", _0)]
    Export(ExportError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Move(e) => Some(e),
            SessionError::Export(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MoveError> for SessionError {
    fn from(err: MoveError) -> Self {
        SessionError::Move(err)
    }
}

impl From<ExportError> for SessionError {
    fn from(err: ExportError) -> Self {
        SessionError::Export(err)
    }
}

/// Outcome of a computer turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentTurn {
    /// What the policy decided.
    pub decision: OpponentDecision,
    /// Events produced by applying the decision.
    pub events: Vec<GameEvent>,
}

/// One game table: state, seating, opponent and log.
#[derive(Debug, Default)]
pub struct GameSession {
    state: GameState,
    log: EventLog,
    players: Option<Players>,
    opponent: Option<OpponentPolicy>,
}

impl GameSession {
    /// Creates a session with nobody seated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Event log.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Seated players, if a game was started.
    pub fn players(&self) -> Option<&Players> {
        self.players.as_ref()
    }

    /// Who controls the O seat.
    pub fn mode(&self) -> OpponentMode {
        opponent_mode(self.opponent.as_ref())
    }

    /// Name of the player holding `mark`, empty when nobody is seated.
    pub fn player_name(&self, mark: Mark) -> &str {
        self.players.as_ref().map_or("", |p| p.name(mark))
    }

    /// Seats two players and starts a game.
    ///
    /// Blank names fall back to "Player 1" and "Player 2" ("AI" when a
    /// computer opponent is given).
    #[instrument(skip(self, opponent), fields(computer = opponent.is_some()))]
    pub fn start_game(&mut self, name1: &str, name2: &str, opponent: Option<OpponentPolicy>) {
        let default_o = if opponent.is_some() { "AI" } else { "Player 2" };
        let players = Players {
            x: non_blank(name1, "Player 1"),
            o: non_blank(name2, default_o),
        };

        self.log.record(
            EventKind::PlayerJoin,
            details! { "playerName" => players.x, "mark" => Mark::X },
        );
        self.log.record(
            EventKind::PlayerJoin,
            details! { "playerName" => players.o, "mark" => Mark::O },
        );
        self.log.record(
            EventKind::GameStart,
            details! {
                "player1Name" => players.x,
                "player2Name" => players.o,
                "mode" => opponent_mode(opponent.as_ref()).to_string(),
            },
        );

        info!(x = %players.x, o = %players.o, "Game started");
        self.players = Some(players);
        self.opponent = opponent;
        self.state.start();
    }

    /// True when the computer opponent is seated and to move.
    pub fn awaiting_opponent(&self) -> bool {
        self.opponent.is_some()
            && self.state.status() == GameStatus::Playing
            && self.state.turn() == OPPONENT_MARK
    }

    /// Handles a click on `index` by the human at the board.
    ///
    /// With a computer opponent the human always plays X, so a click while
    /// O is to move is rejected as a wrong-turn move.
    #[instrument(skip(self))]
    pub fn cell_activated(&mut self, index: usize) -> Result<Vec<GameEvent>, MoveError> {
        let mark = if self.opponent.is_some() {
            HUMAN_MARK
        } else {
            self.state.turn()
        };
        self.play(index, mark)
    }

    /// Asks the computer opponent for a move and applies it.
    #[instrument(skip(self))]
    pub async fn play_opponent_turn(&mut self) -> Result<OpponentTurn, SessionError> {
        if !self.awaiting_opponent() {
            return Err(SessionError::NotOpponentsTurn);
        }

        let mark = self.state.turn();
        let board = *self.state.board();
        let policy = self
            .opponent
            .as_mut()
            .ok_or(SessionError::NotOpponentsTurn)?;
        let decision = policy.decide(&board, mark).await;

        let details = details! {
            "playerName" => self.player_name(mark),
            "mark" => mark,
            "rule" => decision.rule.to_string(),
            "chosenMove" => decision.cell,
            "reason" => decision.reason,
            "possibleMoves" => decision.possible_moves,
            "boardState" => board,
        };
        self.log.record(EventKind::AiMoveDecision, details);

        if decision.used_fallback {
            self.log.record(
                EventKind::AiFallback,
                details! { "reason" => decision.reason, "chosenMove" => decision.cell },
            );
        }

        let Some(cell) = decision.cell else {
            warn!(reason = %decision.reason, "Opponent had no move");
            self.log.record(
                EventKind::AiError,
                details! { "reason" => decision.reason, "boardState" => board },
            );
            return Err(SessionError::ExhaustedBoard(decision.reason));
        };

        let events = self.play(cell, mark)?;
        Ok(OpponentTurn { decision, events })
    }

    /// Fresh board with the same players and opponent.
    #[instrument(skip(self))]
    pub fn rematch(&mut self) -> Result<(), SessionError> {
        let players = self.players.as_ref().ok_or(SessionError::NotStarted)?;
        self.log.record(
            EventKind::GameReset,
            details! {
                "initiatedByPlayer" => true,
                "player1Name" => players.x,
                "player2Name" => players.o,
            },
        );
        self.state.rematch();
        Ok(())
    }

    /// Clears players and opponent and returns to Pending.
    ///
    /// The log is kept.
    #[instrument(skip(self))]
    pub fn new_game(&mut self) {
        let details = details! {
            "player1Name" => self.player_name(Mark::X),
            "player2Name" => self.player_name(Mark::O),
        };
        self.log.record(EventKind::NewGame, details);
        self.players = None;
        self.opponent = None;
        self.state.reset();
    }

    /// Exports the log, then records the export itself.
    #[instrument(skip(self))]
    pub fn export(&mut self, format: ExportFormat) -> Result<LogExport, SessionError> {
        let count = self.log.len();
        let out = export(&self.log, format, Utc::now())?;
        self.log.record(
            EventKind::LogDownload,
            details! { "format" => format.to_string(), "logCount" => count },
        );
        Ok(out)
    }

    /// Drops every log entry.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Applies a move and logs the outcome.
    fn play(&mut self, index: usize, mark: Mark) -> Result<Vec<GameEvent>, MoveError> {
        match self.state.apply_move(index, mark) {
            Ok(events) => {
                for event in &events {
                    self.record_event(event);
                }
                Ok(events)
            }
            Err(e) => {
                let details = details! {
                    "player" => self.player_name(mark),
                    "mark" => mark,
                    "squareIndex" => index,
                    "reason" => e.to_string(),
                    "currentBoardState" => self.state.board(),
                };
                self.log.record(EventKind::InvalidMove, details);
                Err(e)
            }
        }
    }

    fn record_event(&mut self, event: &GameEvent) {
        let (kind, details) = match event {
            GameEvent::MoveApplied { mark, index, board } => (
                EventKind::PlayerMove,
                details! {
                    "playerName" => self.player_name(*mark),
                    "mark" => mark,
                    "squareIndex" => index,
                    "boardAfterMove" => board,
                },
            ),
            GameEvent::WinDeclared { win, board } => (
                EventKind::WinnerDeclared,
                details! {
                    "winnerName" => self.player_name(win.mark),
                    "winnerMark" => win.mark,
                    "winningLine" => win.line,
                    "boardState" => board,
                },
            ),
            GameEvent::Draw { board } => (EventKind::GameDraw, details! { "boardState" => board }),
            GameEvent::TurnSwitched { next } => (
                EventKind::TurnSwitch,
                details! {
                    "nextPlayerName" => self.player_name(*next),
                    "nextPlayerMark" => next,
                },
            ),
        };
        self.log.record(kind, details);
    }
}

fn non_blank(name: &str, fallback: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

fn opponent_mode(opponent: Option<&OpponentPolicy>) -> OpponentMode {
    match opponent {
        None => OpponentMode::TwoPlayer,
        Some(OpponentPolicy::Heuristic(_)) => OpponentMode::Heuristic,
        Some(OpponentPolicy::Delegated(_)) => OpponentMode::Delegated,
    }
}
