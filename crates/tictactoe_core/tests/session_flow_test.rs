//! Tests for session orchestration and event logging.

use tictactoe_core::{
    EventKind, GameEvent, GameSession, GameStatus, HeuristicPolicy, Mark, MoveError,
    OpponentMode, OpponentPolicy, SessionError,
};

fn events(session: &GameSession) -> Vec<EventKind> {
    session.log().chronological().iter().map(|e| *e.event()).collect()
}

fn heuristic() -> Option<OpponentPolicy> {
    Some(OpponentPolicy::Heuristic(HeuristicPolicy::new()))
}

#[test]
fn test_start_game_logs_joins_then_start() {
    let mut session = GameSession::new();
    assert_eq!(session.state().status(), GameStatus::Pending);

    session.start_game("Ann", "Bob", None);

    assert_eq!(session.state().status(), GameStatus::Playing);
    assert_eq!(session.mode(), OpponentMode::TwoPlayer);
    assert_eq!(
        events(&session),
        [EventKind::PlayerJoin, EventKind::PlayerJoin, EventKind::GameStart]
    );
    assert_eq!(session.player_name(Mark::O), "Bob");
}

#[test]
fn test_blank_names_get_defaults() {
    let mut session = GameSession::new();
    session.start_game("  ", "", None);
    assert_eq!(session.player_name(Mark::X), "Player 1");
    assert_eq!(session.player_name(Mark::O), "Player 2");

    let mut session = GameSession::new();
    session.start_game("", "", heuristic());
    assert_eq!(session.player_name(Mark::O), "AI");
    assert_eq!(session.mode(), OpponentMode::Heuristic);
}

#[test]
fn test_pending_session_rejects_clicks() {
    let mut session = GameSession::new();
    let result = session.cell_activated(4);
    assert_eq!(result, Err(MoveError::GameNotPlaying(GameStatus::Pending)));
    assert_eq!(session.log().latest().map(|e| *e.event()), Some(EventKind::InvalidMove));
}

#[test]
fn test_two_player_alternation_and_logging() {
    let mut session = GameSession::new();
    session.start_game("Ann", "Bob", None);
    let before = session.log().len();

    let result = session.cell_activated(4).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(session.state().turn(), Mark::O);

    session.cell_activated(0).unwrap();
    assert_eq!(session.state().turn(), Mark::X);

    let tail: Vec<_> = events(&session)[before..].to_vec();
    assert_eq!(
        tail,
        [
            EventKind::PlayerMove,
            EventKind::TurnSwitch,
            EventKind::PlayerMove,
            EventKind::TurnSwitch
        ]
    );
}

#[test]
fn test_occupied_click_is_logged_and_board_unchanged() {
    let mut session = GameSession::new();
    session.start_game("Ann", "Bob", None);
    session.cell_activated(4).unwrap();
    let board = *session.state().board();

    let result = session.cell_activated(4);
    assert_eq!(result, Err(MoveError::CellOccupied(4, Mark::X)));
    assert_eq!(session.state().board(), &board);

    let entry = session.log().latest().unwrap();
    assert_eq!(entry.event(), &EventKind::InvalidMove);
    assert_eq!(entry.details()["squareIndex"], 4);
    assert_eq!(entry.details()["mark"], "O");
    assert_eq!(entry.details()["reason"], "Square already taken");
}

#[test]
fn test_win_is_terminal_and_logged() {
    let mut session = GameSession::new();
    session.start_game("Ann", "Bob", None);
    for cell in [0, 3, 1, 4] {
        session.cell_activated(cell).unwrap();
    }
    let result = session.cell_activated(2).unwrap();
    assert!(matches!(result.last(), Some(GameEvent::WinDeclared { .. })));
    assert_eq!(session.state().status(), GameStatus::Won);

    let entry = session.log().latest().unwrap();
    assert_eq!(entry.event(), &EventKind::WinnerDeclared);
    assert_eq!(entry.details()["winnerName"], "Ann");
    assert_eq!(entry.details()["winningLine"], serde_json::json!([0, 1, 2]));

    let board = *session.state().board();
    assert!(matches!(
        session.cell_activated(8),
        Err(MoveError::GameNotPlaying(GameStatus::Won))
    ));
    assert_eq!(session.state().board(), &board);
}

#[test]
fn test_draw_is_terminal() {
    let mut session = GameSession::new();
    session.start_game("Ann", "Bob", None);
    // X O X / X O O / O X X
    for cell in [0, 1, 2, 4, 3, 5, 7, 6, 8] {
        session.cell_activated(cell).unwrap();
    }
    assert_eq!(session.state().status(), GameStatus::Draw);
    assert_eq!(session.log().latest().map(|e| *e.event()), Some(EventKind::GameDraw));

    let board = *session.state().board();
    assert_eq!(
        session.cell_activated(4),
        Err(MoveError::GameNotPlaying(GameStatus::Draw))
    );
    assert_eq!(session.state().board(), &board);
    assert_eq!(session.state().status(), GameStatus::Draw);

    let entry = session.log().latest().unwrap();
    assert_eq!(entry.event(), &EventKind::InvalidMove);
    assert_eq!(entry.details()["reason"], "Game not in playing state");
    assert_eq!(entry.details()["squareIndex"], 4);
}

#[tokio::test]
async fn test_finished_game_has_no_opponent_turn() {
    let mut session = GameSession::new();
    session.start_game("Ann", "", heuristic());
    // O answers 4 (center), 2 (corner), 3 (block); X then completes 6-7-8
    for cell in [0, 8, 6] {
        session.cell_activated(cell).unwrap();
        session.play_opponent_turn().await.unwrap();
    }
    session.cell_activated(7).unwrap();
    assert_eq!(session.state().status(), GameStatus::Won);
    assert!(!session.awaiting_opponent());

    let before = session.log().len();
    assert!(matches!(
        session.play_opponent_turn().await,
        Err(SessionError::NotOpponentsTurn)
    ));
    assert_eq!(session.log().len(), before);

    let rejected = session.cell_activated(5);
    assert_eq!(rejected, Err(MoveError::GameNotPlaying(GameStatus::Won)));
    assert_eq!(
        session.log().latest().unwrap().details()["reason"],
        "Game already won"
    );
}

#[tokio::test]
async fn test_human_cannot_move_for_opponent() {
    let mut session = GameSession::new();
    session.start_game("Ann", "", heuristic());
    session.cell_activated(0).unwrap();
    assert!(session.awaiting_opponent());

    let result = session.cell_activated(8);
    assert_eq!(
        result,
        Err(MoveError::WrongTurn {
            expected: Mark::O,
            actual: Mark::X
        })
    );

    let turn = session.play_opponent_turn().await.unwrap();
    assert_eq!(turn.decision.cell, Some(4));
    assert!(!session.awaiting_opponent());
    assert_eq!(session.state().turn(), Mark::X);
}

#[tokio::test]
async fn test_opponent_turn_logs_decision_before_move() {
    let mut session = GameSession::new();
    session.start_game("Ann", "", heuristic());
    session.cell_activated(0).unwrap();
    let before = session.log().len();

    session.play_opponent_turn().await.unwrap();

    let tail: Vec<_> = events(&session)[before..].to_vec();
    assert_eq!(
        tail,
        [EventKind::AiMoveDecision, EventKind::PlayerMove, EventKind::TurnSwitch]
    );
    let decision = &session.log().chronological()[before];
    assert_eq!(decision.details()["rule"], "center");
    assert_eq!(decision.details()["chosenMove"], 4);
}

#[tokio::test]
async fn test_opponent_out_of_turn_is_rejected() {
    let mut session = GameSession::new();
    session.start_game("Ann", "", heuristic());
    assert!(matches!(
        session.play_opponent_turn().await,
        Err(SessionError::NotOpponentsTurn)
    ));

    let mut two_player = GameSession::new();
    two_player.start_game("Ann", "Bob", None);
    two_player.cell_activated(0).unwrap();
    assert!(matches!(
        two_player.play_opponent_turn().await,
        Err(SessionError::NotOpponentsTurn)
    ));
}

#[tokio::test]
async fn test_heuristic_blocks_human_threat() {
    let mut session = GameSession::new();
    session.start_game("Ann", "", heuristic());
    session.cell_activated(0).unwrap();
    session.play_opponent_turn().await.unwrap(); // center
    session.cell_activated(1).unwrap();

    let turn = session.play_opponent_turn().await.unwrap();
    assert_eq!(turn.decision.cell, Some(2));
    assert_eq!(session.state().board().get(2).and_then(|s| s.mark()), Some(Mark::O));
}

#[test]
fn test_rematch_keeps_players_and_log() {
    let mut session = GameSession::new();
    session.start_game("Ann", "Bob", None);
    session.cell_activated(4).unwrap();
    let before = session.log().len();

    session.rematch().unwrap();

    assert_eq!(session.state().status(), GameStatus::Playing);
    assert!(session.state().history().is_empty());
    assert_eq!(session.player_name(Mark::X), "Ann");
    assert_eq!(session.log().len(), before + 1);
    assert_eq!(session.log().latest().map(|e| *e.event()), Some(EventKind::GameReset));
}

#[test]
fn test_rematch_before_start_fails() {
    let mut session = GameSession::new();
    assert!(matches!(session.rematch(), Err(SessionError::NotStarted)));
}

#[test]
fn test_new_game_clears_players_and_opponent() {
    let mut session = GameSession::new();
    session.start_game("Ann", "", heuristic());
    session.cell_activated(4).unwrap();

    session.new_game();

    assert_eq!(session.state().status(), GameStatus::Pending);
    assert!(session.players().is_none());
    assert_eq!(session.mode(), OpponentMode::TwoPlayer);
    assert_eq!(session.log().latest().map(|e| *e.event()), Some(EventKind::NewGame));
}

#[test]
fn test_clear_log_only_on_request() {
    let mut session = GameSession::new();
    session.start_game("Ann", "Bob", None);
    session.rematch().unwrap();
    session.new_game();
    assert!(!session.log().is_empty());

    session.clear_log();
    assert!(session.log().is_empty());
}
