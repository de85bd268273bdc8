//! Tests for log export through the session.

use tictactoe_core::export::{parse_text_lines, render_text};
use tictactoe_core::{EventKind, ExportFormat, GameSession};

fn played_session() -> GameSession {
    let mut session = GameSession::new();
    session.start_game("Ann", "Bob", None);
    for cell in [0, 3, 1, 4] {
        session.cell_activated(cell).unwrap();
    }
    let _ = session.cell_activated(0);
    session.cell_activated(2).unwrap();
    session
}

#[test]
fn test_text_round_trip_is_chronological() {
    let session = played_session();
    let text = render_text(session.log());
    let lines = parse_text_lines(&text);

    assert_eq!(lines.len(), session.log().len());
    for (line, entry) in lines.iter().zip(session.log().chronological()) {
        assert!(
            line.contains(&format!(" - {}", entry.event())),
            "{line} does not match {}",
            entry.event()
        );
    }
    assert!(lines[0].contains(" - PLAYER_JOIN: playerName: Ann, mark: X"));
    assert!(lines.last().unwrap().contains(" - WINNER_DECLARED: winnerName: Ann"));
}

#[test]
fn test_json_export_is_chronological_and_ordered() {
    let mut session = played_session();
    let count = session.log().len();

    let out = session.export(ExportFormat::Json).unwrap();
    assert_eq!(out.mime_type, "application/json");
    assert!(out.file_name.starts_with("tic-tac-toe-logs-"));

    let parsed: serde_json::Value = serde_json::from_slice(&out.bytes).unwrap();
    let records = parsed.as_array().unwrap();
    assert_eq!(records.len(), count);
    assert_eq!(records[0]["event"], "PLAYER_JOIN");
    assert_eq!(records[count - 1]["event"], "WINNER_DECLARED");

    let keys: Vec<_> = records[0].as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["timestamp", "event", "details"]);
    let move_keys: Vec<_> = records[3]["details"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(move_keys, ["playerName", "mark", "squareIndex", "boardAfterMove"]);

    let text = String::from_utf8(out.bytes).unwrap();
    assert!(text.contains("\n  "), "JSON export should be pretty-printed");
}

#[test]
fn test_export_is_logged_after_rendering() {
    let mut session = played_session();
    let count = session.log().len();

    let out = session.export(ExportFormat::Text).unwrap();

    assert_eq!(parse_text_lines(std::str::from_utf8(&out.bytes).unwrap()).len(), count);
    let entry = session.log().latest().unwrap();
    assert_eq!(entry.event(), &EventKind::LogDownload);
    assert_eq!(entry.details()["format"], "TXT");
    assert_eq!(entry.details()["logCount"], count);
}
