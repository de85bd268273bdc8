//! Append-only event log for a game session.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Kind of logged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// A player took a seat.
    PlayerJoin,
    /// Play began.
    GameStart,
    /// A mark was placed.
    PlayerMove,
    /// A move was rejected.
    InvalidMove,
    /// A line was completed.
    WinnerDeclared,
    /// The board filled without a line.
    GameDraw,
    /// The other mark is to move.
    TurnSwitch,
    /// The computer opponent chose a move.
    AiMoveDecision,
    /// The delegated source failed and a random move was used.
    AiFallback,
    /// The computer opponent could not produce a move.
    AiError,
    /// Rematch with the same players.
    GameReset,
    /// Back to player selection.
    NewGame,
    /// The log was exported.
    LogDownload,
}

/// Ordered key/value details of an entry.
pub type Details = Map<String, Value>;

/// One logged event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct LogEntry {
    /// When the event was recorded.
    timestamp: DateTime<Utc>,
    /// What happened.
    event: EventKind,
    /// Event payload, in insertion order.
    details: Details,
}

impl LogEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(event: EventKind, details: Details) -> Self {
        Self::at(Utc::now(), event, details)
    }

    /// Creates an entry with an explicit timestamp.
    pub fn at(timestamp: DateTime<Utc>, event: EventKind, details: Details) -> Self {
        Self {
            timestamp,
            event,
            details,
        }
    }
}

/// Builds a [`Details`] map from key/value pairs, keeping their order.
///
/// ```
/// use tictactoe_core::details;
///
/// let d = details! { "mark" => "X", "squareIndex" => 4 };
/// assert_eq!(d.keys().collect::<Vec<_>>(), ["mark", "squareIndex"]);
/// ```
#[macro_export]
macro_rules! details {
    () => { $crate::log::Details::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::log::Details::new();
        $( map.insert(($key).to_string(), $crate::__serde_json::json!($value)); )+
        map
    }};
}

/// Session event log.
///
/// Entries are only ever appended. Storage is chronological;
/// [`EventLog::newest_first`] gives the live-display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry stamped now.
    #[instrument(skip(self, details))]
    pub fn record(&mut self, event: EventKind, details: Details) {
        self.push(LogEntry::new(event, details));
    }

    /// Appends a prepared entry.
    pub fn push(&mut self, entry: LogEntry) {
        debug!(event = %entry.event, count = self.entries.len() + 1, "Event logged");
        self.entries.push(entry);
    }

    /// Oldest first, as exported.
    pub fn chronological(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Newest first, as displayed.
    pub fn newest_first(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry. Only called on explicit request.
    #[instrument(skip(self), fields(count = self.entries.len()))]
    pub fn clear(&mut self) {
        self.entries.clear();
        debug!("Event log cleared");
    }
}
