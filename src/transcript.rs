//! Ordered message transcript.
//!
//! The transcript is the append-only log the view layer renders as a
//! chat-like feed. Entries are created by the session in response to
//! outbound sends and inbound transport events, never mutated afterwards,
//! and only removed by an explicit clear.
//!
//! # Ordering
//!
//! Display order is the order of the underlying sequence — strict
//! event-arrival order. The `timestamp` field on each entry exists for
//! display only and plays no part in ordering.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::SystemTime;

use serde::Serialize;

use crate::identifiers::EntryId;

// ============================================================================
// Direction
// ============================================================================

/// Which way a transcript entry travelled.
///
/// Synthetic lifecycle notices ("connected" / "disconnected") are modeled
/// as [`Direction::Received`] so they render on the inbound side of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Outbound message submitted by the operator.
    Sent,
    /// Inbound message or synthetic lifecycle notice.
    Received,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => f.write_str("sent"),
            Self::Received => f.write_str("received"),
        }
    }
}

// ============================================================================
// TranscriptEntry
// ============================================================================

/// One line in the visualized message log.
///
/// Immutable after creation. The payload is arbitrary text, stored and
/// displayed verbatim — no schema is assumed.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    /// Unique identifier, generated at creation.
    pub id: EntryId,
    /// Message direction.
    pub direction: Direction,
    /// Raw text content.
    pub payload: String,
    /// Capture-time clock reading, for display only.
    pub timestamp: SystemTime,
}

impl TranscriptEntry {
    /// Creates a new entry stamped with the current time.
    #[must_use]
    pub fn new(direction: Direction, payload: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            direction,
            payload: payload.into(),
            timestamp: SystemTime::now(),
        }
    }
}

// ============================================================================
// Transcript
// ============================================================================

/// Append-only ordered sequence of [`TranscriptEntry`].
///
/// The session appends in event-arrival order; the view layer consumes
/// read-only snapshots.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new entry and returns its ID.
    pub fn append(&mut self, direction: Direction, payload: impl Into<String>) -> EntryId {
        let entry = TranscriptEntry::new(direction, payload);
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Removes all entries.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the entries in display order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Returns an owned snapshot for the view layer.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Vec<TranscriptEntry> {
        self.entries.clone()
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the transcript holds no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_arrival_order() {
        let mut transcript = Transcript::new();
        transcript.append(Direction::Received, "connected");
        transcript.append(Direction::Sent, "hello");
        transcript.append(Direction::Received, "hello");
        transcript.append(Direction::Sent, "bye");

        let directions: Vec<_> = transcript.entries().iter().map(|e| e.direction).collect();
        assert_eq!(
            directions,
            vec![
                Direction::Received,
                Direction::Sent,
                Direction::Received,
                Direction::Sent,
            ]
        );

        let payloads: Vec<_> = transcript
            .entries()
            .iter()
            .map(|e| e.payload.as_str())
            .collect();
        assert_eq!(payloads, vec!["connected", "hello", "hello", "bye"]);
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let mut transcript = Transcript::new();
        for i in 0..32 {
            transcript.append(Direction::Sent, format!("msg {i}"));
        }

        let mut ids: Vec<_> = transcript.entries().iter().map(|e| e.id).collect();
        ids.sort_by_key(|id| *id.as_uuid());
        ids.dedup();
        assert_eq!(ids.len(), 32);
    }

    #[test]
    fn test_clear_empties_transcript() {
        let mut transcript = Transcript::new();
        transcript.append(Direction::Sent, "one");
        transcript.append(Direction::Received, "two");
        assert_eq!(transcript.len(), 2);

        transcript.clear();
        assert!(transcript.is_empty());
        assert_eq!(transcript.len(), 0);
    }

    #[test]
    fn test_payload_stored_verbatim() {
        let mut transcript = Transcript::new();
        let raw = "  {\"not\": \"parsed\"} \u{1F980} \n\ttrailing  ";
        transcript.append(Direction::Received, raw);
        assert_eq!(transcript.entries()[0].payload, raw);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut transcript = Transcript::new();
        transcript.append(Direction::Sent, "one");

        let snapshot = transcript.snapshot();
        transcript.append(Direction::Sent, "two");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_entry_serializes_for_view_layer() {
        let entry = TranscriptEntry::new(Direction::Sent, "hello");
        let value = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(value["direction"], "sent");
        assert_eq!(value["payload"], "hello");
        assert!(value["id"].is_string());
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Sent.to_string(), "sent");
        assert_eq!(Direction::Received.to_string(), "received");
    }
}
