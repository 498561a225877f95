//! Messages between trainees and instructors, including the optimistic
//! send flow.
//!
//! A locally-sent message is inserted into the [`MessageLog`] as
//! [`MessageEntry::Pending`] before the server confirms it. When the
//! authoritative list arrives, [`MessageLog::reconcile`] replaces the log
//! with the server's ordering and matches pending entries against it by
//! content and timestamp proximity; unmatched entries stay pending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum distance between a local send time and the server's timestamp
/// for the two to be considered the same message. Covers request latency
/// plus moderate clock skew.
const RECONCILE_WINDOW_SECS: i64 = 60;

/// A server-confirmed message. Sender and recipient are user ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Message {
    pub id: i64,
    pub sender: i64,
    pub recipient: i64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A message sent locally and not yet confirmed by the server.
#[derive(Debug, Clone)]
pub struct PendingMessage {
    /// Client-local id, never sent to the server.
    pub local_id: u64,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// One entry of a message log: either confirmed by the server or still
/// awaiting confirmation.
#[derive(Debug, Clone)]
pub enum MessageEntry {
    Pending(PendingMessage),
    Confirmed(Message),
}

impl MessageEntry {
    pub fn content(&self) -> &str {
        match self {
            MessageEntry::Pending(p) => &p.content,
            MessageEntry::Confirmed(m) => &m.content,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, MessageEntry::Pending(_))
    }
}

/// Ordered message log merging server state with optimistic local sends.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Vec<MessageEntry>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_pending()).count()
    }

    /// Record a locally-sent message before the server has confirmed it.
    /// Returns the client-local id of the new entry.
    pub fn push_pending(&mut self, content: &str) -> u64 {
        let local_id = rand::random::<u64>();
        self.entries.push(MessageEntry::Pending(PendingMessage {
            local_id,
            content: content.to_string(),
            sent_at: Utc::now(),
        }));
        local_id
    }

    /// Merge the authoritative message list into the log.
    ///
    /// The server's ordering wins: previously confirmed entries are replaced
    /// wholesale. A pending entry is confirmed when an authoritative message
    /// has equal content and a timestamp within [`RECONCILE_WINDOW_SECS`] of
    /// the local send time; each authoritative message confirms at most one
    /// pending entry. Unmatched pending entries are kept after the confirmed
    /// ones, preserving their relative order.
    pub fn reconcile(&mut self, authoritative: Vec<Message>) {
        let pending: Vec<PendingMessage> = self
            .entries
            .drain(..)
            .filter_map(|entry| match entry {
                MessageEntry::Pending(p) => Some(p),
                MessageEntry::Confirmed(_) => None,
            })
            .collect();

        let mut consumed = vec![false; authoritative.len()];
        let mut unconfirmed = Vec::new();

        for p in pending {
            let hit = authoritative.iter().enumerate().position(|(i, m)| {
                !consumed[i]
                    && m.content == p.content
                    && (m.timestamp - p.sent_at).num_seconds().abs() <= RECONCILE_WINDOW_SECS
            });
            match hit {
                Some(i) => consumed[i] = true,
                None => unconfirmed.push(p),
            }
        }

        self.entries = authoritative
            .into_iter()
            .map(MessageEntry::Confirmed)
            .collect();
        self.entries
            .extend(unconfirmed.into_iter().map(MessageEntry::Pending));
    }
}
