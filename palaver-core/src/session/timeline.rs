// SPDX-FileCopyrightText: 2026 Palaver Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Timeline Store
//!
//! The ordered, deduplicated message sequence of the currently active
//! conversation. History entries come first in server order, then live and
//! optimistic entries in receipt order; timestamps are advisory for
//! display and never trigger a re-sort.
//!
//! Deduplication is by the `(sender, timestamp, content)` composite key: a
//! live delivery that matches an already-present optimistic entry is
//! dropped, not appended twice. Optimistic and confirmed entries share this
//! one store; there is no separate "pending" flag.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::network::{ChatMessage, DedupKey};

/// Ordered, deduplicated message sequence for one conversation.
#[derive(Default)]
pub struct Timeline {
    entries: Vec<ChatMessage>,
    seen: HashSet<DedupKey>,
    history_applied: bool,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Timeline::default()
    }

    /// Clears to empty. Called on conversation switch before any new
    /// history or live data arrives.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.seen.clear();
        self.history_applied = false;
    }

    /// Applies the fetched backlog, in given order, once per reset.
    ///
    /// The batch is inserted *before* any live or optimistic entries that
    /// arrived while the load was in flight, so history always precedes
    /// live entries no matter which side of the race finished first. The
    /// dedup invariant also holds within the batch. A second call before
    /// the next `reset` is ignored; the controller issues one load per
    /// selection, this guard keeps the contract under misuse.
    pub fn append_history(&mut self, messages: Vec<ChatMessage>) {
        if self.history_applied {
            warn!("ignoring second history batch for this conversation");
            return;
        }
        self.history_applied = true;

        let mut batch = Vec::with_capacity(messages.len());
        for message in messages {
            let key = message.dedup_key();
            if self.seen.contains(&key) {
                debug!(sender = %message.sender, "dropping duplicate history entry");
                continue;
            }
            self.seen.insert(key);
            batch.push(message);
        }
        self.entries.splice(0..0, batch);
    }

    /// Appends one inbound or optimistic message.
    ///
    /// Returns false when the message was a duplicate and got dropped.
    pub fn append_live(&mut self, message: ChatMessage) -> bool {
        self.push_unique(message)
    }

    /// Read-only view for rendering.
    pub fn snapshot(&self) -> &[ChatMessage] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the timeline holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true when the entry at `index` starts a run of consecutive
    /// messages by the same sender (for avatar/name grouping in the UI).
    ///
    /// Derived from the snapshot on each call; nothing is stored.
    pub fn starts_run(&self, index: usize) -> bool {
        match index {
            0 => !self.entries.is_empty(),
            _ => match (self.entries.get(index - 1), self.entries.get(index)) {
                (Some(prev), Some(cur)) => prev.sender != cur.sender,
                _ => false,
            },
        }
    }

    fn push_unique(&mut self, message: ChatMessage) -> bool {
        let key = message.dedup_key();
        if self.seen.contains(&key) {
            debug!(sender = %message.sender, "dropping duplicate message");
            return false;
        }
        self.seen.insert(key);
        self.entries.push(message);
        true
    }
}
