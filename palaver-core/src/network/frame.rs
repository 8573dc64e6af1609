// SPDX-FileCopyrightText: 2026 Palaver Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire Frame Types
//!
//! JSON frames exchanged with the messaging endpoint. The broker model is
//! topic-based: the client subscribes to named topics for push delivery and
//! publishes to named destinations.

use serde::{Deserialize, Serialize};

/// Identifier of a client-side subscription, unique per connection.
pub type SubscriptionId = u64;

/// Frames exchanged over the persistent connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Frame {
    /// Client -> server: start push delivery for a topic.
    Subscribe {
        /// Client-chosen subscription id, scoped to the current socket.
        id: SubscriptionId,
        /// Topic to deliver.
        topic: String,
    },
    /// Client -> server: stop push delivery for a subscription.
    Unsubscribe {
        /// Id passed in the matching `Subscribe`.
        id: SubscriptionId,
    },
    /// Client -> server: publish one message to a destination.
    Send {
        /// Outbound destination address.
        destination: String,
        /// The message record.
        message: ChatMessage,
    },
    /// Server -> client: push delivery of one message on a subscribed
    /// topic.
    Message {
        /// Topic the message was addressed to.
        topic: String,
        /// The message record.
        message: ChatMessage,
    },
}

/// One chat message, on the wire and in the timeline.
///
/// The same record shape is used for outbound publishes, inbound push
/// deliveries, and history responses. `receiver` is present on direct
/// messages, `group_id` on group messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Username of the author.
    pub sender: String,
    /// Peer username for direct messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// Group id for group messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Message body.
    pub content: String,
    /// ISO-8601 creation time. Advisory for display; ordering in the
    /// timeline is arrival order, never a re-sort on this field.
    pub timestamp: String,
}

/// Composite identity used for timeline deduplication.
///
/// No server-assigned id is guaranteed on the optimistic copy of a sent
/// message, so equality is `(sender, timestamp, content)`.
pub type DedupKey = (String, String, String);

impl ChatMessage {
    /// Creates a direct message record.
    pub fn direct(sender: &str, receiver: &str, content: &str, timestamp: &str) -> Self {
        ChatMessage {
            sender: sender.to_string(),
            receiver: Some(receiver.to_string()),
            group_id: None,
            content: content.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    /// Creates a group message record.
    pub fn group(sender: &str, group_id: &str, content: &str, timestamp: &str) -> Self {
        ChatMessage {
            sender: sender.to_string(),
            receiver: None,
            group_id: Some(group_id.to_string()),
            content: content.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    /// Returns the dedup identity of this message.
    pub fn dedup_key(&self) -> DedupKey {
        (
            self.sender.clone(),
            self.timestamp.clone(),
            self.content.clone(),
        )
    }
}

/// An inbound push delivery matched to a live subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundFrame {
    /// Topic the frame arrived on.
    pub topic: String,
    /// The delivered message.
    pub message: ChatMessage,
}

/// Encodes a frame as JSON text for the wire.
pub fn encode_frame(frame: &Frame) -> Result<String, super::NetworkError> {
    serde_json::to_string(frame).map_err(|e| super::NetworkError::InvalidFrame(e.to_string()))
}

/// Decodes a frame from JSON text.
pub fn decode_frame(text: &str) -> Result<Frame, super::NetworkError> {
    serde_json::from_str(text).map_err(|e| super::NetworkError::InvalidFrame(e.to_string()))
}
