// SPDX-FileCopyrightText: 2026 Palaver Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Topic Router
//!
//! Translates a conversation identity into the one subscribe topic and the
//! one publish destination relevant to it, and owns the subscription swap
//! protocol.
//!
//! Direct messages for every peer arrive on one shared topic keyed by the
//! *local* username, so switching between two direct conversations needs no
//! resubscribe; switching into or out of a group does. The held route
//! records the subscribed topic explicitly and swaps by comparing topics,
//! never by conversation kind.

use tracing::{trace, warn};

use crate::network::{ChatConnection, InboundFrame, NetworkError, SubscriptionHandle, Transport};

use super::conversation::ConversationRef;

/// Shared inbound topic prefix for direct messages, keyed by local username.
pub const DIRECT_TOPIC_PREFIX: &str = "/topic/messages/";
/// Inbound topic prefix for group messages, keyed by group id.
pub const GROUP_TOPIC_PREFIX: &str = "/topic/group/";
/// Fixed outbound destination for direct messages.
pub const DIRECT_DESTINATION: &str = "/app/chat";
/// Fixed outbound destination for group messages.
pub const GROUP_DESTINATION: &str = "/app/group";

/// The subscribe/publish pair for one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Topic to subscribe for inbound delivery.
    pub topic: String,
    /// Destination to publish outbound messages to.
    pub destination: &'static str,
}

struct ActiveRoute {
    conversation: ConversationRef,
    topic: String,
    handle: SubscriptionHandle,
}

/// Maps conversations to topics/destinations and tracks the live
/// subscription.
pub struct TopicRouter {
    local_username: String,
    active: Option<ActiveRoute>,
}

impl TopicRouter {
    /// Creates a router for the authenticated local user.
    pub fn new(local_username: &str) -> Self {
        TopicRouter {
            local_username: local_username.to_string(),
            active: None,
        }
    }

    /// The subscribe/publish pair for a conversation.
    pub fn route_for(&self, conversation: &ConversationRef) -> Route {
        match conversation {
            ConversationRef::Direct { .. } => Route {
                topic: format!("{}{}", DIRECT_TOPIC_PREFIX, self.local_username),
                destination: DIRECT_DESTINATION,
            },
            ConversationRef::Group { group_id, .. } => Route {
                topic: format!("{}{}", GROUP_TOPIC_PREFIX, group_id),
                destination: GROUP_DESTINATION,
            },
        }
    }

    /// The publish destination of the active conversation.
    pub fn active_destination(&self) -> Option<&'static str> {
        self.active
            .as_ref()
            .map(|route| self.route_for(&route.conversation).destination)
    }

    /// Swaps the live subscription over to `conversation`.
    ///
    /// When the required topic equals the currently subscribed one (two
    /// direct conversations share the per-user topic) the handle is kept
    /// and no wire traffic happens. Otherwise the previous topic is
    /// unsubscribed *before* the new one is subscribed, closing the window
    /// in which frames of the old conversation could still be delivered.
    ///
    /// On `NotConnected` the router holds no route; the owner retries via
    /// `reestablish` once the connection is back.
    pub fn swap<T: Transport>(
        &mut self,
        conn: &mut ChatConnection<T>,
        conversation: &ConversationRef,
    ) -> Result<(), NetworkError> {
        let next = self.route_for(conversation);

        if let Some(active) = self.active.take() {
            if active.topic == next.topic {
                trace!(topic = %active.topic, "shared topic, no resubscribe");
                self.active = Some(ActiveRoute {
                    conversation: conversation.clone(),
                    ..active
                });
                return Ok(());
            }
            conn.unsubscribe(active.handle);
        }

        let handle = conn.subscribe(&next.topic)?;
        self.active = Some(ActiveRoute {
            conversation: conversation.clone(),
            topic: next.topic,
            handle,
        });
        Ok(())
    }

    /// Re-subscribes `conversation` on a fresh socket (after a reconnect
    /// wiped the connection's subscription table) or after a swap that
    /// failed while disconnected.
    pub fn reestablish<T: Transport>(
        &mut self,
        conn: &mut ChatConnection<T>,
        conversation: &ConversationRef,
    ) -> Result<(), NetworkError> {
        self.active = None;
        self.swap(conn, conversation)
    }

    /// Releases the live subscription, if any.
    pub fn clear<T: Transport>(&mut self, conn: &mut ChatConnection<T>) {
        if let Some(active) = self.active.take() {
            conn.unsubscribe(active.handle);
        }
    }

    /// Decides whether an inbound frame belongs to the active conversation.
    ///
    /// Group frames pass only on group-id equality: a stale or cross-talk
    /// frame can arrive in the brief window around a swap. Direct frames
    /// pass only when sent by the active peer, because the shared per-user
    /// topic also carries messages from every other peer.
    pub fn accepts(&self, frame: &InboundFrame) -> bool {
        let Some(active) = &self.active else {
            return false;
        };
        if frame.topic != active.topic {
            return false;
        }
        match &active.conversation {
            ConversationRef::Direct { peer } => {
                if frame.message.sender == *peer {
                    true
                } else {
                    trace!(sender = %frame.message.sender, "frame from non-active peer");
                    false
                }
            }
            ConversationRef::Group { group_id, .. } => {
                match frame.message.group_id.as_deref() {
                    Some(id) if id == group_id => true,
                    _ => {
                        warn!(topic = %frame.topic, "group frame with mismatched group id");
                        false
                    }
                }
            }
        }
    }
}
