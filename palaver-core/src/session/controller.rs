// SPDX-FileCopyrightText: 2026 Palaver Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session Controller
//!
//! Orchestrates one chat session: owns the connection, reacts to
//! conversation selection by swapping subscriptions and reloading history,
//! and exposes the merged timeline plus `send_message`.
//!
//! Every conversation selection bumps a generation counter, and every
//! asynchronous completion carries the generation it was issued for;
//! completions whose generation no longer matches are discarded. This
//! replaces the stale-closure trap of capturing "the current conversation"
//! inside long-lived callbacks.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, warn};

use crate::api::events::{ChatEvent, EventDispatcher, EventHandler};
use crate::history::{HistoryApi, HistoryError};
use crate::network::{
    ChatConnection, ChatMessage, ConnectionState, NetworkError, Transport, TransportResult,
};

use super::conversation::ConversationRef;
use super::routing::TopicRouter;
use super::timeline::Timeline;

/// Session controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No conversation selected.
    Idle,
    /// History load and/or subscription swap in flight.
    Switching,
    /// Subscribed; ready to send and receive.
    Live,
}

/// A history load issued for one conversation selection.
///
/// The generation tags the selection; `complete_history` discards results
/// whose tag no longer matches.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRequest {
    /// Generation of the selection this load belongs to.
    pub generation: u64,
    /// Conversation the load was issued for.
    pub conversation: ConversationRef,
}

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No conversation is live; selection or connection is still pending.
    #[error("no live conversation")]
    NotLive,

    /// A send with empty (after trimming) content was rejected.
    #[error("empty message")]
    EmptyMessage,

    /// The message could not be delivered; nothing was echoed.
    #[error("send failed: {0}")]
    SendFailed(#[source] NetworkError),
}

/// The chat session orchestrator.
///
/// Presentation code talks to this type (or the [`crate::api::ChatClient`]
/// facade wrapping it) and never to the connection directly.
///
/// # Example
///
/// ```ignore
/// use palaver_core::session::{ChatSession, ConversationRef};
///
/// session.connect()?;
/// session.select_conversation(ConversationRef::direct("bob"));
/// loop {
///     session.pump(&loader);
///     render(session.snapshot());
/// }
/// ```
pub struct ChatSession<T: Transport> {
    conn: ChatConnection<T>,
    router: TopicRouter,
    timeline: Timeline,
    events: Arc<EventDispatcher>,
    local_username: String,
    state: SessionState,
    generation: u64,
    active: Option<ConversationRef>,
    pending_history: Option<HistoryRequest>,
    /// Subscription swap could not run (connection down); retried on
    /// reconnect.
    pending_route: bool,
    last_connection_state: ConnectionState,
}

impl<T: Transport> ChatSession<T> {
    /// Creates a session for the authenticated local user.
    pub fn new(conn: ChatConnection<T>, local_username: &str) -> Self {
        ChatSession {
            conn,
            router: TopicRouter::new(local_username),
            timeline: Timeline::new(),
            events: Arc::new(EventDispatcher::new()),
            local_username: local_username.to_string(),
            state: SessionState::Idle,
            generation: 0,
            active: None,
            pending_history: None,
            pending_route: false,
            last_connection_state: ConnectionState::Disconnected,
        }
    }

    /// Establishes the connection. Idempotent.
    pub fn connect(&mut self) -> TransportResult<()> {
        let result = self.conn.connect();
        self.emit_connection_state();
        result
    }

    /// Tears the session down: releases the subscription, closes the
    /// socket, returns to `Idle`. Safe to call multiple times.
    pub fn disconnect(&mut self) {
        self.close();
        self.conn.disconnect();
        self.emit_connection_state();
    }

    /// Deselects the conversation and releases its subscription, keeping
    /// the connection up. The timeline is discarded.
    pub fn close(&mut self) {
        self.router.clear(&mut self.conn);
        self.timeline.reset();
        self.generation += 1;
        self.state = SessionState::Idle;
        self.active = None;
        self.pending_history = None;
        self.pending_route = false;
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current transport connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.conn.state()
    }

    /// The selected conversation, if any.
    pub fn active_conversation(&self) -> Option<&ConversationRef> {
        self.active.as_ref()
    }

    /// The merged timeline of the active conversation.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Read-only view of the active timeline for rendering.
    pub fn snapshot(&self) -> &[ChatMessage] {
        self.timeline.snapshot()
    }

    /// Selects a conversation: resets the timeline, swaps the subscription
    /// and schedules exactly one history load for it.
    ///
    /// When the connection is down the swap is queued and re-issued after
    /// reconnect; the session stays `Switching` until the swap completes.
    pub fn select_conversation(&mut self, conversation: ConversationRef) {
        self.generation += 1;
        self.timeline.reset();
        self.state = SessionState::Switching;
        self.active = Some(conversation.clone());
        self.pending_history = Some(HistoryRequest {
            generation: self.generation,
            conversation: conversation.clone(),
        });
        self.events.dispatch(ChatEvent::ConversationOpened {
            conversation: conversation.clone(),
        });

        match self.router.swap(&mut self.conn, &conversation) {
            Ok(()) => {
                self.pending_route = false;
                self.state = SessionState::Live;
            }
            Err(NetworkError::NotConnected) => {
                debug!("subscription swap queued until reconnect");
                self.pending_route = true;
            }
            Err(e) => {
                warn!(error = %e, "subscription swap failed");
                self.pending_route = true;
            }
        }
        self.emit_connection_state();
    }

    /// Sends one message into the active conversation.
    ///
    /// Valid only in `Live` state with non-empty trimmed content. The
    /// message is published first and echoed into the timeline only on
    /// success: a failed publish adds nothing and surfaces `SendFailed`.
    /// Messages sent while disconnected are dropped, never queued.
    pub fn send_message(&mut self, content: &str) -> Result<ChatMessage, SessionError> {
        if self.state != SessionState::Live {
            return Err(SessionError::NotLive);
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        let conversation = self.active.clone().ok_or(SessionError::NotLive)?;

        let timestamp = now_timestamp();
        let message = match &conversation {
            ConversationRef::Direct { peer } => {
                ChatMessage::direct(&self.local_username, peer, content, &timestamp)
            }
            ConversationRef::Group { group_id, .. } => {
                ChatMessage::group(&self.local_username, group_id, content, &timestamp)
            }
        };

        let destination = self.router.route_for(&conversation).destination;
        if let Err(e) = self.conn.publish(destination, &message) {
            self.events.dispatch(ChatEvent::SendFailed {
                error: e.to_string(),
            });
            self.emit_connection_state();
            return Err(SessionError::SendFailed(e));
        }

        // Optimistic echo. A later live delivery of the same message is
        // caught by the dedup key.
        self.timeline.append_live(message.clone());
        self.events.dispatch(ChatEvent::MessageSent {
            message: message.clone(),
        });
        Ok(message)
    }

    /// One cooperative tick: drives reconnection, re-establishes the
    /// subscription after a socket replacement, routes inbound frames into
    /// the timeline, and runs at most one pending history load.
    pub fn pump(&mut self, history: &impl HistoryApi) {
        let frames = self.conn.process_incoming();
        self.reestablish_route_if_needed();

        for frame in frames {
            if self.router.accepts(&frame) {
                self.deliver(frame.message);
            }
        }

        if let Some(request) = self.take_pending_load() {
            let result = history.load(&request.conversation);
            self.complete_history(request.generation, result);
        }

        self.emit_connection_state();
    }

    /// Takes the outstanding history load, if any.
    ///
    /// `pump` consumes it internally; embeddings that run their own
    /// (asynchronous) fetch take it here and answer through
    /// [`Self::complete_history`].
    pub fn take_pending_load(&mut self) -> Option<HistoryRequest> {
        self.pending_history.take()
    }

    /// Applies a finished history load.
    ///
    /// A generation that no longer matches the active selection means the
    /// user has switched away since the load was issued; the result is
    /// discarded entirely. Failure degrades to a live-only timeline and
    /// never blocks messaging.
    pub fn complete_history(
        &mut self,
        generation: u64,
        result: Result<Vec<ChatMessage>, HistoryError>,
    ) {
        if generation != self.generation {
            warn!(
                stale = generation,
                current = self.generation,
                "discarding stale history result"
            );
            return;
        }
        match result {
            Ok(messages) => {
                let before = self.timeline.len();
                self.timeline.append_history(messages);
                self.events.dispatch(ChatEvent::HistoryLoaded {
                    count: self.timeline.len() - before,
                });
            }
            Err(e) => {
                warn!(error = %e, "history unavailable, continuing live-only");
                self.events.dispatch(ChatEvent::HistoryFailed {
                    error: e.to_string(),
                });
            }
        }
    }

    /// Adds an event handler.
    ///
    /// Handlers are registered while the dispatcher is not shared; register
    /// them before handing out clones of [`Self::events`].
    pub fn add_event_handler(&mut self, handler: Arc<dyn EventHandler>) {
        if let Some(events) = Arc::get_mut(&mut self.events) {
            events.add_handler(handler);
        }
    }

    /// Returns a reference to the event dispatcher.
    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// Returns a reference to the underlying connection's transport.
    pub fn transport(&self) -> &T {
        self.conn.transport()
    }

    /// Returns a mutable reference to the underlying connection's
    /// transport.
    pub fn transport_mut(&mut self) -> &mut T {
        self.conn.transport_mut()
    }

    /// Returns a reference to the connection (test inspection).
    pub fn connection(&self) -> &ChatConnection<T> {
        &self.conn
    }

    /// Re-issues the subscription swap after a reconnect replaced the
    /// socket, or after a swap that could not run while disconnected.
    fn reestablish_route_if_needed(&mut self) {
        let fresh_socket = self.conn.take_resubscribed();
        if !fresh_socket && !self.pending_route {
            return;
        }
        let Some(conversation) = self.active.clone() else {
            return;
        };
        if !self.conn.is_connected() {
            self.pending_route = true;
            return;
        }
        match self.router.reestablish(&mut self.conn, &conversation) {
            Ok(()) => {
                self.pending_route = false;
                if self.state == SessionState::Switching {
                    self.state = SessionState::Live;
                }
                debug!(conversation = %conversation.title(), "subscription re-established");
            }
            Err(e) => {
                debug!(error = %e, "re-subscribe failed, will retry");
                self.pending_route = true;
            }
        }
    }

    /// Appends one accepted live message and announces it.
    fn deliver(&mut self, message: ChatMessage) {
        if self.timeline.append_live(message.clone()) {
            self.events.dispatch(ChatEvent::MessageReceived { message });
        }
    }

    /// Announces connection state transitions exactly once each.
    fn emit_connection_state(&mut self) {
        let state = self.conn.state();
        if state != self.last_connection_state {
            self.last_connection_state = state;
            self.events
                .dispatch(ChatEvent::ConnectionStateChanged { state });
        }
    }
}

/// ISO-8601 timestamp for a locally sent message.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
