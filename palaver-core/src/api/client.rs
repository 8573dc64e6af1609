// SPDX-FileCopyrightText: 2026 Palaver Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat Client
//!
//! Main entry point. Validates the auth precondition, wires transport,
//! history loader and session controller together, and exposes the surface
//! the presentation layer drives.

use std::sync::Arc;

use crate::history::HistoryApi;
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
use crate::history::RestHistoryLoader;
use crate::network::{ChatConnection, ChatMessage, ConnectionState, Transport};
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
use crate::network::WebSocketTransport;
use crate::session::{ChatSession, ConversationRef, SessionState, Timeline};

use super::config::ClientConfig;
use super::error::{ClientError, ClientResult};
use super::events::{EventDispatcher, EventHandler};

/// High-level chat client.
///
/// Owns the one session of the authenticated user. Presentation code calls
/// `pump` from its event loop and renders `snapshot` afterwards; it never
/// touches the connection directly.
///
/// # Example
///
/// ```ignore
/// use palaver_core::api::{ChatClient, ClientConfig};
/// use palaver_core::session::ConversationRef;
///
/// let config = ClientConfig::new(ws_url, api_url, "alice", token);
/// let mut client = ChatClient::new(config)?;
/// client.connect()?;
/// client.select_conversation(ConversationRef::direct("bob"));
/// loop {
///     client.pump();
///     render(client.snapshot());
/// }
/// ```
pub struct ChatClient<T: Transport, H: HistoryApi> {
    session: ChatSession<T>,
    history: H,
}

#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
impl ChatClient<WebSocketTransport, RestHistoryLoader> {
    /// Creates a client with the production transport and history loader.
    ///
    /// Fails with [`ClientError::Unauthenticated`] when the config carries
    /// no usable credential; no connection is attempted in that case.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let history = RestHistoryLoader::new(&config.history_base_url, &config.auth_token)?;
        Self::with_parts(config, WebSocketTransport::new(), history)
    }
}

impl<T: Transport, H: HistoryApi> ChatClient<T, H> {
    /// Creates a client with a custom transport and history loader (for
    /// tests and alternative platforms).
    pub fn with_parts(config: ClientConfig, transport: T, history: H) -> ClientResult<Self> {
        if !config.has_credential() {
            return Err(ClientError::Unauthenticated);
        }

        let conn = ChatConnection::new(transport, config.transport_config());
        let session = ChatSession::new(conn, config.username.trim());

        Ok(ChatClient { session, history })
    }

    /// Establishes the connection. Idempotent.
    pub fn connect(&mut self) -> ClientResult<()> {
        self.session.connect()?;
        Ok(())
    }

    /// Tears the session down and closes the connection.
    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }

    /// One cooperative tick: reconnection, inbound delivery, history load.
    pub fn pump(&mut self) {
        self.session.pump(&self.history);
    }

    /// Selects the active conversation.
    pub fn select_conversation(&mut self, conversation: ConversationRef) {
        self.session.select_conversation(conversation);
    }

    /// Sends one message into the active conversation.
    pub fn send_message(&mut self, content: &str) -> ClientResult<ChatMessage> {
        Ok(self.session.send_message(content)?)
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Current transport connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.session.connection_state()
    }

    /// The selected conversation, if any.
    pub fn active_conversation(&self) -> Option<&ConversationRef> {
        self.session.active_conversation()
    }

    /// The merged timeline of the active conversation.
    pub fn timeline(&self) -> &Timeline {
        self.session.timeline()
    }

    /// Read-only view of the active timeline for rendering.
    pub fn snapshot(&self) -> &[ChatMessage] {
        self.session.snapshot()
    }

    /// Adds an event handler (register before sharing the dispatcher).
    pub fn add_event_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.session.add_event_handler(handler);
    }

    /// Returns a reference to the event dispatcher.
    pub fn events(&self) -> &Arc<EventDispatcher> {
        self.session.events()
    }

    /// Returns a reference to the underlying session.
    pub fn session(&self) -> &ChatSession<T> {
        &self.session
    }

    /// Returns a mutable reference to the underlying session (tests).
    pub fn session_mut(&mut self) -> &mut ChatSession<T> {
        &mut self.session
    }

    /// Returns a reference to the history loader.
    pub fn history(&self) -> &H {
        &self.history
    }
}
