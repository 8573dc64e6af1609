// SPDX-FileCopyrightText: 2026 Palaver Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat Connection
//!
//! Owns the one persistent connection of an authenticated session and the
//! pub/sub layer on top of it: a subscription table, publish, and the
//! autonomous reconnection policy (fixed delay, unbounded attempts).
//!
//! The connection does not remember subscriptions across a socket
//! replacement; after a successful reconnect `take_resubscribed` reports
//! once so the owning layer can re-establish them.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use super::error::NetworkError;
use super::frame::{ChatMessage, Frame, InboundFrame, SubscriptionId};
use super::transport::{ConnectionState, Transport, TransportConfig, TransportResult};

/// Handle for one active subscription, redeemable for an unsubscribe.
///
/// Handles are scoped to the socket they were issued on; a reconnect
/// invalidates all previously issued handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle(SubscriptionId);

/// Persistent pub/sub connection.
///
/// # Example
///
/// ```ignore
/// use palaver_core::network::{ChatConnection, MockTransport, TransportConfig};
///
/// let mut conn = ChatConnection::new(MockTransport::new(), config);
/// conn.connect()?;
/// let handle = conn.subscribe("/topic/messages/alice")?;
/// let inbound = conn.process_incoming();
/// conn.unsubscribe(handle);
/// ```
pub struct ChatConnection<T: Transport> {
    transport: T,
    config: TransportConfig,
    state: ConnectionState,
    /// Active subscriptions on the current socket: id -> topic.
    subscriptions: HashMap<SubscriptionId, String>,
    next_subscription_id: SubscriptionId,
    /// When the next autonomous reconnect attempt is due.
    retry_at: Option<Instant>,
    /// Set once per successful reconnect, consumed by the owning layer.
    resubscribed: bool,
}

impl<T: Transport> ChatConnection<T> {
    /// Creates a new connection (not yet connected).
    pub fn new(transport: T, config: TransportConfig) -> Self {
        ChatConnection {
            transport,
            config,
            state: ConnectionState::Disconnected,
            subscriptions: HashMap::new(),
            next_subscription_id: 0,
            retry_at: None,
            resubscribed: false,
        }
    }

    /// Establishes the connection, attaching the credential at handshake.
    ///
    /// Idempotent: a no-op when already `Connected` or `Connecting`.
    /// A handshake failure leaves the connection `Errored`; a later call
    /// may try again.
    pub fn connect(&mut self) -> TransportResult<()> {
        if matches!(
            self.state,
            ConnectionState::Connected | ConnectionState::Connecting
        ) {
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        match self.transport.connect(&self.config) {
            Ok(()) => {
                self.state = ConnectionState::Connected;
                self.retry_at = None;
                info!(url = %self.config.server_url, "connected");
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Errored;
                Err(e)
            }
        }
    }

    /// Explicit teardown: releases all subscriptions, closes the socket.
    ///
    /// Safe to call multiple times and from switch or unmount paths; an
    /// explicit disconnect never triggers the reconnection policy.
    pub fn disconnect(&mut self) {
        self.subscriptions.clear();
        let _ = self.transport.disconnect();
        self.state = ConnectionState::Disconnected;
        self.retry_at = None;
        self.resubscribed = false;
        info!("disconnected");
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns true if connected and ready.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Starts push delivery for `topic`.
    ///
    /// Fails with `NotConnected` while the connection is down (the caller
    /// retries after reconnect). At most one subscription exists per topic:
    /// subscribing an already-subscribed topic returns the existing handle
    /// without wire traffic.
    pub fn subscribe(&mut self, topic: &str) -> TransportResult<SubscriptionHandle> {
        if !self.is_connected() {
            return Err(NetworkError::NotConnected);
        }

        if let Some((&id, _)) = self.subscriptions.iter().find(|(_, t)| *t == topic) {
            debug!(topic, "already subscribed");
            return Ok(SubscriptionHandle(id));
        }

        let id = self.next_subscription_id;
        self.next_subscription_id += 1;

        self.send_or_drop(&Frame::Subscribe {
            id,
            topic: topic.to_string(),
        })?;
        self.subscriptions.insert(id, topic.to_string());
        debug!(topic, id, "subscribed");
        Ok(SubscriptionHandle(id))
    }

    /// Stops push delivery for a subscription.
    ///
    /// Unknown or stale handles are ignored.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        if let Some(topic) = self.subscriptions.remove(&handle.0) {
            debug!(topic = %topic, id = handle.0, "unsubscribed");
            if self.is_connected() {
                let _ = self.send_or_drop(&Frame::Unsubscribe { id: handle.0 });
            }
        }
    }

    /// Publishes one message to a destination.
    ///
    /// Never fails silently: reports `NotConnected` whenever the frame
    /// cannot reach the wire, so callers surface delivery failure instead
    /// of assuming success.
    pub fn publish(&mut self, destination: &str, message: &ChatMessage) -> TransportResult<()> {
        if !self.is_connected() {
            return Err(NetworkError::NotConnected);
        }
        self.send_or_drop(&Frame::Send {
            destination: destination.to_string(),
            message: message.clone(),
        })
    }

    /// Drives reconnection and drains inbound frames.
    ///
    /// Frames for subscribed topics are returned in receipt order; frames
    /// for topics without a live subscription are dropped. An unexpected
    /// close observed here schedules the next reconnect attempt.
    pub fn process_incoming(&mut self) -> Vec<InboundFrame> {
        self.maintain();

        let mut inbound = Vec::new();
        if !self.is_connected() {
            return inbound;
        }

        loop {
            match self.transport.receive() {
                Ok(Some(Frame::Message { topic, message })) => {
                    if self.subscriptions.values().any(|t| *t == topic) {
                        inbound.push(InboundFrame { topic, message });
                    } else {
                        trace!(topic = %topic, "dropping frame for unsubscribed topic");
                    }
                }
                Ok(Some(frame)) => {
                    trace!(?frame, "ignoring unexpected client frame from server");
                }
                Ok(None) => break,
                Err(NetworkError::ConnectionClosed) => {
                    self.handle_drop();
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "receive failed");
                    break;
                }
            }
        }
        inbound
    }

    /// Runs a due reconnect attempt, if any.
    ///
    /// Called from `process_incoming`; exposed so hosts with no inbound
    /// traffic can still drive the retry loop.
    pub fn maintain(&mut self) {
        let due = self.retry_at.is_some_and(|at| Instant::now() >= at);
        if due {
            self.attempt_reconnect();
        }
    }

    /// Reports (once) that the socket was replaced by a reconnect and the
    /// owning layer must re-establish its subscriptions.
    pub fn take_resubscribed(&mut self) -> bool {
        std::mem::take(&mut self.resubscribed)
    }

    /// Number of live subscriptions on the current socket.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if a live subscription exists for `topic`.
    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.subscriptions.values().any(|t| t == topic)
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Sends a frame, converting a revealed close into drop handling.
    fn send_or_drop(&mut self, frame: &Frame) -> TransportResult<()> {
        match self.transport.send(frame) {
            Ok(()) => Ok(()),
            Err(NetworkError::ConnectionClosed) | Err(NetworkError::NotConnected) => {
                self.handle_drop();
                Err(NetworkError::NotConnected)
            }
            Err(e) => Err(e),
        }
    }

    /// Reacts to an unexpected drop: forget subscriptions (the socket that
    /// carried them is gone) and schedule the next attempt at the fixed
    /// retry delay.
    fn handle_drop(&mut self) {
        self.subscriptions.clear();
        self.state = ConnectionState::Disconnected;
        self.retry_at = Some(Instant::now() + Duration::from_millis(self.config.retry_delay_ms));
        info!(
            retry_delay_ms = self.config.retry_delay_ms,
            "connection dropped, reconnecting"
        );
    }

    /// One reconnect attempt. Attempts are unbounded: a failure schedules
    /// the next one at the same fixed delay.
    fn attempt_reconnect(&mut self) {
        self.state = ConnectionState::Connecting;
        match self.transport.connect(&self.config) {
            Ok(()) => {
                self.state = ConnectionState::Connected;
                self.retry_at = None;
                self.resubscribed = true;
                info!("reconnected");
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                self.retry_at =
                    Some(Instant::now() + Duration::from_millis(self.config.retry_delay_ms));
                debug!(error = %e, "reconnect attempt failed");
            }
        }
    }
}
