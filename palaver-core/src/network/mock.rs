// SPDX-FileCopyrightText: 2026 Palaver Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! Scripted in-memory transport for tests: inbound frames are queued ahead
//! of time, outbound frames are captured, and connect failures or an
//! unexpected drop can be injected.

use std::collections::VecDeque;

use super::error::NetworkError;
use super::frame::Frame;
use super::transport::{ConnectionState, Transport, TransportConfig, TransportResult};

/// In-memory transport for testing.
#[derive(Default)]
pub struct MockTransport {
    state: ConnectionState,
    sent: Vec<Frame>,
    incoming: VecDeque<Frame>,
    fail_connects: u32,
    broken: bool,
    connect_count: u32,
    last_config: Option<TransportConfig>,
}

impl MockTransport {
    /// Creates a new disconnected mock transport.
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// Queues a frame to be returned by a later `receive` call.
    pub fn queue_receive(&mut self, frame: Frame) {
        self.incoming.push_back(frame);
    }

    /// Returns all frames sent so far, in order.
    pub fn sent_frames(&self) -> &[Frame] {
        &self.sent
    }

    /// Clears the sent-frame capture.
    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    /// Makes the next `attempts` connect calls fail.
    pub fn fail_next_connects(&mut self, attempts: u32) {
        self.fail_connects = attempts;
    }

    /// Simulates an unexpected drop: the next send or receive reports
    /// `ConnectionClosed`.
    pub fn break_connection(&mut self) {
        self.broken = true;
    }

    /// Number of successful connect calls so far.
    pub fn connect_count(&self) -> u32 {
        self.connect_count
    }

    /// The config passed to the most recent connect call.
    pub fn last_config(&self) -> Option<&TransportConfig> {
        self.last_config.as_ref()
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()> {
        self.last_config = Some(config.clone());
        if self.fail_connects > 0 {
            self.fail_connects -= 1;
            self.state = ConnectionState::Disconnected;
            return Err(NetworkError::ConnectionFailed("scripted failure".into()));
        }
        self.broken = false;
        self.state = ConnectionState::Connected;
        self.connect_count += 1;
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        self.state = ConnectionState::Disconnected;
        self.broken = false;
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn send(&mut self, frame: &Frame) -> TransportResult<()> {
        if self.broken {
            self.broken = false;
            self.state = ConnectionState::Disconnected;
            return Err(NetworkError::ConnectionClosed);
        }
        if self.state != ConnectionState::Connected {
            return Err(NetworkError::NotConnected);
        }
        self.sent.push(frame.clone());
        Ok(())
    }

    fn receive(&mut self) -> TransportResult<Option<Frame>> {
        if self.broken {
            self.broken = false;
            self.state = ConnectionState::Disconnected;
            return Err(NetworkError::ConnectionClosed);
        }
        if self.state != ConnectionState::Connected {
            return Err(NetworkError::NotConnected);
        }
        Ok(self.incoming.pop_front())
    }
}
