//! Transport Trait
//!
//! Platform-agnostic abstraction for the persistent messaging socket.

use super::error::NetworkError;
use super::frame::Frame;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected to any server.
    #[default]
    Disconnected,
    /// Connection in progress.
    Connecting,
    /// Connected and ready.
    Connected,
    /// Handshake failed; a new connect attempt is required.
    Errored,
}

/// Configuration for transport connections.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Messaging endpoint URL (ws:// or wss://).
    pub server_url: String,
    /// Opaque bearer credential attached at handshake time.
    pub auth_token: String,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Read/write timeout in milliseconds.
    pub io_timeout_ms: u64,
    /// Delay between reconnection attempts after an unexpected drop
    /// (milliseconds). Attempts are unbounded.
    pub retry_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            server_url: String::new(),
            auth_token: String::new(),
            connect_timeout_ms: 10_000,
            io_timeout_ms: 1_000,
            retry_delay_ms: 5_000,
        }
    }
}

impl TransportConfig {
    /// Creates a config for the given endpoint and credential.
    pub fn new(server_url: &str, auth_token: &str) -> Self {
        TransportConfig {
            server_url: server_url.to_string(),
            auth_token: auth_token.to_string(),
            ..Default::default()
        }
    }
}

/// Transport trait for the persistent socket.
///
/// Abstracts the underlying mechanism (WebSocket in production, scripted
/// mock in tests). Methods are blocking; `receive` returns `Ok(None)` when
/// no frame arrived within the io timeout, so a cooperative event loop can
/// pump it without stalling.
///
/// # Example
///
/// ```ignore
/// use palaver_core::network::{MockTransport, Transport, TransportConfig};
///
/// let mut transport = MockTransport::new();
/// transport.connect(&TransportConfig::default())?;
/// transport.send(&frame)?;
/// let inbound = transport.receive()?;
/// transport.disconnect()?;
/// ```
pub trait Transport {
    /// Connects to the messaging endpoint, attaching the credential from
    /// the config at handshake time.
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()>;

    /// Disconnects from the endpoint.
    ///
    /// Safe to call even if not connected.
    fn disconnect(&mut self) -> TransportResult<()>;

    /// Returns the current connection state.
    fn state(&self) -> ConnectionState;

    /// Sends one frame.
    ///
    /// Returns `NotConnected` if no socket is open and `ConnectionClosed`
    /// if the send reveals that the peer went away.
    fn send(&mut self, frame: &Frame) -> TransportResult<()>;

    /// Receives the next frame.
    ///
    /// Returns `Ok(None)` if no frame is available before the io timeout;
    /// `ConnectionClosed` signals an unexpected drop the owner must react
    /// to.
    fn receive(&mut self) -> TransportResult<Option<Frame>>;
}
