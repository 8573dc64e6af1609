//! Network + Transport Layer
//!
//! The persistent pub/sub connection to the messaging endpoint.
//!
//! # Architecture
//!
//! - **Transport trait**: platform-agnostic socket interface
//! - **Frame types**: JSON wire protocol (subscribe, publish, push delivery)
//! - **Chat connection**: subscription table, publish, autonomous reconnect
//!
//! # Example
//!
//! ```ignore
//! use palaver_core::network::{ChatConnection, MockTransport, TransportConfig};
//!
//! let config = TransportConfig::new("wss://chat.example.com/ws", token);
//! let mut conn = ChatConnection::new(MockTransport::new(), config);
//! conn.connect()?;
//! let handle = conn.subscribe("/topic/messages/alice")?;
//! for frame in conn.process_incoming() {
//!     println!("{}: {}", frame.message.sender, frame.message.content);
//! }
//! ```

pub mod connection;
pub mod error;
pub mod frame;
pub mod mock;
pub mod transport;
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub mod websocket;

// Error types
pub use error::NetworkError;

// Wire frame types
pub use frame::{
    decode_frame, encode_frame, ChatMessage, DedupKey, Frame, InboundFrame, SubscriptionId,
};

// Transport abstraction
pub use transport::{ConnectionState, Transport, TransportConfig, TransportResult};

// Mock transport for testing
pub use mock::MockTransport;

// WebSocket transport for production
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use websocket::WebSocketTransport;

// Connection management
pub use connection::{ChatConnection, SubscriptionHandle};
