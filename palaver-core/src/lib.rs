//! Palaver Core Library
//!
//! Client-side chat session synchronization engine: one persistent pub/sub
//! connection, request/response history backfill, and a single ordered,
//! deduplicated timeline per conversation that stays consistent while the
//! underlying connection flaps, reconnects, or is torn down on navigation.

pub mod api;
pub mod history;
pub mod network;
pub mod session;

pub use api::{
    CallbackHandler, ChatClient, ChatEvent, ClientConfig, ClientError, ClientResult,
    EventDispatcher, EventHandler,
};
pub use history::{HistoryApi, HistoryError, MockHistoryLoader, RestHistoryLoader};
pub use network::{
    ChatConnection, ChatMessage, ConnectionState, Frame, InboundFrame, MockTransport,
    NetworkError, SubscriptionHandle, Transport, TransportConfig,
};
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use network::WebSocketTransport;
pub use session::{
    ChatSession, ConversationRef, HistoryRequest, SessionError, SessionState, Timeline,
};
