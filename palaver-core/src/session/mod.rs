//! Chat Session Core
//!
//! The session synchronization engine: conversation identity, the topic
//! router, the timeline store, and the orchestrating session controller.
//!
//! # Data flow
//!
//! Presentation selects a conversation -> the controller resets the
//! timeline, swaps the live subscription and schedules a history load ->
//! inbound frames and local sends both feed the timeline -> presentation
//! renders the timeline snapshot.

pub mod controller;
pub mod conversation;
pub mod routing;
pub mod timeline;

pub use controller::{ChatSession, HistoryRequest, SessionError, SessionState};
pub use conversation::ConversationRef;
pub use routing::{
    Route, TopicRouter, DIRECT_DESTINATION, DIRECT_TOPIC_PREFIX, GROUP_DESTINATION,
    GROUP_TOPIC_PREFIX,
};
pub use timeline::Timeline;
