//! Event System
//!
//! Callbacks for chat session events.

use std::sync::Arc;

use crate::network::{ChatMessage, ConnectionState};
use crate::session::ConversationRef;

/// Events emitted by the chat session.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// Transport connection state changed.
    ///
    /// `Connecting` after a drop doubles as the transient "reconnecting"
    /// indicator; drops are otherwise handled autonomously.
    ConnectionStateChanged {
        /// The new connection state.
        state: ConnectionState,
    },

    /// A conversation was selected and is being switched to.
    ConversationOpened {
        /// The selected conversation.
        conversation: ConversationRef,
    },

    /// A live message was appended to the active timeline.
    MessageReceived {
        /// The delivered message.
        message: ChatMessage,
    },

    /// The backlog for the active conversation was applied.
    HistoryLoaded {
        /// Number of entries the backlog added.
        count: usize,
    },

    /// The backlog fetch failed; the timeline continues live-only.
    HistoryFailed {
        /// Error description.
        error: String,
    },

    /// A local send was published and echoed optimistically.
    MessageSent {
        /// The sent message.
        message: ChatMessage,
    },

    /// A local send could not be delivered; nothing was echoed.
    SendFailed {
        /// Error description.
        error: String,
    },
}

/// Event handler trait.
///
/// Implement this trait to receive chat events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: ChatEvent);
}

/// Simple callback-based event handler.
///
/// Wraps a closure for easy event handling.
pub struct CallbackHandler<F>
where
    F: Fn(ChatEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(ChatEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(ChatEvent) + Send + Sync,
{
    fn on_event(&self, event: ChatEvent) {
        (self.callback)(event);
    }
}

/// Event dispatcher for managing multiple handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    pub fn new() -> Self {
        EventDispatcher {
            handlers: Vec::new(),
        }
    }

    /// Adds an event handler.
    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Removes all handlers.
    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatches an event to all handlers.
    pub fn dispatch(&self, event: ChatEvent) {
        for handler in &self.handlers {
            handler.on_event(event.clone());
        }
    }
}
