//! Tests for the api layer: config, auth precondition, events, facade.

use std::sync::{Arc, Mutex};

use palaver_core::api::{
    CallbackHandler, ChatClient, ChatEvent, ClientConfig, ClientError, EventDispatcher,
};
use palaver_core::history::MockHistoryLoader;
use palaver_core::network::{ChatMessage, ConnectionState, Frame, MockTransport};
use palaver_core::session::{ConversationRef, SessionState};

fn test_config() -> ClientConfig {
    ClientConfig::new(
        "ws://localhost:8080/ws",
        "http://localhost:8080",
        "alice",
        "secret-token",
    )
}

fn test_client() -> ChatClient<MockTransport, MockHistoryLoader> {
    ChatClient::with_parts(test_config(), MockTransport::new(), MockHistoryLoader::new()).unwrap()
}

#[test]
fn test_config_defaults() {
    let config = ClientConfig::default();
    assert!(!config.has_credential());
    assert_eq!(config.retry_delay_ms, 5_000);
    assert_eq!(config.connect_timeout_ms, 10_000);
}

#[test]
fn test_transport_config_carries_credential() {
    let transport = test_config().transport_config();
    assert_eq!(transport.server_url, "ws://localhost:8080/ws");
    assert_eq!(transport.auth_token, "secret-token");
}

#[test]
fn test_missing_token_is_unauthenticated() {
    let mut config = test_config();
    config.auth_token = "   ".into();

    let result = ChatClient::with_parts(config, MockTransport::new(), MockHistoryLoader::new());
    assert!(matches!(result, Err(ClientError::Unauthenticated)));
}

#[test]
fn test_missing_username_is_unauthenticated() {
    let mut config = test_config();
    config.username = String::new();

    let result = ChatClient::with_parts(config, MockTransport::new(), MockHistoryLoader::new());
    assert!(matches!(result, Err(ClientError::Unauthenticated)));
}

#[test]
fn test_connect_passes_credential_to_transport() {
    let mut client = test_client();
    client.connect().unwrap();

    let config = client
        .session()
        .transport()
        .last_config()
        .cloned()
        .unwrap();
    assert_eq!(config.auth_token, "secret-token");
}

#[test]
fn test_full_conversation_flow() {
    let mut client = test_client();
    client.connect().unwrap();
    assert_eq!(client.connection_state(), ConnectionState::Connected);

    client.select_conversation(ConversationRef::direct("bob"));
    client.pump();
    assert_eq!(client.state(), SessionState::Live);

    client.send_message("hello bob").unwrap();
    assert_eq!(client.snapshot().len(), 1);
    assert_eq!(client.snapshot()[0].content, "hello bob");

    client.session_mut().transport_mut().queue_receive(Frame::Message {
        topic: "/topic/messages/alice".into(),
        message: ChatMessage::direct("bob", "alice", "hi alice", "T2"),
    });
    client.pump();

    let contents: Vec<_> = client.snapshot().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["hello bob", "hi alice"]);

    client.disconnect();
    assert_eq!(client.state(), SessionState::Idle);
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
}

#[test]
fn test_event_dispatcher_handler_management() {
    let mut dispatcher = EventDispatcher::new();
    assert_eq!(dispatcher.handler_count(), 0);

    dispatcher.add_handler(Arc::new(CallbackHandler::new(|_| {})));
    assert_eq!(dispatcher.handler_count(), 1);

    dispatcher.clear_handlers();
    assert_eq!(dispatcher.handler_count(), 0);
}

#[test]
fn test_events_are_dispatched() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let mut client = test_client();
    client.add_event_handler(Arc::new(CallbackHandler::new(move |event: ChatEvent| {
        let label = match event {
            ChatEvent::ConnectionStateChanged { .. } => "connection",
            ChatEvent::ConversationOpened { .. } => "opened",
            ChatEvent::MessageReceived { .. } => "received",
            ChatEvent::HistoryLoaded { .. } => "history",
            ChatEvent::HistoryFailed { .. } => "history-failed",
            ChatEvent::MessageSent { .. } => "sent",
            ChatEvent::SendFailed { .. } => "send-failed",
        };
        sink.lock().unwrap().push(label.to_string());
    })));

    client.connect().unwrap();
    client.select_conversation(ConversationRef::direct("bob"));
    client.pump();
    client.send_message("hi").unwrap();

    let events = seen.lock().unwrap().clone();
    assert_eq!(events, ["connection", "opened", "history", "sent"]);
}

#[test]
fn test_send_failure_event_carries_no_echo() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let mut client = test_client();
    client.add_event_handler(Arc::new(CallbackHandler::new(move |event: ChatEvent| {
        if let ChatEvent::SendFailed { error } = event {
            sink.lock().unwrap().push(error);
        }
    })));

    client.connect().unwrap();
    client.select_conversation(ConversationRef::direct("bob"));
    client.pump();

    client.session_mut().transport_mut().break_connection();
    client
        .session_mut()
        .transport_mut()
        .fail_next_connects(u32::MAX);
    client.pump();

    assert!(client.send_message("lost").is_err());
    assert!(client.snapshot().is_empty());
    assert_eq!(seen.lock().unwrap().len(), 1);
}
