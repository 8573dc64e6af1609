//! Tests for network::connection
//!
//! Public-surface behavior of the pub/sub connection: subscription wire
//! traffic, inbound filtering, publish failure reporting, teardown.

use palaver_core::network::*;

fn test_config() -> TransportConfig {
    TransportConfig {
        server_url: "test://localhost".into(),
        auth_token: "token".into(),
        retry_delay_ms: 0,
        ..Default::default()
    }
}

fn connected() -> ChatConnection<MockTransport> {
    let mut conn = ChatConnection::new(MockTransport::new(), test_config());
    conn.connect().unwrap();
    conn
}

fn direct(sender: &str, content: &str) -> ChatMessage {
    ChatMessage::direct(sender, "alice", content, "2026-08-08T10:00:00Z")
}

#[test]
fn test_subscribe_sends_frame() {
    let mut conn = connected();
    conn.subscribe("/topic/messages/alice").unwrap();

    let frames = conn.transport().sent_frames();
    assert_eq!(frames.len(), 1);
    assert!(
        matches!(&frames[0], Frame::Subscribe { topic, .. } if topic == "/topic/messages/alice")
    );
}

#[test]
fn test_unsubscribe_sends_frame_and_forgets_topic() {
    let mut conn = connected();
    let handle = conn.subscribe("/topic/group/42").unwrap();
    conn.unsubscribe(handle);

    assert_eq!(conn.subscription_count(), 0);
    assert!(!conn.is_subscribed("/topic/group/42"));
    let frames = conn.transport().sent_frames();
    assert!(matches!(frames[1], Frame::Unsubscribe { .. }));
}

#[test]
fn test_stale_handle_is_ignored() {
    let mut conn = connected();
    let handle = conn.subscribe("/topic/group/42").unwrap();
    conn.unsubscribe(handle);
    conn.transport_mut().clear_sent();

    conn.unsubscribe(handle);
    assert!(conn.transport().sent_frames().is_empty());
}

#[test]
fn test_inbound_delivery_for_subscribed_topic() {
    let mut conn = connected();
    conn.subscribe("/topic/messages/alice").unwrap();
    conn.transport_mut().queue_receive(Frame::Message {
        topic: "/topic/messages/alice".into(),
        message: direct("bob", "hi"),
    });

    let inbound = conn.process_incoming();
    assert_eq!(inbound.len(), 1);
    assert_eq!(inbound[0].message.content, "hi");
}

#[test]
fn test_inbound_for_unsubscribed_topic_is_dropped() {
    let mut conn = connected();
    conn.subscribe("/topic/messages/alice").unwrap();
    conn.transport_mut().queue_receive(Frame::Message {
        topic: "/topic/group/42".into(),
        message: ChatMessage::group("bob", "42", "psst", "T1"),
    });

    assert!(conn.process_incoming().is_empty());
}

#[test]
fn test_inbound_preserves_receipt_order() {
    let mut conn = connected();
    conn.subscribe("/topic/messages/alice").unwrap();
    for content in ["one", "two", "three"] {
        conn.transport_mut().queue_receive(Frame::Message {
            topic: "/topic/messages/alice".into(),
            message: direct("bob", content),
        });
    }

    let contents: Vec<_> = conn
        .process_incoming()
        .into_iter()
        .map(|f| f.message.content)
        .collect();
    assert_eq!(contents, ["one", "two", "three"]);
}

#[test]
fn test_publish_sends_to_destination() {
    let mut conn = connected();
    conn.publish("/app/chat", &direct("alice", "hi")).unwrap();

    let frames = conn.transport().sent_frames();
    assert!(matches!(&frames[0], Frame::Send { destination, .. } if destination == "/app/chat"));
}

#[test]
fn test_publish_on_broken_socket_reports_not_connected() {
    let mut conn = connected();
    conn.transport_mut().break_connection();

    let result = conn.publish("/app/chat", &direct("alice", "hi"));
    assert!(matches!(result, Err(NetworkError::NotConnected)));
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

#[test]
fn test_disconnect_releases_subscriptions() {
    let mut conn = connected();
    conn.subscribe("/topic/messages/alice").unwrap();
    conn.subscribe("/topic/group/42").unwrap();

    conn.disconnect();
    assert_eq!(conn.subscription_count(), 0);
    assert_eq!(conn.state(), ConnectionState::Disconnected);

    // Safe to repeat.
    conn.disconnect();
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

#[test]
fn test_process_incoming_while_disconnected_is_empty() {
    let mut conn = ChatConnection::new(MockTransport::new(), test_config());
    assert!(conn.process_incoming().is_empty());
}
