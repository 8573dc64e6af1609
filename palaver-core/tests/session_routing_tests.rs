//! Tests for session::routing
//!
//! Topic/destination mapping, the swap protocol and its direct-vs-group
//! asymmetry, and inbound frame filtering.

use palaver_core::network::{
    ChatConnection, ChatMessage, Frame, InboundFrame, MockTransport, TransportConfig,
};
use palaver_core::session::{
    ConversationRef, TopicRouter, DIRECT_DESTINATION, GROUP_DESTINATION,
};

fn connected() -> ChatConnection<MockTransport> {
    let config = TransportConfig {
        server_url: "test://localhost".into(),
        auth_token: "token".into(),
        retry_delay_ms: 0,
        ..Default::default()
    };
    let mut conn = ChatConnection::new(MockTransport::new(), config);
    conn.connect().unwrap();
    conn
}

fn subscribes(frames: &[Frame]) -> Vec<&str> {
    frames
        .iter()
        .filter_map(|f| match f {
            Frame::Subscribe { topic, .. } => Some(topic.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_conversation_ref_accessors() {
    let direct = ConversationRef::direct("bob");
    assert!(!direct.is_group());
    assert_eq!(direct.title(), "bob");

    let group = ConversationRef::group("42", "Ops");
    assert!(group.is_group());
    assert_eq!(group.title(), "Ops");

    // Identity is the group id; the display name is presentation only.
    assert_ne!(group, ConversationRef::group("43", "Ops"));
}

#[test]
fn test_route_for_direct_keyed_by_local_user() {
    let router = TopicRouter::new("alice");
    let route = router.route_for(&ConversationRef::direct("bob"));

    // The inbound topic is keyed by the local username, not the peer.
    assert_eq!(route.topic, "/topic/messages/alice");
    assert_eq!(route.destination, DIRECT_DESTINATION);
}

#[test]
fn test_route_for_group_keyed_by_group_id() {
    let router = TopicRouter::new("alice");
    let route = router.route_for(&ConversationRef::group("42", "Ops"));

    assert_eq!(route.topic, "/topic/group/42");
    assert_eq!(route.destination, GROUP_DESTINATION);
}

#[test]
fn test_direct_to_direct_switch_needs_no_resubscribe() {
    let mut conn = connected();
    let mut router = TopicRouter::new("alice");

    router.swap(&mut conn, &ConversationRef::direct("bob")).unwrap();
    conn.transport_mut().clear_sent();

    router.swap(&mut conn, &ConversationRef::direct("carol")).unwrap();
    assert!(conn.transport().sent_frames().is_empty());
    assert_eq!(conn.subscription_count(), 1);
}

#[test]
fn test_direct_to_group_switch_unsubscribes_then_subscribes() {
    let mut conn = connected();
    let mut router = TopicRouter::new("alice");

    router.swap(&mut conn, &ConversationRef::direct("bob")).unwrap();
    conn.transport_mut().clear_sent();

    router.swap(&mut conn, &ConversationRef::group("42", "Ops")).unwrap();

    let frames = conn.transport().sent_frames();
    assert_eq!(frames.len(), 2);
    assert!(matches!(frames[0], Frame::Unsubscribe { .. }));
    assert!(matches!(&frames[1], Frame::Subscribe { topic, .. } if topic == "/topic/group/42"));
    assert_eq!(conn.subscription_count(), 1);
}

#[test]
fn test_group_to_group_switch_resubscribes() {
    let mut conn = connected();
    let mut router = TopicRouter::new("alice");

    router.swap(&mut conn, &ConversationRef::group("42", "Ops")).unwrap();
    conn.transport_mut().clear_sent();

    router.swap(&mut conn, &ConversationRef::group("43", "Dev")).unwrap();

    let frames = conn.transport().sent_frames();
    assert!(matches!(frames[0], Frame::Unsubscribe { .. }));
    assert_eq!(subscribes(frames), ["/topic/group/43"]);
    assert!(!conn.is_subscribed("/topic/group/42"));
    assert!(conn.is_subscribed("/topic/group/43"));
}

#[test]
fn test_swap_while_disconnected_fails_and_holds_no_route() {
    let config = TransportConfig::default();
    let mut conn = ChatConnection::new(MockTransport::new(), config);
    let mut router = TopicRouter::new("alice");

    let result = router.swap(&mut conn, &ConversationRef::direct("bob"));
    assert!(result.is_err());
    assert_eq!(router.active_destination(), None);
}

#[test]
fn test_reestablish_after_socket_replacement() {
    let mut conn = connected();
    let mut router = TopicRouter::new("alice");
    router.swap(&mut conn, &ConversationRef::group("42", "Ops")).unwrap();

    // Drop and reconnect: the connection forgot its subscriptions.
    conn.transport_mut().break_connection();
    conn.process_incoming();
    conn.maintain();
    assert_eq!(conn.subscription_count(), 0);

    router
        .reestablish(&mut conn, &ConversationRef::group("42", "Ops"))
        .unwrap();
    assert_eq!(conn.subscription_count(), 1);
    assert!(conn.is_subscribed("/topic/group/42"));
}

#[test]
fn test_accepts_filters_group_cross_talk() {
    let mut conn = connected();
    let mut router = TopicRouter::new("alice");
    router.swap(&mut conn, &ConversationRef::group("42", "Ops")).unwrap();

    let matching = InboundFrame {
        topic: "/topic/group/42".into(),
        message: ChatMessage::group("bob", "42", "hi", "T1"),
    };
    let stale = InboundFrame {
        topic: "/topic/group/42".into(),
        message: ChatMessage::group("bob", "41", "old", "T0"),
    };
    let missing_id = InboundFrame {
        topic: "/topic/group/42".into(),
        message: ChatMessage::direct("bob", "alice", "odd", "T0"),
    };

    assert!(router.accepts(&matching));
    assert!(!router.accepts(&stale));
    assert!(!router.accepts(&missing_id));
}

#[test]
fn test_accepts_filters_non_active_peer_on_shared_topic() {
    let mut conn = connected();
    let mut router = TopicRouter::new("alice");
    router.swap(&mut conn, &ConversationRef::direct("bob")).unwrap();

    let from_active_peer = InboundFrame {
        topic: "/topic/messages/alice".into(),
        message: ChatMessage::direct("bob", "alice", "hi", "T1"),
    };
    let from_other_peer = InboundFrame {
        topic: "/topic/messages/alice".into(),
        message: ChatMessage::direct("carol", "alice", "psst", "T1"),
    };

    assert!(router.accepts(&from_active_peer));
    assert!(!router.accepts(&from_other_peer));
}

#[test]
fn test_accepts_nothing_without_active_route() {
    let router = TopicRouter::new("alice");
    let frame = InboundFrame {
        topic: "/topic/messages/alice".into(),
        message: ChatMessage::direct("bob", "alice", "hi", "T1"),
    };
    assert!(!router.accepts(&frame));
}
