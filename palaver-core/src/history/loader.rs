// SPDX-FileCopyrightText: 2026 Palaver Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! History Loader
//!
//! Fetches the durable message backlog for a conversation from the
//! collaborating read API. Direct history is keyed by peer username, group
//! history by group id; the two read operations stay separate because no
//! unified conversation id exists server-side.

use std::time::Duration;

use thiserror::Error;

use crate::network::ChatMessage;
use crate::session::ConversationRef;

/// Errors that can occur while fetching history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// HTTP error with status code.
    #[error("HTTP error: {0}")]
    Http(u16),

    /// Network/request error.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read access to the message backlog.
///
/// History failure is never fatal for a session: the timeline degrades to
/// live-only until the next conversation switch.
pub trait HistoryApi {
    /// Fetches the direct-message backlog with `peer`, oldest first.
    fn direct_history(&self, peer: &str) -> Result<Vec<ChatMessage>, HistoryError>;

    /// Fetches the backlog of group `group_id`, oldest first.
    fn group_history(&self, group_id: &str) -> Result<Vec<ChatMessage>, HistoryError>;

    /// Fetches the backlog for a conversation.
    fn load(&self, conversation: &ConversationRef) -> Result<Vec<ChatMessage>, HistoryError> {
        match conversation {
            ConversationRef::Direct { peer } => self.direct_history(peer),
            ConversationRef::Group { group_id, .. } => self.group_history(group_id),
        }
    }
}

/// History loader backed by the REST read API.
///
/// # Example
///
/// ```ignore
/// use palaver_core::history::{HistoryApi, RestHistoryLoader};
///
/// let loader = RestHistoryLoader::new("https://chat.example.com", token)?;
/// let backlog = loader.direct_history("bob")?;
/// ```
pub struct RestHistoryLoader {
    client: reqwest::blocking::Client,
    base_url: String,
    auth_token: String,
}

impl RestHistoryLoader {
    /// Creates a loader for the given API base URL and credential.
    pub fn new(base_url: &str, auth_token: &str) -> Result<Self, HistoryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(format!(
                "Palaver/{}",
                option_env!("CARGO_PKG_VERSION").unwrap_or("0.1.0")
            ))
            .build()?;

        Ok(RestHistoryLoader {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.trim().to_string(),
        })
    }

    /// The API base URL this loader targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch(&self, path: &str, query: (&str, &str)) -> Result<Vec<ChatMessage>, HistoryError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(&[query])
            .bearer_auth(&self.auth_token)
            .send()?;

        if !response.status().is_success() {
            return Err(HistoryError::Http(response.status().as_u16()));
        }

        Ok(response.json()?)
    }
}

impl HistoryApi for RestHistoryLoader {
    fn direct_history(&self, peer: &str) -> Result<Vec<ChatMessage>, HistoryError> {
        self.fetch("/api/messages/history", ("friendUsername", peer))
    }

    fn group_history(&self, group_id: &str) -> Result<Vec<ChatMessage>, HistoryError> {
        self.fetch("/api/group-messages/history", ("groupId", group_id))
    }
}

/// Scripted history source for tests.
#[derive(Default)]
pub struct MockHistoryLoader {
    direct: std::collections::HashMap<String, Vec<ChatMessage>>,
    groups: std::collections::HashMap<String, Vec<ChatMessage>>,
    fail: bool,
    calls: std::cell::RefCell<Vec<String>>,
}

impl MockHistoryLoader {
    /// Creates an empty mock loader (every backlog empty).
    pub fn new() -> Self {
        MockHistoryLoader::default()
    }

    /// Scripts the backlog returned for a direct peer.
    pub fn set_direct(&mut self, peer: &str, messages: Vec<ChatMessage>) {
        self.direct.insert(peer.to_string(), messages);
    }

    /// Scripts the backlog returned for a group.
    pub fn set_group(&mut self, group_id: &str, messages: Vec<ChatMessage>) {
        self.groups.insert(group_id.to_string(), messages);
    }

    /// Makes every fetch fail (history unavailable).
    pub fn fail(&mut self, fail: bool) {
        self.fail = fail;
    }

    /// Conversation keys fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl HistoryApi for MockHistoryLoader {
    fn direct_history(&self, peer: &str) -> Result<Vec<ChatMessage>, HistoryError> {
        self.calls.borrow_mut().push(format!("direct:{}", peer));
        if self.fail {
            return Err(HistoryError::Http(503));
        }
        Ok(self.direct.get(peer).cloned().unwrap_or_default())
    }

    fn group_history(&self, group_id: &str) -> Result<Vec<ChatMessage>, HistoryError> {
        self.calls.borrow_mut().push(format!("group:{}", group_id));
        if self.fail {
            return Err(HistoryError::Http(503));
        }
        Ok(self.groups.get(group_id).cloned().unwrap_or_default())
    }
}
