// SPDX-FileCopyrightText: 2026 Palaver Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types
//!
//! Unified error type for the client API layer.

use thiserror::Error;

use crate::history::HistoryError;
use crate::network::NetworkError;
use crate::session::SessionError;

/// Unified error type for chat client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No usable credential; fatal for the whole session, never retried.
    #[error("unauthenticated: no credential")]
    Unauthenticated,

    /// Network operation failed.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// History fetch failed.
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    /// Session operation failed.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

/// Result type for chat client operations.
pub type ClientResult<T> = Result<T, ClientError>;
