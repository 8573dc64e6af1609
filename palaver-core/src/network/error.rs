// SPDX-FileCopyrightText: 2026 Palaver Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network Error Types

use thiserror::Error;

/// Errors from the transport and connection layer.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Operation attempted while the connection is not established.
    #[error("not connected")]
    NotConnected,

    /// Connecting or handshaking with the endpoint failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The peer closed the connection unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receiving a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// An inbound frame could not be decoded.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
