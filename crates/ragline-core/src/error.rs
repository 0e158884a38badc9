// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Ragline client core.

use thiserror::Error;

/// The primary error type used across all Ragline crates.
///
/// Cancellation deliberately has no variant here: an aborted stream ends
/// cleanly and must never surface through the error channel.
#[derive(Debug, Error)]
pub enum RaglineError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failures (connection refused, non-success HTTP status,
    /// the event stream breaking mid-answer).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Application-level failure reported inside a `{code, message, data}`
    /// envelope. Non-zero `code` is a failure even on HTTP 200.
    #[error("api error (code {code}): {message}")]
    Api { code: i64, message: String },

    /// Conversation state errors (unknown session, finalizing a message
    /// that was never opened).
    #[error("session error: {0}")]
    Session(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RaglineError {
    /// Convenience constructor for transport failures wrapping an underlying error.
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RaglineError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
