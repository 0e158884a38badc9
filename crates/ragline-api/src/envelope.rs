// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `{code, message, data}` response envelope.
//!
//! Every unary endpoint wraps its payload in this envelope; a non-zero
//! `code` is an application-level failure even when the HTTP status is 200.

use serde::Deserialize;

use ragline_core::RaglineError;

/// Wire envelope around one endpoint's payload.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the payload, mapping a non-zero `code` to [`RaglineError::Api`].
    pub fn into_data(self) -> Result<T, RaglineError> {
        if self.code != 0 {
            return Err(RaglineError::Api {
                code: self.code,
                message: self.message,
            });
        }
        self.data
            .ok_or_else(|| RaglineError::Internal("response envelope carried no data".into()))
    }
}
