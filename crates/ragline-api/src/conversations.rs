// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST client for conversation CRUD and message-level operations.
//!
//! Thin wrappers over the `/v1/conversation/*` endpoints. All responses
//! use the `{code, message, data}` envelope; payload structs tolerate the
//! partial shapes the service actually emits.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use ragline_config::RaglineConfig;
use ragline_core::{Message, MessageId, MessageRole, RaglineError, ReferenceSet};

use crate::envelope::ApiEnvelope;

/// One message as stored by the service.
///
/// `role` stays a raw string here: history can contain `system` turns the
/// client filters out during conversion.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Epoch seconds.
    #[serde(default)]
    pub created_at: Option<f64>,
    #[serde(default)]
    pub thumbup: Option<bool>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// A full conversation as returned by `get` and the mutation endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationPayload {
    pub id: String,
    #[serde(default)]
    pub dialog_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: Vec<RawMessage>,
    /// Parallel array of reference sets, one per answered assistant turn.
    #[serde(default)]
    pub reference: Vec<ReferenceSet>,
}

impl ConversationPayload {
    /// Converts raw history into display messages.
    ///
    /// `system` turns are dropped; missing ids get locally generated ones.
    /// Reference alignment is the caller's concern (the pairing depends on
    /// whether the backend prepends a prologue turn).
    pub fn into_parts(self) -> (Vec<Message>, Vec<ReferenceSet>) {
        let messages = self
            .message
            .into_iter()
            .filter_map(|raw| {
                let role = match raw.role.as_str() {
                    "user" => MessageRole::User,
                    "assistant" => MessageRole::Assistant,
                    other => {
                        debug!(role = other, "dropping non-display turn");
                        return None;
                    }
                };
                let id = raw
                    .id
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let timestamp = raw
                    .created_at
                    .and_then(|secs| DateTime::<Utc>::from_timestamp(secs as i64, 0))
                    .unwrap_or_else(Utc::now);
                Some(Message {
                    id: MessageId(id),
                    content: raw.content,
                    role,
                    timestamp,
                    reference: None,
                })
            })
            .collect();
        (messages, self.reference)
    }
}

/// Summary row from the `list` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dialog_id: String,
}

/// HTTP client for the conversation endpoints.
#[derive(Debug, Clone)]
pub struct ConversationClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl ConversationClient {
    pub fn new(config: &RaglineConfig) -> Result<Self, RaglineError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.server.timeout_secs))
            .build()
            .map_err(|e| RaglineError::transport("failed to build HTTP client", e))?;
        Ok(Self {
            http,
            base_url: config.server.base_url.trim_end_matches('/').to_string(),
            api_token: config.server.api_token.clone(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Lists conversations belonging to a dialog, newest first.
    pub async fn list(&self, dialog_id: &str) -> Result<Vec<ConversationSummary>, RaglineError> {
        let url = format!("{}/v1/conversation/list", self.base_url);
        let envelope: ApiEnvelope<Vec<ConversationSummary>> = self
            .get_json(&url, &[("dialog_id", dialog_id)])
            .await?;
        envelope.into_data()
    }

    /// Fetches one conversation with its full message and reference arrays.
    pub async fn get(&self, conversation_id: &str) -> Result<ConversationPayload, RaglineError> {
        let url = format!("{}/v1/conversation/get", self.base_url);
        let envelope: ApiEnvelope<ConversationPayload> = self
            .get_json(&url, &[("conversation_id", conversation_id)])
            .await?;
        envelope.into_data()
    }

    /// Creates a conversation under a dialog with a locally generated id.
    pub async fn create(
        &self,
        dialog_id: &str,
        name: &str,
    ) -> Result<ConversationPayload, RaglineError> {
        let url = format!("{}/v1/conversation/set", self.base_url);
        let body = serde_json::json!({
            "conversation_id": Uuid::new_v4().to_string(),
            "dialog_id": dialog_id,
            "name": name,
            "is_new": true,
        });
        let envelope: ApiEnvelope<ConversationPayload> = self.post_json(&url, &body).await?;
        envelope.into_data()
    }

    /// Renames a conversation.
    pub async fn rename(
        &self,
        conversation_id: &str,
        name: &str,
    ) -> Result<ConversationPayload, RaglineError> {
        let url = format!("{}/v1/conversation/set", self.base_url);
        let body = serde_json::json!({
            "conversation_id": conversation_id,
            "name": name,
            "is_new": false,
        });
        let envelope: ApiEnvelope<ConversationPayload> = self.post_json(&url, &body).await?;
        envelope.into_data()
    }

    /// Deletes conversations by id.
    pub async fn remove(&self, conversation_ids: &[String]) -> Result<(), RaglineError> {
        let url = format!("{}/v1/conversation/rm", self.base_url);
        let body = serde_json::json!({ "conversation_ids": conversation_ids });
        let envelope: ApiEnvelope<bool> = self.post_json(&url, &body).await?;
        envelope.into_data().map(|_| ())
    }

    /// Removes a question/answer turn pair and its reference entry.
    pub async fn delete_message(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<ConversationPayload, RaglineError> {
        let url = format!("{}/v1/conversation/delete_msg", self.base_url);
        let body = serde_json::json!({
            "conversation_id": conversation_id,
            "message_id": message_id,
        });
        let envelope: ApiEnvelope<ConversationPayload> = self.post_json(&url, &body).await?;
        envelope.into_data()
    }

    /// Rates an assistant turn; `feedback` accompanies a thumbs-down.
    pub async fn feedback(
        &self,
        conversation_id: &str,
        message_id: &str,
        thumbs_up: bool,
        feedback: Option<&str>,
    ) -> Result<ConversationPayload, RaglineError> {
        let url = format!("{}/v1/conversation/thumbup", self.base_url);
        let body = serde_json::json!({
            "conversation_id": conversation_id,
            "message_id": message_id,
            "thumbup": thumbs_up,
            "feedback": feedback,
        });
        let envelope: ApiEnvelope<ConversationPayload> = self.post_json(&url, &body).await?;
        envelope.into_data()
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RaglineError> {
        let mut req = self.http.get(url).query(query);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }
        let response = req
            .send()
            .await
            .map_err(|e| RaglineError::transport("request failed", e))?;
        decode_response(response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, RaglineError> {
        let mut req = self.http.post(url).json(body);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }
        let response = req
            .send()
            .await
            .map_err(|e| RaglineError::transport("request failed", e))?;
        decode_response(response).await
    }
}

async fn decode_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, RaglineError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RaglineError::Transport {
            message: format!("endpoint returned {status}: {body}"),
            source: None,
        });
    }
    let body = response
        .text()
        .await
        .map_err(|e| RaglineError::transport("failed to read response body", e))?;
    serde_json::from_str(&body).map_err(|e| RaglineError::Transport {
        message: format!("failed to decode response: {e}"),
        source: Some(Box::new(e)),
    })
}
