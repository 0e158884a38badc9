// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the completion streaming endpoint.
//!
//! Builds the request from config, attaches bearer auth, and hands the
//! event-stream response to the SSE decoder. A non-success status before
//! streaming begins is a hard failure; no automatic retry.

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use serde::Serialize;
use tracing::debug;

use ragline_config::RaglineConfig;
use ragline_core::RaglineError;

use crate::sse::{self, CompletionFrame};

/// Path of the completion endpoint relative to the configured base URL.
const COMPLETION_PATH: &str = "/v1/conversation/completion";

/// One outbound conversation turn in a completion request.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub content: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_ids: Option<Vec<String>>,
}

/// Request body for the completion endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub conversation_id: String,
    pub messages: Vec<OutboundMessage>,
}

/// HTTP client for completion streaming.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl CompletionClient {
    /// Creates a client from configuration.
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

    /// Opens the completion stream for one request.
    ///
    /// Awaits the response headers; a non-2xx status is surfaced as a
    /// transport failure with the response body folded into the message.
    pub async fn open_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<CompletionFrame, RaglineError>> + Send>>, RaglineError>
    {
        let url = format!("{}{COMPLETION_PATH}", self.base_url);
        let mut req = self.http.post(&url).json(request);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .await
            .map_err(|e| RaglineError::transport("completion request failed", e))?;

        let status = response.status();
        debug!(status = %status, conversation_id = %request.conversation_id, "completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RaglineError::Transport {
                message: format!("completion endpoint returned {status}: {body}"),
                source: None,
            });
        }

        Ok(sse::parse_frame_stream(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> CompletionClient {
        let config = ragline_config::load_config_from_str("").unwrap();
        CompletionClient::new(&config)
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    fn test_request() -> CompletionRequest {
        CompletionRequest {
            conversation_id: "conv-1".into(),
            messages: vec![OutboundMessage {
                content: "Hello".into(),
                role: "user".into(),
                id: Some("m1".into()),
                doc_ids: None,
            }],
        }
    }

    #[tokio::test]
    async fn open_stream_yields_decoded_frames() {
        let server = MockServer::start().await;
        let sse = concat!(
            "data:{\"code\":0,\"message\":\"\",\"data\":{\"answer\":\"Hi\",\"reference\":{}}}\n\n",
            "data:{\"code\":0,\"message\":\"\",\"data\":true}\n\n",
        );

        Mock::given(method("POST"))
            .and(path("/v1/conversation/completion"))
            .and(body_partial_json(
                serde_json::json!({"conversation_id": "conv-1"}),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let mut stream = client.open_stream(&test_request()).await.unwrap();

        match stream.next().await.unwrap().unwrap() {
            CompletionFrame::Answer(frame) => assert_eq!(frame.answer, "Hi"),
            other => panic!("expected Answer, got {other:?}"),
        }
        assert!(matches!(
            stream.next().await.unwrap().unwrap(),
            CompletionFrame::Done
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_hard_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/conversation/completion"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.open_stream(&test_request()).await;
        let err = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("502"), "got: {err}");
    }

    #[tokio::test]
    async fn garbled_frames_are_skipped_mid_stream() {
        let server = MockServer::start().await;
        let sse = concat!(
            "data:{\"code\":0,\"data\":{\"answer\":\"one\"}}\n\n",
            "data:{\"code\":0,\"data\":{\"ans\n\n",
            "data:{\"code\":0,\"data\":{\"answer\":\"two\"}}\n\n",
            "data:{\"code\":0,\"data\":true}\n\n",
        );

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let mut stream = client.open_stream(&test_request()).await.unwrap();

        let mut answers = Vec::new();
        while let Some(frame) = stream.next().await {
            match frame.unwrap() {
                CompletionFrame::Answer(f) => answers.push(f.answer),
                CompletionFrame::Done => break,
            }
        }
        assert_eq!(answers, vec!["one", "two"]);
    }
}
