// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch document metadata and thumbnail lookup with shared caches.
//!
//! Caches are read-mostly and keyed by document id; fetch completions
//! overwrite whole entries, so readers always observe either the previous
//! or the fully updated value. Ids the service does not know resolve to
//! absent entries, never to an error for the whole batch.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use ragline_config::RaglineConfig;
use ragline_core::{DocumentInfo, DocumentLookup, RaglineError};

use crate::envelope::ApiEnvelope;

/// HTTP client for the document endpoints, with per-id caches.
#[derive(Debug)]
pub struct DocumentClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    info_cache: DashMap<String, DocumentInfo>,
    thumbnail_cache: DashMap<String, String>,
}

impl DocumentClient {
    pub fn new(config: &RaglineConfig) -> Result<Self, RaglineError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.server.timeout_secs))
            .build()
            .map_err(|e| RaglineError::transport("failed to build HTTP client", e))?;
        Ok(Self {
            http,
            base_url: config.server.base_url.trim_end_matches('/').to_string(),
            api_token: config.server.api_token.clone(),
            info_cache: DashMap::new(),
            thumbnail_cache: DashMap::new(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Fetches thumbnails for the given ids, consulting the cache first.
    ///
    /// Returns a map holding only the ids the service knows thumbnails for.
    pub async fn thumbnails(
        &self,
        document_ids: &[String],
    ) -> Result<HashMap<String, String>, RaglineError> {
        let mut found = HashMap::new();
        let mut missing = Vec::new();
        for id in document_ids {
            match self.thumbnail_cache.get(id) {
                Some(url) => {
                    found.insert(id.clone(), url.value().clone());
                }
                None => missing.push(id.clone()),
            }
        }

        if missing.is_empty() {
            return Ok(found);
        }

        debug!(count = missing.len(), "fetching thumbnails");
        let url = format!("{}/v1/document/thumbnails", self.base_url);
        let mut req = self.http.get(&url).query(&[("doc_ids", missing.join(","))]);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }
        let response = req
            .send()
            .await
            .map_err(|e| RaglineError::transport("thumbnail request failed", e))?;
        let envelope: ApiEnvelope<HashMap<String, String>> = decode(response).await?;
        let fetched = envelope.into_data()?;

        for (id, thumbnail) in fetched {
            self.thumbnail_cache.insert(id.clone(), thumbnail.clone());
            found.insert(id, thumbnail);
        }
        Ok(found)
    }

    /// Fetches metadata for the given ids, consulting the cache first.
    ///
    /// The result preserves request order; unknown ids are simply absent.
    pub async fn infos(
        &self,
        document_ids: &[String],
    ) -> Result<Vec<DocumentInfo>, RaglineError> {
        let missing: Vec<String> = document_ids
            .iter()
            .filter(|id| !self.info_cache.contains_key(*id))
            .cloned()
            .collect();

        if !missing.is_empty() {
            debug!(count = missing.len(), "fetching document infos");
            let url = format!("{}/v1/document/infos", self.base_url);
            let body = serde_json::json!({ "doc_ids": missing });
            let mut req = self.http.post(&url).json(&body);
            if let Some(token) = &self.api_token {
                req = req.bearer_auth(token);
            }
            let response = req
                .send()
                .await
                .map_err(|e| RaglineError::transport("document info request failed", e))?;
            let envelope: ApiEnvelope<Vec<DocumentInfo>> = decode(response).await?;
            for info in envelope.into_data()? {
                self.info_cache.insert(info.id.clone(), info);
            }
        }

        Ok(document_ids
            .iter()
            .filter_map(|id| self.info_cache.get(id).map(|entry| entry.value().clone()))
            .collect())
    }
}

#[async_trait]
impl DocumentLookup for DocumentClient {
    async fn resolve_thumbnail(&self, document_id: &str) -> Result<Option<String>, RaglineError> {
        let found = self.thumbnails(&[document_id.to_string()]).await?;
        Ok(found.get(document_id).cloned())
    }

    async fn resolve_document_infos(
        &self,
        document_ids: &[String],
    ) -> Result<Vec<DocumentInfo>, RaglineError> {
        self.infos(document_ids).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
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

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> DocumentClient {
        let config = ragline_config::load_config_from_str("").unwrap();
        DocumentClient::new(&config)
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    #[tokio::test]
    async fn missing_ids_are_absent_not_errors() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "code": 0, "message": "",
            "data": {"d1": "thumb-1"}
        });
        Mock::given(method("GET"))
            .and(path("/v1/document/thumbnails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let found = client
            .thumbnails(&["d1".into(), "unknown".into()])
            .await
            .unwrap();
        assert_eq!(found.get("d1").map(String::as_str), Some("thumb-1"));
        assert!(!found.contains_key("unknown"));
    }

    #[tokio::test]
    async fn thumbnail_cache_prevents_refetch() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "code": 0, "message": "",
            "data": {"d1": "thumb-1"}
        });
        Mock::given(method("GET"))
            .and(path("/v1/document/thumbnails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let first = client.resolve_thumbnail("d1").await.unwrap();
        let second = client.resolve_thumbnail("d1").await.unwrap();
        assert_eq!(first.as_deref(), Some("thumb-1"));
        assert_eq!(second.as_deref(), Some("thumb-1"));
    }

    #[tokio::test]
    async fn infos_preserve_request_order() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "code": 0, "message": "",
            "data": [
                {"id": "d2", "name": "two.pdf"},
                {"id": "d1", "name": "one.pdf"}
            ]
        });
        Mock::given(method("POST"))
            .and(path("/v1/document/infos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let infos = client
            .infos(&["d1".into(), "d2".into(), "d3".into()])
            .await
            .unwrap();
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["one.pdf", "two.pdf"]);
    }

    #[tokio::test]
    async fn non_zero_code_fails_the_batch_call() {
        let server = MockServer::start().await;
        let body = serde_json::json!({"code": 401, "message": "Unauthorized", "data": null});
        Mock::given(method("POST"))
            .and(path("/v1/document/infos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.infos(&["d1".into()]).await;
        assert!(matches!(result, Err(RaglineError::Api { code: 401, .. })));
    }
}
