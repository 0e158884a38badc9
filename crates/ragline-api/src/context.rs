// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The client context aggregate.
//!
//! One explicitly constructed object holding the configured service
//! clients, built once at application start and passed to the components
//! that need it. Nothing here is a global; tests construct as many
//! independent contexts as they like.

use tracing::info;

use ragline_config::RaglineConfig;
use ragline_core::RaglineError;
use ragline_stream::{CompletionClient, Completions};

use crate::conversations::ConversationClient;
use crate::documents::DocumentClient;

/// All service clients for one configured backend.
#[derive(Debug)]
pub struct ClientContext {
    pub config: RaglineConfig,
    pub conversations: ConversationClient,
    pub documents: DocumentClient,
    pub completions: Completions,
}

impl ClientContext {
    /// Builds every client from one configuration.
    pub fn new(config: RaglineConfig) -> Result<Self, RaglineError> {
        let conversations = ConversationClient::new(&config)?;
        let documents = DocumentClient::new(&config)?;
        let completions = Completions::new(CompletionClient::new(&config)?, &config.stream);

        info!(base_url = %config.server.base_url, "client context initialized");

        Ok(Self {
            config,
            conversations,
            documents,
            completions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_builds_from_default_config() {
        let config = ragline_config::load_config_from_str("").unwrap();
        let context = ClientContext::new(config).unwrap();
        assert_eq!(context.config.server.base_url, "http://127.0.0.1:9380");
    }
}
