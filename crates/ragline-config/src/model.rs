// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Ragline chat client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Ragline configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RaglineConfig {
    /// RAG service endpoint settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Streaming completion settings.
    #[serde(default)]
    pub stream: StreamConfig,
}

/// RAG service endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL of the RAG service API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token attached to every request when set.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Request timeout in seconds. Streaming answers can run long.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:9380".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

/// Streaming completion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// Capacity of the snapshot channel between the assembler task and the
    /// consumer. Backpressure beyond this holds the network read.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    32
}
