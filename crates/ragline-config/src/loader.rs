// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./ragline.toml` > `~/.config/ragline/ragline.toml`
//! > `/etc/ragline/ragline.toml` with environment variable overrides via the
//! `RAGLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RaglineConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ragline/ragline.toml` (system-wide)
/// 3. `~/.config/ragline/ragline.toml` (user XDG config)
/// 4. `./ragline.toml` (local directory)
/// 5. `RAGLINE_*` environment variables
pub fn load_config() -> Result<RaglineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RaglineConfig::default()))
        .merge(Toml::file("/etc/ragline/ragline.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("ragline/ragline.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("ragline.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RaglineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RaglineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RaglineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RaglineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay unambiguous: `RAGLINE_SERVER_API_TOKEN` must map to
/// `server.api_token`, not `server.api.token`.
fn env_provider() -> Env {
    Env::prefixed("RAGLINE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("stream_", "stream.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_with_empty_toml() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.base_url, "http://127.0.0.1:9380");
        assert_eq!(config.server.api_token, None);
        assert_eq!(config.server.timeout_secs, 300);
        assert_eq!(config.stream.channel_capacity, 32);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [server]
            base_url = "https://rag.example.com"
            api_token = "ragflow-abc"

            [stream]
            channel_capacity = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "https://rag.example.com");
        assert_eq!(config.server.api_token.as_deref(), Some("ragflow-abc"));
        assert_eq!(config.stream.channel_capacity, 8);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [server]
            base_uri = "typo"
            "#,
        );
        assert!(result.is_err());
    }
}
