// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Ragline chat client.
//!
//! Layered loading: compiled defaults, system and user TOML files, a local
//! `ragline.toml`, then `RAGLINE_*` environment variables.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{RaglineConfig, ServerConfig, StreamConfig};
