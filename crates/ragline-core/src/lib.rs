// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Ragline chat client.
//!
//! This crate provides the shared domain types, the workspace error enum,
//! and the trait seams used by the streaming, citation, session, and API
//! crates. It holds no I/O of its own.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RaglineError;
pub use traits::DocumentLookup;
pub use types::{
    DocType, DocumentAggregate, DocumentInfo, Message, MessageId, MessageRole, ReferenceChunk,
    ReferenceSet, SessionId,
};
