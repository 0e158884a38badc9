// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST wrappers and the client context for the Ragline chat client.
//!
//! Conversation CRUD and message-level operations, batch document
//! metadata/thumbnail lookup with shared caches, and the explicitly
//! constructed [`ClientContext`] aggregate.

pub mod context;
pub mod conversations;
pub mod documents;
pub mod envelope;

pub use context::ClientContext;
pub use conversations::{ConversationClient, ConversationPayload, ConversationSummary, RawMessage};
pub use documents::DocumentClient;
pub use envelope::ApiEnvelope;
