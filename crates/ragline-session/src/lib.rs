// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state for the Ragline chat client.
//!
//! Per-session ordered message lists with collision-free ids, the
//! streaming placeholder lifecycle, per-session load serialization, and
//! the history/reference alignment adapters.

pub mod history;
pub mod store;

pub use history::{align_references, align_references_skipping_prologue};
pub use store::{ConversationStore, Session, SessionSummary};
