// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming completion pipeline for the Ragline chat client.
//!
//! Consumes the RAG service's server-sent event stream of cumulative
//! answer snapshots and reference payloads, and exposes it as a
//! cancellable channel of [`StreamUpdate`]s.

pub mod assembler;
pub mod client;
pub mod sse;

pub use assembler::{CompletionStream, Completions, StreamUpdate};
pub use client::{CompletionClient, CompletionRequest, OutboundMessage};
pub use sse::{AnswerFrame, CompletionFrame};
