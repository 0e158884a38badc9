// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Ragline workspace.
//!
//! Wire-facing structs mirror the RAG service's JSON field names
//! (`doc_aggs`, `doc_id`, ...) via serde attributes and tolerate missing
//! fields: the upstream is a best-effort generative backend and payloads
//! are frequently partial.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Unique identifier for a message within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Kind of source document a reference chunk was retrieved from.
///
/// The service emits free-form strings; the three visual kinds get their
/// own variants because they drive inline-image rendering, everything else
/// round-trips through [`DocType::Other`] and takes the textual path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocType {
    Text,
    Image,
    Table,
    Diagram,
    Other(String),
}

impl DocType {
    /// True for kinds rendered as an inline image rather than a hover card.
    pub fn is_visual(&self) -> bool {
        matches!(self, DocType::Image | DocType::Table | DocType::Diagram)
    }
}

impl From<String> for DocType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "text" => DocType::Text,
            "image" => DocType::Image,
            "table" => DocType::Table,
            "diagram" => DocType::Diagram,
            _ => DocType::Other(raw),
        }
    }
}

impl From<DocType> for String {
    fn from(value: DocType) -> Self {
        match value {
            DocType::Text => "text".into(),
            DocType::Image => "image".into(),
            DocType::Table => "table".into(),
            DocType::Diagram => "diagram".into(),
            DocType::Other(raw) => raw,
        }
    }
}

/// One retrieved passage backing an assistant answer. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReferenceChunk {
    pub id: String,
    pub content: String,
    pub document_id: String,
    pub document_name: Option<String>,
    pub dataset_id: Option<String>,
    pub image_id: Option<String>,
    pub doc_type: Option<DocType>,
    pub similarity: Option<f64>,
    pub vector_similarity: Option<f64>,
    pub term_similarity: Option<f64>,
    /// Byte/char positions within the source document, opaque to the client.
    pub positions: Option<Vec<Vec<i64>>>,
    pub url: Option<String>,
}

/// Per-document rollup across the chunks of one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocumentAggregate {
    #[serde(rename = "doc_id")]
    pub document_id: String,
    #[serde(rename = "doc_name")]
    pub document_name: String,
    #[serde(rename = "count")]
    pub chunk_count: u64,
    pub url: Option<String>,
}

/// The bundle of retrieved passages and document rollups backing one
/// assistant answer.
///
/// Ordinal position in `chunks` is the addressing scheme citation tokens
/// use (1-based). A reference set is attached to exactly one assistant
/// message and replaced wholesale whenever a newer streaming frame
/// supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReferenceSet {
    pub chunks: Vec<ReferenceChunk>,
    #[serde(rename = "doc_aggs")]
    pub aggregates: Vec<DocumentAggregate>,
    pub total: Option<u64>,
}

impl ReferenceSet {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty() && self.aggregates.is_empty()
    }
}

/// One turn in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceSet>,
}

impl Message {
    pub fn new(id: MessageId, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            role,
            timestamp: Utc::now(),
            reference: None,
        }
    }
}

/// Metadata for a source document, from the batch document-info endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocumentInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub size: Option<u64>,
    pub thumbnail: Option<String>,
}
