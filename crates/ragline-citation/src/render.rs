// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Citation rendering: splits a normalized answer into render-ready
//! segments.
//!
//! The scanner walks the text for canonical `[ID:n]` tokens and resolves
//! each against the [`ReferenceIndex`]. Visual chunks (image/table/diagram)
//! become inline media segments; everything else becomes a hover indicator
//! with a sanitized preview. Plain runs pass through untouched for the
//! downstream Markdown/LaTeX backend.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use ragline_core::{DocType, DocumentAggregate, ReferenceChunk};

use crate::index::ReferenceIndex;

/// Canonical citation token: `[ID:3]`.
static CITATION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[ID:(\d+)\]").unwrap());

/// What activating a citation does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClickAction {
    /// Open the owning document in the viewer (PDF sources).
    OpenDocument { document_id: String },
    /// Open the document's external URL in a new context.
    OpenUrl { url: String },
    /// Nothing to open; activation is a no-op.
    None,
}

/// Preview content revealed by a hover indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CitationPreview {
    /// Chunk content reduced to plain text. Never carries markup: the
    /// upstream content is untrusted.
    pub content: String,
    pub image_id: Option<String>,
    pub document_name: Option<String>,
    pub click: Option<ClickAction>,
}

/// One render-ready piece of an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// A plain text/markdown run, untouched.
    Text { text: String },
    /// An inline media citation (image/table/diagram chunk).
    InlineImage {
        ordinal: usize,
        image_id: Option<String>,
        click: ClickAction,
    },
    /// A small inline marker revealing a preview on hover/activation.
    Indicator {
        ordinal: usize,
        preview: CitationPreview,
    },
}

/// Splits normalized answer text into segments, resolving every citation
/// token through `index`.
///
/// Resolution misses render as indicators with empty previews; this
/// function never fails.
pub fn render(text: &str, index: &ReferenceIndex<'_>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in CITATION_TOKEN.captures_iter(text) {
        let Some(token) = caps.get(0) else {
            continue;
        };
        if token.start() > cursor {
            segments.push(Segment::Text {
                text: text[cursor..token.start()].to_string(),
            });
        }
        cursor = token.end();

        // Tokens carry at most a handful of digits in practice; anything
        // unparseable is simply an unresolvable ordinal.
        let ordinal: usize = caps[1].parse().unwrap_or(0);
        segments.push(citation_segment(ordinal, index));
    }

    if cursor < text.len() {
        segments.push(Segment::Text {
            text: text[cursor..].to_string(),
        });
    }

    segments
}

fn citation_segment(ordinal: usize, index: &ReferenceIndex<'_>) -> Segment {
    let Some(resolved) = index.lookup(ordinal) else {
        debug!(ordinal, "citation ordinal did not resolve");
        return Segment::Indicator {
            ordinal,
            preview: CitationPreview::default(),
        };
    };

    let chunk = resolved.chunk;
    let click = click_action(chunk, resolved.aggregate);

    if chunk.doc_type.as_ref().is_some_and(DocType::is_visual) {
        return Segment::InlineImage {
            ordinal,
            image_id: chunk.image_id.clone(),
            click,
        };
    }

    Segment::Indicator {
        ordinal,
        preview: CitationPreview {
            content: sanitize_content(&chunk.content),
            image_id: chunk.image_id.clone(),
            document_name: document_name(chunk, resolved.aggregate),
            click: Some(click),
        },
    }
}

/// Decides what activating a citation opens.
///
/// PDFs open in the document viewer; other documents open their external
/// URL when the aggregate carries one; otherwise activation is a no-op.
fn click_action(chunk: &ReferenceChunk, aggregate: Option<&DocumentAggregate>) -> ClickAction {
    let name = document_name(chunk, aggregate);
    let is_pdf = name
        .as_deref()
        .is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"));

    if is_pdf && !chunk.document_id.is_empty() {
        return ClickAction::OpenDocument {
            document_id: chunk.document_id.clone(),
        };
    }

    if let Some(url) = aggregate.and_then(|agg| agg.url.clone()) {
        return ClickAction::OpenUrl { url };
    }

    ClickAction::None
}

fn document_name(
    chunk: &ReferenceChunk,
    aggregate: Option<&DocumentAggregate>,
) -> Option<String> {
    chunk
        .document_name
        .clone()
        .or_else(|| aggregate.map(|agg| agg.document_name.clone()))
}

/// Reduces possibly HTML-bearing chunk content to plain text.
///
/// The RAG service stores highlighted snippets as HTML fragments; they are
/// untrusted and must never reach the preview panel as markup.
pub fn sanitize_content(content: &str) -> String {
    html2text::from_read(content.as_bytes(), 400)
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}
