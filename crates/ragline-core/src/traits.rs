// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams for services the core consumes but does not implement.

use async_trait::async_trait;

use crate::error::RaglineError;
use crate::types::DocumentInfo;

/// Lookup service for document metadata and thumbnails.
///
/// Backed by the batch document endpoints in production and by in-memory
/// stubs in tests. Missing ids resolve to empty/absent values rather than
/// failing the whole batch.
#[async_trait]
pub trait DocumentLookup {
    /// Resolves a thumbnail URL for one document. `None` when the service
    /// has no thumbnail for the id.
    async fn resolve_thumbnail(&self, document_id: &str) -> Result<Option<String>, RaglineError>;

    /// Resolves metadata for a batch of documents. Ids the service does
    /// not know are simply absent from the result.
    async fn resolve_document_infos(
        &self,
        document_ids: &[String],
    ) -> Result<Vec<DocumentInfo>, RaglineError>;
}
