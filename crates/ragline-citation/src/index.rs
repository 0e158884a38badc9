// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-answer citation lookup.
//!
//! Maps the 1-based ordinal a citation token carries to the reference
//! chunk it addresses and the owning document aggregate. The index is
//! rebuilt from scratch whenever the backing [`ReferenceSet`] changes; it
//! is never patched in place.

use std::collections::HashMap;

use ragline_core::{DocumentAggregate, ReferenceChunk, ReferenceSet};

/// A resolved citation: the chunk an ordinal addresses plus its document
/// rollup, when one exists.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub ordinal: usize,
    pub chunk: &'a ReferenceChunk,
    /// Absent when no aggregate matches the chunk's document id; the
    /// renderer degrades to no thumbnail/link rather than failing.
    pub aggregate: Option<&'a DocumentAggregate>,
}

/// Immutable ordinal lookup over one answer's reference set.
#[derive(Debug)]
pub struct ReferenceIndex<'a> {
    set: &'a ReferenceSet,
    by_document: HashMap<&'a str, &'a DocumentAggregate>,
}

impl<'a> ReferenceIndex<'a> {
    /// Builds the index for one reference set.
    pub fn new(set: &'a ReferenceSet) -> Self {
        let by_document = set
            .aggregates
            .iter()
            .map(|agg| (agg.document_id.as_str(), agg))
            .collect();
        Self { set, by_document }
    }

    /// Resolves a 1-based citation ordinal.
    ///
    /// Ordinal `n` addresses `chunks[n - 1]`; `0` and out-of-range
    /// ordinals resolve to `None`.
    pub fn lookup(&self, ordinal: usize) -> Option<Resolved<'a>> {
        let chunk = self.set.chunks.get(ordinal.checked_sub(1)?)?;
        let aggregate = self.by_document.get(chunk.document_id.as_str()).copied();
        Some(Resolved {
            ordinal,
            chunk,
            aggregate,
        })
    }

    /// Number of addressable chunks.
    pub fn len(&self) -> usize {
        self.set.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, document_id: &str) -> ReferenceChunk {
        ReferenceChunk {
            id: id.into(),
            content: format!("content of {id}"),
            document_id: document_id.into(),
            ..Default::default()
        }
    }

    fn sample_set() -> ReferenceSet {
        ReferenceSet {
            chunks: vec![chunk("a", "d1"), chunk("b", "d1"), chunk("c", "d2")],
            aggregates: vec![DocumentAggregate {
                document_id: "d1".into(),
                document_name: "doc-one.pdf".into(),
                chunk_count: 2,
                url: None,
            }],
            total: None,
        }
    }

    #[test]
    fn ordinal_addresses_one_based() {
        let set = sample_set();
        let index = ReferenceIndex::new(&set);

        let resolved = index.lookup(2).unwrap();
        assert_eq!(resolved.chunk.id, "b");
        assert_eq!(resolved.aggregate.unwrap().document_name, "doc-one.pdf");
    }

    #[test]
    fn out_of_range_ordinal_is_not_found() {
        let set = sample_set();
        let index = ReferenceIndex::new(&set);
        assert!(index.lookup(4).is_none());
        assert!(index.lookup(0).is_none());
    }

    #[test]
    fn missing_aggregate_degrades_to_none() {
        let set = sample_set();
        let index = ReferenceIndex::new(&set);

        let resolved = index.lookup(3).unwrap();
        assert_eq!(resolved.chunk.id, "c");
        assert!(resolved.aggregate.is_none());
    }

    #[test]
    fn rebuild_reflects_replaced_set() {
        let first = sample_set();
        let index = ReferenceIndex::new(&first);
        assert_eq!(index.len(), 3);

        let second = ReferenceSet {
            chunks: vec![chunk("z", "d9")],
            ..Default::default()
        };
        let index = ReferenceIndex::new(&second);
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup(1).unwrap().chunk.id, "z");
    }
}
