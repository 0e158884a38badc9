// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alignment of reloaded reference payloads to conversation messages.
//!
//! A fetched conversation carries its messages and a parallel array of
//! reference sets, one per answered assistant turn. The pairing is
//! positional, so alignment lives here as explicit, named functions rather
//! than an index calculation scattered through callers.

use tracing::debug;

use ragline_core::{Message, MessageRole, ReferenceSet};

/// Attaches `references[i]` to the i-th assistant message.
///
/// Extra references are ignored; assistant messages beyond the reference
/// array keep `None`. Never fails on ragged input.
pub fn align_references(messages: &mut [Message], references: &[ReferenceSet]) {
    let mut next = 0;
    for message in messages.iter_mut() {
        if message.role != MessageRole::Assistant {
            continue;
        }
        if let Some(reference) = references.get(next) {
            if !reference.is_empty() {
                message.reference = Some(reference.clone());
            }
        } else {
            debug!("assistant turn has no reference entry");
        }
        next += 1;
    }
}

/// Like [`align_references`], but skips the first assistant message.
///
/// The upstream service opens every conversation with an assistant
/// prologue turn that has no reference entry, shifting the positional
/// pairing by one. This adapter exists to absorb that quirk at the edge;
/// backends without the prologue turn should use [`align_references`]
/// directly.
pub fn align_references_skipping_prologue(
    messages: &mut [Message],
    references: &[ReferenceSet],
) {
    let mut seen_assistant = false;
    let mut next = 0;
    for message in messages.iter_mut() {
        if message.role != MessageRole::Assistant {
            continue;
        }
        if !seen_assistant {
            seen_assistant = true;
            continue;
        }
        if let Some(reference) = references.get(next)
            && !reference.is_empty()
        {
            message.reference = Some(reference.clone());
        }
        next += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragline_core::{MessageId, ReferenceChunk};

    fn message(id: &str, role: MessageRole) -> Message {
        Message::new(MessageId(id.into()), role, format!("content {id}"))
    }

    fn reference(chunk_id: &str) -> ReferenceSet {
        ReferenceSet {
            chunks: vec![ReferenceChunk {
                id: chunk_id.into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn references_pair_with_assistant_turns_in_order() {
        let mut messages = vec![
            message("u1", MessageRole::User),
            message("a1", MessageRole::Assistant),
            message("u2", MessageRole::User),
            message("a2", MessageRole::Assistant),
        ];
        align_references(&mut messages, &[reference("r1"), reference("r2")]);

        assert_eq!(messages[1].reference.as_ref().unwrap().chunks[0].id, "r1");
        assert_eq!(messages[3].reference.as_ref().unwrap().chunks[0].id, "r2");
        assert!(messages[0].reference.is_none());
    }

    #[test]
    fn ragged_reference_array_is_tolerated() {
        let mut messages = vec![
            message("a1", MessageRole::Assistant),
            message("a2", MessageRole::Assistant),
        ];
        align_references(&mut messages, &[reference("r1")]);

        assert!(messages[0].reference.is_some());
        assert!(messages[1].reference.is_none());
    }

    #[test]
    fn prologue_adapter_skips_first_assistant_turn() {
        let mut messages = vec![
            message("prologue", MessageRole::Assistant),
            message("u1", MessageRole::User),
            message("a1", MessageRole::Assistant),
            message("u2", MessageRole::User),
            message("a2", MessageRole::Assistant),
        ];
        align_references_skipping_prologue(&mut messages, &[reference("r1"), reference("r2")]);

        assert!(messages[0].reference.is_none());
        assert_eq!(messages[2].reference.as_ref().unwrap().chunks[0].id, "r1");
        assert_eq!(messages[4].reference.as_ref().unwrap().chunks[0].id, "r2");
    }

    #[test]
    fn empty_reference_sets_do_not_attach() {
        let mut messages = vec![message("a1", MessageRole::Assistant)];
        align_references(&mut messages, &[ReferenceSet::default()]);
        assert!(messages[0].reference.is_none());
    }
}
