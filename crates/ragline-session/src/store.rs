// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation state.
//!
//! Holds per-session ordered message lists, assigns collision-free ids,
//! and manages the streaming placeholder lifecycle: a composing assistant
//! message whose content is replaced per snapshot, finalized into history
//! only when the stream completes with non-empty content.
//!
//! All mutation happens on the caller's event loop; the store itself holds
//! no locks. Asynchronous completions must re-check session identity
//! through the loading set before touching state.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use ragline_core::{Message, MessageId, MessageRole, RaglineError, ReferenceSet, SessionId};

/// Recomputed roll-up of one session's message list.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    /// Content of the most recent message, truncated for list display.
    pub preview: Option<String>,
    pub message_count: usize,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Characters of the most recent message kept in the summary preview.
const PREVIEW_LEN: usize = 80;

/// One conversation's ordered history plus its in-flight assistant turn.
#[derive(Debug, Default)]
pub struct Session {
    messages: Vec<Message>,
    composing: Option<Message>,
}

impl Session {
    /// Finalized messages, in order. The composing placeholder is not part
    /// of history until the stream completes.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The in-flight assistant turn, if a stream is active.
    pub fn composing(&self) -> Option<&Message> {
        self.composing.as_ref()
    }
}

/// Store of all sessions known to this client instance.
///
/// Constructed once at application start and passed explicitly to the
/// components that need it.
#[derive(Debug, Default)]
pub struct ConversationStore {
    sessions: HashMap<SessionId, Session>,
    loading: HashSet<SessionId>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    fn session_mut(&mut self, id: &SessionId) -> Result<&mut Session, RaglineError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| RaglineError::Session(format!("unknown session {id}")))
    }

    /// Creates the session if absent.
    pub fn ensure_session(&mut self, id: &SessionId) {
        self.sessions.entry(id.clone()).or_default();
    }

    /// Marks a history load for `id` as in flight.
    ///
    /// Returns false when a load for the same session is already running;
    /// the caller must treat that as a no-op rather than issuing a second
    /// request.
    pub fn begin_load(&mut self, id: &SessionId) -> bool {
        let started = self.loading.insert(id.clone());
        if !started {
            debug!(session = %id, "history load already in flight, skipping");
        }
        started
    }

    /// Clears the in-flight marker for `id`. Safe to call on completion,
    /// failure, or cancellation.
    pub fn finish_load(&mut self, id: &SessionId) {
        self.loading.remove(id);
    }

    /// Replaces a session's history with messages loaded from upstream.
    ///
    /// Upstream ids are not trusted to be unique (assistant turns reloaded
    /// from history repeat them); duplicates are deterministically renamed
    /// with a suffix counter so ordering and selection stay stable.
    pub fn replace_messages(&mut self, id: &SessionId, mut messages: Vec<Message>) {
        dedupe_message_ids(&mut messages);
        self.ensure_session(id);
        if let Some(session) = self.sessions.get_mut(id) {
            session.messages = messages;
        }
    }

    /// Appends a user turn with a locally generated collision-free id.
    pub fn push_user_message(
        &mut self,
        id: &SessionId,
        content: impl Into<String>,
    ) -> Result<MessageId, RaglineError> {
        self.ensure_session(id);
        let session = self.session_mut(id)?;
        let message_id = MessageId(Uuid::new_v4().to_string());
        session.messages.push(Message::new(
            message_id.clone(),
            MessageRole::User,
            content,
        ));
        Ok(message_id)
    }

    /// Opens the streaming placeholder for the next assistant turn.
    ///
    /// Any placeholder left over from an earlier, superseded stream is
    /// discarded first.
    pub fn open_placeholder(&mut self, id: &SessionId) -> Result<MessageId, RaglineError> {
        self.ensure_session(id);
        let session = self.session_mut(id)?;
        if session.composing.is_some() {
            warn!(session = %id, "discarding stale streaming placeholder");
        }
        let message_id = MessageId(Uuid::new_v4().to_string());
        session.composing = Some(Message::new(
            message_id.clone(),
            MessageRole::Assistant,
            "",
        ));
        Ok(message_id)
    }

    /// Replaces the placeholder's content with the latest cumulative
    /// snapshot. The server always sends the full answer, never a delta.
    pub fn update_streaming(
        &mut self,
        id: &SessionId,
        answer: impl Into<String>,
        reference: Option<ReferenceSet>,
    ) -> Result<(), RaglineError> {
        let session = self.session_mut(id)?;
        let Some(composing) = session.composing.as_mut() else {
            // A late callback for a stream that was cancelled or replaced.
            debug!(session = %id, "dropping snapshot for inactive stream");
            return Ok(());
        };
        composing.content = answer.into();
        if reference.is_some() {
            composing.reference = reference;
        }
        Ok(())
    }

    /// Closes the placeholder on stream completion.
    ///
    /// A non-empty turn is appended to history (immutable from here on)
    /// and its id returned; an empty turn is dropped so failed streams do
    /// not pollute history.
    pub fn finalize_streaming(
        &mut self,
        id: &SessionId,
        reference: Option<ReferenceSet>,
    ) -> Result<Option<MessageId>, RaglineError> {
        let session = self.session_mut(id)?;
        let Some(mut composing) = session.composing.take() else {
            return Ok(None);
        };

        if composing.content.trim().is_empty() {
            debug!(session = %id, "dropping empty assistant turn");
            return Ok(None);
        }

        if reference.is_some() {
            composing.reference = reference;
        }
        composing.timestamp = Utc::now();
        let message_id = composing.id.clone();
        session.messages.push(composing);
        Ok(Some(message_id))
    }

    /// Discards the placeholder without appending. The cancellation path:
    /// never an error.
    pub fn abort_streaming(&mut self, id: &SessionId) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.composing = None;
        }
        self.finish_load(id);
    }

    /// Attaches a reference set that arrived after finalization. Content
    /// stays immutable; only a missing reference may be filled in.
    pub fn attach_late_reference(
        &mut self,
        id: &SessionId,
        message_id: &MessageId,
        reference: ReferenceSet,
    ) -> Result<bool, RaglineError> {
        let session = self.session_mut(id)?;
        let Some(message) = session
            .messages
            .iter_mut()
            .find(|m| &m.id == message_id)
        else {
            return Ok(false);
        };
        if message.reference.is_some() {
            return Ok(false);
        }
        message.reference = Some(reference);
        Ok(true)
    }

    /// Removes a message by id. Used by the message-deletion endpoint
    /// wrapper to mirror server state locally.
    pub fn remove_message(&mut self, id: &SessionId, message_id: &MessageId) -> bool {
        let Some(session) = self.sessions.get_mut(id) else {
            return false;
        };
        let before = session.messages.len();
        session.messages.retain(|m| &m.id != message_id);
        before != session.messages.len()
    }

    /// Recomputes the session summary from its message list.
    pub fn summary(&self, id: &SessionId) -> Option<SessionSummary> {
        let session = self.sessions.get(id)?;
        let last = session.messages.last();
        Some(SessionSummary {
            preview: last.map(|m| m.content.chars().take(PREVIEW_LEN).collect()),
            message_count: session.messages.len(),
            last_activity: last.map(|m| m.timestamp),
        })
    }
}

/// Renames duplicate message ids in place, preserving order.
///
/// The first occurrence keeps its id; later occurrences get `_1`, `_2`, ...
/// suffixes (skipping suffixes that would themselves collide).
fn dedupe_message_ids(messages: &mut [Message]) {
    let mut seen: HashSet<String> = HashSet::new();
    for message in messages.iter_mut() {
        if seen.insert(message.id.0.clone()) {
            continue;
        }
        let base = message.id.0.clone();
        let mut counter = 1;
        let renamed = loop {
            let candidate = format!("{base}_{counter}");
            if seen.insert(candidate.clone()) {
                break candidate;
            }
            counter += 1;
        };
        debug!(original = %base, renamed = %renamed, "renamed duplicate message id");
        message.id = MessageId(renamed);
    }
}
