// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE frame decoding for the completion endpoint.
//!
//! Converts a reqwest response byte stream into typed [`CompletionFrame`]s
//! using the `eventsource-stream` crate for SSE protocol compliance. Each
//! event's data payload is a JSON envelope `{code, message, data}` where
//! `data` is either an answer object or the boolean `true` end-of-stream
//! sentinel.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use tracing::debug;

use ragline_core::{RaglineError, ReferenceSet};

/// Typed frames from the completion streaming protocol.
#[derive(Debug, Clone)]
pub enum CompletionFrame {
    /// A cumulative answer snapshot. The `answer` is the full text so far,
    /// not a delta; each frame replaces the previous one.
    Answer(AnswerFrame),
    /// The explicit end-of-stream sentinel (`data: true`).
    Done,
}

/// One incremental answer update.
#[derive(Debug, Clone)]
pub struct AnswerFrame {
    pub answer: String,
    /// The reference set backing this snapshot, replaced wholesale per
    /// frame. Absent when the frame carried none or an unusable one.
    pub reference: Option<ReferenceSet>,
    pub message_id: Option<String>,
    pub session_id: Option<String>,
}

/// The `{code, message, data}` envelope every data payload arrives in.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Decodes one SSE data payload.
///
/// Returns `None` for frames that parse as neither an answer nor the
/// sentinel. Partial or garbled payloads are expected at chunk boundaries,
/// so a decode miss is a defensive skip, never an error. Upstream failure
/// frames (`code != 0`) carry their failure text in `answer` and flow
/// through the normal answer path.
pub fn decode_frame(payload: &str) -> Option<CompletionFrame> {
    let envelope: Envelope = match serde_json::from_str(payload) {
        Ok(env) => env,
        Err(e) => {
            debug!(error = %e, "skipping undecodable frame");
            return None;
        }
    };

    if envelope.code != 0 {
        debug!(code = envelope.code, message = %envelope.message, "upstream reported failure frame");
    }

    match envelope.data {
        serde_json::Value::Bool(true) => Some(CompletionFrame::Done),
        serde_json::Value::Object(map) => {
            let answer = map.get("answer").and_then(|v| v.as_str())?.to_string();
            let reference = map
                .get("reference")
                .and_then(|v| serde_json::from_value::<ReferenceSet>(v.clone()).ok());
            let message_id = map.get("id").and_then(|v| v.as_str()).map(String::from);
            let session_id = map
                .get("session_id")
                .and_then(|v| v.as_str())
                .map(String::from);
            Some(CompletionFrame::Answer(AnswerFrame {
                answer,
                reference,
                message_id,
                session_id,
            }))
        }
        _ => {
            debug!("skipping frame with unrecognized data payload");
            None
        }
    }
}

/// Parses a streaming response into a stream of [`CompletionFrame`]s.
///
/// Frames that fail to decode are dropped and the stream continues;
/// transport errors from the underlying byte stream surface as `Err` items.
pub fn parse_frame_stream(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<CompletionFrame, RaglineError>> + Send>> {
    let event_stream = response.bytes_stream().eventsource();

    let mapped = event_stream.filter_map(|result| async move {
        match result {
            Ok(event) => decode_frame(&event.data).map(Ok),
            Err(e) => Some(Err(RaglineError::Transport {
                message: format!("event stream error: {e}"),
                source: None,
            })),
        }
    });

    Box::pin(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_answer_frame() {
        let payload = r#"{"code":0,"message":"","data":{"answer":"Hello","reference":{"chunks":[],"doc_aggs":[]}}}"#;
        match decode_frame(payload) {
            Some(CompletionFrame::Answer(frame)) => {
                assert_eq!(frame.answer, "Hello");
                assert!(frame.reference.is_some());
            }
            other => panic!("expected Answer, got {other:?}"),
        }
    }

    #[test]
    fn decodes_sentinel() {
        let payload = r#"{"code":0,"message":"","data":true}"#;
        assert!(matches!(decode_frame(payload), Some(CompletionFrame::Done)));
    }

    #[test]
    fn skips_garbled_payload() {
        assert!(decode_frame(r#"{"code":0,"data":{"ans"#).is_none());
        assert!(decode_frame("not json at all").is_none());
    }

    #[test]
    fn skips_unrecognized_data() {
        assert!(decode_frame(r#"{"code":0,"data":false}"#).is_none());
        assert!(decode_frame(r#"{"code":0,"data":[1,2]}"#).is_none());
        assert!(decode_frame(r#"{"code":0,"data":{"no_answer":1}}"#).is_none());
    }

    #[test]
    fn failure_frame_keeps_answer_and_drops_bad_reference() {
        // The upstream reports mid-stream failures as ordinary answer
        // frames with `code: 500` and an empty-array reference.
        let payload =
            r#"{"code":500,"message":"boom","data":{"answer":"**ERROR**: boom","reference":[]}}"#;
        match decode_frame(payload) {
            Some(CompletionFrame::Answer(frame)) => {
                assert_eq!(frame.answer, "**ERROR**: boom");
                assert!(frame.reference.is_none());
            }
            other => panic!("expected Answer, got {other:?}"),
        }
    }

    #[test]
    fn answer_frame_carries_ids() {
        let payload =
            r#"{"code":0,"data":{"answer":"x","id":"m1","session_id":"s1"}}"#;
        match decode_frame(payload) {
            Some(CompletionFrame::Answer(frame)) => {
                assert_eq!(frame.message_id.as_deref(), Some("m1"));
                assert_eq!(frame.session_id.as_deref(), Some("s1"));
            }
            other => panic!("expected Answer, got {other:?}"),
        }
    }
}
