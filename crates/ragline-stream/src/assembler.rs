// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming response assembly.
//!
//! The assembler runs the SSE frame stream on a background task and yields
//! `(answer, reference)` snapshots through a bounded channel, with a
//! cancellation token instead of callback-captured flags. Frames are
//! processed strictly in network delivery order; no reordering or batching
//! happens here.
//!
//! Cancellation is cooperative and clean: after [`CompletionStream::cancel`]
//! no further update is yielded, even for frames the transport already
//! buffered, and nothing reaches the error path. Callers clear their own
//! per-session loading flags when `next()` returns `None`.

use std::sync::Mutex;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use ragline_config::StreamConfig;
use ragline_core::{RaglineError, ReferenceSet};

use crate::client::{CompletionClient, CompletionRequest};
use crate::sse::CompletionFrame;

/// One update from an in-flight completion.
#[derive(Debug, Clone)]
pub enum StreamUpdate {
    /// A cumulative snapshot: `answer` is the full text so far and
    /// replaces, never appends to, the previously held text.
    Answer {
        answer: String,
        reference: Option<ReferenceSet>,
    },
    /// The stream completed. Carries the last-seen reference set. Yielded
    /// exactly once, on the sentinel frame or a clean close; an abnormal
    /// close yields an `Err` item instead.
    Done { reference: Option<ReferenceSet> },
}

/// Consumer handle for one in-flight completion.
#[derive(Debug)]
pub struct CompletionStream {
    updates: mpsc::Receiver<Result<StreamUpdate, RaglineError>>,
    cancel: CancellationToken,
}

impl CompletionStream {
    /// Yields the next update, or `None` when the stream is exhausted or
    /// cancelled.
    pub async fn next(&mut self) -> Option<Result<StreamUpdate, RaglineError>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => None,
            update = self.updates.recv() => update,
        }
    }

    /// Aborts the in-flight request. Any buffered frames are discarded and
    /// no further update is yielded. Cancellation is not a failure.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token observing this stream's cancellation, for wiring into
    /// component teardown.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for CompletionStream {
    fn drop(&mut self) {
        // Component teardown implies cancellation.
        self.cancel.cancel();
    }
}

/// Starts completions and enforces the one-active-stream rule: starting a
/// new completion first cancels any stream left over from a prior call.
#[derive(Debug)]
pub struct Completions {
    client: CompletionClient,
    channel_capacity: usize,
    active: Mutex<Option<CancellationToken>>,
}

impl Completions {
    pub fn new(client: CompletionClient, config: &StreamConfig) -> Self {
        Self {
            client,
            channel_capacity: config.channel_capacity.max(1),
            active: Mutex::new(None),
        }
    }

    /// Opens a completion stream for `request`.
    ///
    /// Cancels any previously started stream, awaits the response headers
    /// (a non-2xx status is a hard failure), then spawns the assembly task.
    pub async fn start(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, RaglineError> {
        let cancel = CancellationToken::new();
        {
            let mut active = self
                .active
                .lock()
                .map_err(|_| RaglineError::Internal("completion controller poisoned".into()))?;
            if let Some(previous) = active.replace(cancel.clone()) {
                debug!("cancelling completion stream from prior start");
                previous.cancel();
            }
        }

        let frames = self.client.open_stream(&request).await?;
        let (tx, rx) = mpsc::channel(self.channel_capacity);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            run_assembly(frames, tx, task_cancel).await;
        });

        Ok(CompletionStream {
            updates: rx,
            cancel,
        })
    }

    /// Cancels the active stream, if any.
    pub fn cancel_active(&self) {
        if let Ok(active) = self.active.lock()
            && let Some(token) = active.as_ref()
        {
            token.cancel();
        }
    }
}

/// Drives the frame stream to completion, forwarding snapshots.
async fn run_assembly(
    mut frames: std::pin::Pin<
        Box<dyn futures::Stream<Item = Result<CompletionFrame, RaglineError>> + Send>,
    >,
    tx: mpsc::Sender<Result<StreamUpdate, RaglineError>>,
    cancel: CancellationToken,
) {
    let mut last_reference: Option<ReferenceSet> = None;

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("completion stream cancelled");
                return;
            }
            frame = frames.next() => frame,
        };

        let update = match next {
            Some(Ok(CompletionFrame::Answer(frame))) => {
                if frame.reference.is_some() {
                    last_reference = frame.reference.clone();
                }
                Ok(StreamUpdate::Answer {
                    answer: frame.answer,
                    reference: frame.reference,
                })
            }
            Some(Ok(CompletionFrame::Done)) => {
                deliver(
                    &tx,
                    &cancel,
                    Ok(StreamUpdate::Done {
                        reference: last_reference,
                    }),
                )
                .await;
                return;
            }
            Some(Err(e)) => {
                // Abnormal close: surface the error, no Done afterwards.
                warn!(error = %e, "completion stream broke mid-answer");
                deliver(&tx, &cancel, Err(e)).await;
                return;
            }
            None => {
                // Clean close without the sentinel still completes the answer.
                deliver(
                    &tx,
                    &cancel,
                    Ok(StreamUpdate::Done {
                        reference: last_reference,
                    }),
                )
                .await;
                return;
            }
        };

        if !deliver(&tx, &cancel, update).await {
            return;
        }
    }
}

/// Sends one item unless cancellation wins the race or the consumer is gone.
async fn deliver(
    tx: &mpsc::Sender<Result<StreamUpdate, RaglineError>>,
    cancel: &CancellationToken,
    item: Result<StreamUpdate, RaglineError>,
) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        sent = tx.send(item) => sent.is_ok(),
    }
}
