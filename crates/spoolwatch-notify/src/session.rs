// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-printer notification session.
//
// A session owns one `NotificationHandle` and drives the wait/fetch loop on
// a blocking thread, emitting decoded batches through a bounded channel.
// Cancellation is a token observed at timeout boundaries and while blocked
// on emission, so stopping a session takes at most one wait interval.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use spoolwatch_core::config::WatchConfig;
use spoolwatch_core::types::NotificationBatch;

use crate::decode::decode_batch;
use crate::handle::NotificationHandle;
use crate::source::WaitStatus;

/// Where a session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Waiting,
    Delivering,
    Closing,
    Closed,
}

/// A cancellable stream of decoded notification batches for one printer.
pub struct NotificationSession {
    printer: String,
    rx: mpsc::Receiver<NotificationBatch>,
    cancel: CancellationToken,
    state_rx: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl NotificationSession {
    /// Start a session over an opened handle with a fresh cancellation
    /// token.
    pub fn spawn(handle: NotificationHandle, config: &WatchConfig) -> Self {
        Self::spawn_with_cancel(handle, config, CancellationToken::new())
    }

    /// Start a session whose cancellation is driven by the given token,
    /// typically a child of a multiplexer-wide token.
    pub fn spawn_with_cancel(
        handle: NotificationHandle,
        config: &WatchConfig,
        cancel: CancellationToken,
    ) -> Self {
        let printer = handle.printer().to_owned();
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);

        let worker = SessionWorker {
            printer: printer.clone(),
            wait_timeout: config.wait_timeout(),
            fetch_failure_limit: config.fetch_failure_limit,
            tx,
            cancel: cancel.clone(),
            state: state_tx,
        };
        let task = tokio::spawn(worker.run(handle));

        Self {
            printer,
            rx,
            cancel,
            state_rx,
            task,
        }
    }

    pub fn printer(&self) -> &str {
        &self.printer
    }

    /// Receive the next decoded batch; `None` once the session is closed
    /// and the channel drained.
    pub async fn recv(&mut self) -> Option<NotificationBatch> {
        self.rx.recv().await
    }

    /// Request the session stop. Takes effect at the next timeout or
    /// emission boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Wait until the session has released its handle and stopped.
    pub async fn closed(&mut self) {
        let _ = self
            .state_rx
            .wait_for(|state| matches!(state, SessionState::Closed))
            .await;
    }

    /// Wait for the background worker to finish.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

struct SessionWorker {
    printer: String,
    wait_timeout: Duration,
    fetch_failure_limit: u32,
    tx: mpsc::Sender<NotificationBatch>,
    cancel: CancellationToken,
    state: watch::Sender<SessionState>,
}

impl SessionWorker {
    async fn run(self, mut handle: NotificationHandle) {
        info!(printer = %self.printer, "notification session started");
        let mut failures: u32 = 0;

        loop {
            let _ = self.state.send(SessionState::Waiting);

            // The platform wait is blocking with no cancellable variant, so
            // it runs on a blocking thread and the handle travels with it.
            let timeout = self.wait_timeout;
            let (returned, status) = match task::spawn_blocking(move || {
                let status = handle.wait(timeout);
                (handle, status)
            })
            .await
            {
                Ok(pair) => pair,
                Err(error) => {
                    // The wait panicked; the handle was dropped, and so
                    // closed, inside that task.
                    warn!(printer = %self.printer, %error, "notification wait panicked");
                    let _ = self.state.send(SessionState::Closed);
                    return;
                }
            };
            handle = returned;

            match status {
                WaitStatus::TimedOut => {
                    if self.cancel.is_cancelled() {
                        break;
                    }
                }
                WaitStatus::Failed => {
                    warn!(printer = %self.printer, "notification wait failed, closing session");
                    break;
                }
                WaitStatus::Signaled => match next_decoded(&mut handle) {
                    Ok(Some(batch)) => {
                        failures = 0;
                        let _ = self.state.send(SessionState::Delivering);
                        debug!(
                            printer = %self.printer,
                            cause = %batch.cause,
                            fields = batch.fields.len(),
                            "delivering notification batch"
                        );
                        tokio::select! {
                            sent = self.tx.send(batch) => {
                                if sent.is_err() {
                                    debug!(printer = %self.printer, "consumer gone, closing session");
                                    break;
                                }
                            }
                            () = self.cancel.cancelled() => break,
                        }
                    }
                    Ok(None) => {
                        failures = 0;
                    }
                    Err(error) => {
                        failures += 1;
                        warn!(
                            printer = %self.printer,
                            %error,
                            consecutive = failures,
                            "notification fetch failed"
                        );
                        if failures >= self.fetch_failure_limit {
                            warn!(printer = %self.printer, "fetch failures persist, closing session");
                            break;
                        }
                    }
                },
            }
        }

        let _ = self.state.send(SessionState::Closing);
        handle.close();
        let _ = self.state.send(SessionState::Closed);
        info!(printer = %self.printer, "notification session closed");
    }
}

/// Fetch and decode the batch behind a signal. A batch carrying the
/// discarded flag is dropped and replaced by one refresh fetch; an empty
/// refresh is benign.
fn next_decoded(
    handle: &mut NotificationHandle,
) -> spoolwatch_core::error::Result<Option<NotificationBatch>> {
    let Some(raw) = handle.fetch_next(false)? else {
        return Ok(None);
    };
    if raw.is_discarded() {
        debug!(printer = %handle.printer(), "notifications discarded, refetching with refresh");
        let refreshed = handle.fetch_next(true)?;
        return Ok(refreshed.map(|batch| decode_batch(&batch)));
    }
    Ok(Some(decode_batch(&raw)))
}
