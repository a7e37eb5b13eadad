// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fan-in of many printer sessions into one delivery stream.
//
// One pump task per session forwards its batches into a shared bounded
// channel. Whether that channel closes once every pump has finished, or
// stays open for late-attached sessions, is a policy choice carried in
// `WatchConfig`.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use spoolwatch_core::config::WatchConfig;
use spoolwatch_core::error::{Result, SpoolwatchError};
use spoolwatch_core::types::NotificationBatch;

use crate::handle::NotificationHandle;
use crate::session::NotificationSession;

/// What happens to the merged stream when every session has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxPolicy {
    /// The stream closes once all pumps have finished. Suits a fixed set
    /// of printers watched to completion.
    CloseWhenDone,
    /// The stream stays open until `shutdown`, and new sessions may be
    /// attached at any time.
    StayOpen,
}

/// A decoded batch tagged with the printer it came from.
#[derive(Debug, Clone)]
pub struct PrinterEvent {
    pub printer: String,
    pub batch: NotificationBatch,
}

/// Merges independent session streams into one consumer-facing stream.
pub struct Multiplexer {
    rx: mpsc::Receiver<PrinterEvent>,
    /// Retained under `StayOpen` to keep the channel alive and to mint
    /// senders for attached sessions. `None` once shut down or under
    /// `CloseWhenDone`.
    tx: Option<mpsc::Sender<PrinterEvent>>,
    cancel: CancellationToken,
    policy: MuxPolicy,
}

impl Multiplexer {
    /// Start a multiplexer over already-running sessions, with the policy
    /// taken from `config.close_when_done`.
    pub fn spawn(sessions: Vec<NotificationSession>, config: &WatchConfig) -> Self {
        let policy = if config.close_when_done {
            MuxPolicy::CloseWhenDone
        } else {
            MuxPolicy::StayOpen
        };
        Self::spawn_with_policy(sessions, config.channel_capacity, policy)
    }

    pub fn spawn_with_policy(
        sessions: Vec<NotificationSession>,
        capacity: usize,
        policy: MuxPolicy,
    ) -> Self {
        Self::spawn_inner(sessions, capacity, policy, CancellationToken::new())
    }

    fn spawn_inner(
        sessions: Vec<NotificationSession>,
        capacity: usize,
        policy: MuxPolicy,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));

        info!(sessions = sessions.len(), ?policy, "starting notification multiplexer");
        for session in sessions {
            tokio::spawn(pump(session, tx.clone(), cancel.clone()));
        }

        let tx = match policy {
            MuxPolicy::CloseWhenDone => None,
            MuxPolicy::StayOpen => Some(tx),
        };
        Self {
            rx,
            tx,
            cancel,
            policy,
        }
    }

    /// Open one session per handle, wired to this multiplexer's
    /// cancellation, and merge them.
    pub fn watch(handles: Vec<NotificationHandle>, config: &WatchConfig) -> Self {
        let cancel = CancellationToken::new();
        let sessions = handles
            .into_iter()
            .map(|handle| NotificationSession::spawn_with_cancel(handle, config, cancel.child_token()))
            .collect();
        let policy = if config.close_when_done {
            MuxPolicy::CloseWhenDone
        } else {
            MuxPolicy::StayOpen
        };
        Self::spawn_inner(sessions, config.channel_capacity, policy, cancel)
    }

    pub fn policy(&self) -> MuxPolicy {
        self.policy
    }

    /// Receive the next event from any session. `None` means the stream is
    /// finished: every pump is done under `CloseWhenDone`, or `shutdown`
    /// has been called and the channel has drained.
    pub async fn recv(&mut self) -> Option<PrinterEvent> {
        self.rx.recv().await
    }

    /// Add a running session to a `StayOpen` multiplexer.
    pub fn attach(&self, session: NotificationSession) -> Result<()> {
        let Some(tx) = &self.tx else {
            return Err(SpoolwatchError::StreamClosed);
        };
        debug!(printer = %session.printer(), "attaching session to multiplexer");
        tokio::spawn(pump(session, tx.clone(), self.cancel.clone()));
        Ok(())
    }

    /// Cancel every session and let the stream drain. After the buffered
    /// events are consumed, `recv` returns `None`.
    pub fn shutdown(&mut self) {
        info!("shutting down notification multiplexer");
        self.cancel.cancel();
        self.tx = None;
    }
}

/// Forward one session's batches into the shared channel until the session
/// ends, the consumer goes away, or the multiplexer is shut down.
async fn pump(
    mut session: NotificationSession,
    tx: mpsc::Sender<PrinterEvent>,
    cancel: CancellationToken,
) {
    let printer = session.printer().to_owned();
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                session.cancel();
                break;
            }
            item = session.recv() => {
                let Some(batch) = item else { break };
                let event = PrinterEvent {
                    printer: printer.clone(),
                    batch,
                };
                if tx.send(event).await.is_err() {
                    // Consumer dropped the stream; no point producing more.
                    session.cancel();
                    break;
                }
            }
        }
    }
    // The handle must be released before the pump goes away.
    session.closed().await;
    debug!(printer = %printer, "session pump finished");
}
