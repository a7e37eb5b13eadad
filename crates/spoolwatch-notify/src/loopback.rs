// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process notification source.
//
// A `LoopbackHub` is the publishing side: anything with a hub can push raw
// batches to every subscribed source, stage a refresh batch, or inject
// faults.  Each `LoopbackSource` honours the `ChangeSource` contract over a
// plain channel, which makes it both the reference backend for tests and a
// usable in-memory spooler feed.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use spoolwatch_core::error::{Result, SpoolwatchError};

use crate::raw::RawBatch;
use crate::source::{ChangeSource, WaitStatus};

/// Publishing side of an in-process notification feed.
#[derive(Clone, Default)]
pub struct LoopbackHub {
    senders: Arc<Mutex<Vec<Sender<RawBatch>>>>,
    refresh: Arc<Mutex<Option<RawBatch>>>,
    fail_fetches: Arc<AtomicU32>,
    wait_broken: Arc<AtomicBool>,
    closes: Arc<AtomicUsize>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new subscriber, as the platform does per notification object.
    pub fn subscribe(&self) -> LoopbackSource {
        let (tx, rx) = mpsc::channel();
        self.senders.lock().expect("sender list lock poisoned").push(tx);
        LoopbackSource {
            rx,
            staged: None,
            reported: false,
            refresh: Arc::clone(&self.refresh),
            fail_fetches: Arc::clone(&self.fail_fetches),
            wait_broken: Arc::clone(&self.wait_broken),
            closes: Arc::clone(&self.closes),
            closed: false,
        }
    }

    /// Deliver a raw batch to every live subscriber.
    pub fn push(&self, batch: RawBatch) {
        self.senders
            .lock()
            .expect("sender list lock poisoned")
            .retain(|tx| tx.send(batch.clone()).is_ok());
    }

    /// Stage the batch a refresh fetch will return after an overflow.
    pub fn set_refresh(&self, batch: RawBatch) {
        *self.refresh.lock().expect("refresh lock poisoned") = Some(batch);
    }

    /// Make the next `n` fetches fail, for exercising transient-failure
    /// handling.
    pub fn fail_fetches(&self, n: u32) {
        self.fail_fetches.store(n, Ordering::SeqCst);
    }

    /// Make every subsequent wait report a hard failure.
    pub fn break_wait(&self) {
        self.wait_broken.store(true, Ordering::SeqCst);
    }

    /// Drop the feed; subscribers' waits report a hard failure once their
    /// queue drains.
    pub fn close(&self) {
        self.senders.lock().expect("sender list lock poisoned").clear();
    }

    /// How many subscribers have been closed.
    pub fn closed_sources(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Subscribing side of an in-process notification feed.
pub struct LoopbackSource {
    rx: Receiver<RawBatch>,
    /// Batch accumulated but not yet fetched. Arrivals merge into it, as
    /// the spooler coalesces changes between fetches.
    staged: Option<RawBatch>,
    /// Whether the staged batch has already been signaled. Guards the
    /// contract that one event is never signaled twice without a fetch.
    reported: bool,
    refresh: Arc<Mutex<Option<RawBatch>>>,
    fail_fetches: Arc<AtomicU32>,
    wait_broken: Arc<AtomicBool>,
    closes: Arc<AtomicUsize>,
    closed: bool,
}

impl LoopbackSource {
    fn stage(&mut self, batch: RawBatch) {
        match &mut self.staged {
            Some(pending) => pending.merge(batch),
            None => self.staged = Some(batch),
        }
    }
}

impl ChangeSource for LoopbackSource {
    fn wait(&mut self, timeout: Duration) -> WaitStatus {
        if self.closed || self.wait_broken.load(Ordering::SeqCst) {
            return WaitStatus::Failed;
        }

        if self.staged.is_some() && !self.reported {
            self.reported = true;
            return WaitStatus::Signaled;
        }

        match self.rx.recv_timeout(timeout) {
            Ok(batch) => {
                self.stage(batch);
                self.reported = true;
                WaitStatus::Signaled
            }
            Err(RecvTimeoutError::Timeout) => WaitStatus::TimedOut,
            Err(RecvTimeoutError::Disconnected) => WaitStatus::Failed,
        }
    }

    fn fetch_next(&mut self, refresh: bool) -> Result<Option<RawBatch>> {
        // A failed fetch consumes nothing; whatever is staged must be
        // signalable again so the caller's retry can reach it.
        self.reported = false;

        let outstanding = self.fail_fetches.load(Ordering::SeqCst);
        if outstanding > 0 {
            self.fail_fetches.store(outstanding - 1, Ordering::SeqCst);
            return Err(SpoolwatchError::Fetch("injected fetch failure".into()));
        }

        if refresh {
            // A refresh abandons whatever tracking was in flight and hands
            // back the resynchronized snapshot.
            self.staged = None;
            return Ok(self.refresh.lock().expect("refresh lock poisoned").take());
        }
        Ok(self.staged.take())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}
