// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Owning wrapper around one platform notification object.
//
// The handle guarantees the object is closed exactly once on every exit
// path: `close` is idempotent and `Drop` closes whatever an explicit call
// did not.

use std::time::Duration;

use tracing::debug;

use spoolwatch_core::error::Result;

use crate::raw::RawBatch;
use crate::source::{ChangeSource, WaitStatus};

/// One opened change-notification object for one printer.
pub struct NotificationHandle {
    printer: String,
    source: Box<dyn ChangeSource>,
    closed: bool,
}

impl NotificationHandle {
    /// Wrap a freshly opened source.  The printer name labels log output
    /// and delivered events.
    pub fn new(printer: impl Into<String>, source: Box<dyn ChangeSource>) -> Self {
        let printer = printer.into();
        debug!(printer = %printer, "notification handle opened");
        Self {
            printer,
            source,
            closed: false,
        }
    }

    /// The printer this handle watches.
    pub fn printer(&self) -> &str {
        &self.printer
    }

    /// Block until a change is signaled or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> WaitStatus {
        if self.closed {
            return WaitStatus::Failed;
        }
        self.source.wait(timeout)
    }

    /// Retrieve the batch accumulated since the last fetch.  `Ok(None)`
    /// means nothing is ready.
    pub fn fetch_next(&mut self, refresh: bool) -> Result<Option<RawBatch>> {
        self.source.fetch_next(refresh)
    }

    /// Release the platform object.  Safe to call more than once; only the
    /// first call reaches the source.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.source.close();
            debug!(printer = %self.printer, "notification handle closed");
        }
    }

    /// Whether the handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for NotificationHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for NotificationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationHandle")
            .field("printer", &self.printer)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
