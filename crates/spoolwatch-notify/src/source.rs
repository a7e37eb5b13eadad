// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The platform notification-object contract.
//
// The spooler exposes a blocking wait with an optional timeout and a
// separate non-blocking fetch; there is no cancellable wait primitive.
// Sessions therefore wait with a finite timeout and observe their
// cancellation token at timeout boundaries.

use std::time::Duration;

use spoolwatch_core::error::Result;

use crate::raw::RawBatch;

/// Outcome of one bounded wait on a notification object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// A change accumulated; fetch it.  A source must not report the same
    /// event signaled twice without an intervening fetch.
    Signaled,
    /// The timeout elapsed with nothing to report.
    TimedOut,
    /// The wait itself failed; the object is unusable.
    Failed,
}

/// One platform notification object, bound to one opened printer.
///
/// Backends adapt the platform API to this trait.  `wait` may block up to
/// its timeout; `fetch_next` must return promptly, copying any payload
/// bytes into the returned batch so the platform buffer can be released
/// before the call returns.  `close` releases the platform object and is
/// called at most once by [`NotificationHandle`](crate::handle::NotificationHandle).
pub trait ChangeSource: Send + 'static {
    /// Block until a change is signaled or `timeout` elapses.
    fn wait(&mut self, timeout: Duration) -> WaitStatus;

    /// Retrieve the batch accumulated since the last fetch.
    ///
    /// `Ok(None)` means nothing is ready (benign; keep waiting).  With
    /// `refresh` set, the object discards its missed-change tracking and
    /// resynchronizes; used once after an overflow.
    fn fetch_next(&mut self, refresh: bool) -> Result<Option<RawBatch>>;

    /// Release the platform object.
    fn close(&mut self);
}
