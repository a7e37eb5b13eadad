// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwatch Notify — the asynchronous change-notification pipeline.  Raw
// tagged records from a platform notification object are decoded into typed
// field values, each monitored printer becomes a cancellable session stream,
// and a multiplexer fans the sessions into one consumer-facing stream.

pub mod decode;
pub mod handle;
pub mod loopback;
pub mod mux;
pub mod raw;
pub mod session;
pub mod source;

pub use handle::NotificationHandle;
pub use loopback::{LoopbackHub, LoopbackSource};
pub use mux::{Multiplexer, MuxPolicy, PrinterEvent};
pub use raw::{RawBatch, RawPayload, RawRecord};
pub use session::{NotificationSession, SessionState};
pub use source::{ChangeSource, WaitStatus};
