// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for spoolwatch.

use thiserror::Error;

/// Top-level error type for all spoolwatch operations.
#[derive(Debug, Error)]
pub enum SpoolwatchError {
    // -- Notification pipeline --
    #[error("failed to open change notification: {0}")]
    OpenFailed(String),

    #[error("notification fetch failed: {0}")]
    Fetch(String),

    #[error("notification stream closed")]
    StreamClosed,

    // -- Printer directory / spooler --
    #[error("printer directory error: {0}")]
    Directory(String),

    #[error("unknown printer: {0}")]
    UnknownPrinter(String),

    #[error("job {0} not found")]
    JobNotFound(u32),

    #[error("spool write failed: {0}")]
    Spool(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SpoolwatchError>;
