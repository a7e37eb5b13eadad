// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwatch — Core types, errors, and configuration shared across all crates.

pub mod config;
pub mod error;
pub mod fields;
pub mod status;
pub mod types;

pub use config::WatchConfig;
pub use error::SpoolwatchError;
pub use fields::{ChangeMask, JobField, NotifyType};
pub use types::*;
