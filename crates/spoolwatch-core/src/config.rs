// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tuning knobs for notification sessions and the multiplexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Upper bound for one blocking wait on the notification object, in
    /// milliseconds. The platform has no cancellable wait, so this bounds
    /// cancellation latency.
    pub wait_timeout_ms: u64,
    /// Capacity of each session's delivery channel and of the multiplexer
    /// output. A slow consumer stalls producers once this fills.
    pub channel_capacity: usize,
    /// Consecutive fetch failures tolerated before a session declares its
    /// handle dead and closes.
    pub fetch_failure_limit: u32,
    /// Whether the multiplexed output closes once every session has ended,
    /// or stays open for late-attached sessions until shut down.
    pub close_when_done: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: 500,
            channel_capacity: 16,
            fetch_failure_limit: 5,
            close_when_done: true,
        }
    }
}

impl WatchConfig {
    /// The wait timeout as a `Duration`.
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
