// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job status bitmask, its human-readable rendering, and job control
// commands. The bit values and command numbers are fixed by the spooler
// interface.

use serde::{Deserialize, Serialize};

/// Job status bits as reported in the `Status` notification field and in
/// `JobInfo::status_code`.
pub mod job_status {
    /// Job is paused.
    pub const PAUSED: u32 = 0x0000_0001;
    /// An error is associated with the job.
    pub const ERROR: u32 = 0x0000_0002;
    /// Job is being deleted.
    pub const DELETING: u32 = 0x0000_0004;
    /// Job is spooling.
    pub const SPOOLING: u32 = 0x0000_0008;
    /// Job is printing.
    pub const PRINTING: u32 = 0x0000_0010;
    /// Printer is offline.
    pub const OFFLINE: u32 = 0x0000_0020;
    /// Printer is out of paper.
    pub const PAPEROUT: u32 = 0x0000_0040;
    /// Job has printed.
    pub const PRINTED: u32 = 0x0000_0080;
    /// Job has been deleted.
    pub const DELETED: u32 = 0x0000_0100;
    /// Printer driver cannot print the job.
    pub const BLOCKED_DEVQ: u32 = 0x0000_0200;
    /// User action required.
    pub const USER_INTERVENTION: u32 = 0x0000_0400;
    /// Job has been restarted.
    pub const RESTART: u32 = 0x0000_0800;
    /// Job has been delivered to the printer.
    pub const COMPLETE: u32 = 0x0000_1000;
    /// Job has been retained in the print queue.
    pub const RETAINED: u32 = 0x0000_2000;
    /// Job rendering locally on the client.
    pub const RENDERING_LOCALLY: u32 = 0x0000_4000;
}

/// Bit-to-phrase table driving [`status_text`], in display order.
const STATUS_PHRASES: [(u32, &str); 15] = [
    (job_status::PRINTING, "Printing"),
    (job_status::PAUSED, "Paused"),
    (job_status::ERROR, "Error"),
    (job_status::DELETING, "Deleting"),
    (job_status::SPOOLING, "Spooling"),
    (job_status::OFFLINE, "Printer Offline"),
    (job_status::PAPEROUT, "Out of Paper"),
    (job_status::PRINTED, "Printed"),
    (job_status::DELETED, "Deleted"),
    (job_status::BLOCKED_DEVQ, "Driver Error"),
    (job_status::USER_INTERVENTION, "User Action Required"),
    (job_status::RESTART, "Restarted"),
    (job_status::COMPLETE, "Sent to Printer"),
    (job_status::RETAINED, "Retained"),
    (job_status::RENDERING_LOCALLY, "Rendering on Client"),
];

/// Render a job status bitmask as comma-separated phrases.
///
/// A zero mask renders as "Queue Paused", matching the spooler's own
/// reading of an empty status word.
pub fn status_text(status_code: u32) -> String {
    if status_code == 0 {
        return "Queue Paused".to_string();
    }

    let phrases: Vec<&str> = STATUS_PHRASES
        .iter()
        .filter(|(bit, _)| status_code & bit != 0)
        .map(|(_, phrase)| *phrase)
        .collect();
    phrases.join(", ")
}

/// Commands accepted by the spooler's job-control operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum JobControl {
    Pause = 1,
    Resume = 2,
    Cancel = 3,
    Restart = 4,
    Delete = 5,
    SentToPrinter = 6,
    LastPageEjected = 7,
    Retain = 8,
    Release = 9,
}

impl JobControl {
    /// The on-wire command number.
    pub const fn command(self) -> u32 {
        self as u32
    }
}
