// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The printer directory and port abstractions. A directory names printers
// and opens them; a port is one opened printer, exclusively owned, carrying
// job control, driver detail, the document write path, and the change
// subscription the notification core consumes.

use spoolwatch_core::error::Result;
use spoolwatch_core::status::JobControl;
use spoolwatch_core::types::{DriverInfo, JobInfo, NotificationFilter};
use spoolwatch_notify::source::ChangeSource;

/// Datatype for documents already rendered into the printer's language.
pub const DATATYPE_RAW: &str = "RAW";
/// Datatype for pass-through documents on XPS-based (v4) drivers.
pub const DATATYPE_XPS_PASS: &str = "XPS_PASS";

/// Names printers and opens them by name.
pub trait PrinterDirectory {
    /// Names of the locally known printers.
    fn printer_names(&self) -> Result<Vec<String>>;

    /// Name of the default printer.
    fn default_printer(&self) -> Result<String>;

    /// Open a printer by name, yielding an exclusively-owned port. Fails
    /// with `OpenFailed` for unknown names or an unavailable spooler.
    fn open(&self, name: &str) -> Result<Box<dyn PrinterPort>>;
}

/// One opened printer.
///
/// The notification core only ever calls `subscribe`; the rest of the
/// surface exists for consumers that act on the job ids a notification
/// carries.
pub trait PrinterPort: Send {
    fn name(&self) -> &str;

    /// Subscribe to change notifications matching the filter. Each call
    /// yields an independent source with its own lifecycle.
    fn subscribe(&mut self, filter: &NotificationFilter) -> Result<Box<dyn ChangeSource>>;

    /// All jobs currently queued on the printer.
    fn jobs(&self) -> Result<Vec<JobInfo>>;

    /// One job by id; `JobNotFound` if the queue no longer has it.
    fn job(&self, job_id: u32) -> Result<JobInfo>;

    /// Issue a control command against a queued job.
    fn control_job(&mut self, job_id: u32, command: JobControl) -> Result<()>;

    /// Detail about the driver behind the printer.
    fn driver_info(&self) -> Result<DriverInfo>;

    // Document write path. Calls are sequential per port:
    // start_document, then (start_page, write*, end_page)+, end_document.

    fn start_document(&mut self, name: &str, output_file: &str, datatype: &str) -> Result<()>;
    fn start_page(&mut self) -> Result<()>;
    fn write(&mut self, data: &[u8]) -> Result<usize>;
    fn end_page(&mut self) -> Result<()>;
    fn end_document(&mut self) -> Result<()>;
}
