// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwatch Spool — the boundary the notification core sits on top of: a
// printer directory that opens named printers as exclusively-owned ports,
// job enumeration and control, the sequential document write path, and an
// in-memory spooler backend for tests and embedders.

pub mod directory;
pub mod memory;
pub mod watch;
pub mod writer;

pub use directory::{DATATYPE_RAW, DATATYPE_XPS_PASS, PrinterDirectory, PrinterPort};
pub use memory::MemorySpooler;
pub use watch::{watch_all, watch_printers};
pub use writer::DocumentWriter;
