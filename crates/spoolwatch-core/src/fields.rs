// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire-level tags used by the spooler notification interface: the record
// type tag, the job-level field tags, and the change-category bitmask.
// The numeric values are fixed by the platform and must not be reordered.

use serde::{Deserialize, Serialize};

/// Notification record type tag: printer-level or job-level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotifyType {
    Printer,
    Job,
}

impl NotifyType {
    /// The on-wire tag value.
    pub const fn tag(self) -> u16 {
        match self {
            Self::Printer => 0,
            Self::Job => 1,
        }
    }

    /// Map a raw tag back to a known type. Unknown tags stay raw and their
    /// records decode to absent values.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            0 => Some(Self::Printer),
            1 => Some(Self::Job),
            _ => None,
        }
    }
}

/// Watchable/reportable attributes of a print job.
///
/// Discriminants are the platform field tags; the full catalogue is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum JobField {
    PrinterName = 0x00,
    MachineName = 0x01,
    PortName = 0x02,
    UserName = 0x03,
    NotifyName = 0x04,
    Datatype = 0x05,
    PrintProcessor = 0x06,
    Parameters = 0x07,
    DriverName = 0x08,
    Devmode = 0x09,
    Status = 0x0A,
    StatusString = 0x0B,
    SecurityDescriptor = 0x0C,
    Document = 0x0D,
    Priority = 0x0E,
    Position = 0x0F,
    Submitted = 0x10,
    StartTime = 0x11,
    UntilTime = 0x12,
    Time = 0x13,
    TotalPages = 0x14,
    PagesPrinted = 0x15,
    TotalBytes = 0x16,
    BytesPrinted = 0x17,
    RemoteJobId = 0x18,
}

impl JobField {
    /// Every job-level field, in tag order. Handy for "watch everything"
    /// filters.
    pub const ALL: [JobField; 25] = [
        Self::PrinterName,
        Self::MachineName,
        Self::PortName,
        Self::UserName,
        Self::NotifyName,
        Self::Datatype,
        Self::PrintProcessor,
        Self::Parameters,
        Self::DriverName,
        Self::Devmode,
        Self::Status,
        Self::StatusString,
        Self::SecurityDescriptor,
        Self::Document,
        Self::Priority,
        Self::Position,
        Self::Submitted,
        Self::StartTime,
        Self::UntilTime,
        Self::Time,
        Self::TotalPages,
        Self::PagesPrinted,
        Self::TotalBytes,
        Self::BytesPrinted,
        Self::RemoteJobId,
    ];

    /// The on-wire tag value.
    pub const fn tag(self) -> u16 {
        self as u16
    }

    /// Map a raw tag back to a known field.
    pub fn from_tag(tag: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.tag() == tag)
    }

    /// Human-readable label for display and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::PrinterName => "Printer name",
            Self::MachineName => "Machine name",
            Self::PortName => "Port name",
            Self::UserName => "User name",
            Self::NotifyName => "Notify name",
            Self::Datatype => "Datatype",
            Self::PrintProcessor => "Print processor",
            Self::Parameters => "Parameters",
            Self::DriverName => "Driver name",
            Self::Devmode => "Devmode",
            Self::Status => "Status",
            Self::StatusString => "Status(string)",
            Self::SecurityDescriptor => "Security descriptor",
            Self::Document => "Document",
            Self::Priority => "Priority",
            Self::Position => "Position",
            Self::Submitted => "Submitted time",
            Self::StartTime => "Start time",
            Self::UntilTime => "Until time",
            Self::Time => "Time since start",
            Self::TotalPages => "Total pages",
            Self::PagesPrinted => "Pages printed",
            Self::TotalBytes => "Total bytes",
            Self::BytesPrinted => "Bytes printed",
            Self::RemoteJobId => "Remote job id",
        }
    }
}

impl std::fmt::Display for JobField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Change-category bitmask selecting which classes of spooler changes a
/// notification object reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMask(pub u32);

impl ChangeMask {
    pub const NONE: ChangeMask = ChangeMask(0);

    pub const ADD_PRINTER: ChangeMask = ChangeMask(0x0000_0001);
    pub const SET_PRINTER: ChangeMask = ChangeMask(0x0000_0002);
    pub const DELETE_PRINTER: ChangeMask = ChangeMask(0x0000_0004);
    pub const FAILED_CONNECTION_PRINTER: ChangeMask = ChangeMask(0x0000_0008);
    pub const PRINTER: ChangeMask = ChangeMask(0x0000_00FF);

    pub const ADD_JOB: ChangeMask = ChangeMask(0x0000_0100);
    pub const SET_JOB: ChangeMask = ChangeMask(0x0000_0200);
    pub const DELETE_JOB: ChangeMask = ChangeMask(0x0000_0400);
    pub const WRITE_JOB: ChangeMask = ChangeMask(0x0000_0800);
    pub const JOB: ChangeMask = ChangeMask(0x0000_FF00);

    pub const ADD_FORM: ChangeMask = ChangeMask(0x0001_0000);
    pub const SET_FORM: ChangeMask = ChangeMask(0x0002_0000);
    pub const DELETE_FORM: ChangeMask = ChangeMask(0x0004_0000);
    pub const FORM: ChangeMask = ChangeMask(0x0007_0000);

    pub const ADD_PORT: ChangeMask = ChangeMask(0x0010_0000);
    pub const CONFIGURE_PORT: ChangeMask = ChangeMask(0x0020_0000);
    pub const DELETE_PORT: ChangeMask = ChangeMask(0x0040_0000);
    pub const PORT: ChangeMask = ChangeMask(0x0070_0000);

    pub const ADD_PRINT_PROCESSOR: ChangeMask = ChangeMask(0x0100_0000);
    pub const DELETE_PRINT_PROCESSOR: ChangeMask = ChangeMask(0x0400_0000);
    pub const PRINT_PROCESSOR: ChangeMask = ChangeMask(0x0700_0000);

    pub const SERVER: ChangeMask = ChangeMask(0x0800_0000);

    pub const ADD_PRINTER_DRIVER: ChangeMask = ChangeMask(0x1000_0000);
    pub const SET_PRINTER_DRIVER: ChangeMask = ChangeMask(0x2000_0000);
    pub const DELETE_PRINTER_DRIVER: ChangeMask = ChangeMask(0x4000_0000);
    pub const PRINTER_DRIVER: ChangeMask = ChangeMask(0x7000_0000);

    pub const TIMEOUT: ChangeMask = ChangeMask(0x8000_0000);
    pub const ALL: ChangeMask = ChangeMask(0x7F77_FFFF);

    /// Raw bitmask value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is present in `self`.
    pub const fn contains(self, other: ChangeMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is present in `self`.
    pub const fn intersects(self, other: ChangeMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for ChangeMask {
    type Output = ChangeMask;

    fn bitor(self, rhs: ChangeMask) -> ChangeMask {
        ChangeMask(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ChangeMask {
    fn bitor_assign(&mut self, rhs: ChangeMask) {
        self.0 |= rhs.0;
    }
}

impl std::fmt::Display for ChangeMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_field_tags_round_trip() {
        for field in JobField::ALL {
            assert_eq!(JobField::from_tag(field.tag()), Some(field));
        }
    }

    #[test]
    fn unknown_field_tag_is_none() {
        assert_eq!(JobField::from_tag(0x19), None);
        assert_eq!(JobField::from_tag(0xFFFF), None);
    }

    #[test]
    fn notify_type_tags() {
        assert_eq!(NotifyType::from_tag(0), Some(NotifyType::Printer));
        assert_eq!(NotifyType::from_tag(1), Some(NotifyType::Job));
        assert_eq!(NotifyType::from_tag(2), None);
    }

    #[test]
    fn change_mask_job_covers_job_bits() {
        let jobs = ChangeMask::ADD_JOB | ChangeMask::SET_JOB | ChangeMask::DELETE_JOB;
        assert!(ChangeMask::JOB.contains(jobs));
        assert!(ChangeMask::ALL.intersects(ChangeMask::ADD_JOB));
        assert!(!ChangeMask::PRINTER.intersects(ChangeMask::ADD_JOB));
    }
}
