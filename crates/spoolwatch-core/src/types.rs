// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the spoolwatch notification pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::{ChangeMask, JobField, NotifyType};
use crate::status::status_text;

/// Immutable subscription configuration for one notification object: the
/// change categories of interest plus the ordered watched-field sets per
/// notification type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationFilter {
    /// Which classes of spooler changes trigger the notification object.
    pub changes: ChangeMask,
    /// Job-level fields to report, in the order they were requested.
    pub job_fields: Vec<JobField>,
    /// Printer-level field tags to report. Kept raw: printer-level fields
    /// have no decode support and always yield absent values.
    pub printer_fields: Vec<u16>,
}

impl NotificationFilter {
    /// Watch every change category and every job-level field.
    pub fn all_job_fields() -> Self {
        Self {
            changes: ChangeMask::ALL,
            job_fields: JobField::ALL.to_vec(),
            printer_fields: Vec::new(),
        }
    }

    /// Watch the given job-level fields for the given change categories.
    pub fn job_fields(changes: ChangeMask, fields: impl Into<Vec<JobField>>) -> Self {
        Self {
            changes,
            job_fields: fields.into(),
            printer_fields: Vec::new(),
        }
    }
}

/// A decoded notification field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecodedValue {
    /// Field is unsupported, unrecognized, or its payload was malformed.
    Absent,
    /// Canonical text, converted from the fixed-width wire form.
    Text(String),
    /// Scalar value. On the wire these are carried in the payload *length*
    /// field; there is no payload to dereference.
    Count(u32),
    /// Absolute UTC instant, normalized from the wire timestamp structure.
    Timestamp(DateTime<Utc>),
}

impl DecodedValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The scalar value, if this is a `Count`.
    pub fn as_count(&self) -> Option<u32> {
        match self {
            Self::Count(v) => Some(*v),
            _ => None,
        }
    }

    /// The text value, if this is a `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The timestamp value, if this is a `Timestamp`.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl std::fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => f.write_str("<absent>"),
            Self::Text(s) => f.write_str(s),
            Self::Count(v) => write!(f, "{v}"),
            Self::Timestamp(t) => write!(f, "{t}"),
        }
    }
}

/// One decoded notification record.
///
/// The type and field tags are kept raw so that records with unknown tags
/// survive decoding unchanged (their value is simply absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedField {
    /// Raw notification type tag.
    pub type_tag: u16,
    /// Raw field tag.
    pub field: u16,
    /// Job identifier; only meaningful for job-level records.
    pub job_id: u32,
    /// The decoded value.
    pub value: DecodedValue,
}

impl DecodedField {
    /// The notification type, if the tag is a known one.
    pub fn notify_type(&self) -> Option<NotifyType> {
        NotifyType::from_tag(self.type_tag)
    }

    /// The job field, if this is a job-level record with a known field tag.
    pub fn job_field(&self) -> Option<JobField> {
        match self.notify_type() {
            Some(NotifyType::Job) => JobField::from_tag(self.field),
            _ => None,
        }
    }
}

impl std::fmt::Display for DecodedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.notify_type(), self.job_field()) {
            (Some(NotifyType::Job), Some(JobField::Status)) => {
                // Status gets its bitmask spelled out alongside the raw value.
                if let Some(code) = self.value.as_count() {
                    return write!(
                        f,
                        "Job #{} {}: {} ({})",
                        self.job_id,
                        JobField::Status,
                        code,
                        status_text(code)
                    );
                }
                write!(f, "Job #{} {}: {}", self.job_id, JobField::Status, self.value)
            }
            (Some(NotifyType::Job), Some(field)) => {
                write!(f, "Job #{} {}: {}", self.job_id, field, self.value)
            }
            (Some(NotifyType::Job), None) => {
                write!(f, "Job #{} field {}: {}", self.job_id, self.field, self.value)
            }
            _ => write!(f, "Printer field {}: {}", self.field, self.value),
        }
    }
}

/// One decoded notification batch, produced by a single successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationBatch {
    /// Wire format version reported by the spooler.
    pub version: u32,
    /// Flag bitset; bit 0 marks server-side overflow/discard.
    pub flags: u32,
    /// Change categories that caused this batch.
    pub cause: ChangeMask,
    /// Decoded records, in wire order.
    pub fields: Vec<DecodedField>,
}

impl NotificationBatch {
    /// Overflow/discarded flag: notifications were lost server-side and the
    /// object must be resynchronized with a refresh fetch.
    pub const FLAG_DISCARDED: u32 = 1;

    /// Whether the overflow/discarded flag is set.
    pub fn is_discarded(&self) -> bool {
        self.flags & Self::FLAG_DISCARDED != 0
    }

    /// First decoded value for the given job field, if any record carries it.
    pub fn job_value(&self, field: JobField) -> Option<&DecodedValue> {
        self.fields
            .iter()
            .find(|f| f.job_field() == Some(field))
            .map(|f| &f.value)
    }
}

impl std::fmt::Display for NotificationBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification cause {}", self.cause)?;
        for field in &self.fields {
            write!(f, "\n{field}")?;
        }
        Ok(())
    }
}

/// Full detail for one print job, as returned by job enumeration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    /// Spooler-assigned job identifier.
    pub job_id: u32,
    /// Printer the job is spooled on.
    pub printer_name: String,
    /// Machine that created the job.
    pub machine_name: String,
    /// Owner of the job.
    pub user_name: String,
    /// Document name (for example "Quarterly report.pdf").
    pub document_name: String,
    /// User to notify on completion or error.
    pub notify_name: String,
    /// Datatype used to record the job (for example "RAW").
    pub datatype: String,
    /// Print processor handling the job.
    pub print_processor: String,
    /// Print-processor parameters.
    pub parameters: String,
    /// Driver that should process the job.
    pub driver_name: String,
    /// Status text; takes precedence over `status_code` when non-empty.
    pub status: String,
    /// Status bitmask (`job_status` bits).
    pub status_code: u32,
    /// Priority, 1 (lowest) through 99 (highest).
    pub priority: u32,
    /// Position in the queue.
    pub position: u32,
    /// Earliest time the job may print, minutes since midnight.
    pub start_time: u32,
    /// Latest time the job may print, minutes since midnight.
    pub until_time: u32,
    /// Total pages, zero when the job carries no page delimiters.
    pub total_pages: u32,
    /// Job size in bytes.
    pub size: u64,
    /// Milliseconds elapsed since the job began printing.
    pub time_ms: u32,
    /// Pages printed so far.
    pub pages_printed: u32,
    /// When the job was submitted.
    pub submitted: DateTime<Utc>,
}

impl JobInfo {
    /// A freshly spooled job with empty detail fields.
    pub fn new(job_id: u32, printer_name: impl Into<String>, document_name: impl Into<String>) -> Self {
        Self {
            job_id,
            printer_name: printer_name.into(),
            machine_name: String::new(),
            user_name: String::new(),
            document_name: document_name.into(),
            notify_name: String::new(),
            datatype: String::new(),
            print_processor: String::new(),
            parameters: String::new(),
            driver_name: String::new(),
            status: String::new(),
            status_code: 0,
            priority: 1,
            position: 0,
            start_time: 0,
            until_time: 0,
            total_pages: 0,
            size: 0,
            time_ms: 0,
            pages_printed: 0,
            submitted: Utc::now(),
        }
    }

    /// The status text, deriving it from the bitmask when the spooler did
    /// not supply one.
    pub fn effective_status(&self) -> String {
        if self.status.trim().is_empty() {
            status_text(self.status_code)
        } else {
            self.status.clone()
        }
    }
}

/// Information about a printer driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverInfo {
    pub name: String,
    pub environment: String,
    pub driver_path: String,
    pub attributes: u32,
}

impl DriverInfo {
    /// Attribute bit marking an XPS-based (v4) driver.
    pub const ATTR_XPS: u32 = 0x0000_0002;

    /// Whether documents should be spooled as `XPS_PASS` rather than `RAW`.
    pub fn is_xps(&self) -> bool {
        self.attributes & Self::ATTR_XPS != 0
    }
}
