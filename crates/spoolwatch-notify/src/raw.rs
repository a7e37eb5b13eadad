// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw notification records as delivered by a platform notification object.
//
// A backend fills these inside its fetch call, copying any payload bytes it
// references; once a `RawBatch` is returned the platform buffer may be
// released.  The decoder consumes the batch immediately after fetch, so raw
// payloads never outlive one turn of the session loop.

use chrono::{DateTime, Datelike, Timelike, Utc};

use spoolwatch_core::fields::{ChangeMask, JobField, NotifyType};

/// Payload reference of one raw record: a byte size plus optional bytes.
///
/// Scalar fields repurpose `size` as the value itself and carry no bytes;
/// this is deliberate platform behavior and is preserved as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    /// Payload size in bytes, or the scalar value for length-encoded fields.
    pub size: u32,
    /// Payload bytes, absent for length-encoded scalar fields.
    pub data: Option<Vec<u8>>,
}

impl RawPayload {
    /// A length-encoded scalar: the value lives in the size field.
    pub fn scalar(value: u32) -> Self {
        Self { size: value, data: None }
    }

    /// A byte payload; `size` is derived from the buffer length.
    pub fn bytes(data: Vec<u8>) -> Self {
        Self { size: data.len() as u32, data: Some(data) }
    }

    /// A UTF-16LE text payload with a terminating NUL, as the spooler
    /// writes string fields.
    pub fn text(text: &str) -> Self {
        let mut bytes = Vec::with_capacity((text.len() + 1) * 2);
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.extend_from_slice(&0u16.to_le_bytes());
        Self::bytes(bytes)
    }

    /// A 16-byte wire timestamp (year, month, day-of-week, day, hour,
    /// minute, second, millisecond as little-endian u16s).
    pub fn system_time(when: DateTime<Utc>) -> Self {
        let parts: [u16; 8] = [
            when.year() as u16,
            when.month() as u16,
            when.weekday().num_days_from_sunday() as u16,
            when.day() as u16,
            when.hour() as u16,
            when.minute() as u16,
            when.second() as u16,
            when.timestamp_subsec_millis() as u16,
        ];
        let mut bytes = Vec::with_capacity(16);
        for part in parts {
            bytes.extend_from_slice(&part.to_le_bytes());
        }
        Self::bytes(bytes)
    }
}

/// One raw notification record: type tag, field tag, job id, payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Notification type tag (printer-level or job-level).
    pub type_tag: u16,
    /// Field tag within the notification type.
    pub field: u16,
    /// Job identifier; only meaningful for job-level records.
    pub job_id: u32,
    /// The payload reference.
    pub payload: RawPayload,
}

impl RawRecord {
    /// A job-level record with an arbitrary payload.
    pub fn job(field: JobField, job_id: u32, payload: RawPayload) -> Self {
        Self {
            type_tag: NotifyType::Job.tag(),
            field: field.tag(),
            job_id,
            payload,
        }
    }

    /// A job-level text record (UTF-16LE on the wire).
    pub fn job_text(field: JobField, job_id: u32, text: &str) -> Self {
        Self::job(field, job_id, RawPayload::text(text))
    }

    /// A job-level length-encoded scalar record.
    pub fn job_scalar(field: JobField, job_id: u32, value: u32) -> Self {
        Self::job(field, job_id, RawPayload::scalar(value))
    }

    /// A job submission-time record carrying a wire timestamp.
    pub fn job_submitted(job_id: u32, when: DateTime<Utc>) -> Self {
        Self::job(JobField::Submitted, job_id, RawPayload::system_time(when))
    }

    /// A printer-level record. These decode to absent values.
    pub fn printer(field: u16, payload: RawPayload) -> Self {
        Self {
            type_tag: NotifyType::Printer.tag(),
            field,
            job_id: 0,
            payload,
        }
    }
}

/// One raw batch, as accumulated by the notification object between fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBatch {
    /// Wire format version.
    pub version: u32,
    /// Flag bitset; bit 0 marks server-side overflow/discard.
    pub flags: u32,
    /// Change categories that triggered the notification.
    pub cause: ChangeMask,
    /// Records in wire order.
    pub records: Vec<RawRecord>,
}

impl RawBatch {
    /// Overflow/discarded flag bit.
    pub const FLAG_DISCARDED: u32 = 1;

    /// An empty batch for the given cause.
    pub fn new(cause: ChangeMask) -> Self {
        Self {
            version: 2,
            flags: 0,
            cause,
            records: Vec::new(),
        }
    }

    /// Append a record, builder-style.
    pub fn with_record(mut self, record: RawRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Mark the batch as overflowed/discarded, builder-style.
    pub fn discarded(mut self) -> Self {
        self.flags |= Self::FLAG_DISCARDED;
        self
    }

    /// Whether the overflow/discarded flag is set.
    pub fn is_discarded(&self) -> bool {
        self.flags & Self::FLAG_DISCARDED != 0
    }

    /// Fold another batch into this one, as the spooler does when several
    /// changes accumulate before a fetch.
    pub fn merge(&mut self, other: RawBatch) {
        self.version = self.version.max(other.version);
        self.flags |= other.flags;
        self.cause |= other.cause;
        self.records.extend(other.records);
    }
}
