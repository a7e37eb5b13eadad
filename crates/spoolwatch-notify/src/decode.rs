// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The record decoder: raw tagged records to typed field values.
//
// Interpretation is driven by one table keyed by (notification type, field
// tag).  Text fields carry UTF-16LE payloads of a given byte length; scalar
// fields carry their value in the payload *length* with no payload at all
// (deliberate spooler behavior, preserved exactly); the submission time is
// a 16-byte wire timestamp.  Anything else, including every printer-level
// field and any unknown tag, decodes to an absent value.  Decoding never
// fails.

use chrono::{DateTime, LocalResult, TimeZone, Utc};

use spoolwatch_core::fields::{JobField, NotifyType};
use spoolwatch_core::types::{DecodedField, DecodedValue, NotificationBatch};

use crate::raw::{RawBatch, RawPayload, RawRecord};

/// How a `(type, field)` pair is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeKind {
    /// Fixed-width UTF-16LE text of `payload.size` bytes.
    Text,
    /// Scalar carried in the payload length field.
    Scalar,
    /// 16-byte wire timestamp.
    Timestamp,
    /// Never dereferenced; decodes to absent.
    Unsupported,
}

/// The decode table.  Exhaustive over the job-level field catalogue;
/// printer-level fields and unknown tags are unsupported.
fn decode_kind(type_tag: u16, field: u16) -> DecodeKind {
    if NotifyType::from_tag(type_tag) != Some(NotifyType::Job) {
        return DecodeKind::Unsupported;
    }
    let Some(field) = JobField::from_tag(field) else {
        return DecodeKind::Unsupported;
    };

    match field {
        JobField::PrinterName
        | JobField::MachineName
        | JobField::PortName
        | JobField::UserName
        | JobField::NotifyName
        | JobField::Datatype
        | JobField::PrintProcessor
        | JobField::Parameters
        | JobField::DriverName
        | JobField::StatusString
        | JobField::Document => DecodeKind::Text,

        JobField::Status
        | JobField::Priority
        | JobField::Position
        | JobField::StartTime
        | JobField::UntilTime
        | JobField::Time
        | JobField::TotalPages
        | JobField::PagesPrinted
        | JobField::TotalBytes
        | JobField::BytesPrinted => DecodeKind::Scalar,

        JobField::Submitted => DecodeKind::Timestamp,

        JobField::Devmode | JobField::SecurityDescriptor | JobField::RemoteJobId => {
            DecodeKind::Unsupported
        }
    }
}

/// Decode one raw record.  Pure; never fails.
pub fn decode_record(record: &RawRecord) -> DecodedField {
    let value = match decode_kind(record.type_tag, record.field) {
        DecodeKind::Text => decode_text(&record.payload),
        DecodeKind::Scalar => DecodedValue::Count(record.payload.size),
        DecodeKind::Timestamp => decode_system_time(&record.payload),
        DecodeKind::Unsupported => DecodedValue::Absent,
    };

    DecodedField {
        type_tag: record.type_tag,
        field: record.field,
        job_id: record.job_id,
        value,
    }
}

/// Decode a whole raw batch, preserving record order, flags, and cause.
pub fn decode_batch(raw: &RawBatch) -> NotificationBatch {
    NotificationBatch {
        version: raw.version,
        flags: raw.flags,
        cause: raw.cause,
        fields: raw.records.iter().map(decode_record).collect(),
    }
}

/// Interpret a payload as fixed-width UTF-16LE text of `size` bytes,
/// stopping at the first NUL.
fn decode_text(payload: &RawPayload) -> DecodedValue {
    let Some(data) = payload.data.as_deref() else {
        return DecodedValue::Absent;
    };

    // Only `size` bytes of the buffer are meaningful, and never more than
    // the buffer actually holds.
    let byte_len = (payload.size as usize).min(data.len());
    let units: Vec<u16> = data[..byte_len]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();

    DecodedValue::Text(String::from_utf16_lossy(&units))
}

/// Interpret a payload as a wire timestamp and normalize it to UTC.
/// Malformed payloads decode to absent.
fn decode_system_time(payload: &RawPayload) -> DecodedValue {
    let Some(data) = payload.data.as_deref() else {
        return DecodedValue::Absent;
    };
    if data.len() < 16 {
        return DecodedValue::Absent;
    }

    let unit = |i: usize| u16::from_le_bytes([data[i * 2], data[i * 2 + 1]]);
    let (year, month, day) = (unit(0), unit(1), unit(3)); // unit(2) is day-of-week
    let (hour, minute, second, millis) = (unit(4), unit(5), unit(6), unit(7));

    match Utc.with_ymd_and_hms(
        i32::from(year),
        u32::from(month),
        u32::from(day),
        u32::from(hour),
        u32::from(minute),
        u32::from(second),
    ) {
        LocalResult::Single(instant) => {
            DecodedValue::Timestamp(instant + chrono::Duration::milliseconds(i64::from(millis)))
        }
        _ => DecodedValue::Absent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use spoolwatch_core::fields::ChangeMask;
    use spoolwatch_core::status::job_status;

    fn decode_one(record: RawRecord) -> DecodedValue {
        decode_record(&record).value
    }

    #[test]
    fn every_supported_job_field_decodes_non_absent() {
        let when = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        for field in JobField::ALL {
            let record = match decode_kind(NotifyType::Job.tag(), field.tag()) {
                DecodeKind::Text => RawRecord::job_text(field, 1, "x"),
                DecodeKind::Scalar => RawRecord::job_scalar(field, 1, 42),
                DecodeKind::Timestamp => RawRecord::job_submitted(1, when),
                DecodeKind::Unsupported => continue,
            };
            let value = decode_one(record);
            assert!(!value.is_absent(), "{field} decoded to absent");
        }
    }

    #[test]
    fn unsupported_fields_decode_absent_without_touching_payload() {
        // Devmode and security descriptor carry opaque blobs that must
        // never be interpreted.
        for field in [JobField::Devmode, JobField::SecurityDescriptor] {
            let record = RawRecord::job(field, 1, RawPayload::bytes(vec![0xFF; 64]));
            assert!(decode_one(record).is_absent());
        }
    }

    #[test]
    fn remote_job_id_decodes_absent() {
        let value = decode_one(RawRecord::job_scalar(JobField::RemoteJobId, 1, 77));
        assert!(value.is_absent());
    }

    #[test]
    fn unknown_tags_decode_absent() {
        let unknown_field = RawRecord {
            type_tag: NotifyType::Job.tag(),
            field: 0x40,
            job_id: 1,
            payload: RawPayload::scalar(7),
        };
        assert!(decode_one(unknown_field).is_absent());

        let unknown_type = RawRecord {
            type_tag: 9,
            field: JobField::Status.tag(),
            job_id: 1,
            payload: RawPayload::scalar(7),
        };
        assert!(decode_one(unknown_type).is_absent());

        let printer_level = RawRecord::printer(2, RawPayload::text("idle"));
        assert!(decode_one(printer_level).is_absent());
    }

    #[test]
    fn text_stops_at_nul_and_respects_size() {
        let record = RawRecord::job_text(JobField::Document, 4, "report.pdf");
        assert_eq!(
            decode_one(record),
            DecodedValue::Text("report.pdf".into())
        );

        // Embedded NUL truncates.
        let mut bytes = Vec::new();
        for unit in "ab\0cd".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let record = RawRecord::job(JobField::Document, 4, RawPayload::bytes(bytes));
        assert_eq!(decode_one(record), DecodedValue::Text("ab".into()));

        // A size smaller than the buffer limits how much is read.
        let mut payload = RawPayload::text("abcdef");
        payload.size = 4; // two code units
        let record = RawRecord::job(JobField::Document, 4, payload);
        assert_eq!(decode_one(record), DecodedValue::Text("ab".into()));
    }

    #[test]
    fn decoded_text_never_exceeds_code_unit_count() {
        let text = "printer-of-theseus";
        let record = RawRecord::job_text(JobField::PrinterName, 2, text);
        let DecodedValue::Text(decoded) = decode_one(record) else {
            panic!("expected text");
        };
        assert!(decoded.encode_utf16().count() <= text.encode_utf16().count());
        assert_eq!(decoded, text);
    }

    #[test]
    fn scalar_value_is_the_length_field() {
        let record = RawRecord::job_scalar(JobField::Status, 1, 0x1000);
        assert_eq!(decode_one(record), DecodedValue::Count(0x1000));

        // Even a zero "length" is a legitimate value.
        let record = RawRecord::job_scalar(JobField::PagesPrinted, 1, 0);
        assert_eq!(decode_one(record), DecodedValue::Count(0));
    }

    #[test]
    fn watched_status_example_decodes_exactly() {
        // Watched fields = {status}; a record with length-encoded 0x1000
        // decodes to field=Status, value=0x1000.
        let raw = RawBatch::new(ChangeMask::SET_JOB)
            .with_record(RawRecord::job_scalar(JobField::Status, 12, job_status::COMPLETE));
        let batch = decode_batch(&raw);

        assert_eq!(batch.fields.len(), 1);
        let field = &batch.fields[0];
        assert_eq!(field.job_field(), Some(JobField::Status));
        assert_eq!(field.value.as_count(), Some(0x1000));
    }

    #[test]
    fn system_time_round_trips_components() {
        let when = Utc
            .with_ymd_and_hms(2026, 8, 29, 17, 45, 12)
            .unwrap()
            + chrono::Duration::milliseconds(250);

        let record = RawRecord::job_submitted(8, when);
        let DecodedValue::Timestamp(decoded) = decode_one(record) else {
            panic!("expected timestamp");
        };

        assert_eq!(decoded.year(), 2026);
        assert_eq!(decoded.month(), 8);
        assert_eq!(decoded.day(), 29);
        assert_eq!(decoded.hour(), 17);
        assert_eq!(decoded.minute(), 45);
        assert_eq!(decoded.second(), 12);
        assert_eq!(decoded.timestamp_subsec_millis(), 250);
        assert_eq!(decoded, when);
    }

    #[test]
    fn malformed_timestamp_decodes_absent() {
        let record = RawRecord::job(JobField::Submitted, 1, RawPayload::bytes(vec![0; 8]));
        assert!(decode_one(record).is_absent());

        // Month 13 is not a date.
        let mut bytes = Vec::new();
        for part in [2026u16, 13, 0, 1, 0, 0, 0, 0] {
            bytes.extend_from_slice(&part.to_le_bytes());
        }
        let record = RawRecord::job(JobField::Submitted, 1, RawPayload::bytes(bytes));
        assert!(decode_one(record).is_absent());
    }

    #[test]
    fn batch_decode_preserves_order_flags_and_cause() {
        let raw = RawBatch::new(ChangeMask::ADD_JOB)
            .with_record(RawRecord::job_text(JobField::Document, 5, "a.txt"))
            .with_record(RawRecord::job_scalar(JobField::Status, 5, job_status::SPOOLING));
        let batch = decode_batch(&raw);

        assert_eq!(batch.cause, ChangeMask::ADD_JOB);
        assert!(!batch.is_discarded());
        assert_eq!(batch.fields[0].job_field(), Some(JobField::Document));
        assert_eq!(batch.fields[1].job_field(), Some(JobField::Status));
    }
}
