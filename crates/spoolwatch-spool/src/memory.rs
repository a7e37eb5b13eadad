// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// An in-process spooler. It implements the directory and port traits over
// the loopback notification feed, so spooling a document or controlling a
// job produces the same change batches a platform spooler would. Tests and
// embedders use it as a complete stand-in backend.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info};

use spoolwatch_core::error::{Result, SpoolwatchError};
use spoolwatch_core::fields::{ChangeMask, JobField};
use spoolwatch_core::status::{JobControl, job_status};
use spoolwatch_core::types::{DriverInfo, JobInfo, NotificationFilter};
use spoolwatch_notify::loopback::LoopbackHub;
use spoolwatch_notify::raw::{RawBatch, RawRecord};
use spoolwatch_notify::source::ChangeSource;

use crate::directory::{PrinterDirectory, PrinterPort};

struct PrinterEntry {
    hub: LoopbackHub,
    driver: DriverInfo,
    jobs: Vec<JobInfo>,
    next_job_id: u32,
    /// Finished documents, name and spooled bytes.
    documents: Vec<(String, Vec<u8>)>,
}

impl PrinterEntry {
    fn new(driver: DriverInfo) -> Self {
        Self {
            hub: LoopbackHub::new(),
            driver,
            jobs: Vec::new(),
            next_job_id: 1,
            documents: Vec::new(),
        }
    }
}

#[derive(Default)]
struct Inner {
    printers: BTreeMap<String, PrinterEntry>,
    default: Option<String>,
}

/// In-memory printer directory and spooler.
#[derive(Clone, Default)]
pub struct MemorySpooler {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySpooler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a printer with a plain (non-XPS) driver. The first printer
    /// registered becomes the default.
    pub fn add_printer(&self, name: &str) {
        self.add_printer_with_driver(
            name,
            DriverInfo {
                name: format!("{name} Driver"),
                environment: String::new(),
                driver_path: String::new(),
                attributes: 0,
            },
        );
    }

    pub fn add_printer_with_driver(&self, name: &str, driver: DriverInfo) {
        let mut inner = self.lock();
        inner
            .printers
            .insert(name.to_owned(), PrinterEntry::new(driver));
        if inner.default.is_none() {
            inner.default = Some(name.to_owned());
        }
        info!(printer = name, "registered in-memory printer");
    }

    pub fn set_default(&self, name: &str) -> Result<()> {
        let mut inner = self.lock();
        if !inner.printers.contains_key(name) {
            return Err(SpoolwatchError::UnknownPrinter(name.to_owned()));
        }
        inner.default = Some(name.to_owned());
        Ok(())
    }

    /// The notification hub behind a printer, for pushing synthetic change
    /// batches or injecting faults.
    pub fn hub(&self, name: &str) -> Result<LoopbackHub> {
        let inner = self.lock();
        inner
            .printers
            .get(name)
            .map(|entry| entry.hub.clone())
            .ok_or_else(|| SpoolwatchError::UnknownPrinter(name.to_owned()))
    }

    /// Push a synthetic change batch to every subscriber of a printer.
    pub fn push(&self, name: &str, batch: RawBatch) -> Result<()> {
        self.hub(name)?.push(batch);
        Ok(())
    }

    /// Documents spooled to completion on a printer, oldest first.
    pub fn documents(&self, name: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let inner = self.lock();
        inner
            .printers
            .get(name)
            .map(|entry| entry.documents.clone())
            .ok_or_else(|| SpoolwatchError::UnknownPrinter(name.to_owned()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("spooler state lock poisoned")
    }
}

impl PrinterDirectory for MemorySpooler {
    fn printer_names(&self) -> Result<Vec<String>> {
        Ok(self.lock().printers.keys().cloned().collect())
    }

    fn default_printer(&self) -> Result<String> {
        self.lock()
            .default
            .clone()
            .ok_or_else(|| SpoolwatchError::Directory("no printers registered".into()))
    }

    fn open(&self, name: &str) -> Result<Box<dyn PrinterPort>> {
        if !self.lock().printers.contains_key(name) {
            return Err(SpoolwatchError::OpenFailed(format!("unknown printer {name}")));
        }
        Ok(Box::new(MemoryPort {
            name: name.to_owned(),
            inner: Arc::clone(&self.inner),
            doc: None,
        }))
    }
}

struct OpenDocument {
    name: String,
    datatype: String,
    bytes: Vec<u8>,
    pages: u32,
    page_open: bool,
}

/// One opened in-memory printer.
pub struct MemoryPort {
    name: String,
    inner: Arc<Mutex<Inner>>,
    doc: Option<OpenDocument>,
}

impl MemoryPort {
    fn with_entry<T>(&self, f: impl FnOnce(&mut PrinterEntry) -> Result<T>) -> Result<T> {
        let mut inner = self.inner.lock().expect("spooler state lock poisoned");
        let entry = inner
            .printers
            .get_mut(&self.name)
            .ok_or_else(|| SpoolwatchError::UnknownPrinter(self.name.clone()))?;
        f(entry)
    }
}

/// The change batch a job transition publishes, carrying the fields a real
/// spooler reports alongside the status.
fn job_change(cause: ChangeMask, job: &JobInfo) -> RawBatch {
    RawBatch::new(cause)
        .with_record(RawRecord::job_text(JobField::PrinterName, job.job_id, &job.printer_name))
        .with_record(RawRecord::job_text(JobField::Document, job.job_id, &job.document_name))
        .with_record(RawRecord::job_scalar(JobField::Status, job.job_id, job.status_code))
        .with_record(RawRecord::job_scalar(JobField::TotalPages, job.job_id, job.total_pages))
        .with_record(RawRecord::job_submitted(job.job_id, job.submitted))
}

impl PrinterPort for MemoryPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn subscribe(&mut self, filter: &NotificationFilter) -> Result<Box<dyn ChangeSource>> {
        // The in-memory feed publishes everything; the filter is recorded
        // for the log only.
        debug!(printer = %self.name, changes = %filter.changes, "subscribing to change notifications");
        self.with_entry(|entry| Ok(Box::new(entry.hub.subscribe()) as Box<dyn ChangeSource>))
    }

    fn jobs(&self) -> Result<Vec<JobInfo>> {
        self.with_entry(|entry| Ok(entry.jobs.clone()))
    }

    fn job(&self, job_id: u32) -> Result<JobInfo> {
        self.with_entry(|entry| {
            entry
                .jobs
                .iter()
                .find(|job| job.job_id == job_id)
                .cloned()
                .ok_or(SpoolwatchError::JobNotFound(job_id))
        })
    }

    fn control_job(&mut self, job_id: u32, command: JobControl) -> Result<()> {
        self.with_entry(|entry| {
            let index = entry
                .jobs
                .iter()
                .position(|job| job.job_id == job_id)
                .ok_or(SpoolwatchError::JobNotFound(job_id))?;

            if matches!(command, JobControl::Cancel | JobControl::Delete) {
                let mut job = entry.jobs.remove(index);
                job.status_code = job_status::DELETED;
                entry.hub.push(job_change(ChangeMask::DELETE_JOB, &job));
                return Ok(());
            }

            let job = &mut entry.jobs[index];
            match command {
                JobControl::Pause => job.status_code |= job_status::PAUSED,
                JobControl::Resume => job.status_code &= !job_status::PAUSED,
                JobControl::Restart => job.status_code = job_status::RESTART,
                JobControl::SentToPrinter => job.status_code |= job_status::PRINTING,
                JobControl::LastPageEjected => job.status_code |= job_status::PRINTED,
                JobControl::Retain => job.status_code |= job_status::RETAINED,
                JobControl::Release => job.status_code &= !job_status::RETAINED,
                JobControl::Cancel | JobControl::Delete => unreachable!(),
            }
            let batch = job_change(ChangeMask::SET_JOB, &entry.jobs[index]);
            entry.hub.push(batch);
            Ok(())
        })
    }

    fn driver_info(&self) -> Result<DriverInfo> {
        self.with_entry(|entry| Ok(entry.driver.clone()))
    }

    fn start_document(&mut self, name: &str, _output_file: &str, datatype: &str) -> Result<()> {
        if self.doc.is_some() {
            return Err(SpoolwatchError::Spool("document already in progress".into()));
        }
        self.doc = Some(OpenDocument {
            name: name.to_owned(),
            datatype: datatype.to_owned(),
            bytes: Vec::new(),
            pages: 0,
            page_open: false,
        });
        Ok(())
    }

    fn start_page(&mut self) -> Result<()> {
        let doc = self
            .doc
            .as_mut()
            .ok_or_else(|| SpoolwatchError::Spool("no document started".into()))?;
        doc.pages += 1;
        doc.page_open = true;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let doc = self
            .doc
            .as_mut()
            .ok_or_else(|| SpoolwatchError::Spool("no document started".into()))?;
        doc.bytes.extend_from_slice(data);
        Ok(data.len())
    }

    fn end_page(&mut self) -> Result<()> {
        let doc = self
            .doc
            .as_mut()
            .ok_or_else(|| SpoolwatchError::Spool("no document started".into()))?;
        doc.page_open = false;
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        let doc = self
            .doc
            .take()
            .ok_or_else(|| SpoolwatchError::Spool("no document started".into()))?;
        let name = self.name.clone();
        self.with_entry(|entry| {
            let job_id = entry.next_job_id;
            entry.next_job_id += 1;

            let mut job = JobInfo::new(job_id, &name, &doc.name);
            job.datatype = doc.datatype.clone();
            job.status_code = job_status::SPOOLING;
            job.total_pages = doc.pages;
            job.size = doc.bytes.len() as u64;
            job.position = entry.jobs.len() as u32 + 1;
            job.submitted = Utc::now();

            info!(
                printer = %name,
                job_id,
                document = %doc.name,
                bytes = doc.bytes.len(),
                "document spooled"
            );
            entry.hub.push(job_change(ChangeMask::ADD_JOB, &job));
            entry.jobs.push(job);
            entry.documents.push((doc.name.clone(), doc.bytes.clone()));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    use spoolwatch_core::types::DecodedValue;
    use spoolwatch_notify::decode::decode_batch;
    use spoolwatch_notify::source::WaitStatus;

    use crate::directory::DATATYPE_RAW;
    use crate::writer::DocumentWriter;

    const SHORT: Duration = Duration::from_millis(100);

    fn spooler_with(name: &str) -> MemorySpooler {
        let spooler = MemorySpooler::new();
        spooler.add_printer(name);
        spooler
    }

    #[test]
    fn first_registered_printer_is_default() {
        let spooler = spooler_with("front-desk");
        spooler.add_printer("back-office");
        assert_eq!(spooler.default_printer().unwrap(), "front-desk");
        assert_eq!(
            spooler.printer_names().unwrap(),
            vec!["back-office".to_owned(), "front-desk".to_owned()]
        );

        spooler.set_default("back-office").unwrap();
        assert_eq!(spooler.default_printer().unwrap(), "back-office");
        assert!(spooler.set_default("missing").is_err());
    }

    #[test]
    fn opening_an_unknown_printer_fails() {
        let spooler = spooler_with("front-desk");
        let err = spooler.open("missing").err().expect("open should fail");
        assert!(matches!(err, SpoolwatchError::OpenFailed(_)));
    }

    #[test]
    fn spooling_a_document_queues_a_job_and_notifies() {
        let spooler = spooler_with("front-desk");
        let mut port = spooler.open("front-desk").unwrap();
        let mut source = port.subscribe(&NotificationFilter::all_job_fields()).unwrap();

        let mut writer =
            DocumentWriter::start(port.as_mut(), "ledger.pdf", "", DATATYPE_RAW).unwrap();
        writer.write_all(b"%PDF-1.7 ...").unwrap();
        writer.finish().unwrap();

        assert_eq!(source.wait(SHORT), WaitStatus::Signaled);
        let raw = source.fetch_next(false).unwrap().expect("batch");
        let batch = decode_batch(&raw);
        assert_eq!(batch.cause, ChangeMask::ADD_JOB);
        assert_eq!(
            batch.job_value(JobField::Document),
            Some(&DecodedValue::Text("ledger.pdf".into()))
        );

        let jobs = port.jobs().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].document_name, "ledger.pdf");
        assert_eq!(jobs[0].effective_status(), "Spooling");

        let documents = spooler.documents("front-desk").unwrap();
        assert_eq!(documents[0].0, "ledger.pdf");
        assert_eq!(documents[0].1, b"%PDF-1.7 ...");
    }

    #[test]
    fn job_control_updates_status_and_notifies() {
        let spooler = spooler_with("front-desk");
        let mut port = spooler.open("front-desk").unwrap();

        let mut writer =
            DocumentWriter::start(port.as_mut(), "ledger.pdf", "", DATATYPE_RAW).unwrap();
        writer.write_all(b"data").unwrap();
        writer.finish().unwrap();
        let job_id = port.jobs().unwrap()[0].job_id;

        let mut source = port.subscribe(&NotificationFilter::all_job_fields()).unwrap();

        port.control_job(job_id, JobControl::Pause).unwrap();
        assert_ne!(port.job(job_id).unwrap().status_code & job_status::PAUSED, 0);
        assert_eq!(source.wait(SHORT), WaitStatus::Signaled);
        let paused = decode_batch(&source.fetch_next(false).unwrap().expect("batch"));
        assert_eq!(paused.cause, ChangeMask::SET_JOB);

        port.control_job(job_id, JobControl::Resume).unwrap();
        assert_eq!(port.job(job_id).unwrap().status_code & job_status::PAUSED, 0);

        port.control_job(job_id, JobControl::Cancel).unwrap();
        assert!(matches!(
            port.job(job_id),
            Err(SpoolwatchError::JobNotFound(_))
        ));
        // Resume batch, then the deletion batch.
        while source.wait(SHORT) == WaitStatus::Signaled {
            let _ = source.fetch_next(false).unwrap();
        }
        assert!(matches!(
            port.control_job(job_id, JobControl::Pause),
            Err(SpoolwatchError::JobNotFound(_))
        ));
    }

    #[test]
    fn write_path_misuse_is_rejected() {
        let spooler = spooler_with("front-desk");
        let mut port = spooler.open("front-desk").unwrap();

        assert!(port.write(b"data").is_err());
        port.start_document("a", "", DATATYPE_RAW).unwrap();
        assert!(matches!(
            port.start_document("b", "", DATATYPE_RAW),
            Err(SpoolwatchError::Spool(_))
        ));
        port.start_page().unwrap();
        port.write(b"data").unwrap();
        port.end_page().unwrap();
        port.end_document().unwrap();
        assert!(port.end_document().is_err());
    }
}
