// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Drives the sequential document write path against a printer port and
// exposes it as `std::io::Write`, so anything that can write to a stream
// can print.

use std::io;

use tracing::{debug, warn};

use spoolwatch_core::error::Result;

use crate::directory::{DATATYPE_RAW, DATATYPE_XPS_PASS, PrinterPort};

/// An in-progress spooled document.
///
/// Construction starts the document and its first page; `finish` ends
/// both. Dropping an unfinished writer ends the document best-effort so
/// the port is never left mid-sequence.
pub struct DocumentWriter<'a> {
    port: &'a mut dyn PrinterPort,
    finished: bool,
}

impl<'a> DocumentWriter<'a> {
    /// Start a document with an explicit datatype.
    pub fn start(
        port: &'a mut dyn PrinterPort,
        name: &str,
        output_file: &str,
        datatype: &str,
    ) -> Result<Self> {
        debug!(printer = port.name(), document = name, datatype, "starting document");
        port.start_document(name, output_file, datatype)?;
        port.start_page()?;
        Ok(Self {
            port,
            finished: false,
        })
    }

    /// Start a pre-rendered document, picking `XPS_PASS` or `RAW` from the
    /// driver's attributes.
    pub fn start_raw(port: &'a mut dyn PrinterPort, name: &str, output_file: &str) -> Result<Self> {
        let datatype = if port.driver_info()?.is_xps() {
            DATATYPE_XPS_PASS
        } else {
            DATATYPE_RAW
        };
        Self::start(port, name, output_file, datatype)
    }

    /// Close the current page and open the next one.
    pub fn next_page(&mut self) -> Result<()> {
        self.port.end_page()?;
        self.port.start_page()
    }

    /// End the page and the document.
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.port.end_page()?;
        self.port.end_document()
    }
}

impl io::Write for DocumentWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for DocumentWriter<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(printer = self.port.name(), "document writer dropped unfinished");
            let _ = self.port.end_page();
            let _ = self.port.end_document();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use spoolwatch_core::error::{Result, SpoolwatchError};
    use spoolwatch_core::status::JobControl;
    use spoolwatch_core::types::{DriverInfo, JobInfo, NotificationFilter};
    use spoolwatch_notify::source::ChangeSource;

    /// Records the write-path calls made against it.
    struct ScriptedPort {
        xps: bool,
        calls: Vec<String>,
    }

    impl ScriptedPort {
        fn new(xps: bool) -> Self {
            Self {
                xps,
                calls: Vec::new(),
            }
        }
    }

    impl PrinterPort for ScriptedPort {
        fn name(&self) -> &str {
            "scripted"
        }

        fn subscribe(&mut self, _filter: &NotificationFilter) -> Result<Box<dyn ChangeSource>> {
            Err(SpoolwatchError::OpenFailed("not supported".into()))
        }

        fn jobs(&self) -> Result<Vec<JobInfo>> {
            Ok(Vec::new())
        }

        fn job(&self, job_id: u32) -> Result<JobInfo> {
            Err(SpoolwatchError::JobNotFound(job_id))
        }

        fn control_job(&mut self, _job_id: u32, _command: JobControl) -> Result<()> {
            Ok(())
        }

        fn driver_info(&self) -> Result<DriverInfo> {
            Ok(DriverInfo {
                name: "Scripted Driver".into(),
                environment: String::new(),
                driver_path: String::new(),
                attributes: if self.xps { DriverInfo::ATTR_XPS } else { 0 },
            })
        }

        fn start_document(&mut self, name: &str, _output_file: &str, datatype: &str) -> Result<()> {
            self.calls.push(format!("start_document({name}, {datatype})"));
            Ok(())
        }

        fn start_page(&mut self) -> Result<()> {
            self.calls.push("start_page".into());
            Ok(())
        }

        fn write(&mut self, data: &[u8]) -> Result<usize> {
            self.calls.push(format!("write({})", data.len()));
            Ok(data.len())
        }

        fn end_page(&mut self) -> Result<()> {
            self.calls.push("end_page".into());
            Ok(())
        }

        fn end_document(&mut self) -> Result<()> {
            self.calls.push("end_document".into());
            Ok(())
        }
    }

    #[test]
    fn write_path_call_order() {
        let mut port = ScriptedPort::new(false);
        {
            let mut writer = DocumentWriter::start(&mut port, "ledger", "", DATATYPE_RAW)
                .expect("start");
            writer.write_all(b"page one").expect("write");
            writer.next_page().expect("next page");
            writer.write_all(b"page two").expect("write");
            writer.finish().expect("finish");
        }
        assert_eq!(
            port.calls,
            vec![
                "start_document(ledger, RAW)",
                "start_page",
                "write(8)",
                "end_page",
                "start_page",
                "write(8)",
                "end_page",
                "end_document",
            ]
        );
    }

    #[test]
    fn raw_datatype_follows_driver_attributes() {
        let mut port = ScriptedPort::new(true);
        DocumentWriter::start_raw(&mut port, "ledger", "")
            .expect("start")
            .finish()
            .expect("finish");
        assert_eq!(port.calls[0], "start_document(ledger, XPS_PASS)");

        let mut port = ScriptedPort::new(false);
        DocumentWriter::start_raw(&mut port, "ledger", "")
            .expect("start")
            .finish()
            .expect("finish");
        assert_eq!(port.calls[0], "start_document(ledger, RAW)");
    }

    #[test]
    fn drop_ends_an_unfinished_document() {
        let mut port = ScriptedPort::new(false);
        {
            let mut writer =
                DocumentWriter::start(&mut port, "ledger", "", DATATYPE_RAW).expect("start");
            writer.write_all(b"partial").expect("write");
        }
        assert_eq!(port.calls.last().map(String::as_str), Some("end_document"));
    }
}
