// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Consumer-facing entry point: open named printers through a directory,
// subscribe each with one shared filter, and merge the resulting sessions
// into a single multiplexed event stream.

use tracing::info;

use spoolwatch_core::config::WatchConfig;
use spoolwatch_core::error::Result;
use spoolwatch_core::types::NotificationFilter;
use spoolwatch_notify::handle::NotificationHandle;
use spoolwatch_notify::mux::Multiplexer;

use crate::directory::PrinterDirectory;

/// Watch the named printers. Any printer that fails to open or subscribe
/// fails the whole call; sessions only start once every handle is live.
pub fn watch_printers<D>(
    directory: &D,
    printers: &[&str],
    filter: &NotificationFilter,
    config: &WatchConfig,
) -> Result<Multiplexer>
where
    D: PrinterDirectory + ?Sized,
{
    let mut handles = Vec::with_capacity(printers.len());
    for &name in printers {
        let mut port = directory.open(name)?;
        let source = port.subscribe(filter)?;
        handles.push(NotificationHandle::new(name, source));
    }
    info!(printers = handles.len(), changes = %filter.changes, "watching printers");
    Ok(Multiplexer::watch(handles, config))
}

/// Watch every printer the directory knows about.
pub fn watch_all<D>(
    directory: &D,
    filter: &NotificationFilter,
    config: &WatchConfig,
) -> Result<Multiplexer>
where
    D: PrinterDirectory + ?Sized,
{
    let names = directory.printer_names()?;
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    watch_printers(directory, &names, filter, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    use spoolwatch_core::fields::{ChangeMask, JobField};
    use spoolwatch_core::status::job_status;
    use spoolwatch_core::types::DecodedValue;
    use spoolwatch_notify::raw::{RawBatch, RawRecord};

    use crate::directory::DATATYPE_RAW;
    use crate::memory::MemorySpooler;
    use crate::writer::DocumentWriter;

    fn fast_config() -> WatchConfig {
        WatchConfig {
            wait_timeout_ms: 20,
            channel_capacity: 16,
            fetch_failure_limit: 5,
            close_when_done: false,
        }
    }

    #[tokio::test]
    async fn end_to_end_watch_over_memory_spooler() {
        let spooler = MemorySpooler::new();
        spooler.add_printer("front-desk");
        spooler.add_printer("back-office");

        let mut mux = watch_all(&spooler, &NotificationFilter::all_job_fields(), &fast_config())
            .expect("watch");

        // A document spooled on one printer and a synthetic change pushed
        // on the other both surface as events.
        let mut port = spooler.open("front-desk").expect("open");
        let mut writer =
            DocumentWriter::start(port.as_mut(), "ledger.pdf", "", DATATYPE_RAW).expect("start");
        writer.write_all(b"%PDF-1.7").expect("write");
        writer.finish().expect("finish");

        spooler
            .push(
                "back-office",
                RawBatch::new(ChangeMask::SET_JOB)
                    .with_record(RawRecord::job_scalar(JobField::Status, 9, job_status::PRINTING)),
            )
            .expect("push");

        let mut printers = Vec::new();
        for _ in 0..2 {
            let event = tokio::time::timeout(Duration::from_secs(2), mux.recv())
                .await
                .expect("event within timeout")
                .expect("stream open");
            match event.printer.as_str() {
                "front-desk" => assert_eq!(
                    event.batch.job_value(JobField::Document),
                    Some(&DecodedValue::Text("ledger.pdf".into()))
                ),
                "back-office" => assert_eq!(
                    event.batch.job_value(JobField::Status),
                    Some(&DecodedValue::Count(job_status::PRINTING))
                ),
                other => panic!("unexpected printer {other}"),
            }
            printers.push(event.printer);
        }
        printers.sort();
        assert_eq!(printers, vec!["back-office", "front-desk"]);

        mux.shutdown();
        while mux.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn unknown_printer_fails_the_watch() {
        let spooler = MemorySpooler::new();
        spooler.add_printer("front-desk");

        let result = watch_printers(
            &spooler,
            &["front-desk", "missing"],
            &NotificationFilter::all_job_fields(),
            &fast_config(),
        );
        assert!(result.is_err());
    }
}
