//! Remote log sync.
//!
//! ```text
//!   AlertTask ──emit──▶ SyncEventSink ──mpsc──▶ sync worker ──▶ UploadPort
//!                        (try_send,               (retry on
//!                         never blocks)            Connectivity)
//! ```
//!
//! Every event becomes one [`LogRecord`].  The worker uploads records in
//! order; a `Connectivity` failure is retried with a fixed delay, any
//! other failure drops that record.  The worker exits once the sink is
//! dropped and the queue is drained.

use std::io::{self, ErrorKind, Write};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::app::events::{AlertEvent, LogRecord};
use crate::app::ports::{EventSink, UploadPort};
use crate::app::runtime::Shutdown;
use crate::config::SystemConfig;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::error::SyncError;

/// Records buffered between the alert task and the worker.
pub const SYNC_QUEUE_DEPTH: usize = 32;

// ───────────────────────────────────────────────────────────────
// Retry policy
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries per record, at least 1.
    pub attempts: u32,
    /// Pause between tries.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            attempts: u32::from(config.sync_retry_attempts.max(1)),
            delay: Duration::from_secs(u64::from(config.sync_retry_delay_seconds)),
        }
    }

    /// Upload `record`, retrying connectivity failures.  The wait between
    /// tries is cut short by `shutdown`, which also ends the retries.
    pub fn upload(
        &self,
        uploader: &mut impl UploadPort,
        record: &LogRecord,
        shutdown: &Shutdown,
    ) -> Result<(), SyncError> {
        let mut attempt = 1;
        loop {
            match uploader.upload(record) {
                Ok(()) => return Ok(()),
                Err(SyncError::Connectivity) if attempt < self.attempts => {
                    warn!(
                        "sync: unreachable (attempt {}/{}), retrying in {:?}",
                        attempt, self.attempts, self.delay
                    );
                    if shutdown.sleep(self.delay) {
                        return Err(SyncError::Connectivity);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Sink + worker
// ───────────────────────────────────────────────────────────────

/// What the worker did before it exited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub uploaded: u64,
    pub failed: u64,
}

/// [`EventSink`] that hands records to the sync worker thread.
pub struct SyncEventSink {
    tx: SyncSender<LogRecord>,
    dropped: u64,
}

impl SyncEventSink {
    /// Start the worker and return the sink feeding it.
    pub fn spawn<U>(
        uploader: U,
        policy: RetryPolicy,
        shutdown: Shutdown,
    ) -> io::Result<(Self, JoinHandle<SyncReport>)>
    where
        U: UploadPort + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(SYNC_QUEUE_DEPTH);
        let handle = spawn_on_core(Core::Pro, 3, 8, "sync\0", move || {
            run_worker(uploader, &rx, policy, &shutdown)
        })?;
        Ok((Self { tx, dropped: 0 }, handle))
    }
}

impl Drop for SyncEventSink {
    fn drop(&mut self) {
        if self.dropped > 0 {
            warn!("sync: {} records never reached the worker", self.dropped);
        }
    }
}

impl EventSink for SyncEventSink {
    fn emit(&mut self, event: &AlertEvent) {
        match self.tx.try_send(LogRecord::from(event)) {
            Ok(()) => {}
            Err(TrySendError::Full(r)) => {
                self.dropped += 1;
                warn!("sync: queue full, {:?} record dropped", r.table);
            }
            Err(TrySendError::Disconnected(r)) => {
                self.dropped += 1;
                warn!("sync: worker gone, {:?} record dropped", r.table);
            }
        }
    }
}

fn run_worker<U: UploadPort>(
    mut uploader: U,
    rx: &Receiver<LogRecord>,
    policy: RetryPolicy,
    shutdown: &Shutdown,
) -> SyncReport {
    let mut report = SyncReport::default();
    for record in rx {
        match policy.upload(&mut uploader, &record, shutdown) {
            Ok(()) => {
                report.uploaded += 1;
                debug!("sync: {:?} record uploaded", record.table);
            }
            Err(e) => {
                report.failed += 1;
                error!("sync: {:?} record not uploaded: {}", record.table, e);
            }
        }
    }
    info!(
        "sync: worker stopped ({} uploaded, {} failed)",
        report.uploaded, report.failed
    );
    report
}

// ───────────────────────────────────────────────────────────────
// JSON-lines uploader
// ───────────────────────────────────────────────────────────────

/// Writes each record as one JSON line to any byte sink (file, socket,
/// serial port).
pub struct JsonLinesUploader<W> {
    out: W,
}

impl<W: Write> JsonLinesUploader<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn classify(e: &io::Error) -> SyncError {
    match e.kind() {
        ErrorKind::ConnectionRefused
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::NotConnected
        | ErrorKind::BrokenPipe
        | ErrorKind::TimedOut
        | ErrorKind::WouldBlock => SyncError::Connectivity,
        _ => SyncError::Rejected,
    }
}

impl<W: Write> UploadPort for JsonLinesUploader<W> {
    fn upload(&mut self, record: &LogRecord) -> Result<(), SyncError> {
        let mut line = serde_json::to_vec(record).map_err(|_| SyncError::Encoding)?;
        line.push(b'\n');
        self.out
            .write_all(&line)
            .and_then(|()| self.out.flush())
            .map_err(|e| classify(&e))
    }
}
