//! Append-only audit log with one file per UTC calendar day.
//!
//! Operational events (login attempts, lookups, startup) are recorded as
//! fixed-width text lines:
//!
//! ```text
//! [2025-02-01T12:34:56.789Z] INFO : [auth        ] | [login       ] 203.0.113.9\tLogin succeeded
//! ```
//!
//! Callers hand records to a channel and never wait for the write; a
//! dedicated writer task appends them in arrival order. Write failures are
//! reported on the diagnostic `tracing` channel only and never propagated,
//! so log loss is silent and acceptable. There is no locking; line-level
//! append is the only ordering guarantee.

use std::path::PathBuf;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Width of the severity field.
const SEVERITY_WIDTH: usize = 5;

/// Width of the component and operation fields.
const FIELD_WIDTH: usize = 12;

/// Width of the caller address field (fits an IPv6 address).
const CALLER_WIDTH: usize = 39;

/// Timestamp with millisecond precision, always UTC.
const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

/// Daily file name, e.g. `2025-02-01.log` (without the extension here).
const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

// =============================================================================
// Types
// =============================================================================

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

/// A single audit entry, immutable once recorded.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub timestamp: OffsetDateTime,
    pub severity: Severity,
    pub component: String,
    pub operation: String,
    pub caller: String,
    pub message: String,
}

// =============================================================================
// Handle
// =============================================================================

/// Clone-able sender half of the audit log.
///
/// [`record`](AuditHandle::record) returns immediately; if the writer task
/// has gone away the entry is dropped, matching the fire-and-forget contract.
#[derive(Clone)]
pub struct AuditHandle {
    tx: mpsc::UnboundedSender<AuditRecord>,
}

impl AuditHandle {
    /// Record an informational entry with no caller address.
    pub fn record(
        &self,
        message: impl Into<String>,
        component: impl Into<String>,
        operation: impl Into<String>,
    ) {
        self.record_with(message, component, operation, Severity::Info, "");
    }

    /// Record an entry with explicit severity and caller address.
    pub fn record_with(
        &self,
        message: impl Into<String>,
        component: impl Into<String>,
        operation: impl Into<String>,
        severity: Severity,
        caller: &str,
    ) {
        let record = AuditRecord {
            timestamp: OffsetDateTime::now_utc(),
            severity,
            component: component.into(),
            operation: operation.into(),
            caller: caller.to_string(),
            message: message.into(),
        };

        if self.tx.send(record).is_err() {
            warn!("Audit writer has shut down; entry dropped");
        }
    }
}

// =============================================================================
// Writer Task
// =============================================================================

/// Spawn the audit writer task.
///
/// Returns the handle for recording entries and the writer's join handle.
/// The task exits once every [`AuditHandle`] clone has been dropped and the
/// channel has drained, which is how tests (and shutdown) flush it.
pub fn spawn(dir: impl Into<PathBuf>) -> (AuditHandle, JoinHandle<()>) {
    let dir = dir.into();
    let (tx, mut rx) = mpsc::unbounded_channel::<AuditRecord>();

    let task = tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            if let Err(e) = append_record(&dir, &record).await {
                warn!("Failed to write audit entry: {}", e);
            }
        }
    });

    (AuditHandle { tx }, task)
}

async fn append_record(dir: &std::path::Path, record: &AuditRecord) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(file_name(record.timestamp));
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;

    file.write_all(format_line(record).as_bytes()).await?;
    // tokio::fs::File buffers writes; without an explicit flush the data may
    // still be in flight when the file handle is dropped.
    file.flush().await?;
    Ok(())
}

// =============================================================================
// Formatting
// =============================================================================

/// File name for the day the record was created, e.g. `2025-02-01.log`.
pub fn file_name(timestamp: OffsetDateTime) -> String {
    let date = timestamp
        .date()
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| "unknown-date".to_string());
    format!("{}.log", date)
}

/// Render a record as one log line, trailing newline included.
///
/// Severity, component, operation and caller are truncated or space-padded
/// to their fixed widths; the caller field is omitted entirely when empty.
pub fn format_line(record: &AuditRecord) -> String {
    let timestamp = record
        .timestamp
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| "invalid-timestamp".to_string());

    let severity = fit(record.severity.label(), SEVERITY_WIDTH);
    let component = fit(&record.component, FIELD_WIDTH);
    let operation = fit(&record.operation, FIELD_WIDTH);
    let caller = if record.caller.is_empty() {
        String::new()
    } else {
        fit(&record.caller, CALLER_WIDTH)
    };

    format!(
        "[{}] {}: [{}] | [{}] {}\t{}\n",
        timestamp, severity, component, operation, caller, record.message
    )
}

/// Truncate or space-pad a field to exactly `width` characters.
fn fit(s: &str, width: usize) -> String {
    let mut out: String = s.chars().take(width).collect();
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
