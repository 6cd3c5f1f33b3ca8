// src/sniffer/record_log.rs
//! Shared record sink
//!
//! All direction workers of one controller write their decoded records into
//! a single append-only sink. Each record is rendered to one line and written
//! under a single lock acquisition, so records from concurrent interceptors
//! never interleave mid-record. No ordering beyond that serialization is
//! guaranteed, neither between interceptors nor between the two directions
//! of the same interceptor.

use crate::sniffer::protocol::Direction;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// One decoded record, tagged with its origin
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// Interceptor instance id
    pub instance_id: u64,

    /// Traffic direction the chunk was captured on
    pub direction: Direction,

    /// Capture timestamp
    pub timestamp: DateTime<Utc>,

    /// Decoder-produced summary of the chunk
    pub summary: String,
}

impl Record {
    pub fn new(instance_id: u64, direction: Direction, summary: String) -> Self {
        Self {
            instance_id,
            direction,
            timestamp: Utc::now(),
            summary,
        }
    }
}

/// On-disk rendering of records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordFormat {
    /// `<timestamp> [#<id> <direction>] <summary>`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Append-only record sink shared by all workers of one controller
pub struct RecordSink {
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    format: RecordFormat,
}

impl RecordSink {
    pub fn new(writer: Box<dyn AsyncWrite + Send + Unpin>, format: RecordFormat) -> Self {
        Self {
            writer: Mutex::new(writer),
            format,
        }
    }

    /// Open a sink appending to a file
    pub async fn file(path: impl AsRef<Path>, format: RecordFormat) -> crate::utils::errors::Result<Self> {
        let file = tokio::fs::File::create(path).await?;
        Ok(Self::new(Box::new(file), format))
    }

    /// Render and append one record
    ///
    /// The full line is written and flushed while the sink lock is held.
    pub async fn write_record(&self, record: &Record) -> io::Result<()> {
        let mut line = match self.format {
            RecordFormat::Text => format!(
                "{} [#{} {}] {}",
                record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                record.instance_id,
                record.direction,
                record.summary
            ),
            RecordFormat::Json => serde_json::to_string(record)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
        };
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await
    }
}
