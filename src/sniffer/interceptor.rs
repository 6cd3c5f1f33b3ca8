// src/sniffer/interceptor.rs
//! Per-connection interceptor and its direction workers
//!
//! An interceptor binds one protocol decoder to one connection and runs two
//! concurrent workers, one per traffic direction. Each worker pulls chunks
//! from its reader, asks the decoder for a summary and appends a record to
//! the shared sink. End-of-stream, a transport error, a fatal decode error
//! or a failing sink all stop the worker the same way: it logs a diagnostic
//! and marks its interceptor for reclamation, exactly once.

use crate::sniffer::controller::LiveSet;
use crate::sniffer::protocol::{Direction, Protocol, Reader};
use crate::sniffer::record_log::{Record, RecordSink};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One intercepted connection: a decoder plus two direction workers
///
/// Created and owned by the controller; reclaimed by its reclaimer after
/// both workers have finished. The decoder is shared by the two workers and
/// dropped with the interceptor.
pub struct Interceptor {
    instance_id: u64,
    protocol: Arc<Mutex<Box<dyn Protocol>>>,
}

impl Interceptor {
    pub(crate) fn new(instance_id: u64, protocol: Box<dyn Protocol>) -> Self {
        Self {
            instance_id,
            protocol: Arc::new(Mutex::new(protocol)),
        }
    }

    /// Unique id assigned by the controller at registration, never reused
    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    /// Spawn the two direction workers
    pub(crate) fn start(
        &self,
        live: Arc<LiveSet>,
        sink: Arc<RecordSink>,
        outgoing: Box<dyn Reader>,
        incoming: Box<dyn Reader>,
    ) -> Vec<JoinHandle<()>> {
        vec![
            tokio::spawn(direction_loop(
                self.instance_id,
                Direction::Outgoing,
                outgoing,
                Arc::clone(&self.protocol),
                Arc::clone(&sink),
                Arc::clone(&live),
            )),
            tokio::spawn(direction_loop(
                self.instance_id,
                Direction::Incoming,
                incoming,
                Arc::clone(&self.protocol),
                sink,
                live,
            )),
        ]
    }
}

/// Worker loop for one traffic direction
async fn direction_loop(
    instance_id: u64,
    direction: Direction,
    mut reader: Box<dyn Reader>,
    protocol: Arc<Mutex<Box<dyn Protocol>>>,
    sink: Arc<RecordSink>,
    live: Arc<LiveSet>,
) {
    debug!("#{} {} worker started", instance_id, direction);

    loop {
        match reader.next_chunk().await {
            Ok(Some(chunk)) => {
                let summary = {
                    let mut protocol = protocol.lock().await;
                    protocol.describe(direction, &chunk)
                };
                let summary = match summary {
                    Ok(summary) => summary,
                    Err(e) => {
                        warn!("#{} {}: decode failed: {}", instance_id, direction, e);
                        break;
                    }
                };

                let record = Record::new(instance_id, direction, summary);
                if let Err(e) = sink.write_record(&record).await {
                    warn!("#{} {}: log write failed: {}", instance_id, direction, e);
                    break;
                }
            }
            Ok(None) => {
                debug!("#{} {}: end of stream", instance_id, direction);
                break;
            }
            Err(e) => {
                warn!("#{} {}: read error: {}", instance_id, direction, e);
                break;
            }
        }
    }

    live.mark(instance_id);
    debug!("#{} {} worker finished", instance_id, direction);
}
