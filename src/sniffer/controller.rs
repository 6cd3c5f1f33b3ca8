// src/sniffer/controller.rs
//! Controller and reclaimer
//!
//! The controller owns the option store, the shared record sink, and the set
//! of live interceptors. A background reclaimer task destroys each
//! interceptor exactly once, after both of its direction workers have
//! finished, and drains every remaining interceptor on shutdown.
//!
//! # Lifecycle
//!
//! ```text
//! new_interceptor ──▶ Alive ──mark──▶ Marked ──reclaimer──▶ Deleted
//!                       │                                  (entry removed,
//!                       └── factory failure: rolled back    decoder dropped)
//! ```
//!
//! `mark` is idempotent: both direction workers call it when they stop, and
//! the second call (or any call on an already reclaimed id) is a no-op. The
//! reclaimer only ever transitions `Marked` entries whose workers have both
//! terminated, so an interceptor is never destroyed while one of its workers
//! may still touch its decoder.

use crate::plugin::PluginDescriptor;
use crate::sniffer::interceptor::Interceptor;
use crate::sniffer::protocol::{Protocol, Reader};
use crate::sniffer::record_log::RecordSink;
use crate::utils::errors::{Result, SnifferError};
use crate::utils::options::Options;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How often the reclaimer re-checks marked entries, bounding the gap
/// between a worker's final mark and its reclamation
const SWEEP_INTERVAL: Duration = Duration::from_millis(25);

/// Per-interceptor lifecycle state, held in the live set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleState {
    Alive,
    Marked,
    Deleted,
}

/// Live-set entry owning one interceptor and its worker handles
struct LiveEntry {
    state: LifecycleState,
    interceptor: Option<Interceptor>,
    workers: Vec<JoinHandle<()>>,
}

impl LiveEntry {
    fn new() -> Self {
        Self {
            state: LifecycleState::Alive,
            interceptor: None,
            workers: Vec::new(),
        }
    }
}

/// Wakeup messages for the reclaimer task
pub(crate) enum ReclaimMsg {
    Sweep,
    Shutdown,
}

/// Table of live interceptors shared by the controller, the workers and the
/// reclaimer
pub(crate) struct LiveSet {
    entries: DashMap<u64, LiveEntry>,
    wake_tx: mpsc::UnboundedSender<ReclaimMsg>,
    reclaimed: AtomicU64,
}

impl LiveSet {
    pub(crate) fn new(wake_tx: mpsc::UnboundedSender<ReclaimMsg>) -> Self {
        Self {
            entries: DashMap::new(),
            wake_tx,
            reclaimed: AtomicU64::new(0),
        }
    }

    /// Request reclamation of an interceptor
    ///
    /// Transitions `Alive → Marked`; any other state (or an unknown id) is a
    /// silent no-op. Always wakes the reclaimer.
    pub(crate) fn mark(&self, instance_id: u64) {
        if let Some(mut entry) = self.entries.get_mut(&instance_id) {
            if entry.state == LifecycleState::Alive {
                entry.state = LifecycleState::Marked;
                debug!("Interceptor #{} marked for reclamation", instance_id);
            }
        }
        let _ = self.wake_tx.send(ReclaimMsg::Sweep);
    }

    /// Reclaim every marked entry whose workers have both terminated
    async fn sweep_finished(&self) {
        let ready: Vec<u64> = self
            .entries
            .iter()
            .filter(|entry| {
                entry.state == LifecycleState::Marked
                    && !entry.workers.is_empty()
                    && entry.workers.iter().all(|w| w.is_finished())
            })
            .map(|entry| *entry.key())
            .collect();

        for instance_id in ready {
            // Take the handles without holding the map guard across an await
            let workers = match self.entries.get_mut(&instance_id) {
                Some(mut entry) if entry.state == LifecycleState::Marked => {
                    entry.state = LifecycleState::Deleted;
                    std::mem::take(&mut entry.workers)
                }
                _ => continue,
            };

            for worker in workers {
                let _ = worker.await;
            }

            // Removing the entry drops the interceptor and its decoder
            self.entries.remove(&instance_id);
            self.reclaimed.fetch_add(1, Ordering::Relaxed);
            debug!("Reclaimed interceptor #{}", instance_id);
        }
    }

    /// Drain every remaining entry, waiting for its workers to finish
    ///
    /// Shutdown is cooperative: a worker blocked in its reader holds up the
    /// drain until the reader returns.
    async fn drain_all(&self) {
        loop {
            let remaining: Vec<u64> = self.entries.iter().map(|entry| *entry.key()).collect();
            if remaining.is_empty() {
                break;
            }
            debug!("Draining {} interceptors", remaining.len());

            for instance_id in remaining {
                let workers = match self.entries.get_mut(&instance_id) {
                    Some(mut entry) => {
                        entry.state = LifecycleState::Deleted;
                        std::mem::take(&mut entry.workers)
                    }
                    None => continue,
                };

                for worker in workers {
                    let _ = worker.await;
                }

                self.entries.remove(&instance_id);
                self.reclaimed.fetch_add(1, Ordering::Relaxed);
                debug!("Reclaimed interceptor #{} during drain", instance_id);
            }
        }
    }
}

/// Reclaimer loop: wakes on marks, sweeps periodically, drains on shutdown
async fn reclaimer_loop(live: Arc<LiveSet>, mut wake_rx: mpsc::UnboundedReceiver<ReclaimMsg>) {
    debug!("Reclaimer started");

    let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
    sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = sweep.tick() => {
                live.sweep_finished().await;
            }

            msg = wake_rx.recv() => match msg {
                Some(ReclaimMsg::Sweep) => live.sweep_finished().await,
                Some(ReclaimMsg::Shutdown) | None => break,
            },
        }
    }

    live.drain_all().await;
    debug!("Reclaimer stopped");
}

/// Statistics of one controller
#[derive(Debug, Clone, Default)]
pub struct ControllerStats {
    /// Interceptors created (factory failures excluded)
    pub created: u64,

    /// Interceptors reclaimed
    pub reclaimed: u64,

    /// Interceptors currently live
    pub live: usize,
}

/// Owner of all interceptors for one plugin binding
///
/// Must be created inside a tokio runtime (the reclaimer is spawned on
/// construction). Call [`shutdown`](Controller::shutdown) before dropping;
/// it returns only once every interceptor has been reclaimed.
pub struct Controller {
    plugin: PluginDescriptor,
    options: Options,
    sink: Arc<RecordSink>,
    live: Arc<LiveSet>,
    next_instance_id: AtomicU64,
    created: AtomicU64,
    alive: AtomicBool,
    reclaimer: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl Controller {
    /// Create a controller bound to one plugin, option store and record sink
    pub fn new(plugin: PluginDescriptor, options: Options, sink: RecordSink) -> Self {
        info!("Starting controller for plugin '{}'", plugin.name);

        let (wake_tx, wake_rx) = mpsc::unbounded_channel();
        let live = Arc::new(LiveSet::new(wake_tx));
        let reclaimer = tokio::spawn(reclaimer_loop(Arc::clone(&live), wake_rx));

        Self {
            plugin,
            options,
            sink: Arc::new(sink),
            live,
            next_instance_id: AtomicU64::new(0),
            created: AtomicU64::new(0),
            alive: AtomicBool::new(true),
            reclaimer: parking_lot::Mutex::new(Some(reclaimer)),
        }
    }

    /// Create a decoder instance through the bound plugin factory
    pub fn new_protocol(&self) -> Result<Box<dyn Protocol>> {
        (self.plugin.factory)(&self.options)
    }

    /// Create an interceptor for one connection and start its two direction
    /// workers
    ///
    /// The interceptor is registered first and assigned the next instance id;
    /// a factory failure rolls the registration back, leaving no entry and no
    /// running worker. Returns the instance id.
    pub fn new_interceptor(
        &self,
        outgoing: Box<dyn Reader>,
        incoming: Box<dyn Reader>,
    ) -> Result<u64> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(SnifferError::ShuttingDown);
        }

        let instance_id = self.next_instance_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.live.entries.insert(instance_id, LiveEntry::new());

        // Registrations racing shutdown must either be refused or become
        // visible to the drain; re-checking after the insert guarantees it.
        if !self.alive.load(Ordering::SeqCst) {
            self.live.entries.remove(&instance_id);
            return Err(SnifferError::ShuttingDown);
        }

        let protocol = match self.new_protocol() {
            Ok(protocol) => protocol,
            Err(e) => {
                // Roll back the registration
                self.live.entries.remove(&instance_id);
                warn!("Interceptor #{} construction failed: {}", instance_id, e);
                return Err(e);
            }
        };

        let interceptor = Interceptor::new(instance_id, protocol);

        // The entry guard is held while the workers are spawned so a worker
        // finishing instantly cannot be reclaimed before its handles land.
        if let Some(mut entry) = self.live.entries.get_mut(&instance_id) {
            entry.workers = interceptor.start(
                Arc::clone(&self.live),
                Arc::clone(&self.sink),
                outgoing,
                incoming,
            );
            entry.interceptor = Some(interceptor);
        }

        self.created.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Interceptor #{} created for plugin '{}'",
            instance_id, self.plugin.name
        );
        Ok(instance_id)
    }

    /// Request reclamation of one interceptor (idempotent)
    ///
    /// Takes effect only after both direction workers have returned from
    /// their readers; a worker blocked in a read is not interrupted.
    pub fn mark(&self, instance_id: u64) {
        self.live.mark(instance_id);
    }

    /// The shared record sink workers write to
    pub fn sink(&self) -> &Arc<RecordSink> {
        &self.sink
    }

    /// The option store this controller was built with
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The plugin this controller is bound to
    pub fn plugin(&self) -> &PluginDescriptor {
        &self.plugin
    }

    /// Number of live interceptors
    pub fn live_count(&self) -> usize {
        self.live.entries.len()
    }

    /// Controller statistics
    pub fn stats(&self) -> ControllerStats {
        ControllerStats {
            created: self.created.load(Ordering::Relaxed),
            reclaimed: self.live.reclaimed.load(Ordering::Relaxed),
            live: self.live.entries.len(),
        }
    }

    /// Stop accepting interceptors, drain all live ones and join the
    /// reclaimer
    ///
    /// Returns only once every interceptor has been reclaimed. Cooperative:
    /// workers blocked in a reader hold up the drain until their reader
    /// reaches end-of-stream. Idempotent.
    pub async fn shutdown(&self) {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return;
        }
        info!(
            "Shutting down controller for plugin '{}' ({} interceptors live)",
            self.plugin.name,
            self.live_count()
        );

        let _ = self.live.wake_tx.send(ReclaimMsg::Shutdown);

        let reclaimer = self.reclaimer.lock().take();
        if let Some(handle) = reclaimer {
            let _ = handle.await;
        }

        info!("Controller for plugin '{}' stopped", self.plugin.name);
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if self.alive.load(Ordering::SeqCst) {
            warn!(
                "Controller for plugin '{}' dropped without shutdown, {} interceptors leaked",
                self.plugin.name,
                self.live.entries.len()
            );
        }
    }
}
