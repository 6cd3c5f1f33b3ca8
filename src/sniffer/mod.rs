// src/sniffer/mod.rs
//! Sniffer lifecycle and concurrency engine
//!
//! This module hosts the per-connection interception machinery:
//!
//! - **Protocol / Reader**: capability contracts supplied by plugins and the
//!   transport layer, consumed by the core
//! - **Record Log**: the serialized sink all workers append to
//! - **Interceptor**: one decoder plus two direction workers per connection
//! - **Controller**: owner of all live interceptors and the reclaimer that
//!   destroys each exactly once
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────── Controller ────────────────────────┐
//! │  options · record sink · live set · reclaimer task         │
//! │                                                            │
//! │   Interceptor #1          Interceptor #2        ...        │
//! │   ┌─ outgoing worker ─┐   ┌─ outgoing worker ─┐            │
//! │   └─ incoming worker ─┘   └─ incoming worker ─┘            │
//! │        │  decoder  │           │  decoder  │               │
//! │        ▼           ▼           ▼           ▼               │
//! │   ┌────────── shared record sink (serialized) ─────────┐   │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod controller;
pub mod interceptor;
pub mod protocol;
pub mod record_log;

// Re-export commonly used types
pub use controller::{Controller, ControllerStats};
pub use interceptor::Interceptor;
pub use protocol::{Direction, IoReader, Protocol, Reader};
pub use record_log::{Record, RecordFormat, RecordSink};
