// src/lib.rs
//! Tapwire Traffic Interception Engine
//!
//! This library provides the concurrency and lifecycle substrate for
//! intercepting bidirectional network traffic through pluggable protocol
//! decoders.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **plugin**: Decoder plugins, their descriptors and the registry
//! - **sniffer**: Interceptors, direction workers, the shared record log
//!   and the controller with its reclaimer
//! - **utils**: Error types and the option store
//! - **observability**: Tracing setup
//!
//! # Usage
//!
//! Build a [`Registry`], register decoders, resolve one by name, hand the
//! descriptor plus an [`Options`] store and a [`RecordSink`] to a
//! [`Controller`], then create one interceptor per connection from the two
//! transport [`Reader`]s. Call [`Controller::shutdown`] before dropping it;
//! it returns once every interceptor has been reclaimed.

// Public module exports
pub mod observability;
pub mod plugin;
pub mod sniffer;
pub mod utils;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use plugin::registry::Registry;
pub use plugin::{PluginDescriptor, ProtocolFactory, FLAG_STATEFUL, FLAG_TEXT};
pub use sniffer::controller::{Controller, ControllerStats};
pub use sniffer::interceptor::Interceptor;
pub use sniffer::protocol::{Direction, IoReader, Protocol, Reader};
pub use sniffer::record_log::{Record, RecordFormat, RecordSink};
pub use utils::errors::{Result, SnifferError};
pub use utils::options::Options;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
