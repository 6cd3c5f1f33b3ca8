// src/plugin/mod.rs
//! Protocol decoder plugins
//!
//! A plugin is a named, versioned bundle identifying a protocol decoder and
//! the factory that produces [`Protocol`](crate::sniffer::protocol::Protocol)
//! instances from an option store. Plugins are registered in a
//! [`Registry`](registry::Registry) and resolved by exact name when a
//! controller is set up for a connection.

pub mod raw;
pub mod registry;

pub use registry::Registry;

use crate::sniffer::protocol::Protocol;
use crate::utils::errors::Result;
use crate::utils::options::Options;
use std::fmt;
use std::sync::Arc;

/// Decoder emits printable text summaries
pub const FLAG_TEXT: u32 = 1 << 0;

/// Decoder keeps per-connection state across chunks
pub const FLAG_STATEFUL: u32 = 1 << 1;

/// Factory producing a protocol decoder from an option store
///
/// May fail when the options are invalid for the plugin; the failure is
/// surfaced to whoever requested the new interceptor.
pub type ProtocolFactory = Arc<dyn Fn(&Options) -> Result<Box<dyn Protocol>> + Send + Sync>;

/// Descriptor of one registered protocol decoder
///
/// Immutable once registered. Cloning is cheap: the factory is shared.
#[derive(Clone)]
pub struct PluginDescriptor {
    /// Plugin name, used for registry lookup
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Plugin version
    pub version: u32,

    /// Capability flag bitset ([`FLAG_TEXT`], [`FLAG_STATEFUL`], ...)
    pub flags: u32,

    /// Factory producing decoder instances
    pub factory: ProtocolFactory,
}

impl PluginDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: u32,
        flags: u32,
        factory: ProtocolFactory,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version,
            flags,
            factory,
        }
    }

    /// Check whether a capability flag is set
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("version", &self.version)
            .field("flags", &self.flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sniffer::protocol::Direction;

    struct NopProtocol;

    impl Protocol for NopProtocol {
        fn describe(&mut self, _direction: Direction, _payload: &[u8]) -> Result<String> {
            Ok(String::new())
        }
    }

    fn nop_descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            "nop",
            "does nothing",
            1,
            FLAG_TEXT,
            Arc::new(|_options| Ok(Box::new(NopProtocol) as Box<dyn Protocol>)),
        )
    }

    #[test]
    fn test_has_flag() {
        let descriptor = nop_descriptor();
        assert!(descriptor.has_flag(FLAG_TEXT));
        assert!(!descriptor.has_flag(FLAG_STATEFUL));
    }

    #[test]
    fn test_factory_invocation() {
        let descriptor = nop_descriptor();
        let options = Options::default();
        assert!((descriptor.factory)(&options).is_ok());
    }

    #[test]
    fn test_debug_omits_factory() {
        let rendered = format!("{:?}", nop_descriptor());
        assert!(rendered.contains("nop"));
        assert!(!rendered.contains("factory"));
    }
}
