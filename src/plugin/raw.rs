// src/plugin/raw.rs
//! Built-in raw dump decoder
//!
//! Stateless decoder producing a hex + ASCII summary of each chunk, useful
//! for unknown protocols and as a reference implementation of the plugin
//! contract. Honors a `limit=<bytes>` option capping how much of each chunk
//! is rendered.

use crate::plugin::{PluginDescriptor, Registry, FLAG_TEXT};
use crate::sniffer::protocol::{Direction, Protocol};
use crate::utils::errors::{Result, SnifferError};
use crate::utils::options::Options;
use std::sync::Arc;

/// Default number of bytes rendered per chunk
const DEFAULT_LIMIT: usize = 64;

/// Hex + ASCII dump decoder
pub struct RawProtocol {
    limit: usize,
}

impl RawProtocol {
    /// Build a raw decoder from the option store
    ///
    /// Fails when `limit` is present but not a positive integer.
    pub fn from_options(options: &Options) -> Result<Self> {
        let limit = match options.get("limit") {
            "" => DEFAULT_LIMIT,
            raw => raw.parse::<usize>().ok().filter(|&n| n > 0).ok_or_else(|| {
                SnifferError::ProtocolConstruction(format!("invalid limit '{raw}'"))
            })?,
        };

        Ok(Self { limit })
    }
}

impl Protocol for RawProtocol {
    fn describe(&mut self, _direction: Direction, payload: &[u8]) -> Result<String> {
        let shown = &payload[..payload.len().min(self.limit)];

        let mut hex = String::with_capacity(shown.len() * 3);
        let mut ascii = String::with_capacity(shown.len());
        for &byte in shown {
            if !hex.is_empty() {
                hex.push(' ');
            }
            hex.push_str(&format!("{byte:02x}"));
            ascii.push(if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '.'
            });
        }

        let mut summary = format!("{} bytes: {} |{}|", payload.len(), hex, ascii);
        if payload.len() > self.limit {
            summary.push_str(" ...");
        }
        Ok(summary)
    }
}

/// Register the built-in decoders
pub fn register_builtin(registry: &Registry) {
    registry.register(PluginDescriptor::new(
        "raw",
        "hex and ASCII dump of raw chunks",
        1,
        FLAG_TEXT,
        Arc::new(|options| {
            RawProtocol::from_options(options).map(|p| Box::new(p) as Box<dyn Protocol>)
        }),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_hex_and_ascii() {
        let mut protocol = RawProtocol::from_options(&Options::default()).unwrap();
        let summary = protocol
            .describe(Direction::Outgoing, b"hi\x00")
            .unwrap();
        assert_eq!(summary, "3 bytes: 68 69 00 |hi.|");
    }

    #[test]
    fn test_limit_truncates() {
        let options = Options::parse("limit=2");
        let mut protocol = RawProtocol::from_options(&options).unwrap();
        let summary = protocol.describe(Direction::Incoming, b"hello").unwrap();
        assert_eq!(summary, "5 bytes: 68 65 |he| ...");
    }

    #[test]
    fn test_invalid_limit_rejected() {
        for raw in ["limit=zero", "limit=0", "limit=-4"] {
            let options = Options::parse(raw);
            assert!(RawProtocol::from_options(&options).is_err(), "{raw}");
        }
    }

    #[test]
    fn test_register_builtin() {
        let registry = Registry::new();
        register_builtin(&registry);

        let descriptor = registry.resolve("raw").unwrap();
        assert!(descriptor.has_flag(FLAG_TEXT));

        let protocol = (descriptor.factory)(&Options::default());
        assert!(protocol.is_ok());
    }
}
