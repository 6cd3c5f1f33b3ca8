// src/plugin/registry.rs
//! Plugin registry
//!
//! An append-only catalog of [`PluginDescriptor`]s resolved by exact name.
//! The registry is an explicitly constructed value: whoever wires up
//! controllers builds one, registers the available decoders, and shares it
//! behind an `Arc`. Registration happens during startup; after that the
//! registry is only read, concurrently, by interceptor setups.

use crate::plugin::PluginDescriptor;
use crate::utils::errors::{Result, SnifferError};
use parking_lot::RwLock;
use tracing::{debug, info};

/// Catalog of registered protocol decoder plugins
///
/// Lookup is first-match-wins; name uniqueness is the registrant's
/// responsibility and is not enforced.
#[derive(Debug, Default)]
pub struct Registry {
    plugins: RwLock<Vec<PluginDescriptor>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin descriptor
    pub fn register(&self, descriptor: PluginDescriptor) {
        info!(
            "Registering plugin '{}' v{} ({})",
            descriptor.name, descriptor.version, descriptor.description
        );
        self.plugins.write().push(descriptor);
    }

    /// Resolve a plugin by exact name
    ///
    /// Returns the first descriptor whose name matches, or
    /// [`SnifferError::PluginNotFound`] carrying the requested name.
    pub fn resolve(&self, name: &str) -> Result<PluginDescriptor> {
        let plugins = self.plugins.read();

        match plugins.iter().find(|p| p.name == name) {
            Some(descriptor) => {
                debug!("Resolved plugin '{}'", name);
                Ok(descriptor.clone())
            }
            None => Err(SnifferError::PluginNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    /// Check whether no plugins are registered
    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }

    /// Names of all registered plugins, in registration order
    pub fn names(&self) -> Vec<String> {
        self.plugins.read().iter().map(|p| p.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{ProtocolFactory, FLAG_TEXT};
    use crate::sniffer::protocol::{Direction, Protocol};
    use crate::utils::errors::Result;
    use std::sync::Arc;

    struct NopProtocol;

    impl Protocol for NopProtocol {
        fn describe(&mut self, _direction: Direction, _payload: &[u8]) -> Result<String> {
            Ok(String::new())
        }
    }

    fn nop_factory() -> ProtocolFactory {
        Arc::new(|_options| Ok(Box::new(NopProtocol) as Box<dyn Protocol>))
    }

    fn descriptor(name: &str, version: u32) -> PluginDescriptor {
        PluginDescriptor::new(name, "test plugin", version, FLAG_TEXT, nop_factory())
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = Registry::new();
        registry.register(descriptor("echo", 1));

        let resolved = registry.resolve("echo").unwrap();
        assert_eq!(resolved.name, "echo");
        assert_eq!(resolved.version, 1);
    }

    #[test]
    fn test_resolve_unknown_carries_name() {
        let registry = Registry::new();
        registry.register(descriptor("echo", 1));

        let err = registry.resolve("nonexistent").unwrap_err();
        match err {
            SnifferError::PluginNotFound { name } => assert_eq!(name, "nonexistent"),
            other => panic!("unexpected error: {other:?}"),
        }
        // Lookup has no side effects
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_first_match_wins_on_duplicates() {
        let registry = Registry::new();
        registry.register(descriptor("echo", 1));
        registry.register(descriptor("echo", 2));

        let resolved = registry.resolve("echo").unwrap();
        assert_eq!(resolved.version, 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_names_in_registration_order() {
        let registry = Registry::new();
        registry.register(descriptor("raw", 1));
        registry.register(descriptor("echo", 1));

        assert_eq!(registry.names(), vec!["raw", "echo"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve("anything").is_err());
    }
}
