// src/utils/options.rs
//! Immutable option store parsed from a single raw option string
//!
//! Protocol factories and interceptors query their settings from an
//! [`Options`] value built once from the raw string handed in by whoever
//! selected the plugin (typically a `-o key=value,key2` style argument).
//!
//! # Grammar
//!
//! Fragments are split on `,` and trimmed; empty fragments are skipped.
//! `key=value` stores the pair, a bare `key` stores an empty value, and the
//! first occurrence of a key wins (later duplicates are ignored, matching
//! the first-match-wins convention of the plugin registry).

use std::collections::HashMap;

/// Immutable key/value store for plugin and interceptor settings
#[derive(Debug, Clone, Default)]
pub struct Options {
    values: HashMap<String, String>,
}

impl Options {
    /// Parse an option string like `"mode=raw,limit=64,verbose"`
    pub fn parse(raw: &str) -> Self {
        let mut values = HashMap::new();

        for fragment in raw.split(',') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }

            let (key, value) = match fragment.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (fragment, ""),
            };
            if key.is_empty() {
                continue;
            }

            // First occurrence wins
            values
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }

        Self { values }
    }

    /// Get an option value, or `""` if the key is absent. Never fails.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Check whether a key was present in the raw string
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored options
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether no options were stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
