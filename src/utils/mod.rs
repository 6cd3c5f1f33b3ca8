// src/utils/mod.rs
//! Common utilities: error types and the option store

pub mod errors;
pub mod options;

pub use errors::{Result, SnifferError};
pub use options::Options;
