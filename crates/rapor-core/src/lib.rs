//! Rapor Core Library
//!
//! Core types, configuration, and utilities for the Rapor reporting portal.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::RaporConfig;
pub use error::{Error, Result};

/// Rapor version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
