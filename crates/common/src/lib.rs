//! deskreel Common Utilities
//!
//! Shared infrastructure for all deskreel crates:
//! - Error types and result aliases
//! - The capture clock that stamps every cycle
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
