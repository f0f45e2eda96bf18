//! Shared utilities for Steward.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
