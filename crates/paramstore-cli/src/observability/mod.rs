//! Observability infrastructure for the command line.
//!
//! Structured logging only; logs go to stderr so stdout stays machine
//! readable.

mod logging;

pub use logging::{init_logging, parse_log_level, subscriber, LoggingConfig};
