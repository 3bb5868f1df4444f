//! Structured logging configuration.
//!
//! Log entries are written to stderr, as JSON objects when JSON output is
//! enabled:
//!
//! ```json
//! {"timestamp":"2026-01-15T10:30:00.000Z","level":"WARN","target":"paramstore_domain::batch::executor","fields":{"message":"found invalid parameter","parameter":"/missing"}}
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use paramstore_cli::observability::{init_logging, LoggingConfig};
//!
//! init_logging(LoggingConfig::from(&config.logging));
//! ```

use paramstore_client::config::LoggingSettings;
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    prelude::*,
    EnvFilter,
};

/// Configuration for structured logging.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Whether to use JSON format (true) or text format (false)
    pub json_format: bool,
    /// The default log level if RUST_LOG is not set
    pub default_level: Level,
    /// Whether to include span events (enter/exit)
    pub include_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            default_level: Level::INFO,
            include_spans: false,
        }
    }
}

impl From<&LoggingSettings> for LoggingConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            json_format: settings.json,
            default_level: parse_log_level(&settings.level),
            include_spans: settings.spans,
        }
    }
}

/// Parse log level from string, falling back to INFO.
pub fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize the logging subsystem with the given configuration.
///
/// Call once at startup. Later calls have no effect since the subscriber is
/// global.
pub fn init_logging(config: LoggingConfig) {
    let _ = tracing::subscriber::set_global_default(subscriber(&config, std::io::stderr));
}

/// Builds the subscriber [`init_logging`] installs, writing to `writer`.
pub fn subscriber<W>(config: &LoggingConfig, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level.to_string()));

    let span_events = if config.include_spans {
        FmtSpan::ENTER | FmtSpan::EXIT
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        Box::new(
            tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_span_events(span_events)
                    .with_current_span(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            ),
        )
    } else {
        Box::new(
            tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .compact()
                    .with_writer(writer)
                    .with_span_events(span_events)
                    .with_target(false),
            ),
        )
    }
}
