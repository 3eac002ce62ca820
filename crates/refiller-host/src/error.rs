//! Error types for the host binary.

/// Top-level error for the host binary.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Loading or saving the plugin config failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: refiller_core::config::ConfigError,
    },

    /// The log filter could not be swapped.
    #[error("log filter error: {source}")]
    LogFilter {
        /// The underlying reload error.
        #[from]
        source: tracing_subscriber::reload::Error,
    },

    /// A log filter directive did not parse.
    #[error("log directive error: {source}")]
    Directive {
        /// The underlying parse error.
        #[from]
        source: tracing_subscriber::filter::ParseError,
    },
}
