//! Error types for the latch binary.
//!
//! [`DaemonError`] is the top-level error type that wraps every failure
//! `main` can propagate with `?`.

/// Top-level error for the latch binary.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: latch_core::ConfigError,
    },

    /// The UDP loop stopped with a fatal error, or a one-shot send failed.
    #[error("udp error: {source}")]
    Udp {
        /// The underlying UDP error.
        #[from]
        source: latch_udp::UdpError,
    },

    /// The HTTP supervisor gave up.
    #[error("http error: {source}")]
    Http {
        /// The underlying server error.
        #[from]
        source: latch_http::ServerError,
    },

    /// A supervised task was cancelled or panicked outside its loop.
    #[error("task error: {message}")]
    Task {
        /// Description of the task failure.
        message: String,
    },

    /// The logging subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },
}
