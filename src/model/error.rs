//! Error types for panegrid.
//!
//! The grid core never returns errors: bad column references and widths are
//! ignored or clamped, failed loads become [`GridEvent::DataError`]
//! notifications, and persistence failures are logged. Errors exist only at
//! the outer boundaries, composed here with `thiserror` and `From`.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - top-level error of the `panegrid` binary
//!   - [`InputError`] - reading the rows file
//!   - [`ConfigError`](crate::config::ConfigError) - config file loading
//!   - [`LoggingError`](crate::logging::LoggingError) - tracing setup
//!   - [`TuiError`](crate::view::TuiError) - terminal failures
//!
//! [`GridEvent::DataError`]: crate::grid::GridEvent::DataError

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Rows could not be read.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// Config file exists but is unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Tracing could not be initialized.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Terminal IO failed.
    #[error("Terminal error: {0}")]
    Terminal(#[from] crate::view::TuiError),
}

/// Failure reading the rows file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The path does not exist.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON array of row objects.
    #[error("Invalid rows in {path}: {reason}")]
    InvalidRows {
        /// File path.
        path: PathBuf,
        /// What was wrong.
        reason: String,
    },
}
