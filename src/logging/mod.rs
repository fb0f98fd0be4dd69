//! Tracing subscriber initialization.
//!
//! The terminal belongs to the grid UI, so logs go to a file. Follow them
//! with `tail -f` in another terminal.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no UTF-8 filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Split a log path into the directory to create and the file name.
///
/// A bare file name resolves to the current directory.
///
/// # Errors
///
/// Returns `LoggingError::InvalidPath` when the path has no UTF-8 file name.
pub fn log_target(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((directory, file_name.to_string()))
}

/// Initialize the tracing subscriber with file-based logging.
///
/// Respects `RUST_LOG`, defaulting to [`DEFAULT_FILTER`]. Creates the log
/// directory if it doesn't exist.
///
/// # Errors
///
/// Returns `LoggingError` if the path is unusable, the directory cannot be
/// created, or a global subscriber is already installed.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    use tracing_subscriber::EnvFilter;

    let (directory, file_name) = log_target(log_path)?;
    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(&directory, file_name);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn log_target_splits_directory_and_file() {
        let (dir, file) = log_target(Path::new("/var/log/panegrid/grid.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log/panegrid"));
        assert_eq!(file, "grid.log");
    }

    #[test]
    fn bare_file_name_logs_to_current_directory() {
        let (dir, file) = log_target(Path::new("grid.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, "grid.log");
    }

    #[test]
    fn root_path_is_invalid() {
        assert!(matches!(
            log_target(Path::new("/")),
            Err(LoggingError::InvalidPath(_))
        ));
    }

    #[test]
    #[serial(tracing_init)]
    fn init_creates_log_directory_if_missing() {
        let test_dir = std::env::temp_dir().join("panegrid_test_logs_create");
        let log_file = test_dir.join("test.log");
        let _ = fs::remove_dir_all(&test_dir);

        // The subscriber may already be set by another test; the directory is
        // created first either way.
        let _ = init(&log_file);

        assert!(test_dir.exists(), "Log directory should be created: {:?}", test_dir);
        let _ = fs::remove_dir_all(&test_dir);
    }

    #[test]
    #[serial(tracing_init)]
    fn second_init_reports_subscriber_already_set() {
        let test_dir = std::env::temp_dir().join("panegrid_test_logs_twice");
        let log_file = test_dir.join("test.log");

        let _ = init(&log_file);
        assert!(matches!(
            init(&log_file),
            Err(LoggingError::SubscriberAlreadySet)
        ));
        let _ = fs::remove_dir_all(&test_dir);
    }
}
