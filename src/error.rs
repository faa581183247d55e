//! Unified error types for transflac
//!
//! Error strategy:
//! - Per-file errors (tag query, encode pipeline, layout): Recoverable, mark the
//!   batch as failed and continue
//! - System errors (configuration, output roots, thread pool): Fatal for the
//!   step that hit them
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// External tools the default toolchain relies on, for helpful error messages
pub const REQUIRED_TOOLS: &str = "flac, metaflac, mktorrent";

/// Top-level error type for transflac operations
#[derive(Debug, Error)]
pub enum TransflacError {
    // =========================================================================
    // Recoverable errors - fail the file, continue batch
    // =========================================================================
    #[error("Encoding failed for '{path}': {reason}")]
    EncodeError { path: PathBuf, reason: String },

    #[error("Could not start '{program}': {reason}\n  Tip: Check that {program} is installed and on your PATH (needs {REQUIRED_TOOLS})")]
    SpawnError { program: String, reason: String },

    #[error("Tag query failed for '{path}': {reason}")]
    TagError { path: PathBuf, reason: String },

    #[error("'{path}' is not inside source directory '{root}'")]
    LayoutError { path: PathBuf, root: PathBuf },

    #[error("Directory not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    DirectoryNotFound(PathBuf),

    // =========================================================================
    // Fatal errors - abort the current step
    // =========================================================================
    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for transflac operations
pub type Result<T> = std::result::Result<T, TransflacError>;

impl TransflacError {
    /// Returns true if this error only affects a single file
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TransflacError::EncodeError { .. }
                | TransflacError::SpawnError { .. }
                | TransflacError::TagError { .. }
                | TransflacError::LayoutError { .. }
                | TransflacError::DirectoryNotFound(_)
        )
    }

    /// Create an encode error with context about the issue
    pub fn encode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        TransflacError::EncodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a spawn error from the io error returned by the OS
    pub fn spawn_error(program: impl Into<String>, err: std::io::Error) -> Self {
        let program = program.into();
        let reason = match err.kind() {
            std::io::ErrorKind::NotFound => "program not found".to_string(),
            std::io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => err.to_string(),
        };
        TransflacError::SpawnError { program, reason }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                format!("Directory does not exist: {}", path.parent().map(|p| p.display().to_string()).unwrap_or_default())
            }
            _ => err.to_string(),
        };
        TransflacError::OutputError { path, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_file_errors_are_recoverable() {
        assert!(TransflacError::encode_error("/a.flac", "exit 1").is_recoverable());
        assert!(TransflacError::spawn_error(
            "lame",
            std::io::Error::from(std::io::ErrorKind::NotFound)
        )
        .is_recoverable());
        assert!(!TransflacError::ConfigError("no codec".into()).is_recoverable());
    }

    #[test]
    fn test_spawn_error_mentions_program() {
        let err = TransflacError::spawn_error(
            "oggenc",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        let msg = err.to_string();
        assert!(msg.contains("oggenc"));
        assert!(msg.contains("program not found"));
    }

    #[test]
    fn test_output_error_permission_message() {
        let err = TransflacError::output_error(
            "/out/V0",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(err.to_string().contains("Permission denied"));
    }
}
