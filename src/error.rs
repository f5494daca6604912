//! Custom error types for claude-loop.
//!
//! Only input errors travel this far. Collaborator failures (no credential,
//! service timeouts, a missing `git`) are absorbed inside the component that
//! owns them and never become a [`LoopError`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for claude-loop operations
#[derive(Error, Debug)]
pub enum LoopError {
    // =========================================================================
    // Input Errors
    // =========================================================================
    /// State document path does not exist
    #[error("State file not found: {}", path.display())]
    StateFileNotFound { path: PathBuf },

    /// Iteration argument was not an integer
    #[error("Iteration must be a number, got '{value}'")]
    InvalidIteration { value: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    // =========================================================================
    // Command Generation Errors
    // =========================================================================
    /// Writing a generated command file failed
    #[error("Failed to write command file {}: {message}", path.display())]
    CommandWrite { path: PathBuf, message: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML error wrapper
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl LoopError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Check if this error was caused by caller input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::StateFileNotFound { .. } | Self::InvalidIteration { .. }
        )
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::Toml(_) => 7,
            _ => 1,
        }
    }
}

/// Type alias for claude-loop results
pub type Result<T> = std::result::Result<T, LoopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoopError::StateFileNotFound {
            path: PathBuf::from("/tmp/missing.md"),
        };
        assert_eq!(err.to_string(), "State file not found: /tmp/missing.md");

        let err = LoopError::InvalidIteration {
            value: "abc".into(),
        };
        assert!(err.to_string().contains("Iteration must be a number"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_is_input_error() {
        assert!(LoopError::InvalidIteration { value: "x".into() }.is_input_error());
        assert!(LoopError::StateFileNotFound {
            path: PathBuf::from("x")
        }
        .is_input_error());
        assert!(!LoopError::config_with_path("bad", PathBuf::from("c.toml")).is_input_error());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            LoopError::InvalidIteration { value: "x".into() }.exit_code(),
            1
        );
        assert_eq!(
            LoopError::StateFileNotFound {
                path: PathBuf::from("x")
            }
            .exit_code(),
            1
        );
        assert_eq!(
            LoopError::config_with_path("test", PathBuf::from("c.toml")).exit_code(),
            7
        );
    }

    #[test]
    fn test_config_with_path() {
        let path = PathBuf::from("/test/config.toml");
        let err = LoopError::config_with_path("failed to parse", path.clone());
        if let LoopError::Config {
            message,
            path: opt_path,
        } = err
        {
            assert_eq!(message, "failed to parse");
            assert_eq!(opt_path, Some(path));
        } else {
            panic!("Wrong error variant");
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: LoopError = io_err.into();
        assert!(matches!(err, LoopError::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }
}
