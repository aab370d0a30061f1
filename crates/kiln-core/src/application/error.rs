//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not business
//! rules. Business rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while collecting answers or materializing output.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// An output file already exists and overwriting was not requested.
    #[error("Refusing to overwrite existing file {path}")]
    DestinationCollision { path: PathBuf },

    /// The destination exists but is not a directory.
    #[error("Destination {path} exists and is not a directory")]
    DestinationNotDirectory { path: PathBuf },

    /// An adapter's shared state is unusable (poisoned lock).
    #[error("Adapter state lock poisoned")]
    LockPoisoned,

    /// The interactive prompt could not be shown or read.
    #[error("Prompt failed: {reason}")]
    PromptFailed { reason: String },

    /// A pre-supplied answers record could not be read.
    #[error("Could not read answers: {reason}")]
    AnswersSource { reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::DestinationCollision { path } => vec![
                format!("File already exists: {}", path.display()),
                "Use --force to overwrite existing files".into(),
                "Or choose an empty destination directory".into(),
            ],
            Self::DestinationNotDirectory { path } => vec![
                format!("Remove or rename {}", path.display()),
                "Or pick another destination".into(),
            ],
            Self::LockPoisoned => vec!["This is likely a bug, please report it".into()],
            Self::PromptFailed { .. } => vec![
                "Run in a terminal, or answer non-interactively".into(),
                "Try: kiln new <DEST> --defaults --data KEY=VALUE".into(),
            ],
            Self::AnswersSource { reason } => vec![
                format!("Answers problem: {reason}"),
                "The file must hold a flat key/value record in JSON, TOML or YAML".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } | Self::LockPoisoned => ErrorCategory::Internal,
            Self::DestinationCollision { .. } | Self::DestinationNotDirectory { .. } => {
                ErrorCategory::Destination
            }
            Self::PromptFailed { .. } => ErrorCategory::Internal,
            Self::AnswersSource { .. } => ErrorCategory::Validation,
        }
    }
}
