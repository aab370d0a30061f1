// ============================================================================
// COMPREHENSIVE ERROR DOMAIN
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (collectors keep the last error to show on re-prompt)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Answer Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("invalid answer for '{key}': {reason}")]
    InvalidAnswer { key: String, reason: String },

    #[error("missing answer for required question '{key}'")]
    MissingAnswer { key: String },

    #[error("'{key}' is not a question of this catalog")]
    UnknownQuestion { key: String },

    #[error("'{key}' was answered but its question does not apply: {reason}")]
    UnexpectedAnswer { key: String, reason: String },

    // ========================================================================
    // Template Errors
    // ========================================================================
    #[error("template '{template}' references unknown token '{token}'")]
    UnknownToken { token: String, template: String },

    #[error("template '{template}' line {line}: {reason}")]
    TemplateSyntax {
        template: String,
        line: usize,
        reason: String,
    },

    // ========================================================================
    // Catalog Errors
    // ========================================================================
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Catalog '{catalog_id}' has no entries")]
    EmptyCatalog { catalog_id: String },

    #[error("Duplicate output path: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes the destination root: {path}")]
    PathEscapesRoot { path: String },
}

impl DomainError {
    /// Shorthand for the most common validation failure.
    pub fn invalid_answer(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAnswer {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// The question key this error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::InvalidAnswer { key, .. }
            | Self::MissingAnswer { key }
            | Self::UnknownQuestion { key }
            | Self::UnexpectedAnswer { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidAnswer { key, reason } => vec![
                format!("Fix the value supplied for '{key}'"),
                format!("Constraint: {reason}"),
            ],
            Self::MissingAnswer { key } => vec![
                format!("Supply '{key}' with --data {key}=<value>"),
                "Or add it to the file passed with --data-file".into(),
                "Or run without --defaults to be prompted".into(),
            ],
            Self::UnknownQuestion { key } => vec![
                format!("Remove '{key}' from your answers"),
                "Try: kiln list --questions".into(),
            ],
            Self::UnexpectedAnswer { key, .. } => vec![
                format!("Drop '{key}' from the answers; its question is skipped"),
            ],
            Self::UnknownToken { template, .. } => vec![
                format!("Template '{template}' does not match its questionnaire"),
                "Guard the token with an {% if %} block for conditional questions".into(),
            ],
            Self::TemplateSyntax { template, .. } => vec![
                format!("Fix the template syntax in '{template}'"),
            ],
            Self::EmptyCatalog { catalog_id } => vec![
                format!("Catalog '{}' is corrupted", catalog_id),
                "Please report this issue or use a different catalog".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidAnswer { .. }
            | Self::MissingAnswer { .. }
            | Self::UnknownQuestion { .. }
            | Self::UnexpectedAnswer { .. } => ErrorCategory::Validation,
            Self::UnknownToken { .. }
            | Self::TemplateSyntax { .. }
            | Self::InvalidCatalog(_)
            | Self::EmptyCatalog { .. } => ErrorCategory::Template,
            Self::DuplicatePath { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathEscapesRoot { .. } => ErrorCategory::Template,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Template,
    Internal,
}
