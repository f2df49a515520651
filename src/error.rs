// Error types for gh-repo-man.
// Covers input validation, cancellation, external process failures, and cache/config errors.

use std::fmt;

use thiserror::Error;

/// Rejected user input. Never retried, never reaches an external process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("username too long: maximum {max} characters allowed")]
    TooLong { max: usize },

    #[error("username contains invalid characters that could be unsafe")]
    InvalidCharacters,

    #[error(
        "username format is invalid: must start and end with alphanumeric character, may contain hyphens and underscores"
    )]
    InvalidFormat,

    #[error("invalid repository name format: {0}")]
    InvalidRepoName(String),
}

/// Why a shared deadline fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller cancelled (Ctrl-C, explicit abort).
    Aborted,
    /// The timeout attached to the deadline elapsed.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Aborted => write!(f, "aborted"),
            CancelReason::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RepoManError {
    #[error("invalid username: {0}")]
    InvalidUsername(ValidationError),

    #[error(transparent)]
    Validation(ValidationError),

    #[error("{what} cancelled: {reason}")]
    Cancelled { what: String, reason: CancelReason },

    #[error("{context}: {stderr}")]
    CommandFailed { context: String, stderr: String },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command {0} is not available in PATH")]
    CommandUnavailable(String),

    #[error("selection cancelled")]
    SelectionCancelled,

    #[error("invalid duration format: {0}")]
    InvalidTtl(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl RepoManError {
    pub fn cancelled(what: impl Into<String>, reason: CancelReason) -> Self {
        RepoManError::Cancelled {
            what: what.into(),
            reason,
        }
    }

    /// True for errors caused by a fired deadline or user abort.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RepoManError::Cancelled { .. })
    }
}

impl From<ValidationError> for RepoManError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidRepoName(_) => RepoManError::Validation(err),
            _ => RepoManError::InvalidUsername(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, RepoManError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_errors_carry_prefix() {
        let err: RepoManError = ValidationError::TooLong { max: 39 }.into();
        assert_eq!(
            err.to_string(),
            "invalid username: username too long: maximum 39 characters allowed"
        );

        let err: RepoManError = ValidationError::InvalidRepoName("nope".to_string()).into();
        assert_eq!(err.to_string(), "invalid repository name format: nope");
    }

    #[test]
    fn test_cancelled_message() {
        let err = RepoManError::cancelled("clone of hello-world", CancelReason::DeadlineExceeded);
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "clone of hello-world cancelled: deadline exceeded");

        let err = RepoManError::cancelled("repository listing", CancelReason::Aborted);
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn test_command_failed_keeps_stderr_verbatim() {
        let err = RepoManError::CommandFailed {
            context: "failed to clone fail_repo".to_string(),
            stderr: "fatal: repository not found\n".to_string(),
        };
        assert!(!err.is_cancelled());
        assert_eq!(
            err.to_string(),
            "failed to clone fail_repo: fatal: repository not found\n"
        );
    }
}
