use std::io;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
///
/// Startup failures (`CorpusLoad`, `IndexBuild`) abort bootstrap. Per-turn backend
/// failures (`BackendTimeout`, `BackendUnavailable`) never leave a chat turn: the
/// guidance agent turns them into its apology reply.
#[derive(Debug, Error)]
pub enum AppError {
    /// The corpus file is missing, unreadable, or holds no passages.
    #[error("Corpus load error: {0}")]
    CorpusLoad(String),

    /// The embedding backend failed while the index was being built.
    #[error("Index build error: {0}")]
    IndexBuild(String),

    /// An embedding or completion call did not answer in time.
    #[error("Backend timed out: {0}")]
    BackendTimeout(String),

    /// An embedding or completion backend refused, failed or returned garbage.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents errors specific to the actor system, such as communication failures.
    #[error("Actor error: {0}")]
    Actor(#[from] crate::actors::messages::ActorError),

    /// Represents data validation errors (e.g., invalid input format).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents configuration-related errors (e.g., malformed environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for failures that only affect the current turn.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            AppError::BackendTimeout(_) | AppError::BackendUnavailable(_)
        )
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::CorpusLoad(s) => AppError::CorpusLoad(s.clone()),
            AppError::IndexBuild(s) => AppError::IndexBuild(s.clone()),
            AppError::BackendTimeout(s) => AppError::BackendTimeout(s.clone()),
            AppError::BackendUnavailable(s) => AppError::BackendUnavailable(s.clone()),
            AppError::Io(e) => AppError::Io(io::Error::new(e.kind(), e.to_string())),
            AppError::Actor(e) => AppError::Actor(e.clone()),
            AppError::Validation(s) => AppError::Validation(s.clone()),
            AppError::Config(s) => AppError::Config(s.clone()),
            AppError::Internal(s) => AppError::Internal(s.clone()),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::BackendTimeout(format!("Operation timed out: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(format!("Validation errors: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::BackendTimeout(format!("HTTP request timed out: {}", err))
        } else {
            AppError::BackendUnavailable(format!("HTTP error: {}", err))
        }
    }
}
