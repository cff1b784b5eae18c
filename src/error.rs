use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can abort a reminder run.
#[derive(Debug, Error)]
pub enum ReminderError {
    /// A required input is missing or malformed. Raised before any pull
    /// request is touched.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A call to GitHub failed (network, auth, rate limit, GraphQL errors).
    #[error("{context}: {cause}")]
    Transport { context: String, cause: BoxError },

    /// GitHub answered, but a record lacks a field we rely on.
    #[error("unexpected GitHub data: {0}")]
    DataIntegrity(String),
}

impl ReminderError {
    pub fn transport(context: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::Transport {
            context: context.into(),
            cause: cause.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReminderError>;
