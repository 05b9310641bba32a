//! Error types for the agenda client.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors that can occur in agenda operations.
#[derive(Error, Debug)]
pub enum AgendaError {
    /// Client-side validation failed; nothing was sent to the server.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// The server rejected the request with field messages (HTTP 422 or an
    /// `errors` body). Messages are joined into one line for display.
    #[error("{}", .0.join("; "))]
    ServerValidation(Vec<String>),

    #[error("Not authenticated. Log in with `agenda login`")]
    Unauthorized,

    #[error("Server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Could not reach the server: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Response is missing `{0}`")]
    MissingField(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AgendaError {
    fn from(err: serde_json::Error) -> Self {
        AgendaError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AgendaError {
    fn from(err: reqwest::Error) -> Self {
        AgendaError::Transport(err.to_string())
    }
}

/// Result type alias for agenda operations.
pub type AgendaResult<T> = Result<T, AgendaError>;
