use crate::models::{Id, OptionLetter};
use crate::session::SessionStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Backend responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Error::Unauthorized(body),
            reqwest::StatusCode::NOT_FOUND => Error::NotFound(body),
            reqwest::StatusCode::BAD_REQUEST => Error::BadRequest(body),
            other => Error::Status {
                status: other.as_u16(),
                body,
            },
        }
    }

    /// True when the backend rejected the bearer token and the user must sign in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_))
    }
}

/// Failures surfaced by a quiz session as explicit state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to load quiz: {0}")]
    Load(String),

    #[error("Failed to submit quiz: {0}")]
    Submission(String),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreconditionError {
    #[error("cannot {operation} while the session is {status}")]
    InvalidState {
        operation: &'static str,
        status: SessionStatus,
    },

    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(Id),

    #[error("option {letter} is not available for question {question_id}")]
    UnavailableOption { question_id: Id, letter: OptionLetter },

    #[error("question index {index} is out of range (quiz has {count} questions)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("no signed-in user to attribute the submission to")]
    MissingUser,
}
