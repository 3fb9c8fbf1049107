use thiserror::Error;

use crate::git::GitError;

#[derive(Error, Debug)]
pub enum MrLensError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("GitLab API request failed ({status} {status_text}): {message}")]
    ApiError {
        status: u16,
        status_text: String,
        message: String,
    },

    #[error("Unexpected API response: {0}")]
    UnexpectedResponse(String),

    #[error("{0}")]
    MissingData(String),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MrLensError>;
