use thiserror::Error;

/// An error returned by the Chatwork gateway or the transport beneath it
#[derive(Debug,Error)]
pub enum Error
{
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{command} rejected: {message}")]
    Rejected { command: String, message: String },
    #[error("{0} returned no result")]
    MissingResult(String),
}

impl Error
{
    /// Build a [`Rejected`](Self::Rejected) error for the given gateway command
    pub fn rejected(command: impl ToString, message: impl ToString) -> Self
    {
        Self::Rejected { command: command.to_string(), message: message.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
