use thiserror::Error;

/// A raw line that could not be tokenised into a [`ProtocolMessage`](crate::ProtocolMessage)
#[derive(Debug,Error,PartialEq,Eq)]
pub enum ParseError
{
    #[error("invalid irc message: empty line")]
    Empty,
    #[error("invalid irc message: {0}")]
    MissingCommand(String),
}

/// An error that ends, or is reported on, a client session
#[derive(Debug,Error)]
pub enum SessionError
{
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Backend error: {0}")]
    Backend(chatwork_client::Error),
    #[error("Login failed: {0}")]
    Auth(chatwork_client::Error),
    #[error("Update failed: {0}")]
    Poll(chatwork_client::Error),
    #[error("Send failed: {0}")]
    Send(chatwork_client::Error),
}

impl SessionError
{
    /// Whether the session has to be closed after reporting this error
    pub fn is_fatal(&self) -> bool
    {
        !matches!(self, Self::Send(_))
    }
}

/// An error that might occur when listening for client connections
#[derive(Debug,Error)]
pub enum ListenerError
{
    #[error("Couldn't bind {0}: {1}")]
    Bind(std::net::SocketAddr, std::io::Error),
    #[error("I/O Error: {0}")]
    IoError(#[from] std::io::Error),
}
