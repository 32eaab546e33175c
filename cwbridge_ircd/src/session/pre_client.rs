use std::fmt;

/// Registration progress of a session.
///
/// `Authenticating` and `Active` are entered from the background login task,
/// so the current state is shared between it and the session's read loop.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum SessionState
{
    AwaitingCredentials,
    AwaitingUser,
    Authenticating,
    Active,
    Closed,
}

/// Handshake information received from a connection that has not yet logged in
#[derive(Default)]
pub struct PreClient
{
    pub nick: String,
    secret: Option<String>,
}

impl PreClient
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn set_secret(&mut self, secret: impl ToString)
    {
        self.secret = Some(secret.to_string());
    }

    pub fn has_secret(&self) -> bool
    {
        self.secret.is_some()
    }

    /// Consume the stored secret; an empty one if none was sent
    pub fn take_secret(&mut self) -> String
    {
        self.secret.take().unwrap_or_default()
    }
}

impl fmt::Debug for PreClient
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("PreClient")
         .field("nick", &self.nick)
         .field("has_secret", &self.secret.is_some())
         .finish()
    }
}
