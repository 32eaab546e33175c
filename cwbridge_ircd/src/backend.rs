//! The interface between a session and the chat backend it bridges to.

use async_trait::async_trait;
use chatwork_client::{ChatworkClient, Credentials, Error, Room, RoomId, UpdateEvent};

/// One authenticated (or authenticating) backend account, owned by a single session
#[async_trait]
pub trait ChatBackend: Send + Sync + 'static
{
    /// Establish the backend session with the credentials given at construction
    async fn login(&self) -> Result<(), Error>;

    /// The rooms known to the backend as of the last login or poll, ordered by id
    fn rooms(&self) -> Vec<(RoomId, Room)>;

    /// Fetch new chat events since the last call
    async fn poll_updates(&self) -> Result<Vec<UpdateEvent>, Error>;

    /// Post `text` to a room
    async fn send_message(&self, room: RoomId, text: &str) -> Result<(), Error>;
}

/// Builds a [`ChatBackend`] for each session that completes the handshake
pub trait BackendConnector: Send + Sync + 'static
{
    type Backend: ChatBackend;

    fn connect(&self, credentials: Credentials) -> Result<Self::Backend, Error>;
}

/// Connects sessions to a Chatwork gateway
#[derive(Debug,Clone)]
pub struct ChatworkConnector
{
    base_url: String,
}

impl ChatworkConnector
{
    pub fn new(base_url: impl ToString) -> Self
    {
        Self { base_url: base_url.to_string() }
    }
}

impl BackendConnector for ChatworkConnector
{
    type Backend = ChatworkClient;

    fn connect(&self, credentials: Credentials) -> Result<ChatworkClient, Error>
    {
        ChatworkClient::new(&self.base_url, credentials)
    }
}

#[async_trait]
impl ChatBackend for ChatworkClient
{
    async fn login(&self) -> Result<(), Error>
    {
        ChatworkClient::login(self).await
    }

    fn rooms(&self) -> Vec<(RoomId, Room)>
    {
        ChatworkClient::rooms(self)
    }

    async fn poll_updates(&self) -> Result<Vec<UpdateEvent>, Error>
    {
        self.get_update().await
    }

    async fn send_message(&self, room: RoomId, text: &str) -> Result<(), Error>
    {
        self.send_chat(room, text).await
    }
}
