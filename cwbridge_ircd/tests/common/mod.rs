#![allow(dead_code)]

use cwbridge_ircd::{
    backend::{BackendConnector, ChatBackend},
    Session,
    SessionSettings,
};
use chatwork_client::{Credentials, Error, Room, RoomId, UpdateEvent};

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf},
    task::JoinHandle,
};

pub const SERVER_NAME: &str = "cwbridge";
const LINE_TIMEOUT: Duration = Duration::from_secs(2);

/// State shared between a test and the backends its connector creates
#[derive(Default)]
pub struct MockShared
{
    pub rooms: Mutex<Vec<(RoomId, Room)>>,
    pub login_error: Mutex<Option<String>>,
    pub send_error: Mutex<Option<String>>,
    /// Results handed out by successive polls; an empty queue polls as no updates
    pub polls: Mutex<VecDeque<Result<Vec<UpdateEvent>, String>>>,
    pub poll_calls: AtomicUsize,
    /// Make `login` never complete
    pub hang_login: AtomicBool,
    /// Make every `poll_updates` call never complete
    pub hang_poll: AtomicBool,
    pub logins: Mutex<Vec<(String, String)>>,
    pub sent: Mutex<Vec<(RoomId, String)>>,
}

impl MockShared
{
    pub fn with_rooms(rooms: &[(u64, &str)]) -> Arc<Self>
    {
        let shared = Self::default();
        *shared.rooms.lock() = rooms.iter().map(|(id, name)| (RoomId(*id), Room::new(name))).collect();
        Arc::new(shared)
    }

    pub fn queue_poll(&self, result: Result<Vec<UpdateEvent>, String>)
    {
        self.polls.lock().push_back(result);
    }

    pub fn poll_calls(&self) -> usize
    {
        self.poll_calls.load(Ordering::SeqCst)
    }
}

pub struct MockConnector(pub Arc<MockShared>);

pub struct MockBackend
{
    shared: Arc<MockShared>,
    credentials: Credentials,
}

impl BackendConnector for MockConnector
{
    type Backend = MockBackend;

    fn connect(&self, credentials: Credentials) -> Result<MockBackend, Error>
    {
        Ok(MockBackend { shared: Arc::clone(&self.0), credentials })
    }
}

#[async_trait]
impl ChatBackend for MockBackend
{
    async fn login(&self) -> Result<(), Error>
    {
        self.shared.logins.lock().push((self.credentials.username.clone(), self.credentials.secret().to_string()));

        if self.shared.hang_login.load(Ordering::SeqCst)
        {
            std::future::pending::<()>().await;
        }

        let error = self.shared.login_error.lock().clone();
        match error
        {
            Some(message) => Err(Error::rejected("api_login", message)),
            None => Ok(()),
        }
    }

    fn rooms(&self) -> Vec<(RoomId, Room)>
    {
        self.shared.rooms.lock().clone()
    }

    async fn poll_updates(&self) -> Result<Vec<UpdateEvent>, Error>
    {
        self.shared.poll_calls.fetch_add(1, Ordering::SeqCst);

        if self.shared.hang_poll.load(Ordering::SeqCst)
        {
            std::future::pending::<()>().await;
        }

        let next = self.shared.polls.lock().pop_front();
        match next
        {
            Some(Ok(events)) => Ok(events),
            Some(Err(message)) => Err(Error::rejected("get_update", message)),
            None => Ok(Vec::new()),
        }
    }

    async fn send_message(&self, room: RoomId, text: &str) -> Result<(), Error>
    {
        let error = self.shared.send_error.lock().clone();
        if let Some(message) = error
        {
            return Err(Error::rejected("send_chat", message));
        }
        self.shared.sent.lock().push((room, text.to_string()));
        Ok(())
    }
}

/// Wait for `condition` to hold, checking every few milliseconds
pub async fn wait_until(condition: impl Fn() -> bool)
{
    tokio::time::timeout(LINE_TIMEOUT, async {
        while !condition()
        {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }).await.expect("timed out waiting for condition");
}

pub fn event(id: u64, room: u64, room_name: &str, author: &str, text: &str) -> UpdateEvent
{
    UpdateEvent {
        id,
        room_id: RoomId(room),
        room_name: room_name.to_string(),
        author: author.to_string(),
        text: text.to_string(),
        timestamp: chrono::Utc::now(),
    }
}

pub fn test_settings() -> SessionSettings
{
    SessionSettings {
        server_name: SERVER_NAME.to_string(),
        poll_interval: Duration::from_millis(20),
    }
}

/// The client end of a session running over an in-memory stream
pub struct TestClient
{
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
    pub session: JoinHandle<()>,
}

impl TestClient
{
    pub fn start(shared: &Arc<MockShared>) -> Self
    {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let connector = Arc::new(MockConnector(Arc::clone(shared)));
        let session = tokio::spawn(Session::run(connector, Arc::new(test_settings()), server));

        let (reader, writer) = tokio::io::split(client);
        Self { lines: BufReader::new(reader).lines(), writer, session }
    }

    pub async fn send(&mut self, line: &str)
    {
        self.writer.write_all(format!("{}\r\n", line).as_bytes()).await.unwrap();
    }

    /// The next line from the server, or `None` at end of stream
    pub async fn next_line(&mut self) -> Option<String>
    {
        let line = tokio::time::timeout(LINE_TIMEOUT, self.lines.next_line())
                        .await
                        .expect("timed out waiting for a line")
                        .unwrap();
        line.map(|l| l.trim_end_matches('\r').to_string())
    }

    pub async fn expect_line(&mut self, expected: &str)
    {
        assert_eq!(self.next_line().await.as_deref(), Some(expected));
    }

    pub async fn expect_eof(&mut self)
    {
        assert_eq!(self.next_line().await, None);
    }

    /// Assert that nothing arrives for `wait`
    pub async fn expect_nothing(&mut self, wait: Duration)
    {
        if let Ok(line) = tokio::time::timeout(wait, self.lines.next_line()).await
        {
            panic!("unexpected output: {:?}", line);
        }
    }

    pub async fn register(&mut self, nick: &str, identity: &str, secret: &str)
    {
        self.send(&format!("PASS {}", secret)).await;
        self.send(&format!("NICK {}", nick)).await;
        self.send(&format!("USER {} 0 * :Real Name", identity)).await;
    }

    /// Consume the handshake for a session with `rooms` channels
    pub async fn expect_handshake(&mut self, nick: &str, channels: &[&str])
    {
        self.expect_line(&format!(":{} 001 {} :Welcome to the Internet Relay Network", SERVER_NAME, nick)).await;
        self.expect_line(&format!(":{} 376 {} :End of MOTD", SERVER_NAME, nick)).await;

        for channel in channels
        {
            self.expect_line(&format!(":{} JOIN :{}", nick, channel)).await;
            self.expect_line(&format!(":{} 331 {} {} :No topic is set", SERVER_NAME, nick, channel)).await;
            self.expect_line(&format!(":{} 353 {} = {} :{}", SERVER_NAME, nick, channel, nick)).await;
            self.expect_line(&format!(":{} 366 {} {} :End of NAMES list", SERVER_NAME, nick, channel)).await;
        }
    }

    /// Drop the client end of the stream, returning the session's task
    pub fn disconnect(self) -> JoinHandle<()>
    {
        let Self { lines, writer, session } = self;
        drop(lines);
        drop(writer);
        session
    }

    /// Wait for the session task itself to finish
    pub async fn finished(self)
    {
        tokio::time::timeout(LINE_TIMEOUT, self.session)
            .await
            .expect("session did not finish")
            .unwrap();
    }
}
