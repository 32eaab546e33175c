//! Per-connection protocol state.
//!
//! A [`Session`] reads lines from its client and drives the handshake. Once the
//! client has sent `USER`, a background task logs in to the backend, sends the
//! handshake completion and channel list, and then polls for updates until the
//! session is torn down. Messages sent by the client are posted from their own
//! short-lived tasks. All of these tasks are tracked in the session's
//! [`JoinSet`] and stop as soon as the teardown signal is raised.

use crate::*;
use crate::backend::{BackendConnector, ChatBackend};

use std::{sync::Arc, time::Duration};

use parking_lot::RwLock;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader, Lines},
    sync::watch,
    task::{JoinError, JoinHandle, JoinSet},
};

mod pre_client;
pub use pre_client::*;

mod handlers;
mod login;

/// Settings shared by every session run by a listener
#[derive(Debug,Clone)]
pub struct SessionSettings
{
    /// Prefix used on numeric replies
    pub server_name: String,
    /// Time between two backend update polls
    pub poll_interval: Duration,
}

impl Default for SessionSettings
{
    fn default() -> Self
    {
        Self {
            server_name: "cwbridge".to_string(),
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// A single client connection and the backend account it is bridged to
pub struct Session<C: BackendConnector>
{
    connector: Arc<C>,
    settings: Arc<SessionSettings>,
    connection: Connection,
    pre_client: PreClient,
    /// Created by the first `USER` command and never replaced
    backend: Option<Arc<C::Backend>>,
    state: Arc<RwLock<SessionState>>,
    teardown: watch::Sender<bool>,
    tasks: JoinSet<()>,
}

impl<C: BackendConnector> Session<C>
{
    /// Run a session over `stream` until either side closes it.
    ///
    /// Returns once every task belonging to the session has finished and all
    /// queued output has been written.
    pub async fn run<S>(connector: Arc<C>, settings: Arc<SessionSettings>, stream: S)
        where S: AsyncRead + AsyncWrite + Send + 'static
    {
        let (reader, writer) = tokio::io::split(stream);
        let (connection, writer_task) = Connection::spawn(writer);
        let (teardown, _) = watch::channel(false);

        let mut session = Self {
            connector,
            settings,
            connection,
            pre_client: PreClient::new(),
            backend: None,
            state: Arc::new(RwLock::new(SessionState::AwaitingCredentials)),
            teardown,
            tasks: JoinSet::new(),
        };

        session.read_loop(BufReader::new(reader).lines()).await;
        session.shutdown(writer_task).await;
    }

    fn state(&self) -> SessionState
    {
        *self.state.read()
    }

    fn set_state(&self, state: SessionState)
    {
        *self.state.write() = state;
    }

    async fn read_loop<R>(&mut self, mut lines: Lines<R>)
        where R: AsyncBufRead + Unpin
    {
        let mut closed = self.connection.closed_signal();

        loop
        {
            tokio::select! {
                _ = closed.changed() => {
                    tracing::debug!("connection closed");
                    break;
                }
                Some(result) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    log_task_result(result);
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        let line = line.strip_suffix('\r').unwrap_or(&line);
                        if let Err(e) = self.handle_line(line) {
                            if !e.is_fatal() {
                                self.connection.send(&message::error(&e.to_string()));
                                continue;
                            }
                            tracing::info!(error = %e, "closing session");
                            self.connection.error(&e.to_string());
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::debug!("client disconnected");
                        break;
                    }
                    Err(e) => {
                        let e = SessionError::from(e);
                        tracing::info!(error = %e, "closing session");
                        self.connection.error(&e.to_string());
                        break;
                    }
                }
            }
        }
    }

    /// Stop all background work, then release the connection
    async fn shutdown(mut self, writer_task: JoinHandle<()>)
    {
        self.teardown.send_replace(true);

        while let Some(result) = self.tasks.join_next().await
        {
            log_task_result(result);
        }
        self.set_state(SessionState::Closed);

        self.connection.close();
        if let Err(e) = writer_task.await
        {
            tracing::error!("Connection writer failed: {}", e);
        }
        tracing::debug!("session finished");
    }
}

fn log_task_result(result: Result<(), JoinError>)
{
    if let Err(e) = result
    {
        if e.is_panic()
        {
            tracing::error!("Session task panicked: {}", e);
        }
    }
}

/// Wait until the session's teardown signal has been raised
pub(crate) async fn wait_for_teardown(signal: &mut watch::Receiver<bool>)
{
    loop
    {
        if *signal.borrow_and_update()
        {
            return;
        }
        if signal.changed().await.is_err()
        {
            return;
        }
    }
}
