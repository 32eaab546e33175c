use crate::*;
use crate::connection_task::ConnectionTask;

use std::sync::Arc;

use tokio::{
    io::AsyncWrite,
    sync::{
        mpsc::{unbounded_channel, UnboundedSender},
        watch,
    },
    task::JoinHandle,
};

/// Instruction for a connection's writer task
#[derive(Debug)]
pub(crate) enum ControlMessage
{
    /// Write a complete, terminated line
    Send(String),
    /// Flush what has been queued so far and shut the socket down
    Close,
}

/// Handle to the write side of a client connection.
///
/// Every line is passed whole to a single writer task, so handles can be cloned
/// into as many tasks as needed without lines interleaving on the wire.
#[derive(Clone)]
pub struct Connection
{
    send_channel: UnboundedSender<ControlMessage>,
    closed: Arc<watch::Sender<bool>>,
}

impl Connection
{
    /// Spawn the writer task for `writer` and return a handle to it, along with
    /// the writer task's join handle
    pub fn spawn<W>(writer: W) -> (Self, JoinHandle<()>)
        where W: AsyncWrite + Send + Unpin + 'static
    {
        let (send, recv) = unbounded_channel();
        let (closed, _) = watch::channel(false);
        let closed = Arc::new(closed);

        let task = ConnectionTask::new(writer, recv, Arc::clone(&closed));
        let handle = tokio::spawn(task.run());

        (Self { send_channel: send, closed }, handle)
    }

    fn send_control(&self, msg: ControlMessage)
    {
        if let Err(e) = self.send_channel.send(msg)
        {
            tracing::debug!("Connection writer already gone: {:?}", e.0);
        }
    }

    /// Send a message to the client. Has no effect once the connection is closed.
    pub fn send(&self, msg: &ProtocolMessage)
    {
        if self.is_closed()
        {
            tracing::trace!(%msg, "dropping message for closed connection");
            return;
        }
        self.send_control(ControlMessage::Send(format!("{}\r\n", msg)));
    }

    /// Send an `ERROR` line and close the connection
    pub fn error(&self, text: &str)
    {
        self.send(&message::error(text));
        self.close();
    }

    /// Close the connection once everything already sent has been written
    pub fn close(&self)
    {
        if self.closed.send_replace(true)
        {
            return;
        }
        self.send_control(ControlMessage::Close);
    }

    pub fn is_closed(&self) -> bool
    {
        *self.closed.borrow()
    }

    /// A receiver which observes the connection being closed, whether by
    /// [`close`](Self::close) or by a write failure
    pub fn closed_signal(&self) -> watch::Receiver<bool>
    {
        self.closed.subscribe()
    }
}
