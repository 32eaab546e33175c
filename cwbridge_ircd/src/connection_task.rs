use crate::connection::ControlMessage;

use std::sync::Arc;

use tokio::{
    io::{
        AsyncWrite,
        AsyncWriteExt,
    },
    sync::{
        mpsc::UnboundedReceiver,
        watch,
    },
};

pub(crate) struct ConnectionTask<W> {
    writer: W,
    control_channel: UnboundedReceiver<ControlMessage>,
    closed: Arc<watch::Sender<bool>>,
}

impl<W> ConnectionTask<W>
    where W: AsyncWrite + Unpin
{
    pub fn new(writer: W,
        control: UnboundedReceiver<ControlMessage>,
        closed: Arc<watch::Sender<bool>>) -> Self
    {
        Self {
            writer,
            control_channel: control,
            closed,
        }
    }

    pub async fn run(mut self)
    {
        while let Some(control) = self.control_channel.recv().await
        {
            match control
            {
                ControlMessage::Close => { break; },
                ControlMessage::Send(msg) => {
                    if let Err(e) = self.writer.write_all(msg.as_bytes()).await {
                        tracing::debug!("Write error: {}", e);
                        break;
                    }
                }
            }
        }

        if let Err(e) = self.writer.shutdown().await {
            tracing::debug!("Error shutting down connection: {}", e);
        }
        self.closed.send_replace(true);
        tracing::trace!("connection writer finished");
    }
}
