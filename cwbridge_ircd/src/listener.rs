use crate::*;
use crate::backend::BackendConnector;

use std::{net::SocketAddr, sync::Arc};

use tokio::net::{TcpListener, TcpStream};

/// Accepts client connections and runs an independent [`Session`] for each
pub struct Listener
{
    listener: TcpListener,
}

impl Listener
{
    pub async fn bind(addr: SocketAddr) -> Result<Self, ListenerError>
    {
        let listener = TcpListener::bind(addr).await.map_err(|e| ListenerError::Bind(addr, e))?;
        tracing::info!(%addr, "listening");

        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ListenerError>
    {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until accepting fails. Sessions already running are
    /// left to finish on their own.
    pub async fn run<C: BackendConnector>(self, connector: Arc<C>, settings: Arc<SessionSettings>) -> Result<(), ListenerError>
    {
        loop
        {
            let (stream, peer) = self.listener.accept().await?;
            tokio::spawn(handle_connection(Arc::clone(&connector), Arc::clone(&settings), stream, peer));
        }
    }
}

#[tracing::instrument(skip(connector, settings, stream))]
async fn handle_connection<C: BackendConnector>(connector: Arc<C>, settings: Arc<SessionSettings>, stream: TcpStream, peer: SocketAddr)
{
    tracing::info!("accepted connection");
    Session::run(connector, settings, stream).await;
    tracing::info!("connection closed");
}
