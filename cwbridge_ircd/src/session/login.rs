use super::*;

/// Logs a session in to its backend, completes the client handshake, then
/// becomes the session's update poller
pub(super) struct LoginTask<B>
{
    pub backend: Arc<B>,
    pub connection: Connection,
    pub settings: Arc<SessionSettings>,
    pub state: Arc<RwLock<SessionState>>,
    pub nick: String,
    pub teardown: watch::Receiver<bool>,
}

impl<B: ChatBackend> LoginTask<B>
{
    pub async fn run(mut self)
    {
        let result = tokio::select! {
            _ = wait_for_teardown(&mut self.teardown) => return,
            result = self.backend.login() => result,
        };

        if let Err(e) = result
        {
            let e = SessionError::Auth(e);
            tracing::warn!(error = %e, "login failed");
            self.connection.error(&e.to_string());
            return;
        }

        {
            // Held while the handshake is queued, so a command the client sends
            // in reply is only dispatched once the session is active
            let mut state = self.state.write();
            self.send_handshake();
            *state = SessionState::Active;
        }
        tracing::info!("session active");

        // Every handshake line is queued before the poller can produce anything
        poller::run(self.backend, self.connection, self.settings.poll_interval, self.teardown).await;
    }

    fn send_handshake(&self)
    {
        let server = self.settings.server_name.as_str();
        let nick = if self.nick.is_empty() { "*" } else { self.nick.as_str() };

        self.connection.send(&numeric::welcome(server, nick));
        self.connection.send(&numeric::end_of_motd(server, nick));

        for (_, room) in self.backend.rooms()
        {
            let channel = channel_target(&room.name);
            tracing::debug!(%channel, "sending join");

            self.connection.send(&message::join(nick, &channel));
            self.connection.send(&numeric::no_topic(server, nick, &channel));
            self.connection.send(&numeric::names_reply(server, nick, &channel, nick));
            self.connection.send(&numeric::end_of_names(server, nick, &channel));
        }
    }
}
