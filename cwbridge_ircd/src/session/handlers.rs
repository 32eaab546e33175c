use super::*;
use super::login::LoginTask;

use chatwork_client::Credentials;
use tracing::Instrument;

impl<C: BackendConnector> Session<C>
{
    fn send(&self, msg: ProtocolMessage)
    {
        self.connection.send(&msg);
    }

    fn server_name(&self) -> &str
    {
        &self.settings.server_name
    }

    /// Parse and act on a single line from the client.
    ///
    /// An error return is fatal to the session.
    pub(super) fn handle_line(&mut self, line: &str) -> Result<(), SessionError>
    {
        let msg = ProtocolMessage::parse(line)?;
        let command = msg.command.to_ascii_uppercase();

        // Credentials stay out of the logs
        match command.as_str()
        {
            "PASS" | "USER" => tracing::debug!(command = %msg.command, "received"),
            _ => tracing::debug!(?msg, "received"),
        }

        match command.as_str()
        {
            "PASS" => self.handle_pass(&msg),
            "NICK" => self.handle_nick(&msg),
            "USER" => self.handle_user(&msg)?,
            "PRIVMSG" => self.handle_privmsg(&msg),
            "PING" => self.handle_ping(&msg),
            "QUIT" => self.connection.close(),
            _ => tracing::info!(command = %msg.command, "unknown command"),
        }

        Ok(())
    }

    fn handle_pass(&mut self, msg: &ProtocolMessage)
    {
        if self.backend.is_some()
        {
            self.send(numeric::already_registered(self.server_name(), &self.pre_client.nick));
            return;
        }

        let Some(secret) = msg.arg(0) else {
            self.send(numeric::not_enough_parameters(self.server_name(), &self.pre_client.nick, "PASS"));
            return;
        };

        self.pre_client.set_secret(secret);
        self.set_state(SessionState::AwaitingUser);
    }

    fn handle_nick(&mut self, msg: &ProtocolMessage)
    {
        match msg.arg(0)
        {
            Some(nick) => self.pre_client.nick = nick.to_string(),
            None => self.send(numeric::not_enough_parameters(self.server_name(), &self.pre_client.nick, "NICK")),
        }
    }

    fn handle_user(&mut self, msg: &ProtocolMessage) -> Result<(), SessionError>
    {
        if self.backend.is_some()
        {
            self.send(numeric::already_registered(self.server_name(), &self.pre_client.nick));
            return Ok(());
        }

        let Some(identity) = msg.arg(0) else {
            self.send(numeric::not_enough_parameters(self.server_name(), &self.pre_client.nick, "USER"));
            return Ok(());
        };

        // Whatever has been accumulated so far is used; a missing PASS means an
        // empty secret, which the backend will refuse
        if !self.pre_client.has_secret()
        {
            tracing::debug!("USER received without PASS");
        }
        let credentials = Credentials::new(identity, self.pre_client.take_secret());
        let backend = self.connector.connect(credentials).map_err(SessionError::Backend)?;
        let backend = Arc::new(backend);

        self.backend = Some(Arc::clone(&backend));
        self.set_state(SessionState::Authenticating);
        tracing::info!("logging in");

        let login = LoginTask {
            backend,
            connection: self.connection.clone(),
            settings: Arc::clone(&self.settings),
            state: Arc::clone(&self.state),
            nick: self.pre_client.nick.clone(),
            teardown: self.teardown.subscribe(),
        };
        self.tasks.spawn(login.run().in_current_span());

        Ok(())
    }

    fn handle_privmsg(&mut self, msg: &ProtocolMessage)
    {
        let (Some(target), Some(text)) = (msg.arg(0), msg.arg(1)) else {
            self.send(numeric::not_enough_parameters(self.server_name(), &self.pre_client.nick, "PRIVMSG"));
            return;
        };

        let backend = match &self.backend
        {
            Some(backend) if self.state() == SessionState::Active => Arc::clone(backend),
            _ => {
                self.send(numeric::not_registered(self.server_name(), &self.pre_client.nick));
                return;
            }
        };

        let channel = target.strip_prefix('#').unwrap_or(target);
        let Some((room_id, _)) = backend.rooms()
                                        .into_iter()
                                        .find(|(_, room)| channel_name(&room.name) == channel) else {
            tracing::debug!(%target, "no room for channel");
            return;
        };

        let connection = self.connection.clone();
        let mut teardown = self.teardown.subscribe();
        let text = text.to_string();

        self.tasks.spawn(async move {
            tokio::select! {
                _ = wait_for_teardown(&mut teardown) => {}
                result = backend.send_message(room_id, &text) => {
                    if let Err(e) = result {
                        let e = SessionError::Send(e);
                        tracing::warn!(room = %room_id, error = %e, "failed to send message");
                        connection.send(&message::error(&e.to_string()));
                    }
                }
            }
        }.in_current_span());
    }

    fn handle_ping(&mut self, msg: &ProtocolMessage)
    {
        let cookie = msg.arg(0).unwrap_or_default();
        self.send(message::pong(self.server_name(), cookie));
    }
}
