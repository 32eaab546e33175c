//! Background update polling for an active session.

use crate::*;
use crate::backend::ChatBackend;
use crate::session::wait_for_teardown;

use std::{sync::Arc, time::Duration};

use chatwork_client::UpdateEvent;
use tokio::{sync::watch, time};

/// Poll `backend` every `interval`, relaying each update to the client as
/// channel messages, until `teardown` is raised or a poll fails.
///
/// A failed poll is reported to the client and closes the connection, since
/// the session has no other way to learn about new messages.
#[tracing::instrument(skip_all)]
pub(crate) async fn run<B: ChatBackend>(backend: Arc<B>,
                                        connection: Connection,
                                        interval: Duration,
                                        mut teardown: watch::Receiver<bool>)
{
    loop
    {
        if *teardown.borrow()
        {
            break;
        }

        tokio::select! {
            _ = wait_for_teardown(&mut teardown) => break,
            _ = time::sleep(interval) => {}
        }

        let result = tokio::select! {
            _ = wait_for_teardown(&mut teardown) => break,
            result = backend.poll_updates() => result,
        };

        match result
        {
            Ok(events) => {
                tracing::trace!(count = events.len(), "got updates");
                for event in &events
                {
                    for line in event_lines(event)
                    {
                        connection.send(&line);
                    }
                }
            }
            Err(e) => {
                let e = SessionError::Poll(e);
                tracing::warn!(error = %e, "polling failed");
                connection.error(&e.to_string());
                break;
            }
        }
    }

    tracing::debug!("poller stopped");
}

/// The channel messages relaying one update event: one per line of its text,
/// in order
pub(crate) fn event_lines(event: &UpdateEvent) -> impl Iterator<Item=ProtocolMessage> + '_
{
    let source = channel_name(&event.author);
    let target = channel_target(&event.room_name);

    event.text
         .split('\n')
         .map(move |line| message::privmsg(&source, &target, line.trim_end_matches('\r')))
}
