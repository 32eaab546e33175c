//! A single-user IRC gateway in front of a Chatwork account.
//!
//! Each client connection gets its own [`Session`]. The client's `PASS` and
//! `USER` commands carry the backend credentials; once the backend login
//! succeeds, each room is presented as a channel and new messages are relayed
//! as `PRIVMSG`s. Messages the client sends to a channel are posted to the
//! matching room.

mod errors;
pub use errors::*;

mod client_message;
pub use client_message::*;

mod channel_name;
pub use channel_name::*;

pub mod messages;
use messages::{message, numeric};

mod connection;
mod connection_task;
pub use connection::Connection;

pub mod backend;

pub mod session;
pub use session::{Session, SessionSettings, SessionState};

mod poller;

mod listener;
pub use listener::Listener;

pub mod config;
pub mod tracing_config;
