//! Builders for the lines this server sends to clients.
//!
//! Plain protocol messages are in [`message`], numeric replies in [`numeric`].
//! Both produce [`ProtocolMessage`](crate::ProtocolMessage)s, which the
//! connection formats when sending.

pub mod message;
pub mod numeric;
