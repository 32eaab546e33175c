//! Client for the Chatwork web gateway.
//!
//! This crate speaks the JSON-over-form protocol used by Chatwork's own web and
//! mobile front ends (`gateway.php`). It is stateful: a [`ChatworkClient`] is
//! bound to one set of [`Credentials`], holds the session token and the room
//! and contact tables obtained at login, and advances an update watermark each
//! time [`ChatworkClient::get_update`] is called.

mod error;
pub use error::*;

mod types;
pub use types::*;

mod protocol;

mod client;
pub use client::*;
