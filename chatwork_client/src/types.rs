use std::{
    collections::HashMap,
    fmt,
    num::ParseIntError,
    str::FromStr,
};

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Identifies a room (group chat or direct chat) on the backend
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        self.0.fmt(f)
    }
}

impl FromStr for RoomId
{
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        Ok(Self(s.parse()?))
    }
}

/// A room, as described by the gateway's `room_dat` tables
#[derive(Clone,Debug,Default,PartialEq,Deserialize)]
pub struct Room
{
    /// Display name. Direct chats have an empty name.
    #[serde(rename = "n", default)]
    pub name: String,
    #[serde(rename = "t", default)]
    pub kind: i64,
    /// Timestamp of the newest chat seen in this room
    #[serde(rename = "lt", default)]
    pub last_update: i64,
    #[serde(rename = "r", default)]
    pub read_count: i64,
    #[serde(rename = "c", default)]
    pub chat_count: i64,
    #[serde(rename = "m", default)]
    pub members: HashMap<String, i64>,
}

impl Room
{
    pub fn new(name: impl ToString) -> Self
    {
        Self { name: name.to_string(), ..Default::default() }
    }
}

/// A contact, from the gateway's `contact_dat` table
#[derive(Clone,Debug,Default,PartialEq,Deserialize)]
pub struct Person
{
    #[serde(rename = "aid", default)]
    pub account_id: u64,
    #[serde(rename = "cwid", default)]
    pub chatwork_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "onm", default)]
    pub organization: String,
}

/// A chat message observed while polling for updates
#[derive(Clone,Debug,PartialEq)]
pub struct UpdateEvent
{
    pub id: u64,
    pub room_id: RoomId,
    pub room_name: String,
    pub author: String,
    /// Message body; may span several lines
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Login details for a Chatwork account.
///
/// The secret is deliberately left out of the `Debug` output.
#[derive(Clone)]
pub struct Credentials
{
    pub username: String,
    secret: String,
}

impl Credentials
{
    pub fn new(username: impl ToString, secret: impl ToString) -> Self
    {
        Self { username: username.to_string(), secret: secret.to_string() }
    }

    pub fn secret(&self) -> &str
    {
        &self.secret
    }
}

impl fmt::Debug for Credentials
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Credentials")
         .field("username", &self.username)
         .field("secret", &"<redacted>")
         .finish()
    }
}
