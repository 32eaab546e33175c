//! Request and response bodies for the gateway commands we use.
//!
//! The gateway is undocumented, so every response field is optional and
//! anything whose shape is known to vary is modelled with an explicit
//! fallback variant.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::{Person, Room};

/// Common wrapper around every gateway response
#[derive(Debug,Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub(crate) struct Envelope<T>
{
    pub status: Status,
    #[serde(default)]
    pub result: Option<T>,
}

#[derive(Debug,Deserialize)]
pub(crate) struct Status
{
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug,Serialize)]
pub(crate) struct LoginRequest<'a>
{
    pub email: &'a str,
    pub password: &'a str,
    #[serde(rename = "type")]
    pub login_type: &'a str,
    pub with_profile: u32,
}

#[derive(Debug,Default,Deserialize)]
#[serde(default)]
pub(crate) struct LoginResult
{
    pub token: String,
    #[serde(rename = "myid")]
    pub my_id: String,
    pub room_dat: HashMap<String, Room>,
    pub contact_dat: HashMap<String, Person>,
    pub last_id: String,
}

#[derive(Debug,Serialize)]
pub(crate) struct UpdateRequest<'a>
{
    pub last_id: &'a str,
}

#[derive(Debug,Default,Deserialize)]
#[serde(default)]
pub(crate) struct UpdateResult
{
    pub last_id: String,
    pub update_info: UpdateInfo,
}

#[derive(Debug,Default,Deserialize)]
#[serde(default)]
pub(crate) struct UpdateInfo
{
    pub num: i64,
    pub room: RoomUpdates,
}

/// The `room` member of `update_info`.
///
/// When rooms have changed this is an object keyed by room id; otherwise the
/// gateway sends an empty array, `null`, or leaves it out. Any other shape is
/// accepted and ignored.
#[derive(Debug,Default,Deserialize)]
#[serde(untagged)]
pub(crate) enum RoomUpdates
{
    Changed(HashMap<String, serde_json::Value>),
    Unknown(serde::de::IgnoredAny),
    #[default]
    #[serde(skip)]
    Absent,
}

impl RoomUpdates
{
    pub fn changed_room_ids(&self) -> impl Iterator<Item=&str>
    {
        let rooms = match self {
            Self::Changed(rooms) => Some(rooms),
            Self::Unknown(_) | Self::Absent => None,
        };
        rooms.into_iter().flat_map(|r| r.keys().map(String::as_str))
    }
}

/// Per-room cursor sent with `get_room_info`
#[derive(Debug,Serialize)]
pub(crate) struct RoomCursor
{
    #[serde(rename = "c")]
    pub chat_count: i64,
    #[serde(rename = "u")]
    pub unread_limit: i64,
    #[serde(rename = "t")]
    pub last_update: i64,
    #[serde(rename = "l")]
    pub load: i64,
}

#[derive(Debug,Serialize)]
pub(crate) struct RoomInfoRequest
{
    pub i: BTreeMap<String, RoomCursor>,
}

#[derive(Debug,Default,Deserialize)]
#[serde(default)]
pub(crate) struct RoomInfoResult
{
    pub room_dat: HashMap<String, RoomInfo>,
}

#[derive(Debug,Default,Deserialize)]
#[serde(default)]
pub(crate) struct RoomInfo
{
    pub chat_list: Vec<RawChat>,
}

#[derive(Debug,Default,Deserialize)]
#[serde(default)]
pub(crate) struct RawChat
{
    pub id: u64,
    pub aid: u64,
    pub msg: String,
    pub tm: i64,
    pub utm: i64,
}

#[derive(Debug,Serialize)]
pub(crate) struct SendChatRequest<'a>
{
    pub text: &'a str,
    pub room_id: String,
    pub last_chat_id: u64,
    pub read: u32,
    pub edit_id: u64,
}
