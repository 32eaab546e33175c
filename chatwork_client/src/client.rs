use crate::*;
use crate::protocol::*;

use std::collections::{BTreeMap, HashMap};

use chrono::{TimeZone, Utc};
use parking_lot::RwLock;
use serde::{Serialize, de::DeserializeOwned};

/// The public Chatwork endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.chatwork.com";

/// Protocol version parameters expected by the gateway
const GATEWAY_VERSION: &str = "_v=2.52&_av=4";

/// Chats older than this many seconds are not reported by [`ChatworkClient::get_update`]
pub const UPDATE_WINDOW_SECS: i64 = 60;

/// Number of unread chats requested per room when fetching updates
const ROOM_INFO_UNREAD_LIMIT: i64 = 20;

/// A logged-in (or about to be logged-in) Chatwork account
pub struct ChatworkClient
{
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    state: RwLock<ClientState>,
}

#[derive(Default)]
struct ClientState
{
    token: Option<String>,
    my_id: Option<String>,
    last_id: String,
    people: HashMap<u64, Person>,
    rooms: BTreeMap<RoomId, TrackedRoom>,
}

struct TrackedRoom
{
    room: Room,
    // Highest chat id already returned from get_update
    last_chat_id: Option<u64>,
}

impl ChatworkClient
{
    /// Create a client for the given account. No network traffic happens until
    /// [`login`](Self::login) is called.
    pub fn new(base_url: impl ToString, credentials: Credentials) -> Result<Self>
    {
        let http = reqwest::Client::builder()
                        .cookie_store(true)
                        .build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string().trim_end_matches('/').to_string(),
            credentials,
            state: RwLock::new(ClientState::default()),
        })
    }

    /// Our own account id, once logged in
    pub fn my_id(&self) -> Option<String>
    {
        self.state.read().my_id.clone()
    }

    /// Snapshot of the rooms known to this account, as of the last login or update
    pub fn rooms(&self) -> Vec<(RoomId, Room)>
    {
        self.state.read().rooms.iter().map(|(id, tracked)| (*id, tracked.room.clone())).collect()
    }

    async fn post<T>(&self, command: &str, param: &impl Serialize) -> Result<Option<T>>
        where T: DeserializeOwned
    {
        let pdata = serde_json::to_string(param)?;
        let mut form = vec![("pdata", pdata)];
        let token = self.state.read().token.clone();
        if let Some(token) = token
        {
            form.push(("_t", token));
        }

        let url = format!("{}/gateway.php?{}&cmd={}", self.base_url, GATEWAY_VERSION, command);
        let response = self.http.post(url)
                                .form(&form)
                                .send()
                                .await?
                                .error_for_status()?;
        let content = response.text().await?;

        // The login response carries the session token, so keep it out of the logs
        if command != "api_login"
        {
            tracing::trace!(command, %content, "gateway response");
        }

        let envelope: Envelope<T> = serde_json::from_str(&content)?;
        if !envelope.status.success
        {
            let message = envelope.status.message.unwrap_or_else(|| "response status is fail".to_string());
            return Err(Error::rejected(command, message));
        }

        Ok(envelope.result)
    }

    /// Log in, loading the room and contact tables
    #[tracing::instrument(skip(self))]
    pub async fn login(&self) -> Result<()>
    {
        let request = LoginRequest {
            email: &self.credentials.username,
            password: self.credentials.secret(),
            login_type: "mobile",
            with_profile: 1,
        };

        let result: LoginResult = self.post("api_login", &request)
                                      .await?
                                      .ok_or_else(|| Error::MissingResult("api_login".to_string()))?;

        let mut state = self.state.write();
        state.token = Some(result.token);
        state.my_id = Some(result.my_id);
        state.last_id = result.last_id;

        for (id, person) in result.contact_dat
        {
            match id.parse()
            {
                Ok(id) => { state.people.insert(id, person); }
                Err(_) => tracing::warn!(%id, "skipping contact with non-numeric id"),
            }
        }

        for (id, room) in result.room_dat
        {
            match id.parse()
            {
                Ok(id) => { state.rooms.insert(id, TrackedRoom { room, last_chat_id: None }); }
                Err(_) => tracing::warn!(%id, "skipping room with non-numeric id"),
            }
        }

        tracing::info!(rooms = state.rooms.len(), contacts = state.people.len(), "logged in");
        Ok(())
    }

    /// Fetch chats posted since the previous call.
    ///
    /// Only rooms the gateway reports as changed are queried. Chats older than
    /// the room's last update marker, older than [`UPDATE_WINDOW_SECS`], or
    /// already returned by an earlier call are dropped. Events are ordered by
    /// room id, then in the order the gateway lists them.
    #[tracing::instrument(skip(self))]
    pub async fn get_update(&self) -> Result<Vec<UpdateEvent>>
    {
        let last_id = self.state.read().last_id.clone();

        let result: UpdateResult = self.post("get_update", &UpdateRequest { last_id: &last_id })
                                       .await?
                                       .ok_or_else(|| Error::MissingResult("get_update".to_string()))?;

        let updated_rooms: Vec<(RoomId, Room)> = {
            let mut state = self.state.write();
            state.last_id = result.last_id;

            let mut ids: Vec<RoomId> = result.update_info.room
                                             .changed_room_ids()
                                             .filter_map(|id| id.parse().ok())
                                             .filter(|id| state.rooms.contains_key(id))
                                             .collect();
            ids.sort();
            ids.into_iter()
               .filter_map(|id| state.rooms.get(&id).map(|tracked| (id, tracked.room.clone())))
               .collect()
        };

        let mut updates = Vec::new();

        for (id, room) in updated_rooms
        {
            let request = RoomInfoRequest {
                i: BTreeMap::from([(id.to_string(), RoomCursor {
                    chat_count: room.chat_count,
                    unread_limit: ROOM_INFO_UNREAD_LIMIT,
                    last_update: room.last_update,
                    load: 0,
                })])
            };

            let info: RoomInfoResult = self.post("get_room_info", &request)
                                           .await?
                                           .ok_or_else(|| Error::MissingResult("get_room_info".to_string()))?;

            let Some(info) = info.room_dat.get(&id.to_string()) else {
                continue;
            };

            let now = Utc::now().timestamp();
            let mut state = self.state.write();
            let ClientState { people, rooms, .. } = &mut *state;
            let Some(tracked) = rooms.get_mut(&id) else {
                continue;
            };

            let mut latest = 0;
            for chat in &info.chat_list
            {
                if chat.tm < tracked.room.last_update || now - UPDATE_WINDOW_SECS > chat.tm
                {
                    continue;
                }
                if tracked.last_chat_id.is_some_and(|last| chat.id <= last)
                {
                    tracing::trace!(room = %id, chat = chat.id, "skipping already delivered chat");
                    continue;
                }

                let author = people.get(&chat.aid)
                                   .map(|p| p.name.clone())
                                   .unwrap_or_else(|| chat.aid.to_string());

                updates.push(UpdateEvent {
                    id: chat.id,
                    room_id: id,
                    room_name: tracked.room.name.clone(),
                    author,
                    text: chat.msg.clone(),
                    timestamp: Utc.timestamp_opt(chat.tm, 0).single().unwrap_or_else(Utc::now),
                });

                tracked.last_chat_id = Some(tracked.last_chat_id.map_or(chat.id, |last| last.max(chat.id)));
                latest = latest.max(chat.tm);
            }

            if latest > tracked.room.last_update
            {
                tracked.room.last_update = latest;
            }
        }

        Ok(updates)
    }

    /// Post a message to a room
    #[tracing::instrument(skip(self, text))]
    pub async fn send_chat(&self, room: RoomId, text: &str) -> Result<()>
    {
        let request = SendChatRequest {
            text,
            room_id: room.to_string(),
            last_chat_id: 0,
            read: 1,
            edit_id: 0,
        };

        self.post::<serde::de::IgnoredAny>("send_chat", &request).await?;
        Ok(())
    }
}
