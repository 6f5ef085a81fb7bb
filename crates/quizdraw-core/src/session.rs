//! Realtime session: the bridge between the transport and the store.
//!
//! A [`Session`] owns one transport and one [`SessionStore`]. Inbound server
//! events become store mutations; user intents become outbound events. There
//! is no process-wide instance, so independent sessions can coexist.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::{ConnectionError, ProtocolError, SessionResult, ValidationError};
use crate::model::{GameMode, OutgoingMessage, RoomRef, Snapshot, User};
use crate::protocol::{self, ClientEvent, ServerEvent};
use crate::store::SessionStore;
use crate::sync::{ConnectionState, Transport, TransportEvent};

/// Room id used by every public room.
pub const PUBLIC_ROOM_ID: &str = "public";

/// Length of generated private room codes.
pub const ROOM_CODE_LEN: usize = 6;

/// Generate a random private room code.
pub fn generate_room_code() -> String {
    Uuid::new_v4().to_string()[..ROOM_CODE_LEN].to_string()
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// One client connection to the game server plus its local projection.
pub struct Session<T: Transport> {
    config: SessionConfig,
    transport: T,
    store: SessionStore,
    initialized: bool,
    /// Frames emitted while the handshake is in flight, sent on `Connected`.
    outgoing: Vec<String>,
}

impl<T: Transport> Session<T> {
    /// Create an uninitialized session. Nothing touches the network until
    /// [`Session::initialize`].
    pub fn new(config: SessionConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            store: SessionStore::new(),
            initialized: false,
            outgoing: Vec::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Mutable access, for subscribing and local-only updates.
    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // --- Lifecycle ---

    /// Open the connection. Calling this again on an initialized session
    /// does nothing.
    pub fn initialize(&mut self) -> SessionResult<()> {
        if self.initialized {
            return Ok(());
        }
        log::info!("Connecting to {}", self.config.server_url);
        self.transport.connect(&self.config.server_url)?;
        self.initialized = true;
        Ok(())
    }

    /// Close the connection. A later `initialize` opens a new one.
    pub fn disconnect(&mut self) {
        if !self.initialized {
            return;
        }
        self.transport.disconnect();
        self.initialized = false;
        self.outgoing.clear();
        self.store.set_connected(false);
        log::info!("Disconnected from {}", self.config.server_url);
    }

    // --- Inbound ---

    /// Drain the transport and apply everything it delivered.
    ///
    /// Returns the server events that were applied, in arrival order.
    pub fn poll(&mut self) -> Vec<ServerEvent> {
        let events = self.transport.poll_events();
        events
            .into_iter()
            .filter_map(|event| self.handle_transport_event(event))
            .collect()
    }

    /// Apply one transport event.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Option<ServerEvent> {
        match event {
            TransportEvent::Connected => {
                log::info!("Connected to game server");
                self.store.set_connected(true);
                self.flush_outgoing();
                None
            }
            TransportEvent::Disconnected => {
                log::info!("Disconnected from game server");
                self.store.set_connected(false);
                None
            }
            TransportEvent::Error { message } => {
                log::error!("Transport error: {}", message);
                self.store.set_connected(false);
                None
            }
            TransportEvent::Text(frame) => self.handle_frame(&frame),
        }
    }

    /// Decode and apply one text frame. Frames that fail to decode or do not
    /// fit the current room are logged and dropped.
    pub fn handle_frame(&mut self, frame: &str) -> Option<ServerEvent> {
        let event = match protocol::decode(frame) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Dropping frame: {} ({})", e, crate::protocol::preview(frame));
                return None;
            }
        };
        match self.apply(event.clone()) {
            Ok(()) => Some(event),
            Err(e) => {
                log::warn!("Dropping {}: {}", event.name(), e);
                None
            }
        }
    }

    /// Apply a decoded server event to the store.
    pub fn apply(&mut self, event: ServerEvent) -> Result<(), ProtocolError> {
        log::debug!("Applying {}", event.name());
        match event {
            ServerEvent::Users(users) => self.store.set_users(users),
            ServerEvent::Message(message) => self.store.add_message(message),
            ServerEvent::GameStart(start) => {
                self.store.start_round(start.current_round, start.total_rounds)
            }
            ServerEvent::NewQuestion(question) => {
                self.check_mode("newQuestion", GameMode::Mcq)?;
                self.store.set_question(question);
            }
            ServerEvent::NewWord(word) => {
                self.check_mode("newWord", GameMode::Draw)?;
                self.store.set_word(word);
            }
            ServerEvent::DrawingData(snapshot) => self.store.set_drawing_data(snapshot),
            ServerEvent::TimeUpdate(seconds) => self.store.set_time_left(seconds),
            ServerEvent::ScoreUpdate(update) => self.store.update_score(&update.user_id, update.score),
            ServerEvent::GameEnd => self.store.set_game_started(false),
            ServerEvent::RoundUpdate(round) => self.store.set_current_round(round),
        }
        Ok(())
    }

    /// Round content must match the mode of the room we are in, if any.
    fn check_mode(&self, event: &'static str, expected: GameMode) -> Result<(), ProtocolError> {
        match &self.store.state().room {
            Some(room) if room.mode != expected => Err(ProtocolError::ModeMismatch {
                event,
                mode: room.mode.as_str(),
            }),
            _ => Ok(()),
        }
    }

    // --- Outbound ---

    fn emit(&mut self, event: &ClientEvent) -> SessionResult<()> {
        if !self.initialized {
            return Err(ConnectionError::NotInitialized.into());
        }
        let frame = protocol::encode(event)?;
        if self.transport.state() == ConnectionState::Connecting {
            log::debug!("Queueing {} until connected", event.name());
            self.outgoing.push(frame);
            return Ok(());
        }
        log::debug!("Emitting {}", event.name());
        self.transport.send(&frame)?;
        Ok(())
    }

    /// Number of frames waiting for the connection to open.
    pub fn pending_frames(&self) -> usize {
        self.outgoing.len()
    }

    fn flush_outgoing(&mut self) {
        for frame in std::mem::take(&mut self.outgoing) {
            if let Err(e) = self.transport.send(&frame) {
                log::warn!("Failed to send queued frame: {}", e);
            }
        }
    }

    fn room_id(&self) -> SessionResult<String> {
        self.store
            .state()
            .room
            .as_ref()
            .map(|r| r.id.clone())
            .ok_or_else(|| ValidationError::NotInRoom.into())
    }

    fn user(&self) -> SessionResult<User> {
        self.store
            .state()
            .user
            .clone()
            .ok_or_else(|| ValidationError::MissingIdentity.into())
    }

    /// Create a room and enter it right away.
    ///
    /// The room id is chosen locally before the server confirms anything:
    /// a random code for private rooms, `public` otherwise.
    pub fn create_room(&mut self, mode: GameMode, is_private: bool, user: User) -> SessionResult<String> {
        let room_id = if is_private {
            generate_room_code()
        } else {
            PUBLIC_ROOM_ID.to_string()
        };
        self.emit(&ClientEvent::CreateRoom {
            room_id: room_id.clone(),
            game_mode: mode,
            is_private,
            user: user.clone(),
        })?;
        log::info!("Created {} room {}", mode, room_id);
        self.store.set_user(user);
        self.store.set_room(Some(RoomRef {
            id: room_id.clone(),
            mode,
            is_private,
        }));
        Ok(room_id)
    }

    /// Join an existing room.
    pub fn join_room(&mut self, room_id: &str, user: User, mode: GameMode) -> SessionResult<()> {
        self.emit(&ClientEvent::JoinRoom {
            room_id: room_id.to_string(),
            user: user.clone(),
            game_mode: mode,
        })?;
        log::info!("Joining {} room {}", mode, room_id);
        self.store.set_user(user);
        self.store.set_room(Some(RoomRef {
            id: room_id.to_string(),
            mode,
            is_private: room_id != PUBLIC_ROOM_ID,
        }));
        Ok(())
    }

    /// Leave the current room. Local state is reset whether or not the
    /// `leaveRoom` frame could be sent; a send failure is still returned.
    pub fn leave_room(&mut self) -> SessionResult<()> {
        let sent = self.emit(&ClientEvent::LeaveRoom);
        self.store.set_room(None);
        self.store.reset_game();
        if let Err(e) = &sent {
            log::warn!("Left room locally, server not told: {}", e);
        }
        sent
    }

    pub fn start_game(&mut self) -> SessionResult<()> {
        let room_id = self.room_id()?;
        self.emit(&ClientEvent::StartGame { room_id })
    }

    /// Send a chat message stamped with the current time.
    pub fn send_message(&mut self, text: &str) -> SessionResult<()> {
        let user = self.user()?;
        let room_id = self.room_id()?;
        self.emit(&ClientEvent::Message {
            room_id,
            message: OutgoingMessage {
                user_id: user.id,
                user_name: user.name,
                text: text.to_string(),
                timestamp: now_millis(),
            },
        })
    }

    /// Answer the current question. Only the first answer counts; later
    /// calls do nothing.
    pub fn submit_answer(&mut self, option_id: &str) -> SessionResult<()> {
        if let Some(selected) = self.store.selected_option() {
            log::debug!("Answer already submitted ({}), ignoring {}", selected, option_id);
            return Ok(());
        }
        let room_id = self.room_id()?;
        let user = self.user()?;
        self.emit(&ClientEvent::SubmitAnswer {
            room_id,
            user_id: user.id,
            option_id: option_id.to_string(),
        })?;
        self.store.select_option(option_id);
        Ok(())
    }

    /// Broadcast the drawer's canvas.
    pub fn submit_drawing(&mut self, snapshot: &Snapshot) -> SessionResult<()> {
        let room_id = self.room_id()?;
        self.emit(&ClientEvent::DrawingData {
            room_id,
            drawing_data: snapshot.clone(),
        })
    }

    pub fn submit_guess(&mut self, guess: &str) -> SessionResult<()> {
        let room_id = self.room_id()?;
        let user = self.user()?;
        self.emit(&ClientEvent::SubmitGuess {
            room_id,
            user_id: user.id,
            guess: guess.to_string(),
        })
    }

    pub fn select_word(&mut self, word_id: &str) -> SessionResult<()> {
        let room_id = self.room_id()?;
        self.emit(&ClientEvent::SelectWord {
            room_id,
            word_id: word_id.to_string(),
        })
    }

    /// Chat box entry point: guesses in drawing rooms, messages elsewhere.
    /// Blank input is ignored.
    pub fn send_chat(&mut self, input: &str) -> SessionResult<()> {
        let text = input.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.user()?;
        match self.store.state().room.as_ref().map(|r| r.mode) {
            Some(GameMode::Draw) => self.submit_guess(text),
            _ => self.send_message(text),
        }
    }
}
