//! Room entry forms: validation plus the create/join flow.

use crate::error::{SessionResult, ValidationError};
use crate::model::{GameMode, User};
use crate::routes::Route;
use crate::session::{PUBLIC_ROOM_ID, Session};
use crate::sync::Transport;

/// Longest accepted display name.
pub const MAX_NAME_LEN: usize = 20;
/// Longest accepted room code.
pub const MAX_ROOM_CODE_LEN: usize = 10;

/// Trim and check a display name.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong { max: MAX_NAME_LEN });
    }
    Ok(name.to_string())
}

/// Trim and check a private room code.
pub fn validate_room_code(code: &str) -> Result<String, ValidationError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ValidationError::MissingRoomCode);
    }
    if code.chars().count() > MAX_ROOM_CODE_LEN {
        return Err(ValidationError::RoomCodeTooLong { max: MAX_ROOM_CODE_LEN });
    }
    Ok(code.to_string())
}

/// "Create room" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoomForm {
    pub name: String,
    pub mode: GameMode,
    pub is_private: bool,
}

impl CreateRoomForm {
    /// New form; rooms are private unless switched off.
    pub fn new(mode: GameMode) -> Self {
        Self {
            name: String::new(),
            mode,
            is_private: true,
        }
    }

    /// Whether the submit button should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Validate, connect, create the identity and the room. Returns the
    /// route of the new room.
    pub fn submit<T: Transport>(&self, session: &mut Session<T>) -> SessionResult<Route> {
        let name = validate_name(&self.name)?;
        session.initialize()?;
        let user = User::new(name);
        let room_id = session.create_room(self.mode, self.is_private, user)?;
        Ok(Route::Room(self.mode, room_id))
    }
}

/// "Join room" form. Public joins have no room code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRoomForm {
    pub name: String,
    pub mode: GameMode,
    pub is_private: bool,
    pub room_code: String,
}

impl JoinRoomForm {
    pub fn public(mode: GameMode) -> Self {
        Self {
            name: String::new(),
            mode,
            is_private: false,
            room_code: String::new(),
        }
    }

    /// Private join, optionally pre-filled from an invite link.
    pub fn private(mode: GameMode, room_code: Option<String>) -> Self {
        Self {
            name: String::new(),
            mode,
            is_private: true,
            room_code: room_code.unwrap_or_default(),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty() && (!self.is_private || !self.room_code.trim().is_empty())
    }

    pub fn submit<T: Transport>(&self, session: &mut Session<T>) -> SessionResult<Route> {
        let name = validate_name(&self.name)?;
        let room_id = if self.is_private {
            validate_room_code(&self.room_code)?
        } else {
            PUBLIC_ROOM_ID.to_string()
        };
        session.initialize()?;
        session.join_room(&room_id, User::new(name), self.mode)?;
        Ok(Route::Room(self.mode, room_id))
    }
}
