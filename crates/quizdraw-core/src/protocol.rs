//! Wire protocol.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`; unit
//! events carry no `data` field.
//!
//! ```json
//! { "event": "joinRoom", "data": { "roomId": "a1b2c3", "user": { ... }, "gameMode": "draw" } }
//! { "event": "timeUpdate", "data": 42 }
//! { "event": "gameEnd" }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::model::{DrawingWord, GameMode, McqQuestion, Message, OutgoingMessage, Snapshot, User};

/// Events sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
        user: User,
        game_mode: GameMode,
    },
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        room_id: String,
        game_mode: GameMode,
        is_private: bool,
        user: User,
    },
    LeaveRoom,
    #[serde(rename_all = "camelCase")]
    StartGame { room_id: String },
    #[serde(rename_all = "camelCase")]
    Message {
        room_id: String,
        message: OutgoingMessage,
    },
    #[serde(rename_all = "camelCase")]
    SubmitAnswer {
        room_id: String,
        user_id: String,
        option_id: String,
    },
    #[serde(rename_all = "camelCase")]
    DrawingData {
        room_id: String,
        drawing_data: Snapshot,
    },
    #[serde(rename_all = "camelCase")]
    SubmitGuess {
        room_id: String,
        user_id: String,
        guess: String,
    },
    #[serde(rename_all = "camelCase")]
    SelectWord { room_id: String, word_id: String },
}

impl ClientEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom { .. } => "joinRoom",
            ClientEvent::CreateRoom { .. } => "createRoom",
            ClientEvent::LeaveRoom => "leaveRoom",
            ClientEvent::StartGame { .. } => "startGame",
            ClientEvent::Message { .. } => "message",
            ClientEvent::SubmitAnswer { .. } => "submitAnswer",
            ClientEvent::DrawingData { .. } => "drawingData",
            ClientEvent::SubmitGuess { .. } => "submitGuess",
            ClientEvent::SelectWord { .. } => "selectWord",
        }
    }
}

/// Payload of `gameStart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStart {
    pub current_round: u32,
    pub total_rounds: u32,
}

/// Payload of `scoreUpdate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
    pub user_id: String,
    pub score: i64,
}

/// Events pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    Users(Vec<User>),
    Message(Message),
    GameStart(GameStart),
    NewQuestion(McqQuestion),
    NewWord(DrawingWord),
    DrawingData(Snapshot),
    TimeUpdate(u32),
    ScoreUpdate(ScoreUpdate),
    GameEnd,
    RoundUpdate(u32),
}

impl ServerEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Users(_) => "users",
            ServerEvent::Message(_) => "message",
            ServerEvent::GameStart(_) => "gameStart",
            ServerEvent::NewQuestion(_) => "newQuestion",
            ServerEvent::NewWord(_) => "newWord",
            ServerEvent::DrawingData(_) => "drawingData",
            ServerEvent::TimeUpdate(_) => "timeUpdate",
            ServerEvent::ScoreUpdate(_) => "scoreUpdate",
            ServerEvent::GameEnd => "gameEnd",
            ServerEvent::RoundUpdate(_) => "roundUpdate",
        }
    }
}

/// First 100 characters of a frame, for logging.
pub fn preview(frame: &str) -> &str {
    match frame.char_indices().nth(100) {
        Some((end, _)) => &frame[..end],
        None => frame,
    }
}

/// Encode an outbound event as a text frame.
pub fn encode(event: &ClientEvent) -> Result<String, ProtocolError> {
    serde_json::to_string(event).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Decode an inbound text frame.
pub fn decode(frame: &str) -> Result<ServerEvent, ProtocolError> {
    serde_json::from_str(frame).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_room_serialize() {
        let user = User {
            id: "u1".into(),
            name: "Ann".into(),
            score: 0,
            avatar: None,
            is_drawing: None,
        };
        let event = ClientEvent::JoinRoom {
            room_id: "abc123".into(),
            user,
            game_mode: GameMode::Draw,
        };
        let json: serde_json::Value = serde_json::from_str(&encode(&event).unwrap()).unwrap();
        assert_eq!(json["event"], "joinRoom");
        assert_eq!(json["data"]["roomId"], "abc123");
        assert_eq!(json["data"]["gameMode"], "draw");
        assert_eq!(json["data"]["user"]["name"], "Ann");
    }

    #[test]
    fn test_leave_room_has_no_payload() {
        let json = encode(&ClientEvent::LeaveRoom).unwrap();
        assert_eq!(json, r#"{"event":"leaveRoom"}"#);
    }

    #[test]
    fn test_submit_answer_field_names() {
        let event = ClientEvent::SubmitAnswer {
            room_id: "r".into(),
            user_id: "u".into(),
            option_id: "o".into(),
        };
        let json: serde_json::Value = serde_json::from_str(&encode(&event).unwrap()).unwrap();
        assert_eq!(json["event"], event.name());
        assert_eq!(json["data"]["optionId"], "o");
        assert_eq!(json["data"]["userId"], "u");
    }

    #[test]
    fn test_decode_game_start() {
        let event = decode(r#"{"event":"gameStart","data":{"currentRound":1,"totalRounds":10}}"#).unwrap();
        assert_eq!(
            event,
            ServerEvent::GameStart(GameStart { current_round: 1, total_rounds: 10 })
        );
    }

    #[test]
    fn test_decode_scalar_payloads() {
        assert_eq!(decode(r#"{"event":"timeUpdate","data":42}"#).unwrap(), ServerEvent::TimeUpdate(42));
        assert_eq!(decode(r#"{"event":"roundUpdate","data":3}"#).unwrap(), ServerEvent::RoundUpdate(3));
        assert_eq!(decode(r#"{"event":"gameEnd"}"#).unwrap(), ServerEvent::GameEnd);
        assert_eq!(
            decode(r#"{"event":"drawingData","data":"data:image/png;base64,AA=="}"#).unwrap(),
            ServerEvent::DrawingData(Snapshot::from_data_url("data:image/png;base64,AA=="))
        );
    }

    #[test]
    fn test_decode_users_and_score() {
        let event = decode(
            r#"{"event":"users","data":[{"id":"a","name":"A","score":1},{"id":"b","name":"B","score":0,"isDrawing":true}]}"#,
        )
        .unwrap();
        match event {
            ServerEvent::Users(users) => {
                assert_eq!(users.len(), 2);
                assert!(users[1].is_drawer());
            }
            other => panic!("Wrong event: {:?}", other),
        }

        let event = decode(r#"{"event":"scoreUpdate","data":{"userId":"a","score":15}}"#).unwrap();
        assert_eq!(event.name(), "scoreUpdate");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let frame = "é".repeat(150);
        assert_eq!(preview(&frame).chars().count(), 100);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(matches!(decode("not json"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(
            decode(r#"{"event":"timeUpdate","data":"soon"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(decode(r#"{"event":"teleport","data":1}"#), Err(ProtocolError::Malformed(_))));
    }
}
