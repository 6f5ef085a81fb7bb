//! Data model shared by the store, the wire protocol and the views.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Game mode of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Timed multiple-choice quiz.
    Mcq,
    /// One player draws, the others guess.
    Draw,
}

impl GameMode {
    /// Wire / URL name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Mcq => "mcq",
            GameMode::Draw => "draw",
        }
    }

    /// Parse a mode from its wire / URL name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mcq" => Some(GameMode::Mcq),
            "draw" => Some(GameMode::Draw),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            GameMode::Mcq => "MCQ Quiz",
            GameMode::Draw => "Drawing Game",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A player identity.
///
/// Created client-side at room entry. The `id` never changes for the lifetime
/// of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_drawing: Option<bool>,
}

impl User {
    /// Create a fresh identity with a random id and a zero score.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            score: 0,
            avatar: None,
            is_drawing: None,
        }
    }

    /// Whether this user is flagged as the active drawer.
    pub fn is_drawer(&self) -> bool {
        self.is_drawing.unwrap_or(false)
    }

    /// Up to two uppercase initials, used when no avatar is set.
    pub fn initials(&self) -> String {
        self.name
            .split(' ')
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

/// The room the client currently sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRef {
    pub id: String,
    pub mode: GameMode,
    pub is_private: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<McqOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub category: String,
    pub difficulty: Difficulty,
}

impl McqQuestion {
    /// Letter label for the option at `index` (`A`, `B`, ...).
    pub fn option_label(index: usize) -> char {
        (b'A' + (index % 26) as u8) as char
    }

    pub fn option(&self, id: &str) -> Option<&McqOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn correct_option(&self) -> Option<&McqOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingWord {
    pub id: String,
    pub word: String,
    pub category: String,
    pub difficulty: Difficulty,
}

/// A chat message or guess as pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct_guess: Option<bool>,
}

impl Message {
    pub fn is_correct_guess(&self) -> bool {
        self.is_correct_guess.unwrap_or(false)
    }
}

/// A chat message as sent by the client; the server assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub timestamp: i64,
}

/// What the current round is about. Question and word never coexist.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RoundContent {
    #[default]
    None,
    Question {
        question: McqQuestion,
        /// Option picked by the local user, if any.
        selected: Option<String>,
    },
    Word(DrawingWord),
}

/// An encoded raster image of a whole canvas (a PNG data URL).
///
/// Snapshots replace the receiving canvas entirely; they are never diffed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn from_data_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_initials() {
        assert_eq!(User::new("ada lovelace").initials(), "AL");
        assert_eq!(User::new("Grace Brewster Hopper").initials(), "GB");
        assert_eq!(User::new("solo").initials(), "S");
    }

    #[test]
    fn test_new_users_get_distinct_ids() {
        let a = User::new("a");
        let b = User::new("a");
        assert_ne!(a.id, b.id);
        assert_eq!(a.score, 0);
    }

    #[test]
    fn test_user_wire_format() {
        let json = r#"{"id":"u1","name":"Ann","score":3,"isDrawing":true}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_drawer());
        assert_eq!(user.avatar, None);

        let out = serde_json::to_string(&user).unwrap();
        assert!(out.contains("\"isDrawing\":true"));
        assert!(!out.contains("avatar"));
    }

    #[test]
    fn test_question_helpers() {
        let json = r#"{
            "id": "q1",
            "question": "Powerhouse of the cell?",
            "options": [
                {"id": "a", "text": "Nucleus", "isCorrect": false},
                {"id": "b", "text": "Mitochondria", "isCorrect": true}
            ],
            "category": "Cell Biology",
            "difficulty": "easy"
        }"#;
        let q: McqQuestion = serde_json::from_str(json).unwrap();
        assert_eq!(q.correct_option().map(|o| o.id.as_str()), Some("b"));
        assert_eq!(q.option("a").map(|o| o.text.as_str()), Some("Nucleus"));
        assert_eq!(McqQuestion::option_label(0), 'A');
        assert_eq!(McqQuestion::option_label(3), 'D');
    }

    #[test]
    fn test_game_mode_names() {
        assert_eq!(GameMode::parse("mcq"), Some(GameMode::Mcq));
        assert_eq!(GameMode::parse("draw"), Some(GameMode::Draw));
        assert_eq!(GameMode::parse("chess"), None);
        assert_eq!(serde_json::to_string(&GameMode::Draw).unwrap(), "\"draw\"");
    }
}
