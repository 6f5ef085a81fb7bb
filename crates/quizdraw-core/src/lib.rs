//! QuizDraw Core Library
//!
//! Client-side session layer for QuizDraw rooms: the observable state store,
//! the JSON event protocol, the WebSocket transport and the drawing canvas.

pub mod canvas;
pub mod config;
pub mod error;
pub mod input;
pub mod lobby;
pub mod model;
pub mod practice;
pub mod protocol;
pub mod routes;
pub mod session;
pub mod store;
pub mod sync;
pub mod timer;
pub mod tools;

pub use canvas::{CanvasError, DrawingCanvas, Raster};
pub use config::SessionConfig;
pub use error::{ConnectionError, ProtocolError, SessionError, SessionResult, ValidationError};
pub use input::PointerEvent;
pub use lobby::{CreateRoomForm, JoinRoomForm};
pub use model::{DrawingWord, GameMode, McqQuestion, Message, RoomRef, RoundContent, Snapshot, User};
pub use practice::PracticeSession;
pub use protocol::{ClientEvent, ServerEvent};
pub use routes::Route;
pub use session::Session;
pub use store::{GameState, SessionStore, Slice, SubscriptionId};
pub use sync::{ConnectionState, MemoryTransport, PlatformWebSocket, Transport, TransportEvent};
pub use tools::{BrushSettings, ToolKind};
