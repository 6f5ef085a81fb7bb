//! Client routes.

use crate::model::GameMode;

/// A navigable page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    /// `/:mode/create`
    Create(GameMode),
    /// `/:mode/play`
    JoinPublic(GameMode),
    /// `/:mode/join/:room?`
    JoinPrivate(GameMode, Option<String>),
    /// `/room/:mode/:room`
    Room(GameMode, String),
    /// `/draw/practice`
    Practice,
    NotFound,
}

impl Route {
    /// Resolve a path. Pages that need a game mode fall back to `Home` when
    /// the mode is unknown.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["draw", "practice"] => Route::Practice,
            ["room", mode, room] => match GameMode::parse(mode) {
                Some(mode) => Route::Room(mode, room.to_string()),
                None => Route::Home,
            },
            [mode, "create"] => GameMode::parse(mode).map_or(Route::Home, Route::Create),
            [mode, "play"] => GameMode::parse(mode).map_or(Route::Home, Route::JoinPublic),
            [mode, "join"] => GameMode::parse(mode).map_or(Route::Home, |m| Route::JoinPrivate(m, None)),
            [mode, "join", room] => GameMode::parse(mode)
                .map_or(Route::Home, |m| Route::JoinPrivate(m, Some(room.to_string()))),
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Create(mode) => format!("/{}/create", mode),
            Route::JoinPublic(mode) => format!("/{}/play", mode),
            Route::JoinPrivate(mode, None) => format!("/{}/join", mode),
            Route::JoinPrivate(mode, Some(room)) => format!("/{}/join/{}", mode, room),
            Route::Room(mode, room) => format!("/room/{}/{}", mode, room),
            Route::Practice => "/draw/practice".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }
}
