//! WebAssembly entry point and platform-specific code.

use kurbo::Point;
use quizdraw_core::config::SessionConfig;
use quizdraw_core::input::PointerEvent;
use quizdraw_core::lobby::{CreateRoomForm, JoinRoomForm};
use quizdraw_core::routes::Route;
use quizdraw_core::sync::WasmWebSocket;
use quizdraw_core::Session;
use wasm_bindgen::prelude::*;

use crate::app::{Flow, RoomClient};
use crate::commands::parse_command;

/// Current page path, `/` when unavailable.
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// Script-facing handle to a room client.
#[wasm_bindgen]
pub struct WebClient {
    client: Option<RoomClient<WasmWebSocket>>,
    route: Route,
}

#[wasm_bindgen]
impl WebClient {
    /// Resolve the page route; nothing connects until `enter` is called.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebClient {
        let route = Route::parse(&current_path());
        log::info!("Route: {}", route.path());
        WebClient { client: None, route }
    }

    /// Path of the current route (after any redirect).
    pub fn route(&self) -> String {
        self.route.path()
    }

    /// Submit the entry form for the current route as `name`.
    ///
    /// `room_code` only matters on private join pages. Returns the room path.
    pub fn enter(&mut self, name: &str, room_code: Option<String>) -> Result<String, JsValue> {
        let config = SessionConfig::from_window().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let mut session = Session::new(config, WasmWebSocket::new());
        let result = match &self.route {
            Route::Create(mode) => CreateRoomForm {
                name: name.to_string(),
                mode: *mode,
                is_private: true,
            }
            .submit(&mut session),
            Route::JoinPublic(mode) => {
                let mut form = JoinRoomForm::public(*mode);
                form.name = name.to_string();
                form.submit(&mut session)
            }
            Route::JoinPrivate(mode, code) => {
                let mut form = JoinRoomForm::private(*mode, room_code.or_else(|| code.clone()));
                form.name = name.to_string();
                form.submit(&mut session)
            }
            Route::Room(mode, code) => {
                let mut form = JoinRoomForm::private(*mode, Some(code.clone()));
                form.name = name.to_string();
                form.submit(&mut session)
            }
            other => return Err(JsValue::from_str(&format!("Nothing to join at {}", other.path()))),
        };
        let route = result.map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.route = route;
        self.client = Some(RoomClient::new(session));
        Ok(self.route.path())
    }

    /// Poll the connection; returns rendered lines joined by newlines.
    pub fn tick(&mut self) -> String {
        match self.client.as_mut() {
            Some(client) => {
                client.tick();
                client.drain_output().join("\n")
            }
            None => String::new(),
        }
    }

    /// Run one input line. Returns false once the client has left the room.
    pub fn input(&mut self, line: &str) -> Result<bool, JsValue> {
        let Some(client) = self.client.as_mut() else {
            return Err(JsValue::from_str("Not in a room"));
        };
        let Some(command) = parse_command(line).map_err(|e| JsValue::from_str(&e.to_string()))? else {
            return Ok(true);
        };
        match client.handle_command(command) {
            Ok(Flow::Continue) => Ok(true),
            Ok(Flow::Quit) => {
                self.client = None;
                self.route = Route::Home;
                Ok(false)
            }
            Err(e) => Err(JsValue::from_str(&e.to_string())),
        }
    }

    /// Forward a canvas pointer event (`down`, `move`, `up` or `leave`) in
    /// client coordinates; `origin_x`/`origin_y` is the canvas' bounding-rect corner.
    pub fn pointer(&mut self, kind: &str, x: f64, y: f64, origin_x: f64, origin_y: f64) -> Result<(), JsValue> {
        let Some(client) = self.client.as_mut() else {
            return Err(JsValue::from_str("Not in a room"));
        };
        let position = Point::new(x, y);
        let event = match kind {
            "down" => PointerEvent::Down { position },
            "move" => PointerEvent::Move { position },
            "up" => PointerEvent::Up { position },
            "leave" => PointerEvent::Leave,
            other => return Err(JsValue::from_str(&format!("Unknown pointer event: {}", other))),
        };
        client
            .pointer(event, Point::new(origin_x, origin_y))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for WebClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize logging for the WASM build.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&JsValue::from_str("Logger already initialized"));
    }

    log::info!("Starting QuizDraw (WASM)");
}
