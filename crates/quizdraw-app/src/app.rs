//! Room client: drives a [`Session`] from text commands and renders store
//! changes as text lines.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Point;
use quizdraw_core::canvas::{CanvasError, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DrawingCanvas};
use quizdraw_core::input::PointerEvent;
use quizdraw_core::model::{GameMode, McqQuestion, RoundContent, Snapshot};
use quizdraw_core::protocol::ServerEvent;
use quizdraw_core::store::Slice;
use quizdraw_core::sync::Transport;
use quizdraw_core::timer::{TimerBand, format_time_left};
use quizdraw_core::{Session, SessionError};
use thiserror::Error;

use crate::commands::{Command, help_text};

/// Errors surfaced to the user at the prompt.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("Failed to write {path}: {message}")]
    Io { path: String, message: String },
    #[error("No question to answer")]
    NoQuestion,
    #[error("No option {0} in the current question")]
    UnknownOption(String),
    #[error("Only the drawer can draw")]
    NotDrawer,
    #[error("/{0} is not available here")]
    Unavailable(&'static str),
}

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Lines produced by subscriptions, waiting to be printed.
pub type Output = Rc<RefCell<Vec<String>>>;

/// Write a canvas to disk as PNG.
pub(crate) fn save_canvas(canvas: &DrawingCanvas, path: &str) -> Result<(), AppError> {
    let png = canvas.raster().encode_png()?;
    std::fs::write(path, png).map_err(|e| AppError::Io {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Run a stroke through the canvas as pointer input. Returns the snapshot
/// produced when the stroke ends.
pub(crate) fn stroke(
    canvas: &mut DrawingCanvas,
    from: Point,
    to: Point,
) -> Result<Option<Snapshot>, AppError> {
    if !canvas.is_drawer() {
        return Err(AppError::NotDrawer);
    }
    canvas.handle_pointer_event(PointerEvent::Down { position: from })?;
    canvas.handle_pointer_event(PointerEvent::Move { position: to })?;
    Ok(canvas.handle_pointer_event(PointerEvent::Up { position: to })?)
}

fn describe_question(question: &McqQuestion) -> Vec<String> {
    let mut lines = vec![format!("Q: {} [{}]", question.question, question.category)];
    for (i, option) in question.options.iter().enumerate() {
        lines.push(format!("  {}) {}", McqQuestion::option_label(i), option.text));
    }
    lines
}

/// Text client for one room.
pub struct RoomClient<T: Transport> {
    session: Session<T>,
    canvas: DrawingCanvas,
    output: Output,
}

impl<T: Transport> RoomClient<T> {
    pub fn new(mut session: Session<T>) -> Self {
        let output: Output = Rc::new(RefCell::new(Vec::new()));
        Self::subscribe(&mut session, &output);
        let canvas = DrawingCanvas::new(
            DEFAULT_CANVAS_WIDTH,
            DEFAULT_CANVAS_HEIGHT,
            session.store().is_drawer(),
        );
        Self { session, canvas, output }
    }

    fn subscribe(session: &mut Session<T>, output: &Output) {
        let store = session.store_mut();

        let out = output.clone();
        store.subscribe(Slice::Connection, move |state| {
            let line = if state.is_connected { "Connected" } else { "Disconnected" };
            out.borrow_mut().push(line.to_string());
        });

        let out = output.clone();
        store.subscribe(Slice::Roster, move |state| {
            let names: Vec<String> = state
                .users
                .iter()
                .map(|u| if u.is_drawer() { format!("{} (drawing)", u.name) } else { u.name.clone() })
                .collect();
            out.borrow_mut().push(format!("Players: {}", names.join(", ")));
        });

        let out = output.clone();
        store.subscribe(Slice::Chat, move |state| {
            if let Some(message) = state.messages.last() {
                let line = if message.is_correct_guess == Some(true) {
                    format!("* {} guessed the word!", message.user_name)
                } else {
                    format!("[{}] {}", message.user_name, message.text)
                };
                out.borrow_mut().push(line);
            }
        });

        let out = output.clone();
        store.subscribe(Slice::Round, move |state| {
            let line = if !state.is_game_started {
                if state.current_round == 0 {
                    return;
                }
                "Game over".to_string()
            } else if state.total_rounds > 0 {
                format!("Round {}/{}", state.current_round, state.total_rounds)
            } else {
                format!("Round {}", state.current_round)
            };
            out.borrow_mut().push(line);
        });

        let out = output.clone();
        store.subscribe(Slice::Content, move |state| {
            let lines = match &state.content {
                RoundContent::Question { question, selected: None } => describe_question(question),
                RoundContent::Word(word) if state.is_drawer() => {
                    vec![format!("Draw: {} [{}]", word.word, word.category)]
                }
                RoundContent::Word(word) => {
                    let blanks: String = word
                        .word
                        .chars()
                        .map(|c| if c == ' ' { "  " } else { "_ " })
                        .collect();
                    vec![format!("Guess: {}[{}]", blanks, word.category)]
                }
                _ => Vec::new(),
            };
            out.borrow_mut().extend(lines);
        });

        let out = output.clone();
        let mut last_band = None;
        store.subscribe(Slice::Timer, move |state| {
            let band = TimerBand::for_seconds(state.time_left);
            if last_band != Some(band) || state.time_left == 0 {
                out.borrow_mut().push(format!("Time left {}", format_time_left(state.time_left)));
            }
            last_band = Some(band);
        });
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn canvas(&self) -> &DrawingCanvas {
        &self.canvas
    }

    /// Take the lines rendered since the last call.
    pub fn drain_output(&self) -> Vec<String> {
        std::mem::take(&mut *self.output.borrow_mut())
    }

    /// Pull server events and keep the local canvas in step.
    pub fn tick(&mut self) {
        for event in self.session.poll() {
            match event {
                ServerEvent::Users(_) | ServerEvent::NewWord(_) | ServerEvent::GameStart(_) => {
                    self.canvas.set_drawer(self.session.store().is_drawer());
                }
                ServerEvent::DrawingData(snapshot) => {
                    if let Err(e) = self.canvas.apply_remote(&snapshot) {
                        log::warn!("Dropping drawing update: {}", e);
                    }
                }
                _ => {}
            }
        }
    }

    fn resolve_option(&self, choice: &str) -> Result<String, AppError> {
        let question = self.session.store().current_question().ok_or(AppError::NoQuestion)?;
        if question.option(choice).is_some() {
            return Ok(choice.to_string());
        }
        let mut chars = choice.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            let letter = letter.to_ascii_uppercase();
            if let Some(option) = question
                .options
                .iter()
                .enumerate()
                .find(|(i, _)| McqQuestion::option_label(*i) == letter)
                .map(|(_, o)| o)
            {
                return Ok(option.id.clone());
            }
        }
        Err(AppError::UnknownOption(choice.to_string()))
    }

    /// Leave the room. The local state is reset even when the server cannot
    /// be told.
    fn leave(&mut self) {
        if let Err(e) = self.session.leave_room() {
            log::warn!("Leave not delivered: {}", e);
        }
    }

    /// Feed a pointer event in client coordinates, given the canvas' top-left
    /// corner. A finished stroke is broadcast.
    pub fn pointer(&mut self, event: PointerEvent, origin: Point) -> Result<(), AppError> {
        let snapshot = self.canvas.handle_pointer_event(event.to_canvas(origin))?;
        self.publish(snapshot)
    }

    fn publish(&mut self, snapshot: Option<Snapshot>) -> Result<(), AppError> {
        if let Some(snapshot) = snapshot {
            self.session.submit_drawing(&snapshot)?;
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: Command) -> Result<Flow, AppError> {
        match command {
            Command::Chat(text) => self.session.send_chat(&text)?,
            Command::Answer(choice) => {
                let option_id = self.resolve_option(&choice)?;
                self.session.submit_answer(&option_id)?;
            }
            Command::Start => self.session.start_game()?,
            Command::Leave => {
                self.leave();
                return Ok(Flow::Quit);
            }
            Command::Word(id) => self.session.select_word(&id)?,
            Command::Stroke(from, to) => {
                let snapshot = stroke(&mut self.canvas, from, to)?;
                self.publish(snapshot)?;
            }
            Command::Tool(tool) => self.canvas.brush_mut().tool = tool,
            Command::Color(hex) => self.canvas.brush_mut().set_color(&hex)?,
            Command::Size(size) => self.canvas.brush_mut().set_size(size),
            Command::Clear => {
                if !self.canvas.is_drawer() {
                    return Err(AppError::NotDrawer);
                }
                let snapshot = self.canvas.clear()?;
                self.publish(Some(snapshot))?;
            }
            Command::Save(path) => save_canvas(&self.canvas, &path)?,
            Command::Scores => {
                let board = self.session.store().leaderboard();
                let mut out = self.output.borrow_mut();
                for (rank, (user, score)) in board.iter().enumerate() {
                    out.push(format!("{}. {} {}", rank + 1, user.name, score));
                }
            }
            Command::Next => return Err(AppError::Unavailable("next")),
            Command::Reveal => return Err(AppError::Unavailable("reveal")),
            Command::Help => self.output.borrow_mut().push(help_text()),
            Command::Quit => {
                if self.session.store().state().room.is_some() {
                    self.leave();
                }
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Room mode, if joined.
    pub fn mode(&self) -> Option<GameMode> {
        self.session.store().state().room.as_ref().map(|r| r.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizdraw_core::config::SessionConfig;
    use quizdraw_core::lobby::CreateRoomForm;
    use quizdraw_core::sync::{MemoryTransport, TransportEvent};
    use serde_json::{Value, json};

    fn client(mode: GameMode) -> (RoomClient<MemoryTransport>, MemoryTransport) {
        let transport = MemoryTransport::new();
        let handle = transport.clone();
        let mut session = Session::new(SessionConfig::default(), transport);
        let mut form = CreateRoomForm::new(mode);
        form.name = "Ann".to_string();
        form.submit(&mut session).unwrap();
        let mut client = RoomClient::new(session);
        client.tick();
        handle.take_sent();
        (client, handle)
    }

    fn sent(handle: &MemoryTransport) -> Vec<Value> {
        handle
            .take_sent()
            .iter()
            .map(|frame| serde_json::from_str(frame).unwrap())
            .collect()
    }

    fn my_id(client: &RoomClient<MemoryTransport>) -> String {
        client.session().store().state().user.as_ref().unwrap().id.clone()
    }

    #[test]
    fn test_connection_is_rendered() {
        let (client, _) = client(GameMode::Mcq);
        assert!(client.drain_output().contains(&"Connected".to_string()));
    }

    #[test]
    fn test_answer_by_letter() {
        let (mut client, handle) = client(GameMode::Mcq);
        handle.push_frame(
            json!({"event": "newQuestion", "data": {
                "id": "q1", "question": "Powerhouse of the cell?", "category": "Biology", "difficulty": "easy",
                "options": [
                    {"id": "o1", "text": "Nucleus", "isCorrect": false},
                    {"id": "o2", "text": "Mitochondria", "isCorrect": true}
                ]
            }})
            .to_string(),
        );
        client.tick();
        let output = client.drain_output();
        assert!(output.contains(&"  B) Mitochondria".to_string()));

        client.handle_command(Command::Answer("b".to_string())).unwrap();
        let events = sent(&handle);
        assert_eq!(events[0]["event"], "submitAnswer");
        assert_eq!(events[0]["data"]["optionId"], "o2");

        assert!(matches!(
            client.handle_command(Command::Answer("z".to_string())),
            Err(AppError::UnknownOption(_))
        ));
    }

    #[test]
    fn test_answer_without_question() {
        let (mut client, _) = client(GameMode::Mcq);
        assert!(matches!(
            client.handle_command(Command::Answer("A".to_string())),
            Err(AppError::NoQuestion)
        ));
    }

    #[test]
    fn test_drawer_stroke_publishes_snapshot() {
        let (mut client, handle) = client(GameMode::Draw);
        let id = my_id(&client);
        handle.push_frame(
            json!({"event": "users", "data": [{"id": id, "name": "Ann", "score": 0, "isDrawing": true}]})
                .to_string(),
        );
        client.tick();
        assert!(client.canvas().is_drawer());

        client
            .handle_command(Command::Stroke(Point::new(10.0, 10.0), Point::new(100.0, 10.0)))
            .unwrap();
        let events = sent(&handle);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event"], "drawingData");
        assert!(events[0]["data"]["drawingData"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
        assert!(!client.canvas().raster().is_blank());
    }

    #[test]
    fn test_guesser_cannot_draw_but_sees_remote() {
        let (mut client, handle) = client(GameMode::Draw);
        assert!(matches!(
            client.handle_command(Command::Stroke(Point::ZERO, Point::new(5.0, 5.0))),
            Err(AppError::NotDrawer)
        ));

        let mut source = DrawingCanvas::new(
            DEFAULT_CANVAS_WIDTH,
            DEFAULT_CANVAS_HEIGHT,
            true,
        );
        let snapshot = stroke(&mut source, Point::new(0.0, 0.0), Point::new(50.0, 50.0))
            .unwrap()
            .unwrap();
        handle.push_frame(json!({"event": "drawingData", "data": snapshot.as_str()}).to_string());
        client.tick();
        assert_eq!(client.canvas().raster(), source.raster());
    }

    #[test]
    fn test_chat_in_draw_room_is_a_guess() {
        let (mut client, handle) = client(GameMode::Draw);
        client.handle_command(Command::Chat("neuron".to_string())).unwrap();
        assert_eq!(sent(&handle)[0]["event"], "submitGuess");
    }

    #[test]
    fn test_scores_render_leaderboard() {
        let (mut client, handle) = client(GameMode::Mcq);
        handle.push_frame(
            json!({"event": "users", "data": [
                {"id": "u1", "name": "Ann", "score": 0},
                {"id": "u2", "name": "Bob", "score": 0}
            ]})
            .to_string(),
        );
        handle.push_frame(json!({"event": "scoreUpdate", "data": {"userId": "u2", "score": 30}}).to_string());
        client.tick();
        client.drain_output();

        client.handle_command(Command::Scores).unwrap();
        assert_eq!(client.drain_output(), vec!["1. Bob 30".to_string(), "2. Ann 0".to_string()]);
    }

    #[test]
    fn test_leave_quits() {
        let (mut client, handle) = client(GameMode::Mcq);
        assert_eq!(client.handle_command(Command::Leave).unwrap(), Flow::Quit);
        assert_eq!(sent(&handle)[0]["event"], "leaveRoom");
        assert_eq!(client.mode(), None);
    }

    #[test]
    fn test_quit_after_server_drop() {
        let (mut client, handle) = client(GameMode::Mcq);
        handle.push_event(TransportEvent::Disconnected);
        client.tick();

        assert_eq!(client.handle_command(Command::Quit).unwrap(), Flow::Quit);
        assert_eq!(client.mode(), None);
        assert!(handle.sent().is_empty());
    }

    #[test]
    fn test_leave_after_server_drop() {
        let (mut client, handle) = client(GameMode::Draw);
        handle.push_event(TransportEvent::Disconnected);
        client.tick();
        assert_eq!(client.handle_command(Command::Leave).unwrap(), Flow::Quit);
        assert_eq!(client.mode(), None);
    }

    #[test]
    fn test_pointer_events_use_canvas_origin() {
        let (mut client, handle) = client(GameMode::Draw);
        let id = my_id(&client);
        handle.push_frame(
            json!({"event": "users", "data": [{"id": id, "name": "Ann", "score": 0, "isDrawing": true}]})
                .to_string(),
        );
        client.tick();

        let origin = Point::new(100.0, 50.0);
        client
            .pointer(PointerEvent::Down { position: Point::new(110.0, 60.0) }, origin)
            .unwrap();
        client
            .pointer(PointerEvent::Move { position: Point::new(140.0, 60.0) }, origin)
            .unwrap();
        assert!(sent(&handle).is_empty());
        client.pointer(PointerEvent::Leave, origin).unwrap();

        let events = sent(&handle);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event"], "drawingData");
        // Stroke lands at canvas-local (10..40, 10), not at client coordinates.
        let raster = client.canvas().raster();
        assert_ne!(raster.pixel(25, 10).map(|p| p.0[3]), Some(0));
        assert_eq!(raster.pixel(125, 60).map(|p| p.0[3]), Some(0));
    }

    #[test]
    fn test_practice_commands_unavailable() {
        let (mut client, _) = client(GameMode::Draw);
        assert!(matches!(client.handle_command(Command::Next), Err(AppError::Unavailable("next"))));
    }
}
