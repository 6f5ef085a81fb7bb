//! Offline practice client.

use quizdraw_core::practice::PracticeSession;

use crate::app::{AppError, Flow, save_canvas, stroke};
use crate::commands::{Command, help_text};

/// Text front end for a [`PracticeSession`].
#[derive(Debug, Default)]
pub struct PracticeClient {
    practice: PracticeSession,
}

impl PracticeClient {
    pub fn new(practice: PracticeSession) -> Self {
        Self { practice }
    }

    pub fn practice(&self) -> &PracticeSession {
        &self.practice
    }

    /// Current prompt line.
    pub fn prompt(&self) -> String {
        let word = self.practice.current_word();
        if self.practice.is_word_visible() {
            format!("Draw: {} [{}]", word.word, word.category)
        } else {
            format!("Draw: (hidden) [{}]", word.category)
        }
    }

    pub fn handle_command(&mut self, command: Command) -> Result<(Flow, Option<String>), AppError> {
        let line = match command {
            Command::Stroke(from, to) => {
                stroke(self.practice.canvas_mut(), from, to)?;
                None
            }
            Command::Tool(tool) => {
                self.practice.canvas_mut().brush_mut().tool = tool;
                None
            }
            Command::Color(hex) => {
                self.practice.canvas_mut().brush_mut().set_color(&hex)?;
                None
            }
            Command::Size(size) => {
                self.practice.canvas_mut().brush_mut().set_size(size);
                None
            }
            Command::Clear => {
                self.practice.reset_canvas()?;
                None
            }
            Command::Next => {
                self.practice.next_word()?;
                Some(self.prompt())
            }
            Command::Reveal => {
                self.practice.toggle_word_visibility();
                Some(self.prompt())
            }
            Command::Save(path) => {
                save_canvas(self.practice.canvas(), &path)?;
                None
            }
            Command::Help => Some(help_text()),
            Command::Quit | Command::Leave => return Ok((Flow::Quit, None)),
            Command::Chat(_) => return Err(AppError::Unavailable("chat")),
            Command::Answer(_) => return Err(AppError::Unavailable("answer")),
            Command::Start => return Err(AppError::Unavailable("start")),
            Command::Word(_) => return Err(AppError::Unavailable("word")),
            Command::Scores => return Err(AppError::Unavailable("scores")),
        };
        Ok((Flow::Continue, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use quizdraw_core::tools::ToolKind;

    fn client() -> PracticeClient {
        PracticeClient::new(PracticeSession::new(64, 64))
    }

    #[test]
    fn test_prompt_and_reveal() {
        let mut client = client();
        assert_eq!(client.prompt(), "Draw: Mitochondria [Cell Biology]");
        let (_, line) = client.handle_command(Command::Reveal).unwrap();
        assert_eq!(line.as_deref(), Some("Draw: (hidden) [Cell Biology]"));
    }

    #[test]
    fn test_next_moves_on() {
        let mut client = client();
        let (flow, line) = client.handle_command(Command::Next).unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(line.as_deref(), Some("Draw: DNA Double Helix [Genetics]"));
    }

    #[test]
    fn test_stroke_then_clear() {
        let mut client = client();
        client.handle_command(Command::Tool(ToolKind::Line)).unwrap();
        client
            .handle_command(Command::Stroke(Point::new(4.0, 4.0), Point::new(60.0, 60.0)))
            .unwrap();
        assert!(!client.practice().canvas().raster().is_blank());
        client.handle_command(Command::Clear).unwrap();
        assert!(client.practice().canvas().raster().is_blank());
    }

    #[test]
    fn test_room_commands_rejected() {
        let mut client = client();
        assert!(matches!(
            client.handle_command(Command::Start),
            Err(AppError::Unavailable("start"))
        ));
        assert_eq!(client.handle_command(Command::Quit).unwrap().0, Flow::Quit);
    }
}
