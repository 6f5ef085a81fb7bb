//! Slash commands understood by the terminal client.

use kurbo::Point;
use quizdraw_core::tools::ToolKind;
use thiserror::Error;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Plain text: a chat message, or a guess in drawing rooms.
    Chat(String),
    /// Answer by option letter (`B`) or option id.
    Answer(String),
    Start,
    Leave,
    Word(String),
    /// Stroke from one point to another with the current tool.
    Stroke(Point, Point),
    Tool(ToolKind),
    Color(String),
    Size(u32),
    Clear,
    Save(String),
    Scores,
    /// Practice only: skip to the next word.
    Next,
    /// Practice only: show or hide the word.
    Reveal,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command: /{0} (try /help)")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Help entry for one command.
#[derive(Debug, Clone)]
pub struct CommandHelp {
    pub usage: &'static str,
    pub description: &'static str,
}

impl CommandHelp {
    pub const fn new(usage: &'static str, description: &'static str) -> Self {
        Self { usage, description }
    }
}

/// All commands, for `/help`.
pub fn all_commands() -> Vec<CommandHelp> {
    vec![
        CommandHelp::new("<text>", "Chat, or guess the word in drawing rooms"),
        CommandHelp::new("/answer <A-D|id>", "Answer the current question"),
        CommandHelp::new("/start", "Start the game"),
        CommandHelp::new("/leave", "Leave the room"),
        CommandHelp::new("/word <id>", "Pick the word to draw"),
        CommandHelp::new("/stroke x1 y1 x2 y2", "Draw with the current tool"),
        CommandHelp::new("/tool <brush|eraser|rectangle|circle|line>", "Switch tool"),
        CommandHelp::new("/color <#rrggbb>", "Set the brush colour"),
        CommandHelp::new("/size <n>", "Set the brush size"),
        CommandHelp::new("/clear", "Clear the canvas"),
        CommandHelp::new("/save <file.png>", "Save the canvas as PNG"),
        CommandHelp::new("/scores", "Show the leaderboard"),
        CommandHelp::new("/next", "Next practice word"),
        CommandHelp::new("/reveal", "Show or hide the practice word"),
        CommandHelp::new("/help", "Show this list"),
        CommandHelp::new("/quit", "Exit"),
    ]
}

/// Format the help table.
pub fn help_text() -> String {
    all_commands()
        .iter()
        .map(|c| format!("  {:44} {}", c.usage, c.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_tool(name: &str) -> Option<ToolKind> {
    ToolKind::ALL
        .into_iter()
        .find(|tool| tool.label().eq_ignore_ascii_case(name))
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Chat(line.to_string())));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    let command = match (name.as_str(), args.as_slice()) {
        ("answer" | "a", [choice]) => Command::Answer(choice.to_string()),
        ("answer" | "a", _) => return Err(ParseError::Usage("/answer <A-D|id>")),
        ("start", []) => Command::Start,
        ("leave", []) => Command::Leave,
        ("word", [id]) => Command::Word(id.to_string()),
        ("word", _) => return Err(ParseError::Usage("/word <id>")),
        ("stroke", [x1, y1, x2, y2]) => {
            let coords: Result<Vec<f64>, _> = [x1, y1, x2, y2].iter().map(|s| s.parse::<f64>()).collect();
            match coords.as_deref() {
                Ok([x1, y1, x2, y2]) => Command::Stroke(Point::new(*x1, *y1), Point::new(*x2, *y2)),
                _ => return Err(ParseError::Usage("/stroke x1 y1 x2 y2")),
            }
        }
        ("stroke", _) => return Err(ParseError::Usage("/stroke x1 y1 x2 y2")),
        ("tool", [tool]) => match parse_tool(tool) {
            Some(tool) => Command::Tool(tool),
            None => return Err(ParseError::Usage("/tool <brush|eraser|rectangle|circle|line>")),
        },
        ("tool", _) => return Err(ParseError::Usage("/tool <brush|eraser|rectangle|circle|line>")),
        ("color" | "colour", [hex]) => Command::Color(hex.to_string()),
        ("color" | "colour", _) => return Err(ParseError::Usage("/color <#rrggbb>")),
        ("size", [n]) => match n.parse() {
            Ok(n) => Command::Size(n),
            Err(_) => return Err(ParseError::Usage("/size <n>")),
        },
        ("size", _) => return Err(ParseError::Usage("/size <n>")),
        ("clear", []) => Command::Clear,
        ("save", [path]) => Command::Save(path.to_string()),
        ("save", _) => return Err(ParseError::Usage("/save <file.png>")),
        ("scores", []) => Command::Scores,
        ("next", []) => Command::Next,
        ("reveal", []) => Command::Reveal,
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit" | "q", _) => Command::Quit,
        (other, _) => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(parse_command("  hello there "), Ok(Some(Command::Chat("hello there".to_string()))));
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_command("/answer b"), Ok(Some(Command::Answer("b".to_string()))));
        assert_eq!(parse_command("/a opt-3"), Ok(Some(Command::Answer("opt-3".to_string()))));
        assert!(parse_command("/answer").is_err());
    }

    #[test]
    fn test_parse_stroke() {
        assert_eq!(
            parse_command("/stroke 1 2 30.5 40"),
            Ok(Some(Command::Stroke(Point::new(1.0, 2.0), Point::new(30.5, 40.0))))
        );
        assert_eq!(parse_command("/stroke 1 2 x 4"), Err(ParseError::Usage("/stroke x1 y1 x2 y2")));
    }

    #[test]
    fn test_parse_tool() {
        assert_eq!(parse_command("/tool Circle"), Ok(Some(Command::Tool(ToolKind::Circle))));
        assert!(parse_command("/tool spray").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(parse_command("/dance"), Err(ParseError::Unknown("dance".to_string())));
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help_text();
        assert_eq!(help.lines().count(), all_commands().len());
        assert!(help.contains("/stroke"));
    }
}
