//! Command-line interface and the native run loop.

use std::io::BufRead;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use quizdraw_core::config::SessionConfig;
use quizdraw_core::lobby::{CreateRoomForm, JoinRoomForm};
use quizdraw_core::model::GameMode;
use quizdraw_core::practice::PracticeSession;
use quizdraw_core::routes::Route;
use quizdraw_core::sync::NativeWebSocket;
use quizdraw_core::{Session, SessionError};

use crate::app::{AppError, Flow, RoomClient};
use crate::commands::parse_command;
use crate::practice::PracticeClient;

const TICK: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(name = "quizdraw", about = "Terminal client for QuizDraw rooms", author, version)]
pub struct Cli {
    /// Game server (`host:port`, `ws://host:port` or a full `/ws` URL).
    #[arg(long, env = "QUIZDRAW_SERVER_URL", global = true)]
    pub server: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Mcq,
    Draw,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Mcq => GameMode::Mcq,
            ModeArg::Draw => GameMode::Draw,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a room and join it.
    Create {
        /// Display name.
        #[arg(long, short)]
        name: String,
        #[arg(long, value_enum, default_value_t = ModeArg::Mcq)]
        mode: ModeArg,
        /// Create a public room instead of a private one.
        #[arg(long)]
        public: bool,
    },
    /// Join a private room by code, or the public room when no code is given.
    Join {
        #[arg(long, short)]
        name: String,
        #[arg(long, value_enum, default_value_t = ModeArg::Mcq)]
        mode: ModeArg,
        room: Option<String>,
    },
    /// Open a room or join page by its path, e.g. `/draw/join/ab12cd`.
    Open {
        #[arg(long, short)]
        name: String,
        path: String,
    },
    /// Practise drawing offline.
    Practice,
}

impl Cli {
    fn session_config(&self) -> Result<SessionConfig, SessionError> {
        let config = match self.server.as_deref() {
            Some(server) => SessionConfig::with_server(server)?,
            None => SessionConfig::from_env()?,
        };
        Ok(config)
    }
}

/// Read stdin on a background thread so the session keeps ticking.
fn spawn_stdin() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

fn enter_room(cli: &Cli, session: &mut Session<NativeWebSocket>) -> Result<Option<Route>, AppError> {
    let route = match &cli.command {
        Commands::Create { name, mode, public } => {
            let form = CreateRoomForm {
                name: name.clone(),
                mode: (*mode).into(),
                is_private: !public,
            };
            form.submit(session)?
        }
        Commands::Join { name, mode, room } => {
            let mut form = match room {
                Some(code) => JoinRoomForm::private((*mode).into(), Some(code.clone())),
                None => JoinRoomForm::public((*mode).into()),
            };
            form.name = name.clone();
            form.submit(session)?
        }
        Commands::Open { name, path } => {
            let mut form = match Route::parse(path) {
                Route::JoinPublic(mode) => JoinRoomForm::public(mode),
                Route::JoinPrivate(mode, code) => JoinRoomForm::private(mode, code),
                Route::Room(mode, code) => JoinRoomForm::private(mode, Some(code)),
                Route::Create(mode) => {
                    let form = CreateRoomForm {
                        name: name.clone(),
                        mode,
                        is_private: true,
                    };
                    return Ok(Some(form.submit(session)?));
                }
                other => {
                    println!("Nothing to join at {}", other.path());
                    return Ok(None);
                }
            };
            form.name = name.clone();
            form.submit(session)?
        }
        Commands::Practice => return Ok(None),
    };
    Ok(Some(route))
}

fn run_room(cli: &Cli) -> Result<(), AppError> {
    let mut session = Session::new(cli.session_config()?, NativeWebSocket::new());
    let Some(route) = enter_room(cli, &mut session)? else {
        return Ok(());
    };
    println!("Joined {} (type /help for commands)", route.path());

    let mut client = RoomClient::new(session);
    let input = spawn_stdin();
    loop {
        client.tick();
        for line in client.drain_output() {
            println!("{}", line);
        }
        loop {
            match input.try_recv() {
                Ok(line) => match parse_command(&line) {
                    Ok(Some(command)) => match client.handle_command(command) {
                        Ok(Flow::Quit) => {
                            // Flush the leave frame before the socket is dropped.
                            thread::sleep(TICK);
                            return Ok(());
                        }
                        Ok(Flow::Continue) => {}
                        Err(e) => eprintln!("{}", e),
                    },
                    Ok(None) => {}
                    Err(e) => eprintln!("{}", e),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }
        for line in client.drain_output() {
            println!("{}", line);
        }
        thread::sleep(TICK);
    }
}

fn run_practice() -> Result<(), AppError> {
    let mut client = PracticeClient::new(PracticeSession::default());
    println!("{}", client.prompt());
    for line in std::io::stdin().lock().lines() {
        let line = line.map_err(|e| AppError::Io {
            path: "stdin".to_string(),
            message: e.to_string(),
        })?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        match client.handle_command(command) {
            Ok((Flow::Quit, _)) => break,
            Ok((Flow::Continue, Some(line))) => println!("{}", line),
            Ok((Flow::Continue, None)) => {}
            Err(e) => eprintln!("{}", e),
        }
    }
    Ok(())
}

/// Run the client until the user quits.
pub fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Practice => run_practice(),
        _ => run_room(&cli),
    }
}
