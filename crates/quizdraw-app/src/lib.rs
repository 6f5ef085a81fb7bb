//! QuizDraw Application
//!
//! Client shell around the core session: a terminal client on native
//! platforms and a script-facing handle in the browser.

mod app;
mod commands;
mod practice;

pub use app::{AppError, Flow, Output, RoomClient};
pub use commands::{Command, CommandHelp, ParseError, all_commands, help_text, parse_command};
pub use practice::PracticeClient;

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub mod cli;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebClient, run_wasm};
