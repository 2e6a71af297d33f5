//! Console host: user commands and the event dispatcher.

mod commands;
mod dispatcher;

pub use commands::{KillTarget, ParseCommandError, UserCommand, HELP};
pub use dispatcher::{Dispatcher, Reply};
