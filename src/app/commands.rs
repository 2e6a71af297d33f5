//! User command parsing for the console host.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::session::SessionId;
use crate::window::EditorSize;

/// A command typed at the console prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Toggle,
    New,
    Next,
    Previous,
    /// Show a session. `None` is a number no session can have.
    GoTo(Option<SessionId>),
    List,
    Kill(KillTarget),
    KillAll,
    /// Run a scratch command. A missing command is prompted for.
    Run(Option<String>),
    /// Run a scratch command in a directory. Missing parts are prompted for.
    RunInDir {
        dir: Option<PathBuf>,
        command: Option<String>,
    },
    /// Send a line of input to the current session's shell.
    Send(String),
    Status,
    /// Simulate a host editor resize.
    Resize(EditorSize),
    /// Print the open floating windows.
    Show,
    Help,
    Quit,
}

/// Which session `kill` applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillTarget {
    Current,
    /// A numbered session. `None` is a number no session can have.
    Session(Option<SessionId>),
}

/// Errors from parsing a user command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("unknown command `{0}` (type `help`)")]
    Unknown(String),

    #[error("`{0}` needs an argument: {1}")]
    MissingArgument(&'static str, &'static str),

    #[error("invalid argument for `{0}`: {1}")]
    InvalidArgument(&'static str, String),
}

impl UserCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseCommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let rest = (!rest.is_empty()).then_some(rest);

        let command = match word {
            "toggle" | "t" => Self::Toggle,
            "new" => Self::New,
            "next" | "n" => Self::Next,
            "prev" | "previous" | "p" => Self::Previous,
            "goto" | "go" => {
                let arg = rest.ok_or(ParseCommandError::MissingArgument("goto", "N"))?;
                Self::GoTo(session_number("goto", arg)?)
            }
            "list" | "ls" => Self::List,
            "kill" => Self::Kill(match rest {
                Some(arg) => KillTarget::Session(session_number("kill", arg)?),
                None => KillTarget::Current,
            }),
            "kill-current" => Self::Kill(KillTarget::Current),
            "kill-all" => Self::KillAll,
            "run" => Self::Run(rest.map(str::to_string)),
            "run-in-dir" => match rest {
                None => Self::RunInDir {
                    dir: None,
                    command: None,
                },
                Some(rest) => {
                    let (dir, command) = match rest.split_once(char::is_whitespace) {
                        Some((dir, command)) => (dir, Some(command.trim().to_string())),
                        None => (rest, None),
                    };
                    Self::RunInDir {
                        dir: Some(PathBuf::from(dir)),
                        command,
                    }
                }
            },
            "send" => {
                let text = rest.ok_or(ParseCommandError::MissingArgument("send", "TEXT"))?;
                Self::Send(text.to_string())
            }
            "status" => Self::Status,
            "resize" => {
                let arg = rest.ok_or(ParseCommandError::MissingArgument("resize", "ROWS COLS"))?;
                Self::Resize(editor_size(arg)?)
            }
            "show" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

impl FromStr for UserCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)?.ok_or(ParseCommandError::Unknown(String::new()))
    }
}

/// Parse a session number. Numbers outside the id range (0, or too large)
/// parse to `None` so they can be ignored like any other unknown session.
fn session_number(
    command: &'static str,
    arg: &str,
) -> Result<Option<SessionId>, ParseCommandError> {
    let digits = arg.trim_start_matches('#');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseCommandError::InvalidArgument(command, arg.to_string()));
    }
    Ok(digits.parse::<u32>().ok().and_then(SessionId::new))
}

fn editor_size(arg: &str) -> Result<EditorSize, ParseCommandError> {
    let invalid = || ParseCommandError::InvalidArgument("resize", arg.to_string());
    let mut parts = arg.split_whitespace();
    let (Some(rows), Some(cols), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let rows: u16 = rows.parse().map_err(|_| invalid())?;
    let cols: u16 = cols.parse().map_err(|_| invalid())?;
    if rows == 0 || cols == 0 {
        return Err(invalid());
    }
    Ok(EditorSize::new(rows, cols))
}

/// Console help text.
pub const HELP: &str = "\
Sessions:
  toggle            Hide the visible terminal, or show the current one
  new               Start a new terminal session
  next, prev        Cycle through sessions
  goto N            Show session N
  list              List sessions (* marks the current one)
  kill [N]          Kill session N, or the current session
  kill-all          Kill every session
  send TEXT         Send a line of input to the current session
Commands:
  run [CMD]         Run CMD in a scratch window
  run-in-dir [DIR [CMD]]
                    Run CMD inside DIR
Host:
  status            Show the current/total indicator
  resize ROWS COLS  Resize the editor
  show              Print the open windows
  help              Show this help
  quit              Kill everything and exit";
