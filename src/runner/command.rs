//! Scratch command representation.

use std::path::{Path, PathBuf};

/// A one-shot command to run in a scratch window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchCommand {
    /// The command line as the user typed it.
    pub command: String,
    /// Directory to change into first, if any.
    pub dir: Option<PathBuf>,
}

impl ScratchCommand {
    /// Create a command that runs in the host's working directory.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            dir: None,
        }
    }

    /// Run in `dir` instead.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Full command line handed to the system shell.
    pub fn command_line(&self) -> String {
        match &self.dir {
            Some(dir) => format!("{} && {}", change_dir(dir), self.command),
            None => self.command.clone(),
        }
    }

    /// Window title.
    pub fn title(&self) -> String {
        format!(" $ {} ", self.command)
    }
}

#[cfg(unix)]
fn change_dir(dir: &Path) -> String {
    let raw = dir.to_string_lossy();
    format!("cd '{}'", raw.replace('\'', r"'\''"))
}

#[cfg(windows)]
fn change_dir(dir: &Path) -> String {
    format!("cd /d \"{}\"", dir.to_string_lossy())
}
