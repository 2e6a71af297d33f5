//! Scratch command runner.
//!
//! Runs a single command, streams its output into a transient floating
//! window and disposes of the window shortly after the command exits.
//!
//! # Example
//!
//! ```
//! use floatterm::runner::ScratchCommand;
//!
//! let cmd = ScratchCommand::new("cargo build").in_dir("/project");
//! assert!(cmd.command_line().ends_with("&& cargo build"));
//! ```

mod command;
mod scratch;

pub use command::ScratchCommand;
pub use scratch::{CommandRunner, DEFAULT_CLOSE_DELAY};
