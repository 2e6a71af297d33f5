//! # floatterm
//!
//! Floating terminal sessions and a scratch command runner for editor hosts.
//!
//! The host editor is modelled by two collaborators: a windowing
//! [`Surface`](window::Surface) that owns buffers and floating windows, and a
//! [`ProcessFacility`](process::ProcessFacility) that starts and controls
//! jobs. On top of them this crate provides:
//!
//! - **Terminal sessions**: dense, renumbered session ids, a current
//!   session pointer and at most one visible session window at a time
//! - **Scratch runner**: one-shot commands whose output streams into a
//!   transient window that closes itself shortly after the command exits
//! - **Event dispatch**: process output and exits arrive as [`JobEvent`]s
//!   on a channel and are applied on a single task
//!
//! ## Quick Start
//!
//! ```no_run
//! use floatterm::{
//!     event_channel, CommandRunner, Dispatcher, HeadlessSurface, Host, NativeProcesses,
//!     TerminalManager,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     floatterm::logging::try_init().ok();
//!
//!     let (tx, mut rx) = event_channel();
//!     let host = Host::new(HeadlessSurface::new(), NativeProcesses::new(tx.clone()));
//!     let mut dispatcher = Dispatcher::new(
//!         host,
//!         TerminalManager::default(),
//!         CommandRunner::default(),
//!         tx,
//!     );
//!
//!     dispatcher.handle_input("toggle");
//!     dispatcher.handle_input("send echo hello");
//!
//!     while let Some(event) = rx.recv().await {
//!         dispatcher.handle_event(event);
//!     }
//! }
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod output;
pub mod process;
pub mod runner;
pub mod session;
pub mod window;

// Re-export commonly used types
pub use app::{Dispatcher, Reply, UserCommand};
pub use config::Config;
pub use error::{FloatTermError, Result};
pub use host::Host;
pub use output::{OutputSanitizer, TerminalScreen};
pub use process::{
    event_channel, JobEvent, JobEventKind, JobId, NativeProcesses, ProcessFacility,
    RecordingProcesses,
};
pub use runner::{CommandRunner, ScratchCommand};
pub use session::{ManagerOptions, SessionId, SessionRegistry, TerminalManager};
pub use window::{FloatGeometry, FloatStyle, HeadlessSurface, Surface};
