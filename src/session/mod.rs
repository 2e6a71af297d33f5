//! Terminal session management.
//!
//! [`SessionRegistry`] holds the bookkeeping (dense ids, current pointer);
//! [`TerminalManager`] applies session operations against the host's
//! windowing surface and process facility.

mod id;
mod manager;
mod registry;

pub use id::{ParseSessionIdError, SessionId};
pub use manager::{ManagerOptions, TerminalManager};
pub use registry::{Direction, Session, SessionRegistry};
