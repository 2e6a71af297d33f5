//! Windowing surface abstraction.
//!
//! The host editor owns buffers and floating windows. This module describes
//! the slice of that API floatterm needs, plus an in-memory implementation
//! used by the console host and by tests.

mod geometry;
mod headless;

pub use geometry::{BorderStyle, EditorSize, FloatGeometry, FloatStyle, Relative};
pub use headless::HeadlessSurface;

use std::fmt;

use crate::Result;

/// Opaque reference to a host buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u64);

impl BufferId {
    /// Create a BufferId from a raw host value.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf-{}", self.0)
    }
}

/// Opaque reference to a host floating window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    /// Create a WindowId from a raw host value.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "win-{}", self.0)
    }
}

/// What a buffer is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Backing buffer of an interactive terminal session.
    Terminal,
    /// Transient output buffer of a scratch command run.
    Scratch,
}

/// Windowing surface provided by the host editor.
///
/// Handles may be invalidated by the host at any time (the user can close a
/// window or wipe a buffer directly), so callers check validity instead of
/// assuming a handle they stored is still live.
pub trait Surface {
    /// Current editor dimensions.
    fn editor_size(&self) -> EditorSize;

    /// Create an empty buffer.
    fn create_buffer(&mut self, kind: BufferKind) -> Result<BufferId>;

    /// Check whether a buffer still exists.
    fn buffer_exists(&self, buffer: BufferId) -> bool;

    /// Replace the full contents of a buffer.
    fn set_lines(&mut self, buffer: BufferId, lines: &[String]) -> Result<()>;

    /// Append lines to the end of a buffer.
    fn append_lines(&mut self, buffer: BufferId, lines: &[String]) -> Result<()>;

    /// Delete a buffer, closing any window that shows it.
    fn delete_buffer(&mut self, buffer: BufferId) -> Result<()>;

    /// Open a floating window over `buffer`.
    fn open_window(&mut self, buffer: BufferId, geometry: &FloatGeometry) -> Result<WindowId>;

    /// Check whether a window is still open.
    fn window_exists(&self, window: WindowId) -> bool;

    /// Close a floating window. The buffer it showed is kept.
    fn close_window(&mut self, window: WindowId) -> Result<()>;
}
