//! The host editor's collaborators, bundled.

use crate::process::ProcessFacility;
use crate::window::Surface;

/// Windowing surface and process facility of one editor host.
///
/// Owned by the dispatcher and lent to the session manager and command
/// runner for each operation.
pub struct Host<S, P> {
    pub surface: S,
    pub processes: P,
}

impl<S: Surface, P: ProcessFacility> Host<S, P> {
    pub fn new(surface: S, processes: P) -> Self {
        Self { surface, processes }
    }
}
