//! Session operations applied against the host.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::{Direction, SessionId, SessionRegistry};
use crate::host::Host;
use crate::output::TerminalScreen;
use crate::process::{JobId, ProcessFacility, ShellSpec};
use crate::window::{BufferKind, FloatGeometry, FloatStyle, Surface};
use crate::Result;

/// Options for a [`TerminalManager`].
#[derive(Debug, Clone, Default)]
pub struct ManagerOptions {
    /// Window styling.
    pub style: FloatStyle,
    /// Shell program; `None` uses the facility default.
    pub shell: Option<String>,
    /// Working directory for new shells.
    pub cwd: Option<PathBuf>,
    /// Show a `Terminal current/total` title on the window.
    pub titles: bool,
}

/// Terminal sessions and their floating windows.
///
/// At most one session window is open after every operation.
#[derive(Debug, Default)]
pub struct TerminalManager {
    registry: SessionRegistry,
    options: ManagerOptions,
}

impl TerminalManager {
    pub fn new(options: ManagerOptions) -> Self {
        Self {
            registry: SessionRegistry::new(),
            options,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    /// Sorted ids of existing sessions.
    pub fn list(&self) -> Vec<SessionId> {
        self.registry.list()
    }

    pub fn current(&self) -> SessionId {
        self.registry.current()
    }

    /// `current/total` indicator text.
    pub fn status(&self) -> String {
        let (current, total) = self.registry.status();
        format!("{}/{}", current, total)
    }

    /// Session whose window is actually open on the surface.
    pub fn visible<S: Surface, P>(&self, host: &Host<S, P>) -> Option<SessionId> {
        self.registry
            .iter()
            .find(|s| s.window.is_some_and(|w| host.surface.window_exists(w)))
            .map(|s| s.id())
    }

    /// Hide the visible session window, or show the current one.
    pub fn toggle<S: Surface, P: ProcessFacility>(&mut self, host: &mut Host<S, P>) -> Result<()> {
        if self.hide(host) {
            return Ok(());
        }
        if self.registry.is_empty() {
            self.create(host)?;
            return Ok(());
        }
        let current = self.registry.current();
        self.show(host, current)
    }

    /// Start a new session, make it current and show it.
    pub fn create<S: Surface, P: ProcessFacility>(
        &mut self,
        host: &mut Host<S, P>,
    ) -> Result<SessionId> {
        self.hide(host);

        let previous = self.registry.current();
        let geometry = self.geometry(host, self.registry.next_id(), self.registry.len() + 1);
        let (rows, cols) = geometry.inner_size();
        let id = self.registry.allocate(TerminalScreen::new(rows, cols));

        if let Err(e) = self.attach(host, id) {
            warn!(session = %id, "failed to start session: {}", e);
            if let Some(session) = self.registry.remove(id) {
                if let Some(buffer) = session.buffer {
                    if let Err(e) = host.surface.delete_buffer(buffer) {
                        debug!(session = %id, "failed to delete buffer: {}", e);
                    }
                }
            }
            self.registry.set_current(previous);
            return Err(e);
        }

        info!(session = %id, total = self.registry.len(), "created session");
        self.show(host, id)?;
        Ok(id)
    }

    /// Move to the next or previous session, wrapping around.
    pub fn advance<S: Surface, P: ProcessFacility>(
        &mut self,
        host: &mut Host<S, P>,
        direction: Direction,
    ) -> Result<()> {
        let Some(target) = self.registry.step(direction) else {
            return self.toggle(host);
        };
        self.hide(host);
        self.registry.set_current(target);
        self.show(host, target)
    }

    /// Show session `id`. Unknown ids are ignored.
    pub fn go_to<S: Surface, P: ProcessFacility>(
        &mut self,
        host: &mut Host<S, P>,
        id: SessionId,
    ) -> Result<()> {
        if !self.registry.contains(id) {
            debug!(session = %id, "go-to ignored: no such session");
            return Ok(());
        }
        self.hide(host);
        self.registry.set_current(id);
        self.show(host, id)
    }

    /// Kill session `id`, closing the gap in the id sequence.
    ///
    /// Unknown ids are ignored. If the killed session was current, the new
    /// current session (if any) is shown. A session window that was already
    /// visible is reopened so its title reflects the new ids; a hidden
    /// terminal stays hidden when a background session is killed.
    pub fn kill<S: Surface, P: ProcessFacility>(
        &mut self,
        host: &mut Host<S, P>,
        id: SessionId,
    ) -> Result<()> {
        let was_current = id == self.registry.current();
        let was_visible = self.visible(host).is_some();
        if !self.destroy(host, id) {
            debug!(session = %id, "kill ignored: no such session");
            return Ok(());
        }
        if self.registry.is_empty() || !(was_current || was_visible) {
            return Ok(());
        }

        let current = self.registry.current();
        self.hide(host);
        self.show(host, current)
    }

    /// Kill the current session.
    pub fn kill_current<S: Surface, P: ProcessFacility>(
        &mut self,
        host: &mut Host<S, P>,
    ) -> Result<()> {
        let current = self.registry.current();
        self.kill(host, current)
    }

    /// Kill every session.
    pub fn kill_all<S: Surface, P: ProcessFacility>(&mut self, host: &mut Host<S, P>) {
        while let Some(last) = self.registry.list().last().copied() {
            self.destroy(host, last);
        }
        info!("killed all sessions");
    }

    /// Send keystrokes to the current session's shell.
    ///
    /// Returns `false` if there is no running shell to send to.
    pub fn send<S: Surface, P: ProcessFacility>(
        &mut self,
        host: &mut Host<S, P>,
        data: &[u8],
    ) -> Result<bool> {
        let job = self
            .registry
            .get(self.registry.current())
            .and_then(|s| s.process);
        match job {
            Some(job) => {
                host.processes.write(job, data)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Re-layout after the host editor changed size.
    pub fn relayout<S: Surface, P: ProcessFacility>(
        &mut self,
        host: &mut Host<S, P>,
    ) -> Result<()> {
        if let Some(id) = self.visible(host) {
            self.hide(host);
            self.show(host, id)?;
        }
        Ok(())
    }

    /// Feed shell output into its session. Returns `false` for foreign jobs.
    pub fn on_output<S: Surface, P>(
        &mut self,
        host: &mut Host<S, P>,
        job: JobId,
        bytes: &[u8],
    ) -> bool {
        let Some(id) = self.registry.find_by_job(job) else {
            return false;
        };
        if let Some(session) = self.registry.get_mut(id) {
            session.screen.process(bytes);
            if let Some(buffer) = session.buffer.filter(|b| host.surface.buffer_exists(*b)) {
                let lines = session.screen.display_lines();
                if let Err(e) = host.surface.set_lines(buffer, &lines) {
                    warn!(session = %id, "failed to update buffer: {}", e);
                }
            }
        }
        true
    }

    /// Record that a session's shell exited. Returns `false` for foreign jobs.
    ///
    /// The session is kept; its buffer gets an exit annotation.
    pub fn on_exit<S: Surface, P>(
        &mut self,
        host: &mut Host<S, P>,
        job: JobId,
        code: Option<i32>,
    ) -> bool {
        let Some(id) = self.registry.find_by_job(job) else {
            return false;
        };
        if let Some(session) = self.registry.get_mut(id) {
            session.process = None;
            info!(session = %id, ?code, "shell exited");
            if let Some(buffer) = session.buffer.filter(|b| host.surface.buffer_exists(*b)) {
                let note = match code {
                    Some(code) => format!("[Process exited {}]", code),
                    None => "[Process terminated]".to_string(),
                };
                if let Err(e) = host.surface.append_lines(buffer, &[String::new(), note]) {
                    warn!(session = %id, "failed to annotate exit: {}", e);
                }
            }
        }
        true
    }

    /// Close whichever session window is open. Returns whether one was.
    fn hide<S: Surface, P>(&mut self, host: &mut Host<S, P>) -> bool {
        let mut hidden = false;
        for session in self.registry.iter_mut() {
            let Some(window) = session.window.take() else {
                continue;
            };
            if host.surface.window_exists(window) {
                if let Err(e) = host.surface.close_window(window) {
                    warn!(session = %session.id, "failed to close window: {}", e);
                }
                hidden = true;
            }
        }
        hidden
    }

    /// Open the window for `id`, recreating its buffer if the host wiped it.
    fn show<S: Surface, P: ProcessFacility>(
        &mut self,
        host: &mut Host<S, P>,
        id: SessionId,
    ) -> Result<()> {
        let geometry = self.geometry(host, id, self.registry.len());
        let (rows, cols) = geometry.inner_size();

        let needs_backing = self
            .registry
            .get(id)
            .map(|s| !s.buffer.is_some_and(|b| host.surface.buffer_exists(b)))
            .unwrap_or(false);
        if needs_backing {
            debug!(session = %id, "buffer gone; starting a fresh shell");
            if let Some(job) = self.registry.get_mut(id).and_then(|s| s.process.take()) {
                host.processes.terminate(job);
            }
            if let Some(session) = self.registry.get_mut(id) {
                session.screen = TerminalScreen::new(rows, cols);
            }
            self.attach(host, id)?;
        }

        let Some(session) = self.registry.get_mut(id) else {
            return Ok(());
        };
        if session.screen.size() != (rows, cols) {
            session.screen.resize(rows, cols);
            if let Some(job) = session.process {
                if let Err(e) = host.processes.resize(job, rows, cols) {
                    debug!(session = %id, "pty resize failed: {}", e);
                }
            }
        }
        let Some(buffer) = session.buffer else {
            return Ok(());
        };
        session.window = Some(host.surface.open_window(buffer, &geometry)?);
        debug!(session = %id, "window shown");
        Ok(())
    }

    /// Give session `id` a buffer and a running shell.
    fn attach<S: Surface, P: ProcessFacility>(
        &mut self,
        host: &mut Host<S, P>,
        id: SessionId,
    ) -> Result<()> {
        let Some(session) = self.registry.get_mut(id) else {
            return Ok(());
        };
        let buffer = host.surface.create_buffer(BufferKind::Terminal)?;
        session.buffer = Some(buffer);

        let (rows, cols) = session.screen.size();
        let spec = ShellSpec {
            program: self.options.shell.clone(),
            cwd: self.options.cwd.clone(),
            rows,
            cols,
        };
        session.process = Some(host.processes.start_shell(&spec)?);
        Ok(())
    }

    /// Release everything session `id` holds and remove it.
    fn destroy<S: Surface, P: ProcessFacility>(
        &mut self,
        host: &mut Host<S, P>,
        id: SessionId,
    ) -> bool {
        let Some(session) = self.registry.remove(id) else {
            return false;
        };
        if let Some(job) = session.process {
            host.processes.terminate(job);
        }
        if let Some(window) = session.window.filter(|w| host.surface.window_exists(*w)) {
            if let Err(e) = host.surface.close_window(window) {
                warn!(session = %id, "failed to close window: {}", e);
            }
        }
        if let Some(buffer) = session.buffer.filter(|b| host.surface.buffer_exists(*b)) {
            if let Err(e) = host.surface.delete_buffer(buffer) {
                warn!(session = %id, "failed to delete buffer: {}", e);
            }
        }
        info!(session = %id, remaining = self.registry.len(), "killed session");
        true
    }

    fn geometry<S: Surface, P>(&self, host: &Host<S, P>, id: SessionId, total: usize) -> FloatGeometry {
        let geometry = FloatGeometry::centered(host.surface.editor_size(), &self.options.style);
        if self.options.titles {
            geometry.with_title(format!(" Terminal {}/{} ", id, total))
        } else {
            geometry
        }
    }
}
