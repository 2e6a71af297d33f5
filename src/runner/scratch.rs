//! Scratch command runner.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::ScratchCommand;
use crate::host::Host;
use crate::output::OutputSanitizer;
use crate::process::{JobId, ProcessFacility};
use crate::window::{BufferId, BufferKind, FloatGeometry, FloatStyle, Surface, WindowId};
use crate::Result;

/// Default delay between a scratch command exiting and its window closing.
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug)]
struct ScratchRun {
    command: String,
    buffer: BufferId,
    window: WindowId,
    finished: bool,
}

/// Runs one-shot commands in transient floating windows.
///
/// The runner is driven by the dispatcher: it never schedules anything
/// itself. [`CommandRunner::on_exit`] returns the delay after which the
/// dispatcher should deliver [`CommandRunner::on_close_due`].
#[derive(Debug)]
pub struct CommandRunner {
    runs: HashMap<JobId, ScratchRun>,
    style: FloatStyle,
    close_delay: Duration,
}

impl CommandRunner {
    /// Create a new runner.
    pub fn new(style: FloatStyle, close_delay: Duration) -> Self {
        Self {
            runs: HashMap::new(),
            style,
            close_delay,
        }
    }

    pub fn close_delay(&self) -> Duration {
        self.close_delay
    }

    /// Jobs whose scratch window has not been disposed yet.
    pub fn active(&self) -> Vec<JobId> {
        let mut jobs: Vec<JobId> = self.runs.keys().copied().collect();
        jobs.sort();
        jobs
    }

    pub fn owns(&self, job: JobId) -> bool {
        self.runs.contains_key(&job)
    }

    /// Buffer of a run that is still on screen.
    pub fn buffer_of(&self, job: JobId) -> Option<BufferId> {
        self.runs.get(&job).map(|run| run.buffer)
    }

    /// Start `command` in a fresh scratch window.
    ///
    /// If the process cannot be started, the window and buffer created for
    /// the attempt are torn down before the error is returned.
    pub fn run<S: Surface, P: ProcessFacility>(
        &mut self,
        host: &mut Host<S, P>,
        command: &ScratchCommand,
    ) -> Result<JobId> {
        let buffer = host.surface.create_buffer(BufferKind::Scratch)?;
        let geometry = FloatGeometry::centered(host.surface.editor_size(), &self.style)
            .with_title(command.title());

        let window = match host.surface.open_window(buffer, &geometry) {
            Ok(window) => window,
            Err(e) => {
                if let Err(cleanup) = host.surface.delete_buffer(buffer) {
                    debug!("failed to delete scratch buffer: {}", cleanup);
                }
                return Err(e);
            }
        };

        let command_line = command.command_line();
        let job = match host.processes.start_command(&command_line) {
            Ok(job) => job,
            Err(e) => {
                warn!("failed to start scratch command: {}", e);
                if let Err(cleanup) = host.surface.close_window(window) {
                    debug!("failed to close scratch window: {}", cleanup);
                }
                if let Err(cleanup) = host.surface.delete_buffer(buffer) {
                    debug!("failed to delete scratch buffer: {}", cleanup);
                }
                return Err(e);
            }
        };

        info!(%job, "running: {}", command_line);
        self.runs.insert(
            job,
            ScratchRun {
                command: command.command.clone(),
                buffer,
                window,
                finished: false,
            },
        );
        Ok(job)
    }

    /// Append one output line. Blank lines are dropped.
    ///
    /// Returns `false` for jobs this runner does not own.
    pub fn on_line<S: Surface, P>(&mut self, host: &mut Host<S, P>, job: JobId, text: &str) -> bool {
        let Some(run) = self.runs.get(&job) else {
            return false;
        };
        let Some(line) = OutputSanitizer::display_line(text) else {
            return true;
        };
        if host.surface.buffer_exists(run.buffer) {
            if let Err(e) = host.surface.append_lines(run.buffer, &[line]) {
                debug!(%job, "dropping output line: {}", e);
            }
        }
        true
    }

    /// Record the exit of a scratch command.
    ///
    /// Non-zero exits are annotated in the buffer. Returns the delay after
    /// which the window should be disposed, or `None` for foreign jobs.
    pub fn on_exit<S: Surface, P: ProcessFacility>(
        &mut self,
        host: &mut Host<S, P>,
        job: JobId,
        code: Option<i32>,
    ) -> Option<Duration> {
        let run = self.runs.get_mut(&job)?;
        run.finished = true;
        host.processes.reap(job);

        let note = match code {
            Some(0) => None,
            Some(code) => Some(format!("[Command failed with exit code {}]", code)),
            None => Some("[Command terminated]".to_string()),
        };
        match &note {
            Some(_) => info!(%job, ?code, "command failed: {}", run.command),
            None => info!(%job, "command finished: {}", run.command),
        }
        if let Some(note) = note {
            if host.surface.buffer_exists(run.buffer) {
                if let Err(e) = host.surface.append_lines(run.buffer, &[note]) {
                    warn!(%job, "failed to annotate exit: {}", e);
                }
            }
        }

        Some(self.close_delay)
    }

    /// Dispose of a finished run's window and buffer.
    ///
    /// Handles the host already having closed either of them. Returns
    /// `false` if there was nothing to dispose.
    pub fn on_close_due<S: Surface, P>(&mut self, host: &mut Host<S, P>, job: JobId) -> bool {
        let Some(run) = self.runs.remove(&job) else {
            return false;
        };
        if host.surface.window_exists(run.window) {
            if let Err(e) = host.surface.close_window(run.window) {
                warn!(%job, "failed to close scratch window: {}", e);
            }
        }
        if host.surface.buffer_exists(run.buffer) {
            if let Err(e) = host.surface.delete_buffer(run.buffer) {
                warn!(%job, "failed to delete scratch buffer: {}", e);
            }
        }
        debug!(%job, "scratch window disposed");
        true
    }

    /// Close every scratch window still on screen. Runs keep their buffers
    /// and are disposed of on schedule. Returns whether any window closed.
    pub fn hide_windows<S: Surface, P>(&mut self, host: &mut Host<S, P>) -> bool {
        let mut hidden = false;
        for (job, run) in &self.runs {
            if !host.surface.window_exists(run.window) {
                continue;
            }
            match host.surface.close_window(run.window) {
                Ok(()) => hidden = true,
                Err(e) => warn!(%job, "failed to close scratch window: {}", e),
            }
        }
        if hidden {
            debug!("scratch windows hidden");
        }
        hidden
    }

    /// Terminate every command still running and dispose of all windows.
    pub fn shutdown<S: Surface, P: ProcessFacility>(&mut self, host: &mut Host<S, P>) {
        let jobs = self.active();
        for job in jobs {
            if self.runs.get(&job).is_some_and(|run| !run.finished) {
                host.processes.terminate(job);
            }
            self.on_close_due(host, job);
        }
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(FloatStyle::default(), DEFAULT_CLOSE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::RecordingProcesses;
    use crate::window::HeadlessSurface;

    type TestHost = Host<HeadlessSurface, RecordingProcesses>;

    fn host() -> TestHost {
        Host::new(HeadlessSurface::new(), RecordingProcesses::new())
    }

    #[test]
    fn test_default_delay() {
        assert_eq!(DEFAULT_CLOSE_DELAY, Duration::from_secs(2));
        assert_eq!(CommandRunner::default().close_delay(), DEFAULT_CLOSE_DELAY);
    }

    #[test]
    fn test_run_opens_window() {
        let mut host = host();
        let mut runner = CommandRunner::default();

        let job = runner.run(&mut host, &ScratchCommand::new("make")).unwrap();

        assert!(runner.owns(job));
        assert_eq!(host.processes.commands()[0].1, "make");
        let window = host.surface.open_windows()[0];
        let geometry = host.surface.window_geometry(window).unwrap();
        assert_eq!(geometry.title.as_deref(), Some(" $ make "));
    }

    #[test]
    fn test_lines_filtered_and_stripped() {
        let mut host = host();
        let mut runner = CommandRunner::default();
        let job = runner.run(&mut host, &ScratchCommand::new("build")).unwrap();

        assert!(runner.on_line(&mut host, job, "\x1b[32mCompiling\x1b[0m foo"));
        assert!(runner.on_line(&mut host, job, ""));
        assert!(runner.on_line(&mut host, job, "   "));
        assert!(runner.on_line(&mut host, job, "warning: x"));

        let buffer = runner.buffer_of(job).unwrap();
        assert_eq!(host.surface.lines(buffer).unwrap(), ["Compiling foo", "warning: x"]);
    }

    #[test]
    fn test_foreign_job_ignored() {
        let mut host = host();
        let mut runner = CommandRunner::default();
        let stranger = JobId::from_raw(77);

        assert!(!runner.on_line(&mut host, stranger, "hello"));
        assert_eq!(runner.on_exit(&mut host, stranger, Some(0)), None);
        assert!(!runner.on_close_due(&mut host, stranger));
    }

    #[test]
    fn test_success_has_no_annotation() {
        let mut host = host();
        let mut runner = CommandRunner::default();
        let job = runner.run(&mut host, &ScratchCommand::new("true")).unwrap();
        runner.on_line(&mut host, job, "done");

        let delay = runner.on_exit(&mut host, job, Some(0));

        assert_eq!(delay, Some(DEFAULT_CLOSE_DELAY));
        let buffer = runner.buffer_of(job).unwrap();
        assert_eq!(host.surface.lines(buffer).unwrap(), ["done"]);
        assert!(!host.processes.is_running(job));
    }

    #[test]
    fn test_failure_annotated_then_closed() {
        let mut host = host();
        let mut runner = CommandRunner::new(FloatStyle::default(), Duration::from_millis(10));
        let job = runner.run(&mut host, &ScratchCommand::new("false")).unwrap();

        assert_eq!(
            runner.on_exit(&mut host, job, Some(1)),
            Some(Duration::from_millis(10))
        );
        let buffer = runner.buffer_of(job).unwrap();
        assert_eq!(
            host.surface.lines(buffer).unwrap(),
            ["[Command failed with exit code 1]"]
        );

        assert!(runner.on_close_due(&mut host, job));
        assert!(host.surface.open_windows().is_empty());
        assert!(!host.surface.buffer_exists(buffer));
        assert!(!runner.owns(job));
    }

    #[test]
    fn test_close_after_user_closed_window() {
        let mut host = host();
        let mut runner = CommandRunner::default();
        let job = runner.run(&mut host, &ScratchCommand::new("ls")).unwrap();
        let buffer = runner.buffer_of(job).unwrap();
        runner.on_exit(&mut host, job, Some(0));

        host.surface.delete_buffer(buffer).unwrap();

        assert!(runner.on_close_due(&mut host, job));
        assert!(!runner.on_close_due(&mut host, job));
    }

    #[test]
    fn test_start_failure_tears_down() {
        let mut host = host();
        let mut runner = CommandRunner::default();
        host.processes.fail_next_start("not found");

        let result = runner.run(&mut host, &ScratchCommand::new("nope"));

        assert!(result.is_err());
        assert!(host.surface.open_windows().is_empty());
        assert_eq!(host.surface.buffer_count(), 0);
        assert!(runner.active().is_empty());
    }

    #[test]
    fn test_hide_windows_keeps_run() {
        let mut host = host();
        let mut runner = CommandRunner::default();
        let job = runner.run(&mut host, &ScratchCommand::new("make")).unwrap();

        assert!(runner.hide_windows(&mut host));
        assert!(host.surface.open_windows().is_empty());
        assert!(!runner.hide_windows(&mut host));

        // Output still lands in the buffer and disposal still works.
        assert!(runner.on_line(&mut host, job, "still going"));
        let buffer = runner.buffer_of(job).unwrap();
        assert_eq!(host.surface.lines(buffer).unwrap(), ["still going"]);
        runner.on_exit(&mut host, job, Some(0));
        assert!(runner.on_close_due(&mut host, job));
        assert_eq!(host.surface.buffer_count(), 0);
    }

    #[test]
    fn test_shutdown_terminates_running() {
        let mut host = host();
        let mut runner = CommandRunner::default();
        let running = runner.run(&mut host, &ScratchCommand::new("sleep 60")).unwrap();
        let done = runner.run(&mut host, &ScratchCommand::new("true")).unwrap();
        runner.on_exit(&mut host, done, Some(0));

        runner.shutdown(&mut host);

        assert_eq!(host.processes.terminated(), [running]);
        assert!(runner.active().is_empty());
        assert_eq!(host.surface.buffer_count(), 0);
    }
}
