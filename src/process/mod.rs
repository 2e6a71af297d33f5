//! Process facility: interactive shells and one-shot commands.
//!
//! Running processes never touch editor state. Everything they produce is
//! delivered as [`JobEvent`]s on a channel drained by a single dispatcher.

mod native;
mod pump;
mod recording;

pub use native::{default_shell, NativeProcesses};
pub use pump::PtyPump;
pub use recording::RecordingProcesses;

use std::fmt;
use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::Result;

/// Identifier of a job started by a process facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    /// Create a JobId from a raw value.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{:04}", self.0)
    }
}

/// Which stream a line of command output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    Stdout,
    Stderr,
}

/// Something that happened to a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEventKind {
    /// Raw bytes from an interactive shell's pty.
    Output(Vec<u8>),
    /// One line from a command's stdout or stderr, without the terminator.
    Line(OutputSource, String),
    /// The process exited. `None` when no exit code is available (signal).
    Exited(Option<i32>),
    /// Deferred disposal of a finished scratch run is due.
    CloseDue,
}

/// Event tagged with the job it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub job: JobId,
    pub kind: JobEventKind,
}

impl JobEvent {
    pub fn output(job: JobId, bytes: Vec<u8>) -> Self {
        Self {
            job,
            kind: JobEventKind::Output(bytes),
        }
    }

    pub fn line(job: JobId, source: OutputSource, text: impl Into<String>) -> Self {
        Self {
            job,
            kind: JobEventKind::Line(source, text.into()),
        }
    }

    pub fn exited(job: JobId, code: Option<i32>) -> Self {
        Self {
            job,
            kind: JobEventKind::Exited(code),
        }
    }

    pub fn close_due(job: JobId) -> Self {
        Self {
            job,
            kind: JobEventKind::CloseDue,
        }
    }
}

/// Sending half of the dispatcher's event channel.
pub type EventSender = mpsc::UnboundedSender<JobEvent>;

/// Receiving half of the dispatcher's event channel.
pub type EventReceiver = mpsc::UnboundedReceiver<JobEvent>;

/// Create the dispatcher's event channel.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Request for an interactive shell bound to a terminal session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSpec {
    /// Shell program; `None` uses the platform default.
    pub program: Option<String>,
    /// Working directory; `None` inherits the host's.
    pub cwd: Option<PathBuf>,
    /// Pty rows.
    pub rows: u16,
    /// Pty columns.
    pub cols: u16,
}

impl ShellSpec {
    /// Shell with the default program and the given pty size.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            program: None,
            cwd: None,
            rows,
            cols,
        }
    }
}

/// Job control provided by the host.
pub trait ProcessFacility {
    /// Start an interactive shell on a pty.
    ///
    /// Output arrives as [`JobEventKind::Output`], followed by one
    /// [`JobEventKind::Exited`].
    fn start_shell(&mut self, spec: &ShellSpec) -> Result<JobId>;

    /// Start a non-interactive command line through the system shell.
    ///
    /// Output arrives line by line as [`JobEventKind::Line`]; the single
    /// [`JobEventKind::Exited`] is sent after both streams are drained.
    fn start_command(&mut self, command_line: &str) -> Result<JobId>;

    /// Terminate a job. Unknown or already finished jobs are ignored.
    fn terminate(&mut self, job: JobId);

    /// Write input to an interactive shell.
    fn write(&mut self, job: JobId, data: &[u8]) -> Result<()>;

    /// Resize an interactive shell's pty.
    fn resize(&mut self, job: JobId, rows: u16, cols: u16) -> Result<()>;

    /// Check whether a job is still tracked as running.
    fn is_running(&self, job: JobId) -> bool;

    /// Drop bookkeeping for a job that reported its exit.
    fn reap(&mut self, job: JobId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_display() {
        assert_eq!(JobId::from_raw(1).to_string(), "job-0001");
        assert_eq!(JobId::from_raw(12345).to_string(), "job-12345");
    }

    #[test]
    fn test_event_constructors() {
        let job = JobId::from_raw(3);
        assert_eq!(
            JobEvent::line(job, OutputSource::Stderr, "oops").kind,
            JobEventKind::Line(OutputSource::Stderr, "oops".to_string())
        );
        assert_eq!(JobEvent::exited(job, Some(2)).kind, JobEventKind::Exited(Some(2)));
        assert_eq!(JobEvent::close_due(job).job, job);
    }

    #[tokio::test]
    async fn test_event_channel() {
        let (tx, mut rx) = event_channel();
        tx.send(JobEvent::output(JobId::from_raw(1), b"hi".to_vec()))
            .unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, JobEventKind::Output(b"hi".to_vec()));
    }

    #[test]
    fn test_shell_spec_defaults() {
        let spec = ShellSpec::new(20, 70);
        assert!(spec.program.is_none());
        assert!(spec.cwd.is_none());
        assert_eq!((spec.rows, spec.cols), (20, 70));
    }
}
