//! In-memory process facility.

use std::collections::BTreeSet;

use super::{JobId, ProcessFacility, ShellSpec};
use crate::error::FloatTermError;
use crate::Result;

/// Process facility that starts nothing and records every request.
///
/// Backs the host's dry-run mode and tests. Jobs stay "running" until
/// terminated or reaped; events are never produced on their own, so callers
/// inject them into the dispatcher as needed.
#[derive(Debug, Default)]
pub struct RecordingProcesses {
    next_job: u64,
    running: BTreeSet<JobId>,
    shells: Vec<(JobId, ShellSpec)>,
    commands: Vec<(JobId, String)>,
    terminated: Vec<JobId>,
    writes: Vec<(JobId, Vec<u8>)>,
    resizes: Vec<(JobId, u16, u16)>,
    fail_next: Option<String>,
}

impl RecordingProcesses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next start request fail with `reason`.
    pub fn fail_next_start(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    /// Shells started, in order.
    pub fn shells(&self) -> &[(JobId, ShellSpec)] {
        &self.shells
    }

    /// Command lines started, in order.
    pub fn commands(&self) -> &[(JobId, String)] {
        &self.commands
    }

    /// Jobs terminated, in order.
    pub fn terminated(&self) -> &[JobId] {
        &self.terminated
    }

    /// Input written to shells, in order.
    pub fn writes(&self) -> &[(JobId, Vec<u8>)] {
        &self.writes
    }

    /// Pty resizes, in order.
    pub fn resizes(&self) -> &[(JobId, u16, u16)] {
        &self.resizes
    }

    /// Jobs currently considered running.
    pub fn running(&self) -> Vec<JobId> {
        self.running.iter().copied().collect()
    }

    fn start(&mut self, what: &str) -> Result<JobId> {
        if let Some(reason) = self.fail_next.take() {
            return Err(FloatTermError::Spawn {
                command: what.to_string(),
                reason,
            });
        }
        self.next_job += 1;
        let job = JobId::from_raw(self.next_job);
        self.running.insert(job);
        Ok(job)
    }
}

impl ProcessFacility for RecordingProcesses {
    fn start_shell(&mut self, spec: &ShellSpec) -> Result<JobId> {
        let job = self.start(spec.program.as_deref().unwrap_or("<default shell>"))?;
        self.shells.push((job, spec.clone()));
        Ok(job)
    }

    fn start_command(&mut self, command_line: &str) -> Result<JobId> {
        let job = self.start(command_line)?;
        self.commands.push((job, command_line.to_string()));
        Ok(job)
    }

    fn terminate(&mut self, job: JobId) {
        if self.running.remove(&job) {
            self.terminated.push(job);
        }
    }

    fn write(&mut self, job: JobId, data: &[u8]) -> Result<()> {
        if !self.running.contains(&job) {
            return Err(FloatTermError::UnknownJob(job));
        }
        self.writes.push((job, data.to_vec()));
        Ok(())
    }

    fn resize(&mut self, job: JobId, rows: u16, cols: u16) -> Result<()> {
        if !self.running.contains(&job) {
            return Err(FloatTermError::UnknownJob(job));
        }
        self.resizes.push((job, rows, cols));
        Ok(())
    }

    fn is_running(&self, job: JobId) -> bool {
        self.running.contains(&job)
    }

    fn reap(&mut self, job: JobId) {
        self.running.remove(&job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_starts() {
        let mut processes = RecordingProcesses::new();
        let shell = processes.start_shell(&ShellSpec::new(10, 40)).unwrap();
        let cmd = processes.start_command("make test").unwrap();

        assert_ne!(shell, cmd);
        assert_eq!(processes.shells()[0].1.rows, 10);
        assert_eq!(processes.commands()[0].1, "make test");
        assert_eq!(processes.running(), vec![shell, cmd]);
    }

    #[test]
    fn test_fail_next_start() {
        let mut processes = RecordingProcesses::new();
        processes.fail_next_start("no such file");

        let err = processes.start_command("nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
        assert!(processes.start_command("ok").is_ok());
    }

    #[test]
    fn test_terminate_once() {
        let mut processes = RecordingProcesses::new();
        let job = processes.start_command("sleep 1").unwrap();
        processes.terminate(job);
        processes.terminate(job);

        assert_eq!(processes.terminated(), [job]);
        assert!(!processes.is_running(job));
        assert!(processes.write(job, b"x").is_err());
    }
}
