//! Native process facility using portable-pty and tokio::process.

use std::collections::HashMap;
use std::io::Write;
use std::process::Stdio;

use portable_pty::{native_pty_system, ChildKiller, CommandBuilder, MasterPty, PtySize};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::{
    EventSender, JobEvent, JobId, OutputSource, ProcessFacility, PtyPump, ShellSpec,
};
use crate::error::FloatTermError;
use crate::Result;

/// Get the default interactive shell for the current platform.
pub fn default_shell() -> String {
    #[cfg(unix)]
    {
        std::env::var("SHELL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "/bin/sh".to_string())
    }
    #[cfg(windows)]
    {
        "powershell.exe".to_string()
    }
}

struct ShellJob {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    killer: Box<dyn ChildKiller + Send + Sync>,
}

/// Process facility backed by real processes.
///
/// Must be used from within a tokio runtime: reader and waiter tasks are
/// spawned onto it.
pub struct NativeProcesses {
    pty_system: Box<dyn portable_pty::PtySystem + Send>,
    events: EventSender,
    default_program: String,
    next_job: u64,
    shells: HashMap<JobId, ShellJob>,
    commands: HashMap<JobId, oneshot::Sender<()>>,
}

impl NativeProcesses {
    /// Create a facility that reports on `events`.
    pub fn new(events: EventSender) -> Self {
        Self {
            pty_system: native_pty_system(),
            events,
            default_program: default_shell(),
            next_job: 1,
            shells: HashMap::new(),
            commands: HashMap::new(),
        }
    }

    /// Override the shell used when a [`ShellSpec`] names none.
    pub fn with_default_program(mut self, program: impl Into<String>) -> Self {
        self.default_program = program.into();
        self
    }

    fn allocate(&mut self) -> JobId {
        let id = JobId::from_raw(self.next_job);
        self.next_job += 1;
        id
    }

    fn command_for(command_line: &str) -> tokio::process::Command {
        #[cfg(unix)]
        let cmd = {
            let mut c = tokio::process::Command::new("/bin/sh");
            c.arg("-c").arg(command_line);
            c
        };

        #[cfg(windows)]
        let cmd = {
            let mut c = tokio::process::Command::new("cmd.exe");
            c.arg("/C").arg(command_line);
            c
        };

        cmd
    }
}

impl ProcessFacility for NativeProcesses {
    fn start_shell(&mut self, spec: &ShellSpec) -> Result<JobId> {
        let size = PtySize {
            rows: spec.rows,
            cols: spec.cols,
            pixel_width: 0,
            pixel_height: 0,
        };

        let pair = self
            .pty_system
            .openpty(size)
            .map_err(|e| FloatTermError::Pty(e.to_string()))?;

        let program = spec
            .program
            .clone()
            .unwrap_or_else(|| self.default_program.clone());
        let mut cmd = CommandBuilder::new(&program);
        if let Some(dir) = &spec.cwd {
            cmd.cwd(dir);
        }

        let mut child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| FloatTermError::Spawn {
                command: program.clone(),
                reason: e.to_string(),
            })?;
        // The master only sees EOF once every slave handle is gone.
        drop(pair.slave);

        let killer = child.clone_killer();
        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| FloatTermError::Pty(e.to_string()))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| FloatTermError::Pty(e.to_string()))?;

        let job = self.allocate();
        info!(%job, pid = ?child.process_id(), "started shell {}", program);

        let pump = PtyPump::new(job, reader, self.events.clone());
        tokio::spawn(pump.run(move || match child.wait() {
            Ok(status) => Some(status.exit_code() as i32),
            Err(e) => {
                warn!(%job, "failed to wait for shell: {}", e);
                None
            }
        }));

        self.shells.insert(
            job,
            ShellJob {
                master: pair.master,
                writer,
                killer,
            },
        );
        Ok(job)
    }

    fn start_command(&mut self, command_line: &str) -> Result<JobId> {
        let mut cmd = Self::command_for(command_line);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| FloatTermError::Spawn {
            command: command_line.to_string(),
            reason: e.to_string(),
        })?;

        let job = self.allocate();
        info!(%job, pid = ?child.id(), "started command: {}", command_line);

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let tx = self.events.clone();

        tokio::spawn(async move {
            let out_task = stdout
                .map(|s| tokio::spawn(forward_lines(job, OutputSource::Stdout, s, tx.clone())));
            let err_task = stderr
                .map(|s| tokio::spawn(forward_lines(job, OutputSource::Stderr, s, tx.clone())));

            let waited = tokio::select! {
                status = child.wait() => Some(status),
                _ = kill_rx => None,
            };
            let status = match waited {
                Some(status) => status,
                None => {
                    debug!(%job, "terminating command");
                    if let Err(e) = child.start_kill() {
                        debug!(%job, "kill failed (already exited?): {}", e);
                    }
                    child.wait().await
                }
            };

            for task in [out_task, err_task].into_iter().flatten() {
                let _ = task.await;
            }

            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!(%job, "failed to wait for command: {}", e);
                    None
                }
            };
            let _ = tx.send(JobEvent::exited(job, code));
        });

        self.commands.insert(job, kill_tx);
        Ok(job)
    }

    fn terminate(&mut self, job: JobId) {
        if let Some(mut shell) = self.shells.remove(&job) {
            if let Err(e) = shell.killer.kill() {
                debug!(%job, "kill failed (already exited?): {}", e);
            }
        } else if let Some(kill) = self.commands.remove(&job) {
            let _ = kill.send(());
        }
    }

    fn write(&mut self, job: JobId, data: &[u8]) -> Result<()> {
        let shell = self
            .shells
            .get_mut(&job)
            .ok_or(FloatTermError::UnknownJob(job))?;
        shell.writer.write_all(data)?;
        shell.writer.flush()?;
        Ok(())
    }

    fn resize(&mut self, job: JobId, rows: u16, cols: u16) -> Result<()> {
        let shell = self.shells.get(&job).ok_or(FloatTermError::UnknownJob(job))?;
        shell
            .master
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| FloatTermError::Pty(e.to_string()))
    }

    fn is_running(&self, job: JobId) -> bool {
        self.shells.contains_key(&job) || self.commands.contains_key(&job)
    }

    fn reap(&mut self, job: JobId) {
        self.shells.remove(&job);
        self.commands.remove(&job);
    }
}

async fn forward_lines<R>(job: JobId, source: OutputSource, stream: R, tx: EventSender)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                if tx.send(JobEvent::line(job, source, line)).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!(%job, ?source, "output stream error: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{event_channel, EventReceiver, JobEventKind};
    use std::time::Duration;

    async fn collect_until_exit(rx: &mut EventReceiver) -> (Vec<JobEventKind>, Option<i32>) {
        let mut seen = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
                .await
                .expect("timed out waiting for job events")
                .expect("channel closed");
            if let JobEventKind::Exited(code) = event.kind {
                return (seen, code);
            }
            seen.push(event.kind);
        }
    }

    #[test]
    fn test_default_shell() {
        let shell = default_shell();
        assert!(!shell.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_streams_lines_then_exit() {
        let (tx, mut rx) = event_channel();
        let mut processes = NativeProcesses::new(tx);

        let job = processes
            .start_command("echo hello; echo oops 1>&2; exit 3")
            .unwrap();
        assert!(processes.is_running(job));

        let (seen, code) = collect_until_exit(&mut rx).await;
        assert_eq!(code, Some(3));
        assert!(seen.contains(&JobEventKind::Line(OutputSource::Stdout, "hello".into())));
        assert!(seen.contains(&JobEventKind::Line(OutputSource::Stderr, "oops".into())));

        processes.reap(job);
        assert!(!processes.is_running(job));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_command() {
        let (tx, mut rx) = event_channel();
        let mut processes = NativeProcesses::new(tx);

        let job = processes.start_command("sleep 30").unwrap();
        processes.terminate(job);

        let (_, code) = collect_until_exit(&mut rx).await;
        assert_eq!(code, None);
        assert!(!processes.is_running(job));
    }

    #[tokio::test]
    async fn test_write_unknown_job() {
        let (tx, _rx) = event_channel();
        let mut processes = NativeProcesses::new(tx);
        let result = processes.write(JobId::from_raw(42), b"ls\n");
        assert!(matches!(result, Err(FloatTermError::UnknownJob(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_start_and_terminate_shell() {
        let (tx, mut rx) = event_channel();
        let mut processes = NativeProcesses::new(tx).with_default_program("/bin/sh");

        let job = processes.start_shell(&ShellSpec::new(24, 80)).unwrap();
        assert!(processes.is_running(job));
        processes.resize(job, 30, 100).unwrap();

        processes.terminate(job);
        assert!(!processes.is_running(job));

        let (_, _code) = collect_until_exit(&mut rx).await;
    }

    // Pty reads can stall on some platforms.
    // Run with: cargo test -- --ignored
    #[cfg(unix)]
    #[tokio::test]
    #[ignore]
    async fn test_shell_echo() {
        let (tx, mut rx) = event_channel();
        let mut processes = NativeProcesses::new(tx).with_default_program("/bin/sh");

        let job = processes.start_shell(&ShellSpec::new(24, 80)).unwrap();
        processes
            .write(job, b"echo FLOATTERM_TEST_OUTPUT; exit\n")
            .unwrap();

        let (seen, _) = collect_until_exit(&mut rx).await;
        let output: Vec<u8> = seen
            .into_iter()
            .filter_map(|kind| match kind {
                JobEventKind::Output(bytes) => Some(bytes),
                _ => None,
            })
            .flatten()
            .collect();
        assert!(String::from_utf8_lossy(&output).contains("FLOATTERM_TEST_OUTPUT"));
    }
}
