//! Single-task dispatcher for user commands and job events.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use super::commands::{KillTarget, UserCommand, HELP};
use crate::host::Host;
use crate::process::{EventSender, JobEvent, JobEventKind, JobId, ProcessFacility};
use crate::runner::{CommandRunner, ScratchCommand};
use crate::session::{Direction, TerminalManager};
use crate::window::{EditorSize, Surface};
use crate::Result;

/// What the console should do after a line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing to print.
    None,
    /// Print a message.
    Message(String),
    /// Ask the user for more input; the next line answers the prompt.
    Prompt(&'static str),
    /// Print the open floating windows.
    Show,
    /// The host editor changed size; resize the surface, then call
    /// [`Dispatcher::relayout`].
    Resize(EditorSize),
    /// Exit.
    Quit,
}

#[derive(Debug)]
enum Pending {
    /// Waiting for a command line. `ask_dir` asks for the directory next.
    Command { dir: Option<PathBuf>, ask_dir: bool },
    /// Waiting for the directory to run `command` in.
    Directory { command: String },
}

const COMMAND_PROMPT: &str = "Command: ";
const DIRECTORY_PROMPT: &str = "Directory (empty for current): ";

/// Owns the host, the terminal manager and the command runner, and applies
/// every mutation on the caller's task.
pub struct Dispatcher<S, P> {
    host: Host<S, P>,
    manager: TerminalManager,
    runner: CommandRunner,
    events: EventSender,
    pending: Option<Pending>,
}

impl<S: Surface, P: ProcessFacility> Dispatcher<S, P> {
    /// Create a dispatcher.
    ///
    /// `events` must feed the same channel the process facility reports
    /// to; close timers post their `CloseDue` events through it.
    pub fn new(
        host: Host<S, P>,
        manager: TerminalManager,
        runner: CommandRunner,
        events: EventSender,
    ) -> Self {
        Self {
            host,
            manager,
            runner,
            events,
            pending: None,
        }
    }

    pub fn host(&self) -> &Host<S, P> {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host<S, P> {
        &mut self.host
    }

    pub fn manager(&self) -> &TerminalManager {
        &self.manager
    }

    pub fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    /// Whether the next input line answers a prompt.
    pub fn is_prompting(&self) -> bool {
        self.pending.is_some()
    }

    /// Handle one line of console input.
    pub fn handle_input(&mut self, line: &str) -> Reply {
        if let Some(pending) = self.pending.take() {
            return self.answer(pending, line.trim());
        }
        match UserCommand::parse(line) {
            Ok(Some(command)) => self.handle_command(command),
            Ok(None) => Reply::None,
            Err(e) => Reply::Message(format!("error: {}", e)),
        }
    }

    /// Apply a parsed user command.
    pub fn handle_command(&mut self, command: UserCommand) -> Reply {
        debug!(?command, "user command");
        match self.apply(command) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("command failed: {}", e);
                Reply::Message(format!("error: {}", e))
            }
        }
    }

    /// Apply a command, then close scratch windows if a session window is
    /// now on screen so at most one float is visible.
    fn apply(&mut self, command: UserCommand) -> Result<Reply> {
        let reply = self.execute(command);
        if self.manager.visible(&self.host).is_some() {
            self.runner.hide_windows(&mut self.host);
        }
        reply
    }

    fn execute(&mut self, command: UserCommand) -> Result<Reply> {
        let host = &mut self.host;
        match command {
            UserCommand::Toggle => self.manager.toggle(host)?,
            UserCommand::New => {
                let id = self.manager.create(host)?;
                return Ok(Reply::Message(format!("Terminal {}", id)));
            }
            UserCommand::Next => self.manager.advance(host, Direction::Next)?,
            UserCommand::Previous => self.manager.advance(host, Direction::Previous)?,
            UserCommand::GoTo(Some(id)) => self.manager.go_to(host, id)?,
            UserCommand::GoTo(None) | UserCommand::Kill(KillTarget::Session(None)) => {
                debug!("ignoring out-of-range session number");
            }
            UserCommand::List => return Ok(Reply::Message(self.list())),
            UserCommand::Kill(KillTarget::Session(Some(id))) => self.manager.kill(host, id)?,
            UserCommand::Kill(KillTarget::Current) => self.manager.kill_current(host)?,
            UserCommand::KillAll => self.manager.kill_all(host),
            UserCommand::Run(None) => {
                return Ok(self.prompt(Pending::Command {
                    dir: None,
                    ask_dir: false,
                }))
            }
            UserCommand::Run(Some(command)) => return self.run(ScratchCommand::new(command)),
            UserCommand::RunInDir { dir, command } => match (dir, command) {
                (Some(dir), Some(command)) => {
                    return self.run(ScratchCommand::new(command).in_dir(dir))
                }
                (None, Some(command)) => {
                    return Ok(self.prompt(Pending::Directory { command }))
                }
                (dir, None) => {
                    let ask_dir = dir.is_none();
                    return Ok(self.prompt(Pending::Command { dir, ask_dir }));
                }
            },
            UserCommand::Send(text) => {
                let mut data = text.into_bytes();
                data.push(b'\n');
                if !self.manager.send(host, &data)? {
                    return Ok(Reply::Message("no running shell".to_string()));
                }
            }
            UserCommand::Status => return Ok(Reply::Message(self.status())),
            UserCommand::Resize(size) => return Ok(Reply::Resize(size)),
            UserCommand::Show => return Ok(Reply::Show),
            UserCommand::Help => return Ok(Reply::Message(HELP.to_string())),
            UserCommand::Quit => {
                self.shutdown();
                return Ok(Reply::Quit);
            }
        }
        Ok(Reply::None)
    }

    fn prompt(&mut self, pending: Pending) -> Reply {
        let text = match pending {
            Pending::Command { .. } => COMMAND_PROMPT,
            Pending::Directory { .. } => DIRECTORY_PROMPT,
        };
        self.pending = Some(pending);
        Reply::Prompt(text)
    }

    fn answer(&mut self, pending: Pending, answer: &str) -> Reply {
        match pending {
            Pending::Command { .. } if answer.is_empty() => {
                Reply::Message("cancelled".to_string())
            }
            Pending::Command { ask_dir: true, .. } => self.prompt(Pending::Directory {
                command: answer.to_string(),
            }),
            Pending::Command { dir, .. } => {
                let command = ScratchCommand::new(answer);
                self.run_reply(match dir {
                    Some(dir) => command.in_dir(dir),
                    None => command,
                })
            }
            Pending::Directory { command } => {
                let command = ScratchCommand::new(command);
                self.run_reply(if answer.is_empty() {
                    command
                } else {
                    command.in_dir(answer)
                })
            }
        }
    }

    fn run_reply(&mut self, command: ScratchCommand) -> Reply {
        match self.run(command) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("command failed: {}", e);
                Reply::Message(format!("error: {}", e))
            }
        }
    }

    /// Start a scratch run, hiding the visible terminal window first.
    fn run(&mut self, command: ScratchCommand) -> Result<Reply> {
        if self.manager.visible(&self.host).is_some() {
            self.manager.toggle(&mut self.host)?;
        }
        self.runner.run(&mut self.host, &command)?;
        Ok(Reply::None)
    }

    /// Re-layout windows after the host editor was resized.
    pub fn relayout(&mut self) -> Reply {
        match self.manager.relayout(&mut self.host) {
            Ok(()) => Reply::None,
            Err(e) => Reply::Message(format!("error: {}", e)),
        }
    }

    /// Route one job event to its owner.
    ///
    /// Must be called from within a tokio runtime: exits of scratch commands
    /// schedule their close timer here.
    pub fn handle_event(&mut self, event: JobEvent) {
        let job = event.job;
        match event.kind {
            JobEventKind::Output(bytes) => {
                if !self.manager.on_output(&mut self.host, job, &bytes) {
                    debug!(%job, "output for unknown job dropped");
                }
            }
            JobEventKind::Line(source, text) => {
                if !self.runner.on_line(&mut self.host, job, &text) {
                    debug!(%job, ?source, "line for unknown job dropped");
                }
            }
            JobEventKind::Exited(code) => {
                if self.manager.on_exit(&mut self.host, job, code) {
                    self.host.processes.reap(job);
                } else if let Some(delay) = self.runner.on_exit(&mut self.host, job, code) {
                    self.schedule_close(job, delay);
                } else {
                    debug!(%job, ?code, "exit of unknown job");
                    self.host.processes.reap(job);
                }
            }
            JobEventKind::CloseDue => {
                self.runner.on_close_due(&mut self.host, job);
            }
        }
    }

    fn schedule_close(&self, job: JobId, delay: Duration) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if events.send(JobEvent::close_due(job)).is_err() {
                debug!(%job, "close timer fired after shutdown");
            }
        });
    }

    /// Terminate all scratch commands and kill every session.
    pub fn shutdown(&mut self) {
        self.pending = None;
        self.runner.shutdown(&mut self.host);
        self.manager.kill_all(&mut self.host);
    }

    fn list(&self) -> String {
        let ids = self.manager.list();
        if ids.is_empty() {
            return "no sessions".to_string();
        }
        let current = self.manager.current();
        ids.iter()
            .map(|id| {
                let marker = if *id == current { '*' } else { ' ' };
                format!("{} {}", marker, id)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn status(&self) -> String {
        let running = self.runner.active().len();
        let mut status = format!("Terminal {}", self.manager.status());
        if running > 0 {
            status.push_str(&format!(", {} scratch window(s)", running));
        }
        status
    }
}
