//! Session bookkeeping: dense ids, current pointer, renumbering.

use std::collections::BTreeMap;

use super::SessionId;
use crate::output::TerminalScreen;
use crate::process::JobId;
use crate::window::{BufferId, WindowId};

/// One terminal session.
#[derive(Debug)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) buffer: Option<BufferId>,
    pub(crate) window: Option<WindowId>,
    pub(crate) process: Option<JobId>,
    pub(crate) screen: TerminalScreen,
}

impl Session {
    fn new(id: SessionId, screen: TerminalScreen) -> Self {
        Self {
            id,
            buffer: None,
            window: None,
            process: None,
            screen,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Buffer holding the session's terminal contents.
    pub fn buffer(&self) -> Option<BufferId> {
        self.buffer
    }

    /// Window showing the session, if one was opened and not yet hidden.
    pub fn window(&self) -> Option<WindowId> {
        self.window
    }

    /// Shell job bound to the session while it runs.
    pub fn process(&self) -> Option<JobId> {
        self.process
    }

    pub fn screen(&self) -> &TerminalScreen {
        &self.screen
    }
}

/// Direction for cycling through sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Owned registry of terminal sessions.
///
/// Invariants:
/// - ids are exactly `1..=len()`
/// - `current()` names an existing session unless the registry is empty,
///   in which case it is 1
/// - the next id handed out is `len() + 1`
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: BTreeMap<SessionId, Session>,
    current: SessionId,
    next_id: SessionId,
}

impl SessionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            sessions: BTreeMap::new(),
            current: SessionId::FIRST,
            next_id: SessionId::FIRST,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Sessions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.values_mut()
    }

    /// Sorted ids of existing sessions.
    pub fn list(&self) -> Vec<SessionId> {
        self.sessions.keys().copied().collect()
    }

    pub fn current(&self) -> SessionId {
        self.current
    }

    /// Id the next allocated session will receive.
    pub fn next_id(&self) -> SessionId {
        self.next_id
    }

    /// Add a session with a fresh id and make it current.
    pub(crate) fn allocate(&mut self, screen: TerminalScreen) -> SessionId {
        let id = self.next_id;
        self.sessions.insert(id, Session::new(id, screen));
        self.current = id;
        self.next_id = dense_id(self.sessions.len() + 1);
        id
    }

    /// Make `id` current. Returns `false` (and changes nothing) if unknown.
    pub(crate) fn set_current(&mut self, id: SessionId) -> bool {
        if self.contains(id) {
            self.current = id;
            true
        } else {
            false
        }
    }

    /// Neighbour of the current session in circular id order.
    ///
    /// Returns `None` when the registry is empty.
    pub fn step(&self, direction: Direction) -> Option<SessionId> {
        let ids = self.list();
        let len = ids.len();
        if len == 0 {
            return None;
        }
        let pos = ids.iter().position(|id| *id == self.current).unwrap_or(0);
        let target = match direction {
            Direction::Next => (pos + 1) % len,
            Direction::Previous => (pos + len - 1) % len,
        };
        Some(ids[target])
    }

    /// Remove a session and close the gap it leaves.
    ///
    /// Every id above `id` moves down by one. If `id` was current, the
    /// smallest remaining id becomes current (1 when nothing remains);
    /// otherwise current follows its session to its new id.
    pub(crate) fn remove(&mut self, id: SessionId) -> Option<Session> {
        let removed = self.sessions.remove(&id)?;

        let tail = self.sessions.split_off(&id);
        for (old, mut session) in tail {
            if let Some(new) = old.pred() {
                session.id = new;
                self.sessions.insert(new, session);
            }
        }

        if self.current == id {
            self.current = self
                .sessions
                .keys()
                .next()
                .copied()
                .unwrap_or(SessionId::FIRST);
        } else if self.current > id {
            if let Some(shifted) = self.current.pred() {
                self.current = shifted;
            }
        }
        self.next_id = dense_id(self.sessions.len() + 1);

        Some(removed)
    }

    /// Session whose window handle is set, if any.
    pub fn windowed(&self) -> Option<SessionId> {
        self.sessions
            .values()
            .find(|s| s.window.is_some())
            .map(|s| s.id)
    }

    /// Session bound to a shell job.
    pub fn find_by_job(&self, job: JobId) -> Option<SessionId> {
        self.sessions
            .values()
            .find(|s| s.process == Some(job))
            .map(|s| s.id)
    }

    /// `(current, total)` for the session indicator.
    pub fn status(&self) -> (u32, usize) {
        if self.is_empty() {
            (0, 0)
        } else {
            (self.current.get(), self.len())
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn dense_id(n: usize) -> SessionId {
    u32::try_from(n)
        .ok()
        .and_then(SessionId::new)
        .unwrap_or(SessionId::FIRST)
}
