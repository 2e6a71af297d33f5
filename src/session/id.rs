//! Session identifier type.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Dense ordinal identifying a terminal session within one registry.
///
/// Ids start at 1 and stay contiguous: killing a session shifts every
/// higher id down by one, so an id must not be held across a kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(NonZeroU32);

impl SessionId {
    /// The first id handed out by an empty registry.
    pub const FIRST: SessionId = SessionId(NonZeroU32::MIN);

    /// Create a SessionId from a raw value. Returns `None` for 0.
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    /// Get the raw value.
    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// The id immediately below this one, if any.
    pub(crate) fn pred(&self) -> Option<Self> {
        Self::new(self.get() - 1)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing a session id from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSessionIdError(String);

impl fmt::Display for ParseSessionIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid session number: '{}'", self.0)
    }
}

impl std::error::Error for ParseSessionIdError {}

impl FromStr for SessionId {
    type Err = ParseSessionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .trim_start_matches('#')
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ParseSessionIdError(s.to_string()))
    }
}
