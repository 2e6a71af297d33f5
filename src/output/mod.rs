//! Output processing.
//!
//! - ANSI escape code stripping for scratch command output
//! - Virtual terminal screens for interactive sessions
//!
//! # Example
//!
//! ```
//! use floatterm::output::{OutputSanitizer, TerminalScreen};
//!
//! let clean = OutputSanitizer::strip_ansi(b"\x1b[31mRed text\x1b[0m");
//! assert_eq!(clean, "Red text");
//!
//! let mut screen = TerminalScreen::new(24, 80);
//! screen.process(b"Hello\r\nWorld");
//! assert_eq!(screen.display_lines(), vec!["Hello", "World"]);
//! ```

mod sanitizer;
mod screen;

pub use sanitizer::OutputSanitizer;
pub use screen::TerminalScreen;
