//! Per-session terminal screen using vt100.

use vt100::Parser;

/// Virtual terminal screen backing a session's buffer.
///
/// Raw pty output is fed in as it arrives; the buffer shown in the floating
/// window mirrors [`TerminalScreen::display_lines`].
pub struct TerminalScreen {
    parser: Parser,
}

impl TerminalScreen {
    /// Create a screen with the given content size.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            parser: Parser::new(rows.max(1), cols.max(1), 0),
        }
    }

    /// Feed raw pty bytes.
    pub fn process(&mut self, input: &[u8]) {
        self.parser.process(input);
    }

    /// Resize, keeping current contents where they fit.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.parser.screen_mut().set_size(rows.max(1), cols.max(1));
    }

    /// Screen dimensions (rows, cols).
    pub fn size(&self) -> (u16, u16) {
        self.parser.screen().size()
    }

    /// Rows of the screen, right-trimmed, without trailing blank rows.
    pub fn display_lines(&self) -> Vec<String> {
        let screen = self.parser.screen();
        let (_, cols) = screen.size();

        let mut lines: Vec<String> = screen
            .rows(0, cols)
            .map(|row| row.trim_end().to_string())
            .collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines
    }
}

impl std::fmt::Debug for TerminalScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalScreen")
            .field("size", &self.size())
            .finish()
    }
}
