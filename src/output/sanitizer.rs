//! Output sanitization for stripping ANSI escape codes.

use vte::{Params, Parser, Perform};

/// Output sanitizer using VTE parser.
pub struct OutputSanitizer;

impl OutputSanitizer {
    /// Strip ANSI escape codes from raw bytes.
    ///
    /// Returns clean UTF-8 text with all control sequences removed.
    pub fn strip_ansi(input: &[u8]) -> String {
        let mut extractor = PlainTextExtractor::new();
        let mut parser = Parser::new();

        parser.advance(&mut extractor, input);

        extractor.into_string()
    }

    /// Strip ANSI codes from a string.
    pub fn strip_ansi_str(input: &str) -> String {
        Self::strip_ansi(input.as_bytes())
    }

    /// Clean one line of command output for display.
    ///
    /// Returns `None` when nothing visible is left.
    pub fn display_line(input: &str) -> Option<String> {
        let clean = Self::strip_ansi_str(input);
        let clean = clean.trim_end_matches(['\r', '\n']);
        if clean.trim().is_empty() {
            None
        } else {
            Some(clean.to_string())
        }
    }
}

/// VTE performer that extracts plain text.
struct PlainTextExtractor {
    output: String,
}

impl PlainTextExtractor {
    fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    fn into_string(self) -> String {
        self.output
    }
}

impl Perform for PlainTextExtractor {
    fn print(&mut self, c: char) {
        self.output.push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' | b'\r' | b'\t' => self.output.push(char::from(byte)),
            _ => {}
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn csi_dispatch(
        &mut self,
        _params: &Params,
        _intermediates: &[u8],
        _ignore: bool,
        _action: char,
    ) {
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(OutputSanitizer::strip_ansi(b"hello world"), "hello world");
    }

    #[test]
    fn test_strip_color_codes() {
        assert_eq!(OutputSanitizer::strip_ansi(b"\x1b[31mred\x1b[0m"), "red");
    }

    #[test]
    fn test_complex_sequence() {
        let input = b"\x1b[32m\x1b[1mGreen Bold\x1b[0m Normal \x1b[34mBlue\x1b[0m";
        assert_eq!(OutputSanitizer::strip_ansi(input), "Green Bold Normal Blue");
    }

    #[test]
    fn test_osc_title() {
        let input = b"\x1b]0;Window Title\x07actual content";
        assert_eq!(OutputSanitizer::strip_ansi(input), "actual content");
    }

    #[test]
    fn test_preserve_tabs() {
        assert_eq!(OutputSanitizer::strip_ansi(b"col1\tcol2"), "col1\tcol2");
    }

    #[test]
    fn test_utf8_passthrough() {
        assert_eq!(OutputSanitizer::strip_ansi_str("✓ passed"), "✓ passed");
    }

    #[test]
    fn test_display_line() {
        assert_eq!(
            OutputSanitizer::display_line("\x1b[33mwarning\x1b[0m: unused\r"),
            Some("warning: unused".to_string())
        );
        assert_eq!(OutputSanitizer::display_line(""), None);
        assert_eq!(OutputSanitizer::display_line("   \t"), None);
        assert_eq!(OutputSanitizer::display_line("\x1b[0m"), None);
    }

    #[test]
    fn test_display_line_keeps_indent() {
        assert_eq!(
            OutputSanitizer::display_line("    at main.rs:3"),
            Some("    at main.rs:3".to_string())
        );
    }
}
