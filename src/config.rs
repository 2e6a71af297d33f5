//! Configuration management for floatterm.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values
//!
//! The result is validated before use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::runner::DEFAULT_CLOSE_DELAY;
use crate::session::ManagerOptions;
use crate::window::{BorderStyle, EditorSize, FloatStyle};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Floating window appearance.
    pub window: WindowSection,
    /// Terminal session shell.
    pub shell: ShellSection,
    /// Scratch command runner.
    pub runner: RunnerSection,
    /// Host editor dimensions for the console host.
    pub display: DisplaySection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Window configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSection {
    /// Width as a fraction of editor columns.
    pub width: f64,
    /// Height as a fraction of editor rows.
    pub height: f64,
    /// Border style.
    pub border: BorderStyle,
    /// Transparency level (0-100).
    pub winblend: u8,
    /// Show the `Terminal n/total` title on session windows.
    pub title: bool,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: 0.8,
            height: 0.8,
            border: BorderStyle::Rounded,
            winblend: 0,
            title: true,
        }
    }
}

/// Shell configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Shell program. Defaults to `$SHELL`.
    pub program: Option<String>,
    /// Working directory for new sessions.
    pub cwd: Option<PathBuf>,
}

/// Runner configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSection {
    /// Delay between a command exiting and its window closing.
    pub close_delay_ms: u64,
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            close_delay_ms: DEFAULT_CLOSE_DELAY.as_millis() as u64,
        }
    }
}

/// Display configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub rows: u16,
    pub cols: u16,
}

impl Default for DisplaySection {
    fn default() -> Self {
        let size = EditorSize::default();
        Self {
            rows: size.rows,
            cols: size.cols,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or filter directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(shell) = std::env::var("FLOATTERM_SHELL") {
            if !shell.is_empty() {
                self.shell.program = Some(shell);
            }
        }

        if let Ok(level) = std::env::var("FLOATTERM_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref shell) = args.shell {
            self.shell.program = Some(shell.clone());
        }
        if let Some(width) = args.width {
            self.window.width = width;
        }
        if let Some(height) = args.height {
            self.window.height = height;
        }
        if let Some(border) = args.border {
            self.window.border = border;
        }
        if let Some(size) = args.size {
            self.display.rows = size.rows;
            self.display.cols = size.cols;
        }
        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("window.width", self.window.width),
            ("window.height", self.window.height),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.window.winblend > 100 {
            return Err(ConfigError::Invalid(format!(
                "window.winblend must be at most 100, got {}",
                self.window.winblend
            )));
        }
        if self.display.rows == 0 || self.display.cols == 0 {
            return Err(ConfigError::Invalid(
                "display.rows and display.cols must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Window style for session and scratch windows.
    pub fn float_style(&self) -> FloatStyle {
        FloatStyle {
            width: self.window.width,
            height: self.window.height,
            border: self.window.border,
            winblend: self.window.winblend,
        }
    }

    /// Options for the terminal session manager.
    pub fn manager_options(&self) -> ManagerOptions {
        ManagerOptions {
            style: self.float_style(),
            shell: self.shell.program.clone(),
            cwd: self.shell.cwd.clone(),
            titles: self.window.title,
        }
    }

    /// Scratch window close delay.
    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.runner.close_delay_ms)
    }

    /// Host editor size.
    pub fn editor_size(&self) -> EditorSize {
        EditorSize::new(self.display.rows, self.display.cols)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// A value is out of range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
