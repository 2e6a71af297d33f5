//! Command-line interface for floatterm.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::window::{BorderStyle, EditorSize};

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level or filter directive.
    pub log_level: Option<String>,
    /// Shell program for terminal sessions.
    pub shell: Option<String>,
    /// Window width fraction.
    pub width: Option<f64>,
    /// Window height fraction.
    pub height: Option<f64>,
    /// Window border style.
    pub border: Option<BorderStyle>,
    /// Host editor size.
    pub size: Option<EditorSize>,
    /// Record process requests instead of starting processes.
    pub dry_run: bool,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Short('s') | Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Long("width") => {
                result.width = Some(fraction("width", parser.value()?.parse()?)?);
            }
            Long("height") => {
                result.height = Some(fraction("height", parser.value()?.parse()?)?);
            }
            Long("border") => {
                let value: String = parser.value()?.parse()?;
                result.border = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("border", value))?,
                );
            }
            Long("size") => {
                let value: String = parser.value()?.parse()?;
                result.size = Some(
                    parse_size(&value).ok_or(ArgsError::InvalidValue("size", value))?,
                );
            }
            Long("dry-run") => {
                result.dry_run = true;
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

fn fraction(name: &'static str, value: String) -> Result<f64, ArgsError> {
    match value.parse::<f64>() {
        Ok(v) if v > 0.0 && v <= 1.0 => Ok(v),
        _ => Err(ArgsError::InvalidValue(name, value)),
    }
}

/// Parse `ROWSxCOLS`.
fn parse_size(value: &str) -> Option<EditorSize> {
    let (rows, cols) = value.split_once(['x', 'X'])?;
    let rows: u16 = rows.trim().parse().ok()?;
    let cols: u16 = cols.trim().parse().ok()?;
    (rows > 0 && cols > 0).then(|| EditorSize::new(rows, cols))
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"floatterm {version}
Floating terminal sessions and scratch command runner

USAGE:
    floatterm [OPTIONS]

OPTIONS:
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -s, --shell <PROGRAM>   Shell for terminal sessions [default: $SHELL]
        --width <FRAC>      Window width as a fraction of the editor [default: 0.8]
        --height <FRAC>     Window height as a fraction of the editor [default: 0.8]
        --border <STYLE>    none, single, double, rounded, solid, shadow [default: rounded]
        --size <ROWSxCOLS>  Editor size [default: 24x80]
        --dry-run           Record process requests instead of starting processes
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    FLOATTERM_SHELL         Shell program (overrides config)
    FLOATTERM_LOG_LEVEL     Log level (overrides config)
    RUST_LOG                Alternative log level setting

Type `help` at the prompt for the list of session commands.
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("floatterm {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
