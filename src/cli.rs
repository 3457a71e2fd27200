//! Command-line interface for live-preview.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
///
/// Options are `None` when absent so config-file and environment values
/// survive layering; only flags the user actually passed override them.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Directory to serve. Defaults to the current directory.
    pub root: Option<PathBuf>,
    /// Preferred port for the preview listener.
    pub port: Option<u16>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Debounce window in milliseconds for coalescing edits.
    pub debounce_ms: Option<u64>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
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
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('d') | Long("debounce") => {
                let value: String = parser.value()?.parse()?;
                result.debounce_ms = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("debounce", value))?,
                );
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                if result.root.is_some() {
                    return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
                }
                result.root = Some(PathBuf::from(val));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"live-preview {version}
Ultra-lightweight live preview server for static HTML and CSS

USAGE:
    live-preview [OPTIONS] [ROOT]

ARGS:
    [ROOT]                  Directory to serve [default: .]

OPTIONS:
    -p, --port <PORT>       Preferred port; taken ports are skipped upward [default: 3000]
    -d, --debounce <MS>     Quiet window for coalescing edits [default: 140]
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    LIVE_PREVIEW_PORT         Preferred port (overrides config)
    LIVE_PREVIEW_DEBOUNCE_MS  Debounce window (overrides config)
    LIVE_PREVIEW_LOG_LEVEL    Log level (overrides config)
    RUST_LOG                  Alternative log level setting

EXAMPLES:
    # Serve the current directory on the first free port at or above 3000
    live-preview

    # Serve a site directory on a specific preferred port
    live-preview -p 8080 ./site

    # Start with config file
    live-preview -c preview.json ./site
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("live-preview {}", env!("CARGO_PKG_VERSION"));
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

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        std::iter::once("live-preview")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_default_args() {
        let result = parse_args_from(args(&[])).unwrap();
        assert!(result.root.is_none());
        assert!(result.port.is_none());
        assert!(result.debounce_ms.is_none());
        assert!(!result.help);
    }

    #[test]
    fn test_root_positional() {
        let result = parse_args_from(args(&["./site"])).unwrap();
        assert_eq!(result.root, Some(PathBuf::from("./site")));
    }

    #[test]
    fn test_extra_positional_rejected() {
        let result = parse_args_from(args(&["./site", "./other"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_port() {
        let result = parse_args_from(args(&["-p", "8080"])).unwrap();
        assert_eq!(result.port, Some(8080));

        let result = parse_args_from(args(&["--port", "9000"])).unwrap();
        assert_eq!(result.port, Some(9000));
    }

    #[test]
    fn test_debounce() {
        let result = parse_args_from(args(&["-d", "250"])).unwrap();
        assert_eq!(result.debounce_ms, Some(250));

        let result = parse_args_from(args(&["--debounce", "0"])).unwrap();
        assert_eq!(result.debounce_ms, Some(0));
    }

    #[test]
    fn test_config_file() {
        let result = parse_args_from(args(&["-c", "/etc/preview.json"])).unwrap();
        assert_eq!(result.config, Some(PathBuf::from("/etc/preview.json")));
    }

    #[test]
    fn test_help_flag() {
        let result = parse_args_from(args(&["-h"])).unwrap();
        assert!(result.help);

        let result = parse_args_from(args(&["--help"])).unwrap();
        assert!(result.help);
    }

    #[test]
    fn test_version_flag() {
        let result = parse_args_from(args(&["-V"])).unwrap();
        assert!(result.version);

        let result = parse_args_from(args(&["--version"])).unwrap();
        assert!(result.version);
    }

    #[test]
    fn test_log_level() {
        let result = parse_args_from(args(&["-l", "debug"])).unwrap();
        assert_eq!(result.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_invalid_port() {
        let result = parse_args_from(args(&["-p", "invalid"]));
        assert!(result.is_err());

        let result = parse_args_from(args(&["-p", "70000"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_debounce() {
        let result = parse_args_from(args(&["-d", "soon"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_flag() {
        let result = parse_args_from(args(&["--no-such-flag"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_combined_options() {
        let result = parse_args_from(args(&[
            "-p",
            "8080",
            "-d",
            "200",
            "-l",
            "debug",
            "./site",
        ]))
        .unwrap();

        assert_eq!(result.port, Some(8080));
        assert_eq!(result.debounce_ms, Some(200));
        assert_eq!(result.log_level, Some("debug".to_string()));
        assert_eq!(result.root, Some(PathBuf::from("./site")));
    }
}
