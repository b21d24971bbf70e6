//! Logging setup for CLI output

use log::LevelFilter;

/// Log level for CLI output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Errors only
    Quiet,
    /// Per-epoch progress
    Normal,
    /// Per-batch timing and extra details
    Verbose,
}

impl LogLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            LogLevel::Quiet
        } else if verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }

    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Quiet => LevelFilter::Error,
            LogLevel::Normal => LevelFilter::Info,
            LogLevel::Verbose => LevelFilter::Debug,
        }
    }
}

/// Install the global logger; `RUST_LOG` still wins when set
pub fn init_logging(level: LogLevel) {
    let _ = env_logger::Builder::new()
        .filter_level(level.filter())
        .parse_default_env()
        .format_timestamp_secs()
        .try_init();
}
