use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::logger::LoggerError;

/// Sequence that restores the terminal's default attributes.
pub const RESET: &str = "\x1b[0m";

/// The eight basic ANSI foreground colors, by palette index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AnsiColor {
    Black = 0,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl AnsiColor {
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Bold foreground escape: `ESC[1;<30+index>m`.
    pub const fn sequence(self) -> &'static str {
        match self {
            AnsiColor::Black => "\x1b[1;30m",
            AnsiColor::Red => "\x1b[1;31m",
            AnsiColor::Green => "\x1b[1;32m",
            AnsiColor::Yellow => "\x1b[1;33m",
            AnsiColor::Blue => "\x1b[1;34m",
            AnsiColor::Magenta => "\x1b[1;35m",
            AnsiColor::Cyan => "\x1b[1;36m",
            AnsiColor::White => "\x1b[1;37m",
        }
    }
}

/// Importance tier of a log record, lowest first.
///
/// `tracing` has no level above `ERROR`; a critical record is an `ERROR`
/// event carrying [`CRITICAL_FIELD`](crate::CRITICAL_FIELD) set to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Label rendered for `%(levelname)s`.
    pub const fn name(self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Numeric value rendered for `%(levelno)d`.
    pub const fn value(self) -> u8 {
        match self {
            Severity::Trace => 5,
            Severity::Debug => 10,
            Severity::Info => 20,
            Severity::Warning => 30,
            Severity::Error => 40,
            Severity::Critical => 50,
        }
    }

    /// Color of the label, `None` for severities that stay plain.
    pub const fn color(self) -> Option<AnsiColor> {
        match self {
            Severity::Warning => Some(AnsiColor::Yellow),
            Severity::Info => Some(AnsiColor::Green),
            Severity::Debug => Some(AnsiColor::Blue),
            Severity::Critical | Severity::Error => Some(AnsiColor::Red),
            Severity::Trace => None,
        }
    }

    pub const fn as_level(self) -> Level {
        match self {
            Severity::Trace => Level::TRACE,
            Severity::Debug => Level::DEBUG,
            Severity::Info => Level::INFO,
            Severity::Warning => Level::WARN,
            Severity::Error | Severity::Critical => Level::ERROR,
        }
    }

    /// `EnvFilter` directive admitting this severity and everything above it.
    pub(crate) const fn filter_directive(self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warn",
            Severity::Error | Severity::Critical => "error",
        }
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::ERROR => Severity::Error,
            Level::WARN => Severity::Warning,
            Level::INFO => Severity::Info,
            Level::DEBUG => Severity::Debug,
            _ => Severity::Trace,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Severity {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        match norm.as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" | "fatal" => Ok(Severity::Critical),
            _ => Err(LoggerError::InvalidLogLevel(s.to_string())),
        }
    }
}
