use serde::{Deserialize, Serialize};

use crate::{logger::console::Console, severity::Severity};

/// Right-justified label, source location, message.
pub const DEFAULT_FORMAT: &str = "%(levelname)8s <%(filename)s:%(lineno)d> %(message)s";
/// Right-justified label and message.
pub const LEVEL_ONLY_FORMAT: &str = "%(levelname)8s %(message)s";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub name: String,
    pub level: Severity,
    pub format: String,
    pub use_color: bool,
    pub console: Console,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let console = Console::default();
        let use_color = cfg!(test) || console.is_terminal();
        Self {
            name: "root".to_string(),
            level: Severity::Info,
            format: DEFAULT_FORMAT.to_string(),
            use_color,
            console,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = LoggerConfig::default();
        assert_eq!(cfg.name, "root");
        assert_eq!(cfg.level, Severity::Info);
        assert_eq!(cfg.format, DEFAULT_FORMAT);
        assert_eq!(cfg.console, Console::Stderr);
        assert!(cfg.use_color);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: LoggerConfig = serde_json::from_str(
            r#"{"name":"net","level":"warning","use_color":false,"console":"stdout"}"#,
        )
        .unwrap();
        assert_eq!(cfg.name, "net");
        assert_eq!(cfg.level, Severity::Warning);
        assert_eq!(cfg.format, DEFAULT_FORMAT);
        assert_eq!(cfg.console, Console::Stdout);
        assert!(!cfg.use_color);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = serde_json::from_str::<LoggerConfig>(r#"{"level":"loud"}"#);
        assert!(err.is_err());
    }
}
