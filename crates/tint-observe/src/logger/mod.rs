mod config;
mod console;
mod error;
mod log;

pub use config::{DEFAULT_FORMAT, LEVEL_ONLY_FORMAT, LoggerConfig};
pub use console::Console;
pub use error::LoggerError;
pub use log::ColorLogger;

/// Builds a [`ColorLogger`] from `cfg` and installs it as the global default.
///
/// The returned handle keeps configuration access (format, color) to the
/// installed logger.
pub fn logger_init(cfg: &LoggerConfig) -> Result<ColorLogger, LoggerError> {
    let logger = ColorLogger::new(cfg)?;
    logger.init()?;
    Ok(logger)
}
