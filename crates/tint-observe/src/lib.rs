mod formatter;
mod logger;
mod severity;
pub mod template;

pub use formatter::{CRITICAL_FIELD, ColorFormatter, Record};
pub use logger::*;
pub use severity::{AnsiColor, RESET, Severity};
pub use template::{Template, TemplateError};
