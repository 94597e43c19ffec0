use thiserror::Error;

use crate::template::TemplateError;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Invalid log format `{template}`: {source}")]
    InvalidTemplate {
        template: String,
        #[source]
        source: TemplateError,
    },
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
    #[error("Logger has been already initialized")]
    AlreadyInitialized,
    #[error("Failed to replace console handler: {0}")]
    ReloadFailed(String),
}
