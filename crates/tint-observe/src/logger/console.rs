use std::io::{self, IsTerminal};

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Console stream a logger writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Console {
    #[default]
    Stderr,
    Stdout,
}

impl Console {
    pub fn is_terminal(self) -> bool {
        match self {
            Console::Stderr => io::stderr().is_terminal(),
            Console::Stdout => io::stdout().is_terminal(),
        }
    }

    pub(crate) fn make_writer(self) -> BoxMakeWriter {
        match self {
            Console::Stderr => BoxMakeWriter::new(io::stderr),
            Console::Stdout => BoxMakeWriter::new(io::stdout),
        }
    }
}
