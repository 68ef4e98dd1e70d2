// SPDX-License-Identifier: MPL-2.0
//! Backends for stream-transport codecs.

use std::fmt;
use std::str::FromStr;

/// How a stream-transport codec reaches its multimedia framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// The framework linked into this process.
    Library,
    /// An external executable driven over its standard streams.
    Process,
}

impl Backend {
    /// Stable lowercase name, as used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Library => "library",
            Backend::Process => "process",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a backend name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBackendError(pub String);

impl fmt::Display for ParseBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown backend '{}' (expected 'library' or 'process')",
            self.0
        )
    }
}

impl std::error::Error for ParseBackendError {}

impl FromStr for Backend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "library" | "lib" | "in-process" => Ok(Backend::Library),
            "process" | "cli" | "subprocess" => Ok(Backend::Process),
            other => Err(ParseBackendError(other.to_string())),
        }
    }
}
