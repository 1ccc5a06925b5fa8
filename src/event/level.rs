use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Event severity. Variants are declared from least to most severe so the
/// derived ordering gives `Fatal > Error > Warning > Info > Debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Every detail of the execution, for tracing a problem down.
    Debug,
    /// General details on the running application, usually plain messages.
    Info,
    /// Expected and handled bad behaviour.
    Warning,
    /// Unexpected behaviour that stopped the code from working properly.
    Error,
    /// Unrecoverable failures.
    Fatal,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warning" | "warn" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            other => Err(format!("unknown level: {other}")),
        }
    }
}
