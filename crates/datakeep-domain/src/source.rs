//! Source module - which tier served a read

use serde::{Deserialize, Serialize};

/// Tier that satisfied a read-through request
///
/// Every resolved read is tagged so callers can tell a hot-tier hit from a
/// cold-tier fallback:
/// - Local: the filesystem tier holding recent artifacts
/// - Remote: the object-storage tier holding the full history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Served from the local filesystem tier
    Local,

    /// Served from the remote object-storage tier
    Remote,
}

impl Source {
    /// Get the source name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Local => "local",
            Source::Remote => "remote",
        }
    }

    /// Parse a source from a string (internal use)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "local" => Some(Source::Local),
            "remote" => Some(Source::Remote),
            _ => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid source: {}", s))
    }
}
