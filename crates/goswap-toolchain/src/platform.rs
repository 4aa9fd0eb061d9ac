//! Target platform of downloaded archives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An OS/architecture pair, spelled the way the release catalog spells it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// Create a platform from catalog names (e.g. `linux`, `amd64`).
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform goswap targets unless configured otherwise.
    pub fn linux_amd64() -> Self {
        Self::new("linux", "amd64")
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::linux_amd64()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
