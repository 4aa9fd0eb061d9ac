//! Global configuration.
//!
//! Every key is optional; missing keys fall back to the built-in defaults.

use crate::{
    CONFIG_FILENAME, DEFAULT_CATALOG_URL, DEFAULT_DOWNLOAD_BASE_URL, DEFAULT_ROOT,
    DEFAULT_TIMEOUT_SECS,
};
use directories::ProjectDirs;
use goswap_core::EnvVars;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Error type for global config operations.
#[derive(Debug, Error)]
pub enum GlobalConfigError {
    #[error("failed to read global config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse global config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize global config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Global configuration.
///
/// # Example
///
/// ```toml
/// # ~/.config/goswap/config.toml
/// root = "/usr/local/golang"
/// download_base_url = "https://dl.google.com/go/"
/// catalog_url = "https://go.dev/dl/?mode=json"
/// timeout_secs = 300
///
/// [platform]
/// os = "linux"
/// arch = "amd64"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Directory holding the installed Go versions
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Base URL archive filenames are appended to
    #[serde(default = "default_download_base_url")]
    pub download_base_url: String,

    /// Release catalog endpoint (JSON)
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// HTTP timeout for the catalog fetch and the archive download
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Target platform of downloaded archives
    #[serde(default)]
    pub platform: PlatformConfig,
}

/// Target OS/architecture pair, named as in the release catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_os")]
    pub os: String,
    #[serde(default = "default_arch")]
    pub arch: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            os: default_os(),
            arch: default_arch(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(DEFAULT_ROOT)
}

fn default_download_base_url() -> String {
    DEFAULT_DOWNLOAD_BASE_URL.to_string()
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_os() -> String {
    "linux".to_string()
}

fn default_arch() -> String {
    "amd64".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            download_base_url: default_download_base_url(),
            catalog_url: default_catalog_url(),
            timeout_secs: default_timeout_secs(),
            platform: PlatformConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Parse global config from a TOML string.
    pub fn parse(s: &str) -> Result<Self, GlobalConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parse global config from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GlobalConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Serialize the global config to a TOML string.
    pub fn to_string(&self) -> Result<String, GlobalConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply environment overrides (`GOSWAP_ROOT`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(root) = std::env::var(EnvVars::GOSWAP_ROOT)
            && !root.is_empty()
        {
            debug!("Using installation root from {}: {}", EnvVars::GOSWAP_ROOT, root);
            self.root = PathBuf::from(root);
        }
        self
    }
}

/// Get the path to the global config file.
///
/// `GOSWAP_CONFIG_FILE` wins over the platform config directory. Returns
/// `None` if the home directory cannot be determined.
pub fn global_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(EnvVars::GOSWAP_CONFIG_FILE)
        && !path.is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let dirs = ProjectDirs::from("dev", "goswap", "goswap")?;
    Some(dirs.config_dir().join(CONFIG_FILENAME))
}

/// Load the global configuration.
///
/// An explicit path must exist. Without one, a missing default file yields
/// the built-in defaults. Environment overrides are applied in both cases.
pub fn load_global_config(explicit: Option<&Path>) -> Result<GlobalConfig, GlobalConfigError> {
    let config = match explicit {
        Some(path) => {
            debug!("Loading global config from: {}", path.display());
            GlobalConfig::from_file(path)?
        }
        None => match global_config_path() {
            Some(path) if path.exists() => {
                debug!("Loading global config from: {}", path.display());
                GlobalConfig::from_file(&path)?
            }
            Some(path) => {
                debug!("Global config file does not exist: {}", path.display());
                GlobalConfig::default()
            }
            None => {
                debug!("Could not determine global config path");
                GlobalConfig::default()
            }
        },
    };

    Ok(config.with_env_overrides())
}
