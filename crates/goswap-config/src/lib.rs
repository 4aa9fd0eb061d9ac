//! Configuration for goswap.
//!
//! Global config is stored at `~/.config/goswap/config.toml` (or platform
//! equivalent) and can be pointed elsewhere with `GOSWAP_CONFIG_FILE`.

pub mod global;

pub use global::{
    GlobalConfig, GlobalConfigError, PlatformConfig, global_config_path, load_global_config,
};

/// The config filename inside the config directory.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Default installation root.
pub const DEFAULT_ROOT: &str = "/usr/local/golang";

/// Default base URL for archive downloads.
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://dl.google.com/go/";

/// Default release catalog endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://go.dev/dl/?mode=json";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
