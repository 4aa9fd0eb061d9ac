//! Environment variable constants for goswap.

/// Environment variable names used by goswap.
pub struct EnvVars;

impl EnvVars {
    // ─── Global Settings ─────────────────────────────────────────────────────

    /// Path to the goswap configuration file.
    pub const GOSWAP_CONFIG_FILE: &'static str = "GOSWAP_CONFIG_FILE";

    /// Installation root holding the Go version directories.
    pub const GOSWAP_ROOT: &'static str = "GOSWAP_ROOT";

    /// Enable verbose output.
    pub const GOSWAP_VERBOSE: &'static str = "GOSWAP_VERBOSE";

    /// Suppress output.
    pub const GOSWAP_QUIET: &'static str = "GOSWAP_QUIET";

    /// Disable colored output.
    pub const GOSWAP_NO_COLOR: &'static str = "GOSWAP_NO_COLOR";

    /// Enable JSON log output.
    pub const GOSWAP_LOG_JSON: &'static str = "GOSWAP_LOG_JSON";

    // ─── Standard Environment Variables ──────────────────────────────────────

    /// Standard NO_COLOR environment variable.
    pub const NO_COLOR: &'static str = "NO_COLOR";

    /// Standard CLICOLOR environment variable.
    pub const CLICOLOR: &'static str = "CLICOLOR";
}

/// Check if colors should be disabled based on environment.
pub fn no_color() -> bool {
    std::env::var(EnvVars::NO_COLOR).is_ok()
        || std::env::var(EnvVars::GOSWAP_NO_COLOR).is_ok()
        || std::env::var(EnvVars::CLICOLOR)
            .map(|v| v == "0")
            .unwrap_or(false)
}
