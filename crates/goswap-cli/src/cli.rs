//! CLI argument parsing.

use clap::Parser;
use goswap_core::EnvVars;
use std::path::PathBuf;

use crate::styles::STYLES;

/// goswap - Go toolchain version switcher
#[derive(Parser, Debug)]
#[command(name = "goswap")]
#[command(author, version, about = "Switch the active Go toolchain version")]
#[command(long_about = None)]
#[command(styles = STYLES)]
#[command(after_help = "Examples:
  goswap 1.14      latest 1.14.x release
  goswap 1.14.7    exact release
  goswap 1.16      newest 1.16 pre-release if 1.16 is not out yet")]
pub struct Cli {
    /// Go version to activate: major.minor[.patch], optionally prefixed with `go`
    #[arg(value_name = "VERSION")]
    pub requested: String,

    /// Installation root holding the Go versions
    #[arg(long, value_name = "DIR", env = EnvVars::GOSWAP_ROOT)]
    pub dest: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "FILE", env = EnvVars::GOSWAP_CONFIG_FILE)]
    pub config_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, env = EnvVars::GOSWAP_VERBOSE)]
    pub verbose: bool,

    /// Suppress output (use twice for complete silence)
    #[arg(short, long, action = clap::ArgAction::Count, env = EnvVars::GOSWAP_QUIET)]
    pub quiet: u8,

    /// Disable colored output
    #[arg(long, env = EnvVars::GOSWAP_NO_COLOR)]
    pub no_color: bool,
}
