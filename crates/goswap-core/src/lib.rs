//! Core types for goswap.
//!
//! This crate provides the shared error type, the version identifier and the
//! environment variable names used across all goswap crates.

pub mod env;
pub mod error;
pub mod version;

pub use env::EnvVars;
pub use error::{Error, ErrorCode, Fix, Result};
pub use version::{Channel, PreReleaseKind, Slot, VersionSpec};

/// Exit codes for the goswap CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    GeneralError = 1,
    /// Usage error (bad arguments, malformed version)
    UsageError = 2,
    /// Configuration error
    ConfigError = 3,
    /// Toolchain resolution or installation error
    ToolchainError = 4,
    /// Catalog or download failure
    NetworkError = 5,
}

impl ExitCode {
    /// Map an error to the exit code reported by the CLI.
    pub fn for_error(error: &Error) -> Self {
        match error.code() {
            ErrorCode::MalformedVersion => ExitCode::UsageError,
            ErrorCode::ConfigError => ExitCode::ConfigError,
            ErrorCode::NetworkError => ExitCode::NetworkError,
            ErrorCode::UnsupportedVersion
            | ErrorCode::FileNotFound
            | ErrorCode::NoLocalSlotAvailable
            | ErrorCode::ArchiveError => ExitCode::ToolchainError,
            ErrorCode::FilesystemError => ExitCode::GeneralError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}
