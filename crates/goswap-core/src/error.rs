//! Error types for goswap.

use std::path::PathBuf;

/// Result type alias using goswap Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes for categorizing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Version string could not be parsed
    MalformedVersion,
    /// No catalog release matches the request
    UnsupportedVersion,
    /// A matching release has no file for the target platform
    FileNotFound,
    /// Enumerating, creating or removing paths failed
    FilesystemError,
    /// No installed slot can be repurposed
    NoLocalSlotAvailable,
    /// Catalog or archive fetch failed
    NetworkError,
    /// Archive content is corrupt or unexpected
    ArchiveError,
    /// Invalid configuration
    ConfigError,
}

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct Fix {
    /// Description of what this fix does
    pub description: String,
}

impl Fix {
    /// Create a fix with just a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Structured error type for goswap.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid version (expected [go]x.y[.z]): {input}")]
    MalformedVersion { input: String },

    #[error("unsupported version: {requested}")]
    UnsupportedVersion { requested: String, fixes: Vec<Fix> },

    #[error("file not found: no {platform} archive for {version}")]
    FileNotFound { version: String, platform: String },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("no local installation of {slot} or an older minor version to replace")]
    NoLocalSlotAvailable {
        slot: String,
        root: PathBuf,
        fixes: Vec<Fix>,
    },

    #[error("network error: {message}")]
    Network {
        message: String,
        url: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("truncated archive entry {path}: expected {expected} bytes, got {actual}")]
    TruncatedEntry {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("unsupported archive entry type {kind} for {path}")]
    UnsupportedEntryType { path: PathBuf, kind: String },

    #[error("archive entry escapes the destination: {path}")]
    UnsafeEntryPath { path: PathBuf },

    #[error("configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::MalformedVersion { .. } => ErrorCode::MalformedVersion,
            Error::UnsupportedVersion { .. } => ErrorCode::UnsupportedVersion,
            Error::FileNotFound { .. } => ErrorCode::FileNotFound,
            Error::Io { .. } => ErrorCode::FilesystemError,
            Error::NoLocalSlotAvailable { .. } => ErrorCode::NoLocalSlotAvailable,
            Error::Network { .. } => ErrorCode::NetworkError,
            Error::TruncatedEntry { .. }
            | Error::UnsupportedEntryType { .. }
            | Error::UnsafeEntryPath { .. } => ErrorCode::ArchiveError,
            Error::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Get suggested fixes for this error.
    pub fn fixes(&self) -> &[Fix] {
        match self {
            Error::UnsupportedVersion { fixes, .. } => fixes,
            Error::NoLocalSlotAvailable { fixes, .. } => fixes,
            _ => &[],
        }
    }

    /// Get the filesystem path this error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::Io { path, .. } | Error::Config { path, .. } => path.as_deref(),
            Error::NoLocalSlotAvailable { root, .. } => Some(root),
            Error::TruncatedEntry { path, .. }
            | Error::UnsupportedEntryType { path, .. }
            | Error::UnsafeEntryPath { path } => Some(path),
            _ => None,
        }
    }

    /// Create a malformed version error.
    pub fn malformed_version(input: impl Into<String>) -> Self {
        Error::MalformedVersion {
            input: input.into(),
        }
    }

    /// Create an unsupported version error.
    pub fn unsupported_version(requested: impl Into<String>) -> Self {
        Error::UnsupportedVersion {
            requested: requested.into(),
            fixes: vec![Fix::new(
                "Check https://go.dev/dl/ for the list of published versions",
            )],
        }
    }

    /// Create an I/O error for a path.
    pub fn io(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Error::Io {
            message: message.into(),
            path: Some(path.into()),
            source,
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>, url: impl Into<String>) -> Self {
        Error::Network {
            message: message.into(),
            url: Some(url.into()),
            source: None,
        }
    }
}
