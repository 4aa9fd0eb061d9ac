//! Go toolchain resolution and activation for goswap.
//!
//! This crate handles:
//! - Matching a requested version against the release catalog
//! - Indexing the versions installed under a root directory
//! - Choosing which slot a new version takes over
//! - Repointing slot symlinks
//! - Downloading and unpacking release archives

pub mod acquire;
pub mod activate;
pub mod archive;
pub mod catalog;
pub mod download;
pub mod local;
pub mod platform;
pub mod resolve;

pub use acquire::{AcquireOutcome, AcquireSettings, Acquirer};
pub use activate::activate;
pub use archive::{ExtractSummary, extract, install_staged};
pub use catalog::{
    CatalogChannel, Release, ReleaseCatalog, ReleaseFile, StableMatch, find_latest_unstable,
    find_release_file, resolve_release,
};
pub use download::{ArchiveFetcher, HttpClient, NetworkStream, download_url};
pub use local::{LocalIndex, LocalInstall};
pub use platform::Platform;
pub use resolve::{ActivationPlan, plan_activation};
