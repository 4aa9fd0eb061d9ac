//! Release catalog types and matching.
//!
//! The catalog itself is an external collaborator ([`ReleaseCatalog`]); this
//! module only decides which file of which release satisfies a request.

use crate::platform::Platform;
use goswap_core::{Error, Result, VersionSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// File kind of installable binary archives.
pub const ARCHIVE_KIND: &str = "archive";

/// One release in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Tagged version (e.g. `go1.14.7`).
    pub version: String,
    /// Whether this is a stable release.
    pub stable: bool,
    /// Downloadable artifacts.
    #[serde(default)]
    pub files: Vec<ReleaseFile>,
}

/// One downloadable artifact of a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFile {
    pub filename: String,
    pub os: String,
    pub arch: String,
    pub version: String,
    pub sha256: String,
    pub size: u64,
    pub kind: String,
}

impl Release {
    /// Parse the release version, `None` for entries the catalog spells oddly.
    pub fn spec(&self) -> Option<VersionSpec> {
        VersionSpec::parse(&self.version).ok()
    }

    /// Find the archive for a platform.
    pub fn file_for(&self, platform: &Platform) -> Option<&ReleaseFile> {
        self.files.iter().find(|file| {
            file.os == platform.os && file.arch == platform.arch && file.kind == ARCHIVE_KIND
        })
    }
}

impl ReleaseFile {
    /// Parse the file's version.
    pub fn spec(&self) -> Result<VersionSpec> {
        VersionSpec::parse(&self.version)
    }
}

/// Which part of the catalog to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogChannel {
    /// Stable releases only.
    Stable,
    /// Stable and unstable releases.
    All,
}

/// Source of release listings, newest release first.
pub trait ReleaseCatalog {
    fn releases(&self, channel: CatalogChannel) -> Result<Vec<Release>>;
}

impl ReleaseCatalog for Vec<Release> {
    fn releases(&self, channel: CatalogChannel) -> Result<Vec<Release>> {
        Ok(match channel {
            CatalogChannel::Stable => self.iter().filter(|r| r.stable).cloned().collect(),
            CatalogChannel::All => self.clone(),
        })
    }
}

/// Outcome of scanning stable releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StableMatch {
    /// A release matched and has a file for the platform.
    Found(ReleaseFile),
    /// Releases matched, but none has a file for the platform.
    NoPlatformFile,
    /// No release matched.
    None,
}

/// Scan stable releases in catalog order for the first match with a file
/// for the platform.
///
/// Catalog order decides which patch wins for a `major.minor` request.
pub fn find_release_file(
    releases: &[Release],
    request: &VersionSpec,
    platform: &Platform,
) -> StableMatch {
    let mut matched_without_file = false;

    for release in releases.iter().filter(|r| r.stable) {
        let Some(spec) = release.spec() else {
            debug!("Skipping unparseable release {}", release.version);
            continue;
        };
        if !spec.is_stable() || !spec.matches_request(request) {
            continue;
        }
        match release.file_for(platform) {
            Some(file) => return StableMatch::Found(file.clone()),
            None => {
                debug!("{} has no {} archive", release.version, platform);
                matched_without_file = true;
            }
        }
    }

    if matched_without_file {
        StableMatch::NoPlatformFile
    } else {
        StableMatch::None
    }
}

/// Pick the newest pre-release of the requested version.
pub fn find_latest_unstable(
    releases: &[Release],
    request: &VersionSpec,
    platform: &Platform,
) -> Result<ReleaseFile> {
    let newest = releases
        .iter()
        .filter(|r| !r.stable)
        .filter_map(|r| r.spec().map(|spec| (spec, r)))
        .filter(|(spec, _)| spec.is_prerelease_of(request))
        .max_by(|(a, ra), (b, rb)| a.cmp(b).then_with(|| ra.version.cmp(&rb.version)));

    let Some((spec, release)) = newest else {
        return Err(Error::unsupported_version(request.literal()));
    };

    debug!("Newest pre-release for {}: {}", request, spec.tagged());

    release
        .file_for(platform)
        .cloned()
        .ok_or_else(|| Error::FileNotFound {
            version: release.version.clone(),
            platform: platform.to_string(),
        })
}

/// Resolve a request to the file to install.
///
/// The unstable listing is only fetched when no stable release matches.
pub fn resolve_release<C>(
    catalog: &C,
    request: &VersionSpec,
    platform: &Platform,
) -> Result<ReleaseFile>
where
    C: ReleaseCatalog + ?Sized,
{
    let stable = catalog.releases(CatalogChannel::Stable)?;

    let stable_miss = match find_release_file(&stable, request, platform) {
        StableMatch::Found(file) => {
            debug!("Found release: {:?}", file);
            return Ok(file);
        }
        miss => miss,
    };

    info!("No stable release for {}, trying to find an unstable release", request);

    let all = catalog.releases(CatalogChannel::All)?;
    match find_latest_unstable(&all, request, platform) {
        Err(Error::UnsupportedVersion { .. }) if stable_miss == StableMatch::NoPlatformFile => {
            Err(Error::FileNotFound {
                version: request.tagged(),
                platform: platform.to_string(),
            })
        }
        result => result,
    }
}
