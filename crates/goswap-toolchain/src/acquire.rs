//! The end-to-end acquire flow.
//!
//! Resolve the request against the catalog, reconcile it with the installed
//! versions, then either do nothing, repoint a slot at an existing install,
//! or download, unpack and repoint.

use crate::activate::activate;
use crate::archive::install_staged;
use crate::catalog::{ReleaseCatalog, resolve_release};
use crate::download::{ArchiveFetcher, NetworkStream, download_url};
use crate::local::LocalIndex;
use crate::platform::Platform;
use crate::resolve::{ActivationPlan, plan_activation};
use goswap_core::{Result, VersionSpec};
use goswap_ui::Spinner;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Knobs of an acquire run.
#[derive(Debug, Clone)]
pub struct AcquireSettings {
    /// Platform whose archive is installed.
    pub platform: Platform,
    /// Base URL archive filenames are appended to.
    pub download_base_url: String,
    /// Show a spinner while downloading.
    pub show_progress: bool,
}

impl Default for AcquireSettings {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            download_base_url: "https://dl.google.com/go/".to_string(),
            show_progress: false,
        }
    }
}

/// What an acquire run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The exact version was already active; nothing was written.
    AlreadyInstalled { version: String, path: PathBuf },
    /// A slot was repointed at a version already present on disk.
    ReplacedLocally {
        previous: String,
        version: String,
        path: PathBuf,
    },
    /// The version was downloaded and a slot repointed at it.
    ReplacedRemotely {
        previous: String,
        version: String,
        path: PathBuf,
    },
}

impl AcquireOutcome {
    /// Tagged version that is now active.
    pub fn version(&self) -> &str {
        match self {
            Self::AlreadyInstalled { version, .. }
            | Self::ReplacedLocally { version, .. }
            | Self::ReplacedRemotely { version, .. } => version,
        }
    }

    /// Directory holding the active version.
    pub fn path(&self) -> &Path {
        match self {
            Self::AlreadyInstalled { path, .. }
            | Self::ReplacedLocally { path, .. }
            | Self::ReplacedRemotely { path, .. } => path,
        }
    }

    /// Whether the filesystem was changed.
    pub fn changed(&self) -> bool {
        !matches!(self, Self::AlreadyInstalled { .. })
    }
}

impl fmt::Display for AcquireOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInstalled { version, .. } => {
                write!(f, "Nothing to do: {} already installed.", version)
            }
            Self::ReplacedLocally {
                previous, version, ..
            } => write!(f, "[local] {} has been replaced by {}.", previous, version),
            Self::ReplacedRemotely {
                previous, version, ..
            } => write!(f, "[remote] {} has been replaced by {}.", previous, version),
        }
    }
}

/// Drives one acquire run over a catalog and an archive source.
pub struct Acquirer<C, F> {
    catalog: C,
    fetcher: F,
    settings: AcquireSettings,
}

impl<C, F> Acquirer<C, F>
where
    C: ReleaseCatalog,
    F: ArchiveFetcher,
{
    pub fn new(catalog: C, fetcher: F, settings: AcquireSettings) -> Self {
        Self {
            catalog,
            fetcher,
            settings,
        }
    }

    /// Make `requested` the active version under `root`.
    ///
    /// Fails without touching the filesystem when the version is malformed,
    /// unknown to the catalog, or no slot can be taken over.
    pub fn acquire(&self, root: &Path, requested: &str) -> Result<AcquireOutcome> {
        let request = VersionSpec::parse_request(requested)?;

        let file = resolve_release(&self.catalog, &request, &self.settings.platform)?;
        let target = file.spec()?;
        let dest = root.join(target.number());
        debug!("Target {} at {}", target.tagged(), dest.display());

        let index = LocalIndex::scan(root)?;
        debug!("Found {} local versions under {}", index.len(), root.display());

        let slot = match plan_activation(&target, &index, root)? {
            ActivationPlan::AlreadyInstalled(install) => {
                return Ok(AcquireOutcome::AlreadyInstalled {
                    version: target.tagged(),
                    path: install.path,
                });
            }
            ActivationPlan::ReuseSlot(install) => install,
        };

        if is_real_dir(&dest) {
            info!("{} already present at {}", target.tagged(), dest.display());
            activate(&dest, &slot)?;
            return Ok(AcquireOutcome::ReplacedLocally {
                previous: slot.tagged(),
                version: target.tagged(),
                path: dest,
            });
        }

        self.download(root, &dest, &file.filename, &target)?;
        activate(&dest, &slot)?;

        Ok(AcquireOutcome::ReplacedRemotely {
            previous: slot.tagged(),
            version: target.tagged(),
            path: dest,
        })
    }

    fn download(
        &self,
        root: &Path,
        dest: &Path,
        filename: &str,
        target: &VersionSpec,
    ) -> Result<()> {
        let url = download_url(&self.settings.download_base_url, filename);
        info!("Downloading {}", url);

        let spinner = if self.settings.show_progress {
            Spinner::new(format!("Downloading {}", target.tagged()))
        } else {
            Spinner::hidden()
        };

        let result = self.fetcher.fetch(&url).and_then(|body| {
            let mut stream = NetworkStream::new(body, url.as_str());
            let installed = install_staged(root, dest, &mut stream);
            installed.map_err(|e| stream.into_error().unwrap_or(e))
        });

        match result {
            Ok(summary) => {
                spinner.finish_success(format!(
                    "Installed {} ({} files)",
                    target.tagged(),
                    summary.files
                ));
                debug!(
                    "Extracted {} files, {} directories, {} bytes",
                    summary.files, summary.directories, summary.bytes
                );
                Ok(())
            }
            Err(e) => {
                spinner.finish_error(format!("Failed to install {}", target.tagged()));
                Err(e)
            }
        }
    }
}

/// A directory that is not a symlink.
///
/// A slot link sitting at the destination path serves some other version
/// and does not count as an install of the target.
fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}
