//! Index of Go versions installed under an installation root.
//!
//! Every immediate child whose name embeds a version (`1.14.6`,
//! `go1.13.14`, `1.16rc1`) is an install, keyed by its `major.minor` slot.
//! Slot entries may be real directories or symlinks to another version; a
//! symlink is recorded with the version its target serves.

use goswap_core::{Error, Result, Slot, VersionSpec};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An installed version on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalInstall {
    /// Version number the entry serves (e.g. `1.14.6`): taken from the
    /// entry name for directories, from the resolved target for symlinks.
    pub version: String,
    /// Path of the entry under the root.
    pub path: PathBuf,
    /// Symlink whose target does not resolve.
    pub dangling: bool,
}

impl LocalInstall {
    pub fn new(version: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            version: version.into(),
            path: path.into(),
            dangling: false,
        }
    }

    /// Mark the entry as a symlink that no longer resolves.
    pub fn into_dangling(mut self) -> Self {
        self.dangling = true;
        self
    }

    /// Version with the product tag, for messages (e.g. `go1.14.6`).
    pub fn tagged(&self) -> String {
        format!("{}{}", goswap_core::version::PRODUCT_TAG, self.version)
    }

    fn spec(&self) -> Option<VersionSpec> {
        VersionSpec::parse(&self.version).ok()
    }
}

/// Installed versions keyed by slot, rebuilt from disk on every scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIndex {
    slots: BTreeMap<Slot, LocalInstall>,
}

impl LocalIndex {
    /// Scan the immediate children of `root`.
    ///
    /// A missing root yields an empty index. Entries starting with `.` are
    /// staging or temporary paths and are ignored, as are plain files.
    pub fn scan(root: &Path) -> Result<Self> {
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Installation root {} does not exist", root.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::io("Failed to read installation root", root, e)),
        };

        let mut index = Self::default();

        for entry in entries {
            let entry =
                entry.map_err(|e| Error::io("Failed to read installation root", root, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                debug!("Skipping non UTF-8 entry {:?}", entry.path());
                continue;
            };

            if name.starts_with('.') {
                continue;
            }

            let file_type = entry
                .file_type()
                .map_err(|e| Error::io("Failed to inspect entry", entry.path(), e))?;
            if !file_type.is_dir() && !file_type.is_symlink() {
                debug!("Skipping file {}", entry.path().display());
                continue;
            }

            let Some(spec) = VersionSpec::find_in(name) else {
                debug!("No version in {}", entry.path().display());
                continue;
            };

            let install = if file_type.is_symlink() {
                resolve_link(&entry.path(), spec.number())
            } else {
                LocalInstall::new(spec.number(), entry.path())
            };
            index.insert(spec.slot(), install);
        }

        debug!("Found {} local versions in {}", index.len(), root.display());
        Ok(index)
    }

    /// Insert an install under `slot`, resolving collisions
    /// deterministically: a live entry beats a dangling one, then the higher
    /// served version wins, then the lexicographically last path.
    pub fn insert(&mut self, slot: Slot, install: LocalInstall) {
        let Some(existing) = self.slots.get(&slot) else {
            self.slots.insert(slot, install);
            return;
        };

        let wins = (!install.dangling)
            .cmp(&!existing.dangling)
            .then_with(|| install.spec().cmp(&existing.spec()))
            .then_with(|| install.path.cmp(&existing.path))
            .is_gt();
        debug!(
            "Slot {} collision: {} vs {}, keeping {}",
            slot,
            existing.path.display(),
            install.path.display(),
            if wins { "the latter" } else { "the former" }
        );
        if wins {
            self.slots.insert(slot, install);
        }
    }

    /// Get the install occupying a slot.
    pub fn get(&self, slot: &Slot) -> Option<&LocalInstall> {
        self.slots.get(slot)
    }

    /// Find an install by exact version number.
    pub fn find_version(&self, version: &str) -> Option<&LocalInstall> {
        self.slots.values().find(|install| install.version == version)
    }

    /// Iterate over installs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&Slot, &LocalInstall)> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Record a slot symlink with the version its final target serves.
///
/// Link chains are followed to the end. A target whose name carries no
/// version keeps the entry's own version; an unresolvable one is dangling.
fn resolve_link(path: &Path, own_version: String) -> LocalInstall {
    let target = match fs::canonicalize(path) {
        Ok(target) => target,
        Err(e) => {
            debug!("{} does not resolve: {}", path.display(), e);
            return LocalInstall::new(own_version, path).into_dangling();
        }
    };

    let served = target
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(VersionSpec::find_in);

    match served {
        Some(spec) => {
            debug!("{} serves {}", path.display(), spec.tagged());
            LocalInstall::new(spec.number(), path)
        }
        None => LocalInstall::new(own_version, path),
    }
}
