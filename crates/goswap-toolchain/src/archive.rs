//! Streaming extraction of gzip-compressed tar archives.

use crate::activate::{DIR_MODE, create_dir_all};
use flate2::read::GzDecoder;
use goswap_core::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::debug;

/// Prefix of staging directories under the installation root.
pub const STAGING_PREFIX: &str = ".staging-";

/// What an extraction wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

/// Extract a `.tar.gz` stream into `dest`.
///
/// Only regular files and directories are accepted. Each file must deliver
/// exactly the byte count its header declares.
pub fn extract<R: Read>(dest: &Path, stream: R) -> Result<ExtractSummary> {
    create_dir_all(dest)?;

    debug!("Extracting archive to {}", dest.display());

    let mut archive = Archive::new(GzDecoder::new(stream));
    let entries = archive
        .entries()
        .map_err(|e| Error::io("Failed to read archive", dest, e))?;

    let mut summary = ExtractSummary::default();

    for entry in entries {
        let mut entry = entry.map_err(|e| Error::io("Failed to read archive entry", dest, e))?;

        let name = entry
            .path()
            .map_err(|e| Error::io("Invalid archive entry path", dest, e))?
            .into_owned();
        let relative = relative_entry_path(&name)?;
        let abs = dest.join(&relative);

        let header = entry.header();
        let entry_type = header.entry_type();
        let mode = header
            .mode()
            .map_err(|e| Error::io("Invalid archive entry mode", &name, e))?;

        if entry_type.is_file() {
            if relative.as_os_str().is_empty() {
                return Err(Error::UnsafeEntryPath { path: name });
            }
            let declared = entry.size();
            let written = write_file(&abs, &mut entry, mode)?;
            if written != declared {
                return Err(Error::TruncatedEntry {
                    path: name,
                    expected: declared,
                    actual: written,
                });
            }
            summary.files += 1;
            summary.bytes += written;
        } else if entry_type.is_dir() {
            create_dir_all(&abs)?;
            summary.directories += 1;
        } else {
            return Err(Error::UnsupportedEntryType {
                path: name,
                kind: format!("{:?}", entry_type),
            });
        }
    }

    debug!(
        "Extracted {} files, {} directories ({} bytes)",
        summary.files, summary.directories, summary.bytes
    );

    Ok(summary)
}

/// Extract into a fresh staging directory under `root`, then move it to
/// `dest` once the whole archive has been written.
///
/// On failure the staging directory is removed and `dest` is not created.
pub fn install_staged<R: Read>(root: &Path, dest: &Path, stream: R) -> Result<ExtractSummary> {
    create_dir_all(root)?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(root)
        .map_err(|e| Error::io("Failed to create staging directory", root, e))?;

    let summary = extract(staging.path(), stream)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staging.path(), fs::Permissions::from_mode(DIR_MODE))
            .map_err(|e| Error::io("Failed to set directory permissions", staging.path(), e))?;
    }

    remove_link(dest)?;
    fs::rename(staging.path(), dest)
        .map_err(|e| Error::io("Failed to move staged install into place", dest, e))?;

    debug!("Moved {} to {}", staging.path().display(), dest.display());
    Ok(summary)
}

/// Remove a symlink at `dest`; a slot link there is replaced by the install.
fn remove_link(dest: &Path) -> Result<()> {
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.file_type().is_symlink() => {
            debug!("Replacing symlink {} with the install", dest.display());
            fs::remove_file(dest).map_err(|e| Error::io("Failed to remove symlink", dest, e))
        }
        _ => Ok(()),
    }
}

/// Reject absolute paths and `..`, drop `.` components.
fn relative_entry_path(name: &Path) -> Result<PathBuf> {
    let mut relative = PathBuf::new();
    for component in name.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafeEntryPath {
                    path: name.to_path_buf(),
                });
            }
        }
    }
    Ok(relative)
}

fn write_file(path: &Path, contents: &mut impl Read, mode: u32) -> Result<u64> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut out = open_truncate(path, mode)
        .map_err(|e| Error::io("Failed to create file", path, e))?;
    let written =
        io::copy(contents, &mut out).map_err(|e| Error::io("Failed to write file", path, e))?;
    out.sync_all()
        .map_err(|e| Error::io("Failed to flush file", path, e))?;
    drop(out);

    set_mode(path, mode)?;
    Ok(written)
}

#[cfg(unix)]
fn open_truncate(path: &Path, mode: u32) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode & 0o777)
        .open(path)
}

#[cfg(not(unix))]
fn open_truncate(path: &Path, _mode: u32) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Apply the archive's permission bits, which `open` filters through umask.
#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777))
        .map_err(|e| Error::io("Failed to set file mode", path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
