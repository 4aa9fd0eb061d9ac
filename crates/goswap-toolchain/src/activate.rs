//! Repointing a slot path at a version directory.
//!
//! The new link is created under a hidden temporary name first and renamed
//! over the slot, so a slot that is already a symlink is swapped atomically
//! and a failure before the swap leaves the slot untouched.

use crate::local::LocalInstall;
use goswap_core::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Permission bits of directories created by goswap.
pub const DIR_MODE: u32 = 0o775;

/// Make `slot.path` a symlink to `dest`, creating `dest` if needed.
pub fn activate(dest: &Path, slot: &LocalInstall) -> Result<()> {
    create_dir_all(dest)?;

    let target = std::path::absolute(dest)
        .map_err(|e| Error::io("Failed to resolve destination path", dest, e))?;

    if same_entry(&slot.path, &target) {
        debug!("{} already is the destination", slot.path.display());
        return Ok(());
    }

    let staged_link = staged_link_path(&slot.path);
    remove_if_exists(&staged_link)?;
    symlink(&target, &staged_link)?;

    if let Err(e) = clear_slot(&slot.path) {
        let _ = fs::remove_file(&staged_link);
        return Err(e);
    }

    fs::rename(&staged_link, &slot.path).map_err(|e| {
        let _ = fs::remove_file(&staged_link);
        Error::io("Failed to swap slot symlink", &slot.path, e)
    })?;

    info!("{} -> {}", slot.path.display(), target.display());
    Ok(())
}

/// Create a directory and its parents with [`DIR_MODE`]; idempotent.
pub fn create_dir_all(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder
        .create(path)
        .map_err(|e| Error::io("Failed to create directory", path, e))
}

fn staged_link_path(slot: &Path) -> PathBuf {
    let name = slot
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    slot.with_file_name(format!(".{}.goswap-link", name))
}

fn same_entry(slot: &Path, target: &Path) -> bool {
    match std::path::absolute(slot) {
        Ok(abs) => abs == target,
        Err(_) => false,
    }
}

/// Remove a real directory at the slot path.
///
/// Symlinks and files are left in place for the rename to replace.
fn clear_slot(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            debug!("Removing directory {}", path.display());
            fs::remove_dir_all(path).map_err(|e| Error::io("Failed to remove slot", path, e))
        }
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io("Failed to inspect slot", path, e)),
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io("Failed to remove stale link", path, e)),
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| {
        Error::io(format!("Failed to create symlink to {}", target.display()), link, e)
    })
}

#[cfg(not(unix))]
fn symlink(_target: &Path, link: &Path) -> Result<()> {
    Err(Error::io(
        "Symlink activation is only supported on Unix",
        link,
        io::Error::from(io::ErrorKind::Unsupported),
    ))
}
