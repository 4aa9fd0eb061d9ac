//! Choosing which installed slot a new version takes over.
//!
//! goswap never grows the number of installed versions: a new version either
//! replaces the install of its own release line or the nearest older minor
//! version of the same major. At least one seed install must exist.

use crate::local::{LocalIndex, LocalInstall};
use goswap_core::{Error, Fix, Result, Slot, VersionSpec};
use std::path::Path;
use tracing::debug;

/// What activation has to do for a target version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationPlan {
    /// The exact version already occupies its slot.
    AlreadyInstalled(LocalInstall),
    /// Repoint this install's slot to the target version.
    ReuseSlot(LocalInstall),
}

/// Decide how to activate `target` given the installed versions.
///
/// `root` is only used for error reporting.
pub fn plan_activation(
    target: &VersionSpec,
    index: &LocalIndex,
    root: &Path,
) -> Result<ActivationPlan> {
    let slot = target.slot();

    if let Some(install) = index.get(&slot) {
        if install.version == target.number() && !install.dangling {
            debug!("{} already installed at {}", target.tagged(), install.path.display());
            return Ok(ActivationPlan::AlreadyInstalled(install.clone()));
        }
        debug!("Reusing slot {} ({}) for {}", slot, install.tagged(), target.tagged());
        return Ok(ActivationPlan::ReuseSlot(install.clone()));
    }

    for minor in (1..slot.minor).rev() {
        let candidate = Slot::new(slot.major, minor);
        if let Some(install) = index.get(&candidate) {
            debug!(
                "No {} installed, taking over nearest older slot {} ({})",
                slot,
                candidate,
                install.path.display()
            );
            return Ok(ActivationPlan::ReuseSlot(install.clone()));
        }
    }

    Err(Error::NoLocalSlotAvailable {
        slot: slot.to_string(),
        root: root.to_path_buf(),
        fixes: vec![Fix::new(format!(
            "Create a placeholder directory such as {} to seed a slot",
            root.join(format!("{}.{}", slot.major, 1)).display()
        ))],
    })
}
