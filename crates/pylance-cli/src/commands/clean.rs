//! Package removal command.

use super::common;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Removes the package storage tree from disk.
///
/// # Errors
///
/// Propagates file-system errors from the removal.
pub fn run(storage: Option<PathBuf>) -> Result<()> {
    let options = common::plugin_options(storage)?;
    let resource = common::server_resource(&options)?;

    let package_storage = resource.package_storage();
    if !package_storage.is_dir() {
        println!("Nothing installed under {}", package_storage.display());
        return Ok(());
    }

    resource
        .uninstall()
        .with_context(|| format!("cannot remove {}", package_storage.display()))?;
    println!("Removed {}", package_storage.display());
    Ok(())
}
