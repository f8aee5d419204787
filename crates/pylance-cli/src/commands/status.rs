//! Install status command.

use super::common;
use anyhow::Result;
use pylance_marketplace::InstallState;
use std::path::PathBuf;

/// Prints the resolved cache layout and install state.
///
/// # Errors
///
/// Fails when the storage root or package specification cannot be
/// resolved.
pub fn run(storage: Option<PathBuf>) -> Result<()> {
    let options = common::plugin_options(storage)?;
    let resource = common::server_resource(&options)?;

    let installed = !resource.needs_installation();

    println!("Package:          {}", options.package_name);
    println!(
        "Extension:        {} {}",
        options.extension_id, options.extension_version
    );
    println!("Package storage:  {}", resource.package_storage().display());
    println!("Server directory: {}", resource.server_directory().display());
    println!("Server binary:    {}", resource.binary_path().display());
    println!(
        "Installed:        {}",
        if installed { "yes" } else { "no" }
    );
    println!("State:            {}", describe(&resource.state()));
    Ok(())
}

fn describe(state: &InstallState) -> String {
    match state {
        InstallState::Uninitialized => "uninitialized".to_string(),
        InstallState::Checking => "checking (not installed)".to_string(),
        InstallState::Downloading => "downloading".to_string(),
        InstallState::Ready => "ready".to_string(),
        InstallState::Error(message) => format!("error: {message}"),
    }
}
