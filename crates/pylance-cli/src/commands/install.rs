//! Foreground install command.

use super::common;
use anyhow::{Context, Result};
use pylance_marketplace::MarketplaceEndpoint;
use std::path::PathBuf;

/// Downloads and unpacks the pinned server version, reporting the outcome.
///
/// # Errors
///
/// Propagates specification, network, archive, and verification failures.
pub async fn run(storage: Option<PathBuf>, endpoint: Option<String>) -> Result<()> {
    let mut options = common::plugin_options(storage)?;
    if let Some(base) = endpoint {
        options.marketplace = MarketplaceEndpoint::new(base);
    }

    let resource = common::server_resource(&options)?;
    if !resource.needs_installation() {
        println!(
            "{} {} is already installed in {}",
            options.extension_id,
            options.extension_version,
            resource.server_directory().display()
        );
        return Ok(());
    }

    println!(
        "Installing {} {} ...",
        options.extension_id, options.extension_version
    );
    resource
        .install_or_update()
        .await
        .context("server installation failed")?;

    println!("Installed in {}", resource.server_directory().display());
    println!("Server entry point: {}", resource.binary_path().display());
    Ok(())
}
