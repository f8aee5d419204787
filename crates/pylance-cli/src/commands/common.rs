//! Shared helpers for the subcommands.

use anyhow::{Context, Result};
use pylance_client::PluginOptions;
use pylance_dotted::SettingsStore;
use pylance_marketplace::{ResourceSpec, ServerResource};
use std::path::{Path, PathBuf};

/// Resolves the plugin options against the given (or default) storage root.
///
/// # Errors
///
/// Fails only when no storage root was given and the platform data
/// directory cannot be determined.
pub fn plugin_options(storage: Option<PathBuf>) -> Result<PluginOptions> {
    let storage_root = match storage {
        Some(path) => path,
        None => dirs::data_local_dir()
            .context("cannot determine the platform data directory; pass --storage")?
            .join("pylance"),
    };
    Ok(PluginOptions::pylance(storage_root))
}

/// Builds the server resource described by the options.
///
/// # Errors
///
/// Fails when the pinned resource specification is unusable.
pub fn server_resource(options: &PluginOptions) -> Result<ServerResource> {
    ServerResource::with_endpoint(
        ResourceSpec {
            package_name: options.package_name.clone(),
            extension_id: options.extension_id.clone(),
            extension_version: options.extension_version.clone(),
            server_binary_path: options.server_binary_path.clone(),
            storage_root: options.storage_root.clone(),
            resource_source: options.resource_source.clone(),
            resource_dirs: options.resource_dirs.clone(),
        },
        options.marketplace.clone(),
    )
    .context("unusable server package specification")
}

/// Loads a settings store from a JSON file, or an empty store when no file
/// was given.
///
/// # Errors
///
/// Fails when the file cannot be read or does not parse as JSON.
pub fn load_settings(path: Option<&Path>) -> Result<SettingsStore> {
    let Some(path) = path else {
        return Ok(SettingsStore::new());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read settings file {}", path.display()))?;
    let value = serde_json::from_str(&raw)
        .with_context(|| format!("settings file {} is not valid JSON", path.display()))?;
    Ok(SettingsStore::from_value(value))
}
