//! Launch configuration inspection command.

use super::common;
use anyhow::{Context, Result};
use pylance_client::PylancePlugin;
use std::path::PathBuf;

/// Prints the merged launch configuration as pretty JSON.
///
/// When the pinned server version is installed, the configuration is
/// assembled exactly as the editor host would receive it: launch command
/// filled in, simulated VS Code environment applied, install-time
/// variables expanded. Otherwise the raw settings-derived configuration is
/// printed with `enabled: false`.
///
/// # Errors
///
/// Fails when the settings file is unreadable, the specification is
/// unusable, or setup cannot resolve a Node.js runtime.
pub fn run(storage: Option<PathBuf>, settings: Option<PathBuf>) -> Result<()> {
    let options = common::plugin_options(storage)?;
    let store = common::load_settings(settings.as_deref())?;

    let installed = !common::server_resource(&options)?.needs_installation();

    let mut plugin = PylancePlugin::new(options, store);
    if installed {
        plugin
            .setup()
            .context("plugin setup failed; is a compatible Node.js on the PATH?")?;
    } else {
        tracing::warn!("server is not installed; run `pylance-cli install` first");
    }

    let config = plugin.client_config();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
