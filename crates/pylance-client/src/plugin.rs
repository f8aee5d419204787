//! The top-level plugin controller.

use crate::config::ClientConfig;
use crate::masquerade::Masquerade;
use crate::telemetry::{TELEMETRY_EVENT_METHOD, analysis_status_message};
use pylance_core::{ExtensionId, ExtensionVersion, PackageName, Variables, expand_variables};
use pylance_dotted::{Result as DottedResult, SettingsStore, dotted_get_or, dotted_set};
use pylance_marketplace::{
    InstallError, MarketplaceEndpoint, NodeVersion, ResourceSpec, RuntimeError, ServerResource,
    resolve_node,
};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;

/// Server settings key the module search paths live under.
pub const EXTRA_PATHS_KEY: &str = "python.analysis.extraPaths";

/// Search path of the type stubs bundled with the package, relative to the
/// install directory via the `server_directory_path` variable.
pub const BUNDLED_TYPINGS_PATH: &str = "${server_directory_path}/_resources/typings";

/// Errors surfaced by the plugin lifecycle.
#[derive(thiserror::Error, Debug)]
pub enum PluginError {
    /// No usable Node.js runtime was found.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    /// The server resource could not be constructed or installed.
    #[error(transparent)]
    Install(#[from] InstallError),
}

/// Static plugin configuration, fixed at compile/package time.
#[derive(Debug, Clone)]
pub struct PluginOptions {
    /// Display name; storage subdirectory and message prefix.
    pub package_name: PackageName,
    /// Marketplace extension to install.
    pub extension_id: ExtensionId,
    /// Pinned extension version.
    pub extension_version: ExtensionVersion,
    /// Server entry point relative to the unpacked archive.
    pub server_binary_path: PathBuf,
    /// Root directory packages install under.
    pub storage_root: PathBuf,
    /// Where the bundled resource dirs are copied from.
    pub resource_source: Option<PathBuf>,
    /// Resource dirs copied into the install directory.
    pub resource_dirs: Vec<String>,
    /// Oldest Node.js the server bundle runs on.
    pub minimum_node_version: NodeVersion,
    /// Launch the entry point through `node` with `--stdio`.
    pub execute_with_node: bool,
    /// Report the VS Code identity and environment to the server.
    pub pretend_vscode: bool,
    /// Gallery endpoint; overridable for tests.
    pub marketplace: MarketplaceEndpoint,
}

impl PluginOptions {
    /// The pinned Pylance package this plugin ships.
    #[must_use]
    pub fn pylance(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            package_name: PackageName::new("LSP-pylance"),
            // the insiders channel publishes pre-release server builds
            extension_id: ExtensionId::parse("pylance-insiders.vscode-pylance")
                .expect("pinned extension id is vendor-qualified"),
            extension_version: ExtensionVersion::new("2021.1.4-pre.1"),
            server_binary_path: PathBuf::from("extension/dist/server.bundle.js"),
            storage_root: storage_root.into(),
            resource_source: None,
            resource_dirs: vec!["_resources".to_string()],
            minimum_node_version: NodeVersion::new(12, 0, 0),
            execute_with_node: true,
            pretend_vscode: true,
            marketplace: MarketplaceEndpoint::default(),
        }
    }
}

/// Owns the plugin's single server resource and drives its lifecycle.
///
/// Construct once per process, call [`setup`](Self::setup) from the host's
/// load hook (calling it again is a no-op), and [`cleanup`](Self::cleanup)
/// from the unload hook. No hidden singleton: everything hangs off this
/// value.
#[derive(Debug)]
pub struct PylancePlugin {
    options: PluginOptions,
    settings: SettingsStore,
    masquerade: Masquerade,
    resource: Option<Arc<ServerResource>>,
}

impl PylancePlugin {
    /// Creates the controller with the package settings read by the host.
    #[must_use]
    pub fn new(options: PluginOptions, settings: SettingsStore) -> Self {
        Self {
            options,
            settings,
            masquerade: Masquerade::new(),
            resource: None,
        }
    }

    /// Resolves the runtime, constructs the server resource, and schedules
    /// installation in the background when the package is missing on disk.
    ///
    /// Idempotent: the host may call this from both its constructor and
    /// its load hook; the second call observes the existing resource and
    /// returns without touching the disk or the network. Must run inside
    /// an async runtime when installation is needed.
    ///
    /// # Errors
    ///
    /// * [`PluginError::Runtime`] - no compatible Node.js runtime
    /// * [`PluginError::Install`] - unusable resource specification
    pub fn setup(&mut self) -> Result<(), PluginError> {
        if self.resource.is_some() {
            tracing::debug!("{}: setup already ran", self.options.package_name);
            return Ok(());
        }

        if self.options.execute_with_node {
            let runtime = resolve_node(self.options.minimum_node_version)?;
            tracing::info!(
                "{}: using node {} at {}",
                self.options.package_name,
                runtime.version,
                runtime.path.display()
            );
        }

        if self.options.pretend_vscode {
            self.masquerade.configure();
        }

        let resource = Arc::new(ServerResource::with_endpoint(
            ResourceSpec {
                package_name: self.options.package_name.clone(),
                extension_id: self.options.extension_id.clone(),
                extension_version: self.options.extension_version.clone(),
                server_binary_path: self.options.server_binary_path.clone(),
                storage_root: self.options.storage_root.clone(),
                resource_source: self.options.resource_source.clone(),
                resource_dirs: self.options.resource_dirs.clone(),
            },
            self.options.marketplace.clone(),
        )?);

        if resource.needs_installation() {
            resource.install_in_background();
        }

        self.resource = Some(resource);
        Ok(())
    }

    /// Deletes the downloaded server from disk.
    ///
    /// # Errors
    ///
    /// Propagates file-system errors from the removal.
    pub fn cleanup(&self) -> std::io::Result<()> {
        if let Some(resource) = &self.resource {
            resource.uninstall()?;
        }
        Ok(())
    }

    /// Returns the owned server resource once `setup` has run.
    #[must_use]
    pub fn resource(&self) -> Option<&Arc<ServerResource>> {
        self.resource.as_ref()
    }

    /// Returns the masquerade applied at session construction.
    #[must_use]
    pub fn masquerade(&self) -> &Masquerade {
        &self.masquerade
    }

    /// Reads a plugin setting by dotted key, with a default.
    #[must_use]
    pub fn plugin_setting(&self, dotted: &str, default: Value) -> Value {
        self.settings.dotted_get_or(dotted, default)
    }

    /// Variables resolvable once the resource exists: `package_storage`,
    /// `server_directory_path`, `server_path`.
    #[must_use]
    pub fn variables(&self) -> Variables {
        let mut variables = Variables::new();
        if let Some(resource) = &self.resource {
            variables.insert(
                "package_storage".to_string(),
                resource.package_storage().display().to_string(),
            );
            variables.insert(
                "server_directory_path".to_string(),
                resource.server_directory().display().to_string(),
            );
            variables.insert(
                "server_path".to_string(),
                resource.binary_path().display().to_string(),
            );
        }
        variables
    }

    /// Assembles the launch configuration the host consumes.
    ///
    /// Reads the recognized settings keys, fills in the default launch
    /// command, applies the simulated VS Code environment, and expands the
    /// install-time variables inside the forwarded settings.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_settings(&self.settings);
        config.enabled = self.resource.is_some();

        if let Some(resource) = &self.resource {
            config.ensure_command(&resource.binary_path(), self.options.execute_with_node);
        }

        self.masquerade.apply_environment(&mut config.env);

        let mut settings = Value::Object(std::mem::take(&mut config.settings));
        expand_variables(&mut settings, &self.variables());
        if let Value::Object(map) = settings {
            config.settings = map;
        }

        config
    }

    /// Reacts to a change of the forwarded server settings.
    ///
    /// When the plugin setting `dev_environment` is `"editor"`, the host's
    /// package dependency directories and the bundled type stubs are
    /// appended to the module search paths, order-stable de-duplicated.
    ///
    /// # Errors
    ///
    /// Propagates the dotted write when the settings shape rejects it.
    pub fn on_settings_changed(
        &self,
        server_settings: &mut Value,
        dependency_dirs: &[PathBuf],
    ) -> DottedResult<()> {
        if self.plugin_setting("dev_environment", Value::Null) != json!("editor") {
            return Ok(());
        }

        let extra = dependency_dirs
            .iter()
            .filter(|dir| dir.is_dir())
            .map(|dir| dir.display().to_string())
            .chain(std::iter::once(BUNDLED_TYPINGS_PATH.to_string()));

        merge_extra_paths(server_settings, extra)
    }

    /// Handles a server notification, returning status-bar text when the
    /// notification warrants one.
    #[must_use]
    pub fn handle_notification(&self, method: &str, params: &Value) -> Option<String> {
        if method == TELEMETRY_EVENT_METHOD {
            analysis_status_message(&self.options.package_name, params)
        } else {
            None
        }
    }
}

/// Appends entries to `python.analysis.extraPaths`, keeping the first
/// occurrence of every path.
///
/// # Errors
///
/// Propagates the dotted write when the settings shape rejects it.
pub fn merge_extra_paths(
    server_settings: &mut Value,
    extra: impl IntoIterator<Item = String>,
) -> DottedResult<()> {
    let existing: Vec<String> =
        serde_json::from_value(dotted_get_or(server_settings, EXTRA_PATHS_KEY, json!([])))
            .unwrap_or_default();

    let merged = unique_stable(existing.into_iter().chain(extra));
    dotted_set(server_settings, EXTRA_PATHS_KEY, json!(merged))
}

/// De-duplicates while preserving first-occurrence order.
fn unique_stable(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pylance_marketplace::InstallState;
    use std::path::Path;
    use tempfile::TempDir;

    fn options(storage_root: &Path) -> PluginOptions {
        PluginOptions {
            execute_with_node: false,
            ..PluginOptions::pylance(storage_root)
        }
    }

    fn preinstall(options: &PluginOptions) {
        let binary = options
            .storage_root
            .join(options.package_name.as_str())
            .join(format!(
                "{}~{}",
                options.extension_id, options.extension_version
            ))
            .join(&options.server_binary_path);
        std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
        std::fs::write(&binary, "// bundle").unwrap();
    }

    #[test]
    fn pinned_package_options_are_well_formed() {
        let options = PluginOptions::pylance("/tmp/storage");
        assert_eq!(options.package_name.as_str(), "LSP-pylance");
        assert_eq!(options.extension_id.vendor(), "pylance-insiders");
        assert_eq!(options.extension_id.name(), "vscode-pylance");
        assert!(options.execute_with_node);
    }

    #[test]
    fn setup_is_idempotent_for_double_invocation() {
        let temp = TempDir::new().unwrap();
        let options = options(temp.path());
        preinstall(&options);

        let mut plugin = PylancePlugin::new(options, SettingsStore::new());
        plugin.setup().unwrap();
        let first = Arc::clone(plugin.resource().unwrap());

        plugin.setup().unwrap();
        assert!(Arc::ptr_eq(&first, plugin.resource().unwrap()));
        assert_eq!(first.state(), InstallState::Ready);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn setup_backgrounds_install_and_records_failure() {
        let temp = TempDir::new().unwrap();
        let mut options = options(temp.path());
        // unroutable endpoint: the scheduled install fails fast
        options.marketplace = MarketplaceEndpoint::new("http://127.0.0.1:1");

        let mut plugin = PylancePlugin::new(options, SettingsStore::new());
        plugin.setup().unwrap();
        let resource = Arc::clone(plugin.resource().unwrap());

        for _ in 0..500 {
            if resource.error_message().is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let message = resource.error_message().unwrap();
        assert!(message.starts_with("LSP-pylance:"), "{message}");
        assert!(!resource.ready());
        assert!(!resource.binary_path().exists());
    }

    #[test]
    fn client_config_fills_command_and_environment() {
        let temp = TempDir::new().unwrap();
        let options = options(temp.path());
        preinstall(&options);

        let mut plugin = PylancePlugin::new(options, SettingsStore::new());
        plugin.setup().unwrap();

        let config = plugin.client_config();
        assert!(config.enabled);
        // execute_with_node is off in tests, so the argv is the bare binary
        assert_eq!(config.command.len(), 1);
        assert!(config.command[0].ends_with("server.bundle.js"));
        assert_eq!(config.env["ELECTRON_RUN_AS_NODE"], "1");
    }

    #[test]
    fn client_config_expands_server_variables_in_settings() {
        let temp = TempDir::new().unwrap();
        let options = options(temp.path());
        preinstall(&options);

        let settings = SettingsStore::from_value(serde_json::json!({
            "settings": {"python": {"analysis": {"stubPath": "${server_directory_path}/typings"}}},
        }));
        let mut plugin = PylancePlugin::new(options, settings);
        plugin.setup().unwrap();

        let config = plugin.client_config();
        let stub_path = config.settings["python"]["analysis"]["stubPath"]
            .as_str()
            .unwrap();
        assert!(!stub_path.contains("${"), "{stub_path}");
        assert!(stub_path.ends_with("/typings"));
    }

    #[test]
    fn settings_change_injects_extra_paths_in_editor_mode() {
        let temp = TempDir::new().unwrap();
        let options = options(temp.path());
        preinstall(&options);

        let dep_dir = temp.path().join("deps");
        std::fs::create_dir_all(&dep_dir).unwrap();

        let settings =
            SettingsStore::from_value(serde_json::json!({"dev_environment": "editor"}));
        let mut plugin = PylancePlugin::new(options, settings);
        plugin.setup().unwrap();

        let mut server_settings = serde_json::json!({});
        plugin
            .on_settings_changed(&mut server_settings, &[dep_dir.clone()])
            .unwrap();

        let paths: Vec<String> = serde_json::from_value(
            dotted_get_or(&server_settings, EXTRA_PATHS_KEY, json!([])),
        )
        .unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], dep_dir.display().to_string());
        assert_eq!(paths[1], BUNDLED_TYPINGS_PATH);
    }

    #[test]
    fn settings_change_is_inert_without_editor_mode() {
        let temp = TempDir::new().unwrap();
        let options = options(temp.path());
        preinstall(&options);

        let mut plugin = PylancePlugin::new(options, SettingsStore::new());
        plugin.setup().unwrap();

        let mut server_settings = serde_json::json!({});
        plugin
            .on_settings_changed(&mut server_settings, &[temp.path().to_path_buf()])
            .unwrap();
        assert_eq!(server_settings, serde_json::json!({}));
    }

    #[test]
    fn merge_extra_paths_is_stable_unique() {
        let mut settings = serde_json::json!({
            "python": {"analysis": {"extraPaths": ["/a", "/b"]}},
        });
        merge_extra_paths(
            &mut settings,
            ["/b".to_string(), "/c".to_string(), "/a".to_string()],
        )
        .unwrap();
        assert_eq!(
            settings["python"]["analysis"]["extraPaths"],
            serde_json::json!(["/a", "/b", "/c"]),
        );
    }

    #[test]
    fn telemetry_notification_becomes_status_text() {
        let temp = TempDir::new().unwrap();
        let plugin = PylancePlugin::new(options(temp.path()), SettingsStore::new());

        let params = serde_json::json!({
            "EventName": "language_server/analysis_complete",
            "Measurements": {"numFilesAnalyzed": 5, "numFilesInProgram": 5, "elapsedMs": 100.0},
        });
        let message = plugin
            .handle_notification(TELEMETRY_EVENT_METHOD, &params)
            .unwrap();
        assert!(message.starts_with("LSP-pylance: Analysis 5/5"));

        assert_eq!(plugin.handle_notification("window/logMessage", &params), None);
    }

    #[test]
    fn cleanup_removes_package_storage() {
        let temp = TempDir::new().unwrap();
        let options = options(temp.path());
        preinstall(&options);

        let storage = options.storage_root.join(options.package_name.as_str());
        let mut plugin = PylancePlugin::new(options, SettingsStore::new());
        plugin.setup().unwrap();

        plugin.cleanup().unwrap();
        assert!(!storage.exists());
    }
}
