//! The launch configuration consumed by the editor host.

use pylance_dotted::{DottedError, OpaqueFields, Result as DottedResult, SettingsStore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Settings keys the configuration is assembled from. Anything else in the
/// settings file is ignored.
const RECOGNIZED_KEYS: [&str; 6] = [
    "command",
    "env",
    "settings",
    "languages",
    "initializationOptions",
    "experimental_capabilities",
];

/// The resolved launch configuration for one language-server session.
///
/// Mirrors the shape the host's client framework consumes: the launch
/// argv, process environment overrides, forwarded server settings,
/// language selectors, and the two capability escape hatches. Each field
/// falls back to an empty value when the settings file omits it.
///
/// As a container, this struct is *opaque*: fields are reachable only by
/// name through [`OpaqueFields`], custom fields cannot be created, and
/// nested mutations go through a detached copy that is written back whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Whether the session should be started at all.
    pub enabled: bool,
    /// Launch argv; auto-filled with `["node", <binary>, "--stdio"]` when
    /// absent.
    pub command: Vec<String>,
    /// Process environment overrides for the server.
    pub env: BTreeMap<String, String>,
    /// Configuration forwarded to the server over
    /// `workspace/didChangeConfiguration`.
    pub settings: Map<String, Value>,
    /// Language selectors the session attaches to.
    pub languages: Vec<Value>,
    /// Options sent in the `initialize` request.
    #[serde(rename = "initializationOptions")]
    pub initialization_options: Map<String, Value>,
    /// Experimental client capabilities advertised to the server.
    pub experimental_capabilities: Map<String, Value>,
}

impl ClientConfig {
    /// Reads the recognized keys out of a settings store.
    ///
    /// Each key is deserialized independently; a missing or ill-typed
    /// entry falls back to that field's empty default rather than failing
    /// the whole read.
    #[must_use]
    pub fn from_settings(store: &SettingsStore) -> Self {
        let mut config = Self::default();
        for key in RECOGNIZED_KEYS {
            if let Some(value) = store.get(key) {
                // set_field assigns only after the value deserialized, so a
                // failure here leaves the field at its default
                if config.set_field(key, value).is_err() {
                    tracing::warn!("ignoring ill-typed settings entry: {key}");
                }
            }
        }
        config
    }

    /// Fills in the default launch command when the settings provided
    /// none.
    pub fn ensure_command(&mut self, binary_path: &Path, execute_with_node: bool) {
        if self.command.is_empty() {
            self.command = default_launch_command(binary_path, execute_with_node);
        }
    }
}

impl OpaqueFields for ClientConfig {
    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "enabled" => serde_json::to_value(self.enabled),
            "command" => serde_json::to_value(&self.command),
            "env" => serde_json::to_value(&self.env),
            "settings" => serde_json::to_value(&self.settings),
            "languages" => serde_json::to_value(&self.languages),
            "initializationOptions" => serde_json::to_value(&self.initialization_options),
            "experimental_capabilities" => serde_json::to_value(&self.experimental_capabilities),
            _ => return None,
        };
        value.ok()
    }

    fn set_field(&mut self, name: &str, value: Value) -> DottedResult<()> {
        let ill_typed = || DottedError::unreachable(name);
        match name {
            "enabled" => self.enabled = serde_json::from_value(value).map_err(|_| ill_typed())?,
            "command" => self.command = serde_json::from_value(value).map_err(|_| ill_typed())?,
            "env" => self.env = serde_json::from_value(value).map_err(|_| ill_typed())?,
            "settings" => self.settings = serde_json::from_value(value).map_err(|_| ill_typed())?,
            "languages" => {
                self.languages = serde_json::from_value(value).map_err(|_| ill_typed())?;
            }
            "initializationOptions" => {
                self.initialization_options =
                    serde_json::from_value(value).map_err(|_| ill_typed())?;
            }
            "experimental_capabilities" => {
                self.experimental_capabilities =
                    serde_json::from_value(value).map_err(|_| ill_typed())?;
            }
            _ => return Err(DottedError::unreachable(name)),
        }
        Ok(())
    }

    fn snapshot(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Builds the default launch argv for the unpacked server bundle.
///
/// The Pylance entry point is a Node.js bundle spoken to over stdio, so
/// the default is `["node", <binary>, "--stdio"]`; without a Node wrapper
/// the binary is launched directly.
#[must_use]
pub fn default_launch_command(binary_path: &Path, execute_with_node: bool) -> Vec<String> {
    let mut command = Vec::new();
    if execute_with_node {
        command.push("node".to_string());
    }
    command.push(binary_path.display().to_string());
    if execute_with_node {
        command.push("--stdio".to_string());
    }
    command
}
