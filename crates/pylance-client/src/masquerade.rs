//! The VS Code client-identity masquerade.
//!
//! Pylance sniffs the client identity from the `initialize` handshake and
//! from its process environment, and keeps most features off for clients
//! other than VS Code. The masquerade holds the identity override and
//! merges it into both places at session-construction time - an explicit
//! hook instead of patching the host's params builder globally.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// VS Code version reported in the handshake.
///
/// Pinned rather than probed: the server only checks that the pair looks
/// like a real VS Code release.
pub const VSCODE_VERSION: &str = "1.51.1";

/// The `clientInfo` value sent in the `initialize` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client name as reported to the server.
    pub name: String,
    /// Client version as reported to the server.
    pub version: String,
}

impl ClientInfo {
    /// The identity VS Code itself reports.
    #[must_use]
    pub fn vscode() -> Self {
        Self {
            name: "vscode".to_string(),
            version: VSCODE_VERSION.to_string(),
        }
    }
}

/// Environment variables VS Code sets for its extension-host processes.
///
/// `ELECTRON_RUN_AS_NODE=1` plus a minimal NLS configuration; the server
/// reads both during startup.
#[must_use]
pub fn vscode_environment() -> BTreeMap<String, String> {
    let nls = serde_json::json!({
        "locale": "en-us",
        "availableLanguages": {},
    });

    let mut env = BTreeMap::new();
    env.insert("ELECTRON_RUN_AS_NODE".to_string(), "1".to_string());
    env.insert("VSCODE_NLS_CONFIG".to_string(), nls.to_string());
    env
}

/// Client-identity override applied at session construction.
///
/// Unconfigured, it applies nothing and the host's own identity goes
/// through untouched. [`Masquerade::configure`] is idempotent: calling it
/// from both the plugin constructor and the host's load hook installs the
/// override exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Masquerade {
    client_info: Option<ClientInfo>,
}

impl Masquerade {
    /// Creates an inactive masquerade.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the VS Code identity override. Idempotent.
    pub fn configure(&mut self) {
        self.client_info.get_or_insert_with(ClientInfo::vscode);
    }

    /// Returns the configured override, if any.
    #[must_use]
    pub fn client_info(&self) -> Option<&ClientInfo> {
        self.client_info.as_ref()
    }

    /// Merges the identity override into `initialize` params.
    ///
    /// Existing `clientInfo` keys other than `name` and `version` are
    /// preserved. Does nothing while unconfigured.
    pub fn apply_client_info(&self, params: &mut Value) {
        let Some(info) = &self.client_info else {
            return;
        };
        let Value::Object(params) = params else {
            return;
        };

        let client_info = params
            .entry("clientInfo")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(client_info) = client_info {
            client_info.insert("name".to_string(), Value::String(info.name.clone()));
            client_info.insert("version".to_string(), Value::String(info.version.clone()));
        }
    }

    /// Merges the simulated VS Code variables into a server environment.
    ///
    /// Does nothing while unconfigured.
    pub fn apply_environment(&self, env: &mut BTreeMap<String, String>) {
        if self.client_info.is_some() {
            env.extend(vscode_environment());
        }
    }
}
