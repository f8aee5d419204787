//! Editor-facing glue for running Pylance outside VS Code.
//!
//! Ties the marketplace installer and the dotted-path settings machinery
//! together into the pieces an editor host consumes:
//!
//! - [`ClientConfig`] - the launch configuration read from host settings,
//!   with the auto-filled `node` command and simulated VS Code environment
//! - [`Masquerade`] - the client-identity override merged into the LSP
//!   `initialize` params so the server's VS-Code-only gates unlock
//! - [`analysis_status_message`] - renders `telemetry/event` notifications
//!   into status-bar text
//! - [`PylancePlugin`] - the top-level controller owning the single
//!   [`ServerResource`](pylance_marketplace::ServerResource) and the
//!   setup/cleanup lifecycle

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod masquerade;
mod plugin;
mod telemetry;

pub use config::{ClientConfig, default_launch_command};
pub use masquerade::{ClientInfo, Masquerade, VSCODE_VERSION, vscode_environment};
pub use plugin::{
    BUNDLED_TYPINGS_PATH, EXTRA_PATHS_KEY, PluginError, PluginOptions, PylancePlugin,
    merge_extra_paths,
};
pub use telemetry::{
    ANALYSIS_COMPLETE_EVENT, Measurements, TELEMETRY_EVENT_METHOD, TelemetryEvent,
    analysis_status_message,
};
