//! Marketplace download and on-disk caching of a language-server package.
//!
//! The Pylance server is distributed only as a VS Code extension package
//! (a `.vsix`, which is a ZIP container) behind the marketplace gallery
//! API. This crate resolves a versioned cache location for the package,
//! checks whether it is already installed, and when it is not, downloads
//! the archive, strips the gzip transport envelope, unpacks it in place,
//! and verifies the server entry point exists.
//!
//! # Directory structure
//!
//! ```text
//! <storage-root>/
//! └── <package-name>/
//!     └── <extension-id>~<version>/
//!         ├── extension.vsix          # downloaded archive
//!         ├── extension/dist/...      # unpacked contents
//!         └── _resources/...          # bundled resource dirs, copied first
//! ```
//!
//! # Install lifecycle
//!
//! `Uninitialized → Checking → {Ready | Downloading → {Ready | Error}}`.
//! `Error` is terminal for the process lifetime: a failed install is not
//! retried; the next process start re-enters `Checking`.
//!
//! # Examples
//!
//! ```no_run
//! use pylance_core::{ExtensionId, ExtensionVersion, PackageName};
//! use pylance_marketplace::{ResourceSpec, ServerResource};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let spec = ResourceSpec {
//!     package_name: PackageName::new("LSP-pylance"),
//!     extension_id: ExtensionId::parse("ms-python.vscode-pylance")?,
//!     extension_version: ExtensionVersion::new("2021.1.4"),
//!     server_binary_path: "extension/dist/server.bundle.js".into(),
//!     storage_root: "/tmp/package-storage".into(),
//!     resource_source: None,
//!     resource_dirs: vec![],
//! };
//!
//! let resource = Arc::new(ServerResource::new(spec)?);
//! if resource.needs_installation() {
//!     resource.install_in_background();
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod endpoint;
mod error;
mod node;
mod resource;

pub use endpoint::{MarketplaceEndpoint, USER_AGENT};
pub use error::{InstallError, Result, RuntimeError};
pub use node::{NodeRuntime, NodeVersion, resolve_node};
pub use resource::{InstallState, ResourceSpec, ServerResource, VSIX_FILE};
