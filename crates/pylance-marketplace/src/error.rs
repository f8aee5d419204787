//! Error types for server installation and runtime resolution.

use crate::node::NodeVersion;
use std::path::PathBuf;

/// Result type for install operations.
pub type Result<T> = std::result::Result<T, InstallError>;

/// Errors that can occur while installing the server package.
///
/// Every variant is terminal for the install attempt: nothing is retried
/// automatically, the error message is surfaced to the user prefixed with
/// the package name, and a fresh process start may try again.
#[derive(thiserror::Error, Debug)]
pub enum InstallError {
    /// The marketplace answered with a non-2xx status.
    #[error("unable to download the extension (HTTP status {status})")]
    Http {
        /// The response status code.
        status: u16,
    },

    /// The response body was shorter than the declared `Content-Length`.
    #[error("extension was downloaded incompletely ({actual} of {expected} bytes)")]
    Incomplete {
        /// Byte count declared by the server.
        expected: u64,
        /// Byte count actually received.
        actual: u64,
    },

    /// The archive unpacked cleanly but the expected server entry point is
    /// not a file.
    #[error("server binary missing after unpack: {}", path.display())]
    Verification {
        /// The resolved binary path that should have existed.
        path: PathBuf,
    },

    /// The resource specification is unusable (empty identifier, relative
    /// path escaping the install directory, and similar).
    #[error("invalid server resource specification: {reason}")]
    InvalidSpec {
        /// Description of what is wrong with the specification.
        reason: String,
    },

    /// Transport-level failure from the HTTP client.
    #[error("failed to reach the marketplace: {0}")]
    Network(#[from] reqwest::Error),

    /// The downloaded archive could not be read as a ZIP container.
    #[error("failed to unpack the extension archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// File-system failure while preparing the install directory.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors resolving the external Node.js runtime the server runs on.
#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    /// No `node` binary was found on the search path.
    #[error("node binary not found on the PATH")]
    NotFound(#[from] which::Error),

    /// `node --version` failed or produced unparseable output.
    #[error("failed to probe the node version: {reason}")]
    Probe {
        /// What went wrong while probing.
        reason: String,
    },

    /// The installed runtime is older than the server supports.
    #[error("installed node version ({found}) is lower than required version ({minimum})")]
    VersionTooLow {
        /// The version reported by `node --version`.
        found: NodeVersion,
        /// The minimum version required.
        minimum: NodeVersion,
    },
}
