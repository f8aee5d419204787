//! Node.js runtime discovery.
//!
//! The server entry point is a Node.js bundle, so a compatible `node`
//! binary must exist on the search path before installing anything.

use crate::error::RuntimeError;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use std::str::FromStr;

/// A `major.minor.patch` Node.js version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeVersion {
    /// Major version component.
    pub major: u32,
    /// Minor version component.
    pub minor: u32,
    /// Patch version component.
    pub patch: u32,
}

impl NodeVersion {
    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for NodeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for NodeVersion {
    type Err = RuntimeError;

    /// Parses `node --version` output such as `v18.17.0` (the leading `v`
    /// and any pre-release suffix are tolerated).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RuntimeError::Probe {
            reason: format!("unrecognized version string: {s:?}"),
        };

        let core = s
            .trim()
            .trim_start_matches('v')
            .split('-')
            .next()
            .ok_or_else(bad)?;

        let mut parts = core.split('.');
        let mut next = || -> Result<u32, RuntimeError> {
            parts
                .next()
                .and_then(|p| p.parse().ok())
                .ok_or_else(bad)
        };

        Ok(Self::new(next()?, next()?, next()?))
    }
}

/// A resolved Node.js runtime: where it lives and which version it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRuntime {
    /// Absolute path of the `node` binary.
    pub path: PathBuf,
    /// Version reported by `node --version`.
    pub version: NodeVersion,
}

/// Locates `node` on the search path and checks it against `minimum`.
///
/// # Errors
///
/// * [`RuntimeError::NotFound`] - no `node` on the PATH
/// * [`RuntimeError::Probe`] - `node --version` failed or was unparseable
/// * [`RuntimeError::VersionTooLow`] - runtime older than `minimum`
pub fn resolve_node(minimum: NodeVersion) -> Result<NodeRuntime, RuntimeError> {
    let path = which::which("node")?;

    let output = Command::new(&path)
        .arg("--version")
        .output()
        .map_err(|e| RuntimeError::Probe {
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(RuntimeError::Probe {
            reason: format!("node --version exited with {}", output.status),
        });
    }

    let version: NodeVersion = String::from_utf8_lossy(&output.stdout).parse()?;
    if version < minimum {
        return Err(RuntimeError::VersionTooLow {
            found: version,
            minimum,
        });
    }

    tracing::debug!("resolved node {} at {}", version, path.display());
    Ok(NodeRuntime { path, version })
}
