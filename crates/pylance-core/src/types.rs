//! Strong domain types for marketplace extensions.
//!
//! This module implements the newtype pattern to provide type safety for
//! the identifiers that flow through the download and configuration layers.
//! A marketplace extension is addressed by a vendor-qualified identifier
//! such as `ms-python.vscode-pylance` together with a version string; the
//! installing package has its own display name used to prefix user-facing
//! messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name of the installing package (newtype over String).
///
/// Used as the storage subdirectory name and as the prefix of every
/// user-visible status or error message.
///
/// # Examples
///
/// ```
/// use pylance_core::PackageName;
///
/// let name = PackageName::new("LSP-pylance");
/// assert_eq!(name.as_str(), "LSP-pylance");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageName(String);

impl PackageName {
    /// Creates a new package name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the package name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PackageName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Error returned when an extension identifier is not vendor-qualified.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("extension id must look like \"vendor.name\", got: {id}")]
pub struct InvalidExtensionId {
    /// The rejected identifier.
    pub id: String,
}

/// Vendor-qualified marketplace extension identifier.
///
/// The marketplace addresses extensions as `{vendor}.{name}`, e.g.
/// `ms-python.vscode-pylance`. Both halves are needed separately to build
/// the gallery download URL, so the identifier is validated at construction
/// time rather than split lazily.
///
/// # Examples
///
/// ```
/// use pylance_core::ExtensionId;
///
/// let id = ExtensionId::parse("ms-python.vscode-pylance")?;
/// assert_eq!(id.vendor(), "ms-python");
/// assert_eq!(id.name(), "vscode-pylance");
/// # Ok::<(), pylance_core::InvalidExtensionId>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtensionId {
    id: String,
    dot: usize,
}

impl ExtensionId {
    /// Parses a `vendor.name` identifier.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidExtensionId`] when the identifier has no `.`
    /// separator or either half is empty. Identifiers with more than one
    /// dot split at the first one, matching marketplace semantics.
    pub fn parse(id: impl Into<String>) -> Result<Self, InvalidExtensionId> {
        let id = id.into();
        match id.find('.') {
            Some(dot) if dot > 0 && dot + 1 < id.len() => Ok(Self { id, dot }),
            _ => Err(InvalidExtensionId { id }),
        }
    }

    /// Returns the full `vendor.name` identifier.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Returns the vendor (publisher) half.
    #[inline]
    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.id[..self.dot]
    }

    /// Returns the extension name half.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.id[self.dot + 1..]
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl TryFrom<String> for ExtensionId {
    type Error = InvalidExtensionId;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::parse(id)
    }
}

impl From<ExtensionId> for String {
    fn from(id: ExtensionId) -> Self {
        id.id
    }
}

/// Marketplace extension version string (newtype over String).
///
/// Treated as an opaque token: the marketplace accepts pre-release suffixes
/// such as `2021.1.4-pre.1`, so no semver ordering is imposed here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionVersion(String);

impl ExtensionVersion {
    /// Creates a new version token.
    #[inline]
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Returns the version as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExtensionVersion {
    fn from(version: &str) -> Self {
        Self::new(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_id_splits_at_first_dot() {
        let id = ExtensionId::parse("pylance-insiders.vscode-pylance").unwrap();
        assert_eq!(id.vendor(), "pylance-insiders");
        assert_eq!(id.name(), "vscode-pylance");
        assert_eq!(id.as_str(), "pylance-insiders.vscode-pylance");
    }

    #[test]
    fn extension_id_keeps_extra_dots_in_name() {
        let id = ExtensionId::parse("vendor.some.name").unwrap();
        assert_eq!(id.vendor(), "vendor");
        assert_eq!(id.name(), "some.name");
    }

    #[test]
    fn extension_id_rejects_unqualified() {
        assert!(ExtensionId::parse("pylance").is_err());
        assert!(ExtensionId::parse(".pylance").is_err());
        assert!(ExtensionId::parse("pylance.").is_err());
        assert!(ExtensionId::parse("").is_err());
    }

    #[test]
    fn extension_id_serde_round_trip() {
        let id = ExtensionId::parse("ms-python.vscode-pylance").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ms-python.vscode-pylance\"");
        let back: ExtensionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
