//! Error types for dotted-path traversal.

/// Result type for dotted-path operations.
pub type Result<T> = std::result::Result<T, DottedError>;

/// Errors that can occur while writing through a dotted path.
///
/// Reads fail soft (they return the caller's default); only writes surface
/// an error, because a silently dropped write would leave the launch
/// configuration looking patched when it is not.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DottedError {
    /// The walk hit a node that cannot accept further indexing, e.g. a
    /// scalar in the middle of the path, a sequence index out of range, or
    /// a field that does not exist on an opaque container.
    #[error("path \"{path}\" is unreachable")]
    Unreachable {
        /// The dotted path that failed to resolve.
        path: String,
    },
}

impl DottedError {
    /// Creates an [`DottedError::Unreachable`] for the given path.
    #[must_use]
    pub fn unreachable(path: impl Into<String>) -> Self {
        Self::Unreachable { path: path.into() }
    }
}
