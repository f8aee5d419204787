//! Field-name access into typed, non-extensible containers.

use crate::access::{dotted_set, walk};
use crate::error::{DottedError, Result};
use crate::path::DottedPath;
use serde_json::Value;

/// A container whose top level is reachable only by field name.
///
/// Resolved launch configurations are plain structs: their fields cannot be
/// enumerated or extended at runtime, and nested values are only available
/// as detached copies. Implementors expose each field as JSON; traversal
/// below the top level then proceeds over the copied value, and writes put
/// the whole mutated field back.
pub trait OpaqueFields {
    /// Returns a detached copy of the named field, or `None` for a field
    /// that does not exist on this container.
    fn field(&self, name: &str) -> Option<Value>;

    /// Replaces the named field with `value`.
    ///
    /// # Errors
    ///
    /// [`DottedError::Unreachable`] when the field does not exist or the
    /// value does not fit the field's type. Custom fields can never be
    /// created on an opaque container.
    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;

    /// Returns the whole container as a JSON value.
    ///
    /// Used for the empty-path identity read.
    fn snapshot(&self) -> Value;
}

/// Gets a detached copy of the value addressed by `dotted`.
///
/// The first segment selects a field; the remaining segments descend into
/// the field's copied JSON value. Reads fail soft: an unknown field, like
/// any miss below it, yields `default`. An empty path returns the whole
/// container snapshot.
#[must_use]
pub fn opaque_get<T: OpaqueFields>(container: &T, dotted: &str, default: Value) -> Value {
    let path = DottedPath::parse(dotted);
    let Some((first, rest)) = path.split_first() else {
        return container.snapshot();
    };

    let Some(top) = container.field(first) else {
        return default;
    };

    walk(&top, &rest).cloned().unwrap_or(default)
}

/// Sets `value` at the path addressed by `dotted`.
///
/// The named field is read out as a detached copy, mutated, and written
/// back explicitly - partial mutations are invisible until the write-back,
/// because the container does not support in-place mutation of nested
/// structures.
///
/// # Errors
///
/// [`DottedError::Unreachable`] when the first segment is not a field of
/// the container or the descent below it fails.
pub fn opaque_set<T: OpaqueFields>(container: &mut T, dotted: &str, value: Value) -> Result<()> {
    let path = DottedPath::parse(dotted);
    let Some((first, rest)) = path.split_first() else {
        return Ok(());
    };

    if rest.is_empty() {
        return container.set_field(first, value);
    }

    let mut top = container
        .field(first)
        .ok_or_else(|| DottedError::unreachable(dotted))?;

    dotted_set(&mut top, &rest.to_string(), value)
        .map_err(|_| DottedError::unreachable(dotted))?;

    container.set_field(first, top)
}
