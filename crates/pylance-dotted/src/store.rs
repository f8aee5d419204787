//! Copy-out/write-back settings store.

use crate::access::{dotted_set, walk};
use crate::error::{DottedError, Result};
use crate::path::DottedPath;
use serde_json::{Map, Value};

/// A flat key-value settings store with copy-out/write-back semantics.
///
/// Models the host's settings object: reading a top-level entry hands back
/// a detached copy, and mutations of nested structures are invisible until
/// the whole entry is re-assigned with [`SettingsStore::set`]. The dotted
/// helpers encapsulate that read-mutate-write-back dance.
///
/// # Examples
///
/// ```
/// use pylance_dotted::SettingsStore;
/// use serde_json::json;
///
/// let mut store = SettingsStore::new();
/// store.set("settings", json!({"python": {}}));
///
/// store
///     .dotted_set("settings.python.analysis.typeCheckingMode", json!("off"))
///     .unwrap();
/// assert_eq!(
///     store.dotted_get("settings.python.analysis.typeCheckingMode"),
///     Some(json!("off")),
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsStore {
    entries: Map<String, Value>,
}

impl SettingsStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a JSON object's entries.
    ///
    /// Non-object values produce an empty store.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(entries) => Self { entries },
            _ => Self::default(),
        }
    }

    /// Returns `true` when a top-level entry exists.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns a detached copy of a top-level entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    /// Assigns a top-level entry, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Returns the whole store as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }

    /// Gets a detached copy of the value addressed by `dotted`.
    ///
    /// The first segment selects the top-level entry; missing entry or a
    /// failed walk below it returns `None`. An empty path returns the whole
    /// store as an object.
    #[must_use]
    pub fn dotted_get(&self, dotted: &str) -> Option<Value> {
        let path = DottedPath::parse(dotted);
        let Some((first, rest)) = path.split_first() else {
            return Some(self.to_value());
        };

        let top = self.entries.get(first)?;
        walk(top, &rest).cloned()
    }

    /// Gets the value addressed by `dotted`, or `default` on any miss.
    #[must_use]
    pub fn dotted_get_or(&self, dotted: &str, default: Value) -> Value {
        self.dotted_get(dotted).unwrap_or(default)
    }

    /// Sets `value` at the path addressed by `dotted`.
    ///
    /// Reads the top-level entry out as a detached copy, mutates the copy,
    /// and writes it back. A missing top-level entry is created only when
    /// the path has no further segments; deeper writes into an absent entry
    /// are unreachable, because there is no container to copy out.
    ///
    /// # Errors
    ///
    /// [`DottedError::Unreachable`] when the walk below the top-level entry
    /// fails or the entry is absent with segments remaining.
    pub fn dotted_set(&mut self, dotted: &str, value: Value) -> Result<()> {
        let path = DottedPath::parse(dotted);
        let Some((first, rest)) = path.split_first() else {
            return Ok(());
        };

        let mut top = match self.entries.get(first) {
            Some(existing) => existing.clone(),
            None => {
                if !rest.is_empty() {
                    return Err(DottedError::unreachable(dotted));
                }
                value.clone()
            }
        };

        if !rest.is_empty() {
            dotted_set(&mut top, &rest.to_string(), value)
                .map_err(|_| DottedError::unreachable(dotted))?;
        } else {
            top = value;
        }

        self.entries.insert(first.to_string(), top);
        Ok(())
    }
}

impl From<Map<String, Value>> for SettingsStore {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> SettingsStore {
        SettingsStore::from_value(json!({
            "command": [],
            "settings": {"python": {"analysis": {"extraPaths": ["/a"]}}},
        }))
    }

    #[test]
    fn get_returns_detached_copy() {
        let store = store();
        let mut copy = store.get("settings").unwrap();
        copy["python"] = json!(null);
        // the store is unaffected until set() writes the copy back
        assert_eq!(
            store.dotted_get("settings.python.analysis.extraPaths"),
            Some(json!(["/a"])),
        );
    }

    #[test]
    fn dotted_set_writes_back_through_top_key() {
        let mut store = store();
        store
            .dotted_set("settings.python.analysis.extraPaths", json!(["/a", "/b"]))
            .unwrap();
        assert_eq!(
            store.dotted_get("settings.python.analysis.extraPaths"),
            Some(json!(["/a", "/b"])),
        );
    }

    #[test]
    fn dotted_set_creates_missing_top_entry_for_single_segment() {
        let mut store = SettingsStore::new();
        store.dotted_set("enabled", json!(true)).unwrap();
        assert_eq!(store.get("enabled"), Some(json!(true)));
    }

    #[test]
    fn dotted_set_missing_top_entry_with_remaining_path_is_unreachable() {
        let mut store = SettingsStore::new();
        let err = store.dotted_set("absent.nested", json!(1)).unwrap_err();
        assert!(matches!(err, DottedError::Unreachable { .. }));
    }

    #[test]
    fn empty_path_reads_whole_store() {
        let store = store();
        assert_eq!(store.dotted_get(""), Some(store.to_value()));
    }

    #[test]
    fn missing_entry_reads_default() {
        let store = store();
        assert_eq!(store.dotted_get_or("nope.x", json!("D")), json!("D"));
    }
}
