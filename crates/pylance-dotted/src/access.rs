//! Traversal over [`serde_json::Value`] containers.

use crate::error::{DottedError, Result};
use crate::path::DottedPath;
use serde_json::{Map, Value};

/// Gets a reference to the value addressed by `dotted`.
///
/// Walks the container one segment at a time: mappings are indexed by key,
/// sequences by non-negative integer. Any miss - absent key, non-numeric or
/// out-of-range index, or a scalar in the middle of the path - returns
/// `None`. An empty path returns the container itself.
///
/// # Examples
///
/// ```
/// use pylance_dotted::dotted_get;
/// use serde_json::json;
///
/// let value = json!({"a": [1, 2, 3]});
/// assert_eq!(dotted_get(&value, "a.1"), Some(&json!(2)));
/// assert_eq!(dotted_get(&value, "a.9"), None);
/// assert_eq!(dotted_get(&value, ""), Some(&value));
/// ```
#[must_use]
pub fn dotted_get<'a>(root: &'a Value, dotted: &str) -> Option<&'a Value> {
    walk(root, &DottedPath::parse(dotted))
}

/// Gets the value addressed by `dotted`, or `default` when the walk fails.
///
/// Clone-based convenience over [`dotted_get`] mirroring the fail-closed
/// read contract: no partial results, the default is returned on the first
/// miss.
#[must_use]
pub fn dotted_get_or(root: &Value, dotted: &str, default: Value) -> Value {
    dotted_get(root, dotted).cloned().unwrap_or(default)
}

/// Sets `value` at the path addressed by `dotted`.
///
/// Walks all but the last segment with non-destructive creation: a missing
/// key in a mapping is created as an empty mapping rather than failing.
/// This deliberately differs from [`dotted_get`], which fails closed.
/// Sequences are never grown; an out-of-range index is an error, as is
/// descending into a scalar.
///
/// An empty path is a no-op, matching the read-side identity.
///
/// # Errors
///
/// [`DottedError::Unreachable`] when the walk hits a node that cannot
/// accept further indexing or the final assignment target does not exist.
pub fn dotted_set(root: &mut Value, dotted: &str, value: Value) -> Result<()> {
    let path = DottedPath::parse(dotted);
    let Some((init, last)) = path.split_last() else {
        return Ok(());
    };

    let unreachable = || DottedError::unreachable(dotted);

    let mut node = root;
    for segment in init.segments() {
        node = match node {
            Value::Object(map) => map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(items) => {
                let index = segment.parse::<usize>().map_err(|_| unreachable())?;
                items.get_mut(index).ok_or_else(unreachable)?
            }
            _ => return Err(unreachable()),
        };
    }

    match node {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = last.parse::<usize>().map_err(|_| unreachable())?;
            let slot = items.get_mut(index).ok_or_else(unreachable)?;
            *slot = value;
            Ok(())
        }
        _ => Err(unreachable()),
    }
}

pub(crate) fn walk<'a>(root: &'a Value, path: &DottedPath) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}
