//! Dotted-path access into nested, heterogeneous containers.
//!
//! Settings for a language server arrive as arbitrarily nested JSON and
//! need to be read and patched by textual keys such as
//! `python.analysis.extraPaths`. This crate provides:
//!
//! - [`DottedPath`] - the parsed path, with an angle-bracket escape so a
//!   single segment may contain literal dots (`<a.b>.c` is two segments)
//! - [`dotted_get`] / [`dotted_set`] - traversal over [`serde_json::Value`]
//! - [`OpaqueFields`] - field-name access into typed structs that expose
//!   no interior mutation
//! - [`SettingsStore`] - a copy-out/write-back key-value store whose nested
//!   mutations only become visible when the top-level entry is re-assigned
//!
//! # Shape dispatch
//!
//! Traversal distinguishes exactly three container shapes: mappings
//! (segment is a key), sequences (segment is a numeric index), and opaque
//! objects (segment is a field name). The shape of the *container* decides
//! how a segment is interpreted; a numeric-looking segment against a
//! mapping is a mapping key, never an index.
//!
//! # Examples
//!
//! ```
//! use pylance_dotted::{dotted_get, dotted_set};
//! use serde_json::json;
//!
//! let mut settings = json!({"python": {"analysis": {"extraPaths": ["/a"]}}});
//!
//! dotted_set(&mut settings, "python.analysis.typeCheckingMode", json!("basic")).unwrap();
//! assert_eq!(
//!     dotted_get(&settings, "python.analysis.typeCheckingMode"),
//!     Some(&json!("basic")),
//! );
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod access;
mod error;
mod opaque;
mod path;
mod store;

pub use access::{dotted_get, dotted_get_or, dotted_set};
pub use error::{DottedError, Result};
pub use opaque::{OpaqueFields, opaque_get, opaque_set};
pub use path::DottedPath;
pub use store::SettingsStore;
