//! Core domain types for marketplace language-server provisioning.
//!
//! This crate provides the foundational types shared across the workspace:
//!
//! - Strong domain types (`PackageName`, `ExtensionId`, `ExtensionVersion`)
//! - `${variable}` expansion for server-relative path templates
//!
//! # Architecture
//!
//! Nothing here touches the network or the file system. The marketplace
//! download machinery lives in `pylance-marketplace`; the launch
//! configuration model and editor-facing glue live in `pylance-client`.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod expand;
mod types;

pub use expand::{Variables, expand_variables};
pub use types::{ExtensionId, ExtensionVersion, InvalidExtensionId, PackageName};
