//! SCIM PATCH request document (RFC 7644 §3.5.2).
//!
//! # Operations
//!
//! `add`, `remove` and `replace`, each with an optional path. The diff
//! engine always sets a path; path-less adds can be built by hand.

pub mod codec;
pub mod types;

pub use codec::{from_json, from_str, to_json};
pub use types::{OpKind, PatchOperation, PatchRequest, PATCH_OP_SCHEMA};
