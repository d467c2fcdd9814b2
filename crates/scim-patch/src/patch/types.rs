//! Patch operations and the patch request document.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use scim_filter::{AttrPath, AttrPathParser};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::PatchError;
use crate::schema::RecordType;

/// Message schema of every PATCH request body.
pub const PATCH_OP_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

// ── OpKind ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Add,
    Remove,
    Replace,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Remove => "remove",
            OpKind::Replace => "replace",
        }
    }
}

impl FromStr for OpKind {
    type Err = PatchError;

    /// Operation names are case-insensitive on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(OpKind::Add),
            "remove" => Ok(OpKind::Remove),
            "replace" => Ok(OpKind::Replace),
            _ => Err(PatchError::UnknownOp(s.to_string())),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── PatchOperation ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchOperation {
    pub op: OpKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self { op: OpKind::Add, path: Some(path.into()), value: Some(value) }
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self { op: OpKind::Replace, path: Some(path.into()), value: Some(value) }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self { op: OpKind::Remove, path: Some(path.into()), value: None }
    }

    /// Parse the target path, if any.
    pub fn target(&self) -> Result<Option<AttrPath>, PatchError> {
        self.path
            .as_deref()
            .map(AttrPathParser::parse)
            .transpose()
            .map_err(PatchError::from)
    }
}

// ── PatchRequest ──────────────────────────────────────────────────────────

/// The ordered operations for one resource, plus the metadata the transport
/// needs to send them.
///
/// Only `schemas` and `Operations` are part of the request body. The
/// identifier, target type, `If-Match` token and attribute selection are
/// carried alongside for the transport to turn into URL, headers and query
/// parameters.
#[derive(Debug, Clone)]
pub struct PatchRequest {
    id: String,
    resource_type: Arc<RecordType>,
    operations: Vec<PatchOperation>,
    if_match: Option<String>,
    attributes: Option<String>,
}

impl PatchRequest {
    pub fn new(id: impl Into<String>, resource_type: Arc<RecordType>) -> Self {
        Self {
            id: id.into(),
            resource_type,
            operations: Vec::new(),
            if_match: None,
            attributes: None,
        }
    }

    pub fn with_if_match(mut self, if_match: Option<String>) -> Self {
        self.if_match = if_match;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn resource_type(&self) -> &Arc<RecordType> {
        &self.resource_type
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<PatchOperation> {
        self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Conditional-request token (an ETag) the resource must still match.
    pub fn if_match(&self) -> Option<&str> {
        self.if_match.as_deref()
    }

    pub fn set_if_match(&mut self, if_match: Option<String>) {
        self.if_match = if_match;
    }

    /// Attributes the server should return in the response.
    pub fn attributes(&self) -> Option<&str> {
        self.attributes.as_deref()
    }

    /// Blank selections are dropped.
    pub fn set_attributes(&mut self, attributes: Option<&str>) {
        self.attributes = attributes
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
    }

    pub fn push(&mut self, op: PatchOperation) {
        self.operations.push(op);
    }

    pub fn add(&mut self, path: impl Into<String>, value: Value) {
        self.push(PatchOperation::add(path, value));
    }

    /// Path-less add: `value` is merged into the resource itself.
    pub fn add_document(&mut self, value: Value) {
        self.push(PatchOperation { op: OpKind::Add, path: None, value: Some(value) });
    }

    pub fn add_json(&mut self, path: Option<&str>, json: &str) -> Result<(), PatchError> {
        let value = serde_json::from_str(json)?;
        self.push(PatchOperation { op: OpKind::Add, path: path.map(str::to_string), value: Some(value) });
        Ok(())
    }

    pub fn replace(&mut self, path: impl Into<String>, value: Value) {
        self.push(PatchOperation::replace(path, value));
    }

    pub fn replace_json(&mut self, path: Option<&str>, json: &str) -> Result<(), PatchError> {
        let value = serde_json::from_str(json)?;
        self.push(PatchOperation {
            op: OpKind::Replace,
            path: path.map(str::to_string),
            value: Some(value),
        });
        Ok(())
    }

    pub fn remove(&mut self, path: impl Into<String>) {
        self.push(PatchOperation::remove(path));
    }
}

impl Serialize for PatchRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PatchRequest", 2)?;
        state.serialize_field("schemas", &[PATCH_OP_SCHEMA])?;
        state.serialize_field("Operations", &self.operations)?;
        state.end()
    }
}

impl fmt::Display for PatchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
