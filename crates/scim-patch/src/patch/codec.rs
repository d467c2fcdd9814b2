//! JSON codec for PATCH request bodies.
//!
//! Encodes a [`PatchRequest`] to, and decodes operations from, the
//! `urn:ietf:params:scim:api:messages:2.0:PatchOp` message form.

use serde_json::{json, Map, Value};

use crate::error::PatchError;
use crate::patch::types::{OpKind, PatchOperation, PatchRequest, PATCH_OP_SCHEMA};

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize one operation. `path` and `value` are omitted when absent.
pub fn op_to_json(op: &PatchOperation) -> Value {
    let mut m = Map::new();
    m.insert("op".into(), json!(op.op.as_str()));
    if let Some(path) = &op.path {
        m.insert("path".into(), json!(path));
    }
    if let Some(value) = &op.value {
        m.insert("value".into(), value.clone());
    }
    Value::Object(m)
}

/// Serialize the request body.
pub fn to_json(pr: &PatchRequest) -> Value {
    json!({
        "schemas": [PATCH_OP_SCHEMA],
        "Operations": pr.operations().iter().map(op_to_json).collect::<Vec<_>>()
    })
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Decode one operation object.
pub fn op_from_json(v: &Value) -> Result<PatchOperation, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let kind: OpKind = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::InvalidOp("missing op".into()))?
        .parse()?;
    let path = match obj.get("path") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(PatchError::InvalidOp("path must be a string".into())),
    };

    match kind {
        OpKind::Remove => {
            let path = path.ok_or_else(|| PatchError::InvalidOp("remove requires a path".into()))?;
            Ok(PatchOperation::remove(path))
        }
        OpKind::Add | OpKind::Replace => {
            let value = obj
                .get("value")
                .cloned()
                .ok_or_else(|| PatchError::InvalidOp(format!("{kind} requires a value")))?;
            Ok(PatchOperation { op: kind, path, value: Some(value) })
        }
    }
}

/// Decode the operations of a request body.
pub fn from_json(v: &Value) -> Result<Vec<PatchOperation>, PatchError> {
    let schemas = v
        .get("schemas")
        .and_then(Value::as_array)
        .ok_or_else(|| PatchError::InvalidOp("schemas must be an array".into()))?;
    if !schemas.iter().any(|s| s.as_str() == Some(PATCH_OP_SCHEMA)) {
        return Err(PatchError::InvalidOp(format!("schemas must contain {PATCH_OP_SCHEMA}")));
    }
    let ops = v
        .get("Operations")
        .and_then(Value::as_array)
        .ok_or_else(|| PatchError::InvalidOp("Operations must be an array".into()))?;
    ops.iter().map(op_from_json).collect()
}

/// Decode the operations of a request body given as text.
pub fn from_str(text: &str) -> Result<Vec<PatchOperation>, PatchError> {
    let v: Value = serde_json::from_str(text)?;
    from_json(&v)
}
