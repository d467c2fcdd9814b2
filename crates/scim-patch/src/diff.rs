//! Structural diff of two records into a SCIM PATCH request.
//!
//! Fields are walked in registry order, so operations come out in
//! declaration order. Within a multi-valued field, elements are matched by
//! position only; net-new trailing elements are collected into a single
//! `add` emitted last for that field.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use scim_filter::AttrPath;
use tracing::{debug, trace};

use crate::error::PatchError;
use crate::path::attr_path_for;
use crate::patch::{OpKind, PatchOperation, PatchRequest};
use crate::schema::{FieldDescriptor, FieldRegistry, RecordType, Shape};
use crate::value::{AttrValue, Record};

/// Generates patch requests from (modified, original) record pairs.
///
/// Stateless apart from the shared field registry; one generator can serve
/// any number of threads.
#[derive(Debug, Clone)]
pub struct PatchGenerator {
    registry: Arc<FieldRegistry>,
}

impl Default for PatchGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchGenerator {
    /// Generator backed by the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(FieldRegistry::global())
    }

    pub fn with_registry(registry: Arc<FieldRegistry>) -> Self {
        Self { registry }
    }

    /// Patch that turns `original` into `modified`.
    pub fn create(&self, id: &str, modified: &Record, original: &Record) -> Result<PatchRequest, PatchError> {
        self.create_with_if_match(id, modified, original, None)
    }

    /// Like [`create`](Self::create), recording an `If-Match` token on the request.
    pub fn create_with_if_match(
        &self,
        id: &str,
        modified: &Record,
        original: &Record,
        if_match: Option<String>,
    ) -> Result<PatchRequest, PatchError> {
        ensure_same_type(modified, original)?;
        debug!(record_type = modified.type_name(), id, "generating patch");

        let mut pr = PatchRequest::new(id, modified.record_type().clone()).with_if_match(if_match);
        self.diff_records(&mut pr, modified, original, None)?;

        debug!(record_type = modified.type_name(), id, operations = pr.len(), "patch generated");
        Ok(pr)
    }

    /// Encode both values as records of `ty` through serde, then diff them.
    pub fn create_from_serde<T: Serialize>(
        &self,
        id: &str,
        ty: &Arc<RecordType>,
        modified: &T,
        original: &T,
    ) -> Result<PatchRequest, PatchError> {
        let modified = Record::from_serialize(ty, modified)?;
        let original = Record::from_serialize(ty, original)?;
        self.create(id, &modified, &original)
    }

    // ── Core recursive differ ─────────────────────────────────────────────

    /// Walk the comparable fields of `modified`. Inside an extension, `urn`
    /// qualifies every emitted path.
    fn diff_records(
        &self,
        pr: &mut PatchRequest,
        modified: &Record,
        original: &Record,
        urn: Option<&str>,
    ) -> Result<(), PatchError> {
        for field in self.registry.fields_of(modified.record_type()).iter() {
            let path = field_path(urn, field);
            match (modified.get(field.name()), original.get(field.name())) {
                (None, None) => {}
                (Some(m), Some(o)) if m == o => {}
                (Some(m), None) => {
                    let value = m.to_json(&path.to_string())?;
                    emit(pr, OpKind::Add, &path, Some(value));
                }
                (None, Some(_)) => emit(pr, OpKind::Remove, &path, None),
                (Some(m), Some(o)) => self.diff_field(pr, field, &path, m, o)?,
            }
        }
        Ok(())
    }

    fn diff_field(
        &self,
        pr: &mut PatchRequest,
        field: &FieldDescriptor,
        path: &AttrPath,
        m: &AttrValue,
        o: &AttrValue,
    ) -> Result<(), PatchError> {
        if field.shape() == Shape::ComplexList {
            let (m, o) = m.as_list().zip(o.as_list()).ok_or_else(|| mismatch(field, "list"))?;
            return self.diff_lists(pr, path, m, o);
        }

        if let Some(urn) = field.extension_urn() {
            let (m, o) = m.as_record().zip(o.as_record()).ok_or_else(|| mismatch(field, "record"))?;
            ensure_same_type(m, o)?;
            trace!(urn, "diffing extension");
            return self.diff_records(pr, m, o, Some(urn));
        }

        match field.shape() {
            Shape::Primitive => {
                if m != o {
                    let value = m.to_json(&path.to_string())?;
                    emit(pr, OpKind::Replace, path, Some(value));
                }
                Ok(())
            }
            _ => self.diff_objects(pr, path, m, o),
        }
    }

    /// Positional reconciliation of a multi-valued attribute.
    fn diff_lists(
        &self,
        pr: &mut PatchRequest,
        path: &AttrPath,
        m: &[Option<AttrValue>],
        o: &[Option<AttrValue>],
    ) -> Result<(), PatchError> {
        if m.is_empty() && !o.is_empty() {
            emit(pr, OpKind::Remove, path, None);
            return Ok(());
        }

        let label = path.to_string();
        let mut added = Vec::new();
        for (i, mi) in m.iter().enumerate() {
            match (mi, o.get(i)) {
                (None, Some(Some(oi))) => {
                    // The element that used to sit here was deleted.
                    let target = attr_path_for(&self.registry, path.clone(), oi);
                    emit(pr, OpKind::Remove, &target, None);
                }
                (Some(mi), Some(Some(oi))) => self.diff_objects(pr, path, mi, oi)?,
                (Some(mi), Some(None) | None) => added.push(mi.to_json(&label)?),
                (None, Some(None) | None) => {}
            }
        }

        if !added.is_empty() {
            emit(pr, OpKind::Add, path, Some(Value::Array(added)));
        }
        Ok(())
    }

    /// Diff two non-null values at `path`. Complex values produce at most one
    /// partial `replace` carrying only the changed or newly set
    /// sub-attributes.
    fn diff_objects(&self, pr: &mut PatchRequest, path: &AttrPath, m: &AttrValue, o: &AttrValue) -> Result<(), PatchError> {
        let (mr, or) = match (m, o) {
            (AttrValue::Complex(mr), AttrValue::Complex(or)) => (mr, or),
            _ => {
                if m != o {
                    let value = m.to_json(&path.to_string())?;
                    emit(pr, OpKind::Replace, path, Some(value));
                }
                return Ok(());
            }
        };
        ensure_same_type(mr, or)?;

        let target = if or.record_type().is_multi_valued() {
            attr_path_for(&self.registry, path.clone(), o)
        } else {
            path.clone()
        };

        let mut staged = Map::new();
        for field in self.registry.fields_of(mr.record_type()).iter() {
            match (mr.get(field.name()), or.get(field.name())) {
                (Some(mv), None) => {
                    staged.insert(field.name().to_string(), mv.to_json(field.name())?);
                }
                (Some(mv), Some(ov)) if mv != ov => {
                    staged.insert(field.name().to_string(), mv.to_json(field.name())?);
                }
                // A sub-attribute cleared in `m` cannot be expressed in a
                // partial replace and is left as-is on the server.
                _ => {}
            }
        }

        if !staged.is_empty() {
            emit(pr, OpKind::Replace, &target, Some(Value::Object(staged)));
        }
        Ok(())
    }
}

fn field_path(urn: Option<&str>, field: &FieldDescriptor) -> AttrPath {
    let path = AttrPath::new(field.path());
    match urn {
        Some(urn) => path.with_urn(urn),
        None => path,
    }
}

fn emit(pr: &mut PatchRequest, op: OpKind, path: &AttrPath, value: Option<Value>) {
    let path = path.to_string();
    trace!(%op, path = path.as_str(), "emit");
    pr.push(PatchOperation { op, path: Some(path), value });
}

fn ensure_same_type(modified: &Record, original: &Record) -> Result<(), PatchError> {
    if modified.type_name() != original.type_name() {
        return Err(PatchError::IncompatibleTypes {
            modified: modified.type_name().to_string(),
            original: original.type_name().to_string(),
        });
    }
    Ok(())
}

fn mismatch(field: &FieldDescriptor, expected: &str) -> PatchError {
    PatchError::TypeMismatch {
        field: field.name().to_string(),
        expected: expected.to_string(),
    }
}
