//! Record instances and attribute values.
//!
//! Values are checked against their field declaration when they are set, so
//! the diff engine can rely on a list field always holding a list and a
//! complex field always holding a record of the declared type.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::PatchError;
use crate::schema::{FieldDescriptor, FieldType, PrimitiveKind, RecordType};

// ── AttrValue ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum AttrValue {
    String(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Binary(Vec<u8>),
    Complex(Record),
    /// Multi-valued attribute. Elements may be absent at a position.
    List(Vec<Option<AttrValue>>),
}

/// Decimals compare bitwise with every NaN equal to every other, so a
/// record always equals its own clone.
impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::String(a), AttrValue::String(b)) => a == b,
            (AttrValue::Integer(a), AttrValue::Integer(b)) => a == b,
            (AttrValue::Decimal(a), AttrValue::Decimal(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            (AttrValue::Boolean(a), AttrValue::Boolean(b)) => a == b,
            (AttrValue::Binary(a), AttrValue::Binary(b)) => a == b,
            (AttrValue::Complex(a), AttrValue::Complex(b)) => a == b,
            (AttrValue::List(a), AttrValue::List(b)) => a == b,
            _ => false,
        }
    }
}

impl AttrValue {
    /// Build a list value from present elements.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttrValue>,
    {
        AttrValue::List(items.into_iter().map(|v| Some(v.into())).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            AttrValue::Complex(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Option<AttrValue>]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// JSON form of the value. `path` only labels serialization errors.
    pub fn to_json(&self, path: &str) -> Result<Value, PatchError> {
        Ok(match self {
            AttrValue::String(s) => Value::String(s.clone()),
            AttrValue::Integer(i) => Value::Number((*i).into()),
            AttrValue::Decimal(f) => {
                Value::Number(Number::from_f64(*f).ok_or_else(|| PatchError::Serialization {
                    path: path.to_string(),
                    reason: format!("decimal {f} has no JSON representation"),
                })?)
            }
            AttrValue::Boolean(b) => Value::Bool(*b),
            AttrValue::Binary(bytes) => Value::String(BASE64.encode(bytes)),
            AttrValue::Complex(record) => record.to_json_at(path)?,
            AttrValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Some(v) => v.to_json(path),
                        None => Ok(Value::Null),
                    })
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// Text form used inside value filters. Complex values and lists have
    /// none.
    pub fn to_literal(&self) -> Option<Value> {
        match self {
            AttrValue::String(s) => Some(Value::String(s.clone())),
            AttrValue::Integer(i) => Some(Value::Number((*i).into())),
            AttrValue::Decimal(f) => Number::from_f64(*f).map(Value::Number),
            AttrValue::Boolean(b) => Some(Value::Bool(*b)),
            AttrValue::Binary(bytes) => Some(Value::String(BASE64.encode(bytes))),
            AttrValue::Complex(_) | AttrValue::List(_) => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Integer(i)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        AttrValue::Integer(i64::from(i))
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Decimal(f)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Boolean(b)
    }
}

impl From<Vec<u8>> for AttrValue {
    fn from(bytes: Vec<u8>) -> Self {
        AttrValue::Binary(bytes)
    }
}

impl From<Record> for AttrValue {
    fn from(record: Record) -> Self {
        AttrValue::Complex(record)
    }
}

// ── Record ────────────────────────────────────────────────────────────────

/// An instance of a [`RecordType`]. Slots follow the type's declared field
/// order; `None` means the field is null.
#[derive(Debug, Clone)]
pub struct Record {
    ty: Arc<RecordType>,
    values: Vec<Option<AttrValue>>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ty.name() == other.ty.name() && self.values == other.values
    }
}

impl Record {
    pub fn new(ty: Arc<RecordType>) -> Self {
        let values = vec![None; ty.fields().len()];
        Self { ty, values }
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.ty.index_of(name).and_then(|i| self.values[i].as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut AttrValue> {
        let i = self.ty.index_of(name)?;
        self.values[i].as_mut()
    }

    /// Set a field, checking the value against the declaration.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) -> Result<(), PatchError> {
        let i = self.slot(name)?;
        let value = value.into();
        check_field(&self.ty.fields()[i], &value)?;
        self.values[i] = Some(value);
        Ok(())
    }

    /// Builder form of [`Record::set`].
    pub fn with(mut self, name: &str, value: impl Into<AttrValue>) -> Result<Self, PatchError> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Null out a field, returning its previous value.
    pub fn clear(&mut self, name: &str) -> Result<Option<AttrValue>, PatchError> {
        let i = self.slot(name)?;
        Ok(self.values[i].take())
    }

    fn slot(&self, name: &str) -> Result<usize, PatchError> {
        self.ty.index_of(name).ok_or_else(|| PatchError::UnknownField {
            record_type: self.ty.name().to_string(),
            field: name.to_string(),
        })
    }

    /// Non-null fields with their descriptors, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldDescriptor, &AttrValue)> {
        self.ty
            .fields()
            .iter()
            .zip(&self.values)
            .filter_map(|(f, v)| v.as_ref().map(|v| (f, v)))
    }

    /// JSON object of all non-null, non-static fields in declaration order.
    pub fn to_json(&self) -> Result<Value, PatchError> {
        self.to_json_at("")
    }

    pub(crate) fn to_json_at(&self, path: &str) -> Result<Value, PatchError> {
        let mut obj = Map::new();
        for (field, value) in self.iter() {
            if field.is_static() {
                continue;
            }
            obj.insert(field.name().to_string(), value.to_json(&join(path, field.name()))?);
        }
        Ok(Value::Object(obj))
    }

    /// Decode a record of type `ty` from its JSON object form.
    ///
    /// Keys the type does not declare are ignored; JSON `null` leaves the
    /// field null.
    pub fn from_json(ty: &Arc<RecordType>, json: &Value) -> Result<Self, PatchError> {
        let obj = json.as_object().ok_or_else(|| PatchError::TypeMismatch {
            field: ty.name().to_string(),
            expected: "object".into(),
        })?;
        let mut record = Record::new(ty.clone());
        for (i, field) in ty.fields().iter().enumerate() {
            match obj.get(field.name()) {
                None | Some(Value::Null) => {}
                Some(v) => record.values[i] = Some(decode_field(field, v)?),
            }
        }
        Ok(record)
    }

    /// Encode any serializable value through its JSON form.
    pub fn from_serialize<T: Serialize>(ty: &Arc<RecordType>, value: &T) -> Result<Self, PatchError> {
        let json = serde_json::to_value(value).map_err(|e| PatchError::Serialization {
            path: ty.name().to_string(),
            reason: e.to_string(),
        })?;
        Record::from_json(ty, &json)
    }
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}.{name}")
    }
}

// ── Declaration checks ────────────────────────────────────────────────────

fn check_field(field: &FieldDescriptor, value: &AttrValue) -> Result<(), PatchError> {
    if field.is_multi_valued() {
        let items = value.as_list().ok_or_else(|| mismatch(field, "list"))?;
        return items
            .iter()
            .flatten()
            .try_for_each(|item| check_single(field, item));
    }
    check_single(field, value)
}

fn check_single(field: &FieldDescriptor, value: &AttrValue) -> Result<(), PatchError> {
    let ok = match (field.field_type(), value) {
        (FieldType::Primitive(kind), v) => matches!(
            (kind, v),
            (PrimitiveKind::String, AttrValue::String(_))
                | (PrimitiveKind::Integer, AttrValue::Integer(_))
                | (PrimitiveKind::Decimal, AttrValue::Decimal(_))
                | (PrimitiveKind::Boolean, AttrValue::Boolean(_))
                | (PrimitiveKind::Binary, AttrValue::Binary(_))
        ),
        (FieldType::Complex(ty), AttrValue::Complex(record)) => record.type_name() == ty.name(),
        (FieldType::Complex(_), _) => false,
    };
    if ok {
        Ok(())
    } else {
        Err(mismatch(field, &field.field_type().describe()))
    }
}

fn mismatch(field: &FieldDescriptor, expected: &str) -> PatchError {
    PatchError::TypeMismatch {
        field: field.name().to_string(),
        expected: expected.to_string(),
    }
}

// ── JSON decoding ─────────────────────────────────────────────────────────

fn decode_field(field: &FieldDescriptor, json: &Value) -> Result<AttrValue, PatchError> {
    if field.is_multi_valued() {
        let items = json.as_array().ok_or_else(|| mismatch(field, "array"))?;
        return items
            .iter()
            .map(|item| match item {
                Value::Null => Ok(None),
                v => decode_single(field, v).map(Some),
            })
            .collect::<Result<_, _>>()
            .map(AttrValue::List);
    }
    decode_single(field, json)
}

fn decode_single(field: &FieldDescriptor, json: &Value) -> Result<AttrValue, PatchError> {
    let expected = || mismatch(field, &field.field_type().describe());
    match field.field_type() {
        FieldType::Primitive(PrimitiveKind::String) => {
            json.as_str().map(AttrValue::from).ok_or_else(expected)
        }
        FieldType::Primitive(PrimitiveKind::Integer) => {
            json.as_i64().map(AttrValue::Integer).ok_or_else(expected)
        }
        FieldType::Primitive(PrimitiveKind::Decimal) => {
            json.as_f64().map(AttrValue::Decimal).ok_or_else(expected)
        }
        FieldType::Primitive(PrimitiveKind::Boolean) => {
            json.as_bool().map(AttrValue::Boolean).ok_or_else(expected)
        }
        FieldType::Primitive(PrimitiveKind::Binary) => {
            let text = json.as_str().ok_or_else(expected)?;
            BASE64.decode(text).map(AttrValue::Binary).map_err(|_| expected())
        }
        FieldType::Complex(ty) => Record::from_json(ty, json).map(AttrValue::Complex),
    }
}
