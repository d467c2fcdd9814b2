//! Declared record types and their field metadata.
//!
//! A [`RecordType`] is built once, up front, and describes every field of a
//! resource or complex attribute in declaration order. The diff engine never
//! inspects values to find out what a field is; it reads the declaration.

pub mod registry;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub use registry::FieldRegistry;

// ── Leaf kinds ────────────────────────────────────────────────────────────

/// Closed set of primitive (leaf) attribute kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Integer,
    Decimal,
    Boolean,
    Binary,
}

impl PrimitiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Decimal => "decimal",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Binary => "binary",
        }
    }
}

/// Declared type of a field, or of each element of a multi-valued field.
#[derive(Debug, Clone)]
pub enum FieldType {
    Primitive(PrimitiveKind),
    Complex(Arc<RecordType>),
}

impl FieldType {
    pub fn describe(&self) -> String {
        match self {
            FieldType::Primitive(kind) => kind.as_str().to_string(),
            FieldType::Complex(ty) => ty.name().to_string(),
        }
    }
}

/// How the diff engine treats a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Primitive,
    ComplexSingle,
    ComplexList,
}

// ── Field descriptor ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    field_type: FieldType,
    multi_valued: bool,
    read_only: bool,
    is_static: bool,
    extension: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            multi_valued: false,
            read_only: false,
            is_static: false,
            extension: None,
        }
    }

    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, FieldType::Primitive(kind))
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveKind::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveKind::Integer)
    }

    pub fn decimal(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveKind::Decimal)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveKind::Boolean)
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveKind::Binary)
    }

    pub fn complex(name: impl Into<String>, ty: Arc<RecordType>) -> Self {
        Self::new(name, FieldType::Complex(ty))
    }

    /// The field holds an ordered list of values of its declared type.
    pub fn multi_valued(mut self) -> Self {
        self.multi_valued = true;
        self
    }

    /// Server-assigned; never compared.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Type-level constant; never compared or serialized.
    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// The field holds a whole record of the extension schema `urn`.
    pub fn extension(mut self, urn: impl Into<String>) -> Self {
        self.extension = Some(urn.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn is_multi_valued(&self) -> bool {
        self.multi_valued
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn extension_urn(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Whether the field takes part in diffs at all.
    pub fn is_comparable(&self) -> bool {
        !self.read_only && !self.is_static
    }

    /// Protocol path of the field at the top of its record: the extension
    /// URN for extension fields, the field name otherwise.
    pub fn path(&self) -> &str {
        self.extension.as_deref().unwrap_or(&self.name)
    }

    /// Static classification, independent of any instance value.
    pub fn shape(&self) -> Shape {
        if self.multi_valued {
            return Shape::ComplexList;
        }
        match self.field_type {
            FieldType::Primitive(_) => Shape::Primitive,
            FieldType::Complex(_) => Shape::ComplexSingle,
        }
    }
}

// ── Record type ───────────────────────────────────────────────────────────

/// A named record type: a resource, an extension schema, or a complex
/// attribute type.
#[derive(Debug)]
pub struct RecordType {
    id: u64,
    name: String,
    schema: Option<String>,
    multi_valued: bool,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl RecordType {
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            schema: None,
            multi_valued: false,
            fields: Vec::new(),
        }
    }

    /// Process-unique identity assigned by [`RecordTypeBuilder::build`].
    /// Two types built separately never share an id, even with equal names.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Type name. Two records are compatible iff their type names are equal.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Elements of this complex type live in multi-valued attributes and are
    /// addressed by value filters.
    pub fn is_multi_valued(&self) -> bool {
        self.multi_valued
    }

    /// Every declared field, including read-only and static ones.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index_of(name).map(|i| &self.fields[i])
    }
}

pub struct RecordTypeBuilder {
    name: String,
    schema: Option<String>,
    multi_valued: bool,
    fields: Vec<FieldDescriptor>,
}

impl RecordTypeBuilder {
    pub fn schema(mut self, urn: impl Into<String>) -> Self {
        self.schema = Some(urn.into());
        self
    }

    pub fn multi_valued(mut self, multi_valued: bool) -> Self {
        self.multi_valued = multi_valued;
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Finish the type. When a name is declared twice the first declaration
    /// is the one looked up by name.
    pub fn build(self) -> Arc<RecordType> {
        let mut index = HashMap::with_capacity(self.fields.len());
        for (i, field) in self.fields.iter().enumerate() {
            index.entry(field.name.clone()).or_insert(i);
        }
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        Arc::new(RecordType {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name: self.name,
            schema: self.schema,
            multi_valued: self.multi_valued,
            fields: self.fields,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_type() -> Arc<RecordType> {
        RecordType::builder("Email")
            .multi_valued(true)
            .field(FieldDescriptor::string("value"))
            .field(FieldDescriptor::string("type"))
            .field(FieldDescriptor::boolean("primary"))
            .build()
    }

    #[test]
    fn shape_is_static() {
        let email = email_type();
        assert_eq!(FieldDescriptor::string("userName").shape(), Shape::Primitive);
        assert_eq!(
            FieldDescriptor::complex("emails", email.clone()).multi_valued().shape(),
            Shape::ComplexList
        );
        assert_eq!(FieldDescriptor::complex("email", email).shape(), Shape::ComplexSingle);
        assert_eq!(
            FieldDescriptor::string("schemas").multi_valued().shape(),
            Shape::ComplexList
        );
    }

    #[test]
    fn extension_path_is_urn() {
        let ent = RecordType::builder("EnterpriseUser").build();
        let field = FieldDescriptor::complex("enterpriseUser", ent).extension("urn:x:ent");
        assert_eq!(field.path(), "urn:x:ent");
        assert_eq!(FieldDescriptor::string("title").path(), "title");
    }

    #[test]
    fn index_lookup_keeps_declaration_order() {
        let email = email_type();
        assert_eq!(email.index_of("value"), Some(0));
        assert_eq!(email.index_of("primary"), Some(2));
        assert_eq!(email.index_of("missing"), None);
        let names: Vec<_> = email.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["value", "type", "primary"]);
    }

    #[test]
    fn duplicate_names_resolve_to_first() {
        let ty = RecordType::builder("Dup")
            .field(FieldDescriptor::string("a"))
            .field(FieldDescriptor::integer("a"))
            .build();
        assert!(matches!(
            ty.field("a").unwrap().field_type(),
            FieldType::Primitive(PrimitiveKind::String)
        ));
    }
}
