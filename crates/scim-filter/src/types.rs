//! SCIM attribute path types based on RFC 7644 §3.5.2.

use serde_json::Value;

/// Attribute comparison operators usable inside a value filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq, // equal
    Ne, // not equal
    Co, // contains
    Sw, // starts with
    Ew, // ends with
    Gt, // greater than
    Ge, // greater than or equal
    Lt, // less than
    Le, // less than or equal
}

impl CompareOp {
    /// Canonical upper-case token, as emitted in generated paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Co => "CO",
            Self::Sw => "SW",
            Self::Ew => "EW",
            Self::Gt => "GT",
            Self::Ge => "GE",
            Self::Lt => "LT",
            Self::Le => "LE",
        }
    }

    /// Parse an operator token. SCIM operators are case-insensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token.to_ascii_lowercase().as_str() {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "co" => Self::Co,
            "sw" => Self::Sw,
            "ew" => Self::Ew,
            "gt" => Self::Gt,
            "ge" => Self::Ge,
            "lt" => Self::Lt,
            "le" => Self::Le,
            _ => return None,
        };
        Some(op)
    }
}

/// One `attr OP literal` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Sub-attribute name of the element being filtered.
    pub attr: String,
    pub op: CompareOp,
    /// String, number, boolean or null literal.
    pub value: Value,
}

impl Comparison {
    pub fn eq(attr: impl Into<String>, value: Value) -> Self {
        Self { attr: attr.into(), op: CompareOp::Eq, value }
    }
}

/// A conjunction of comparisons: `a EQ 1 AND b EQ "x"`.
///
/// An empty filter is legal and formats as `[]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueFilter {
    pub clauses: Vec<Comparison>,
}

impl ValueFilter {
    pub fn new(clauses: Vec<Comparison>) -> Self {
        Self { clauses }
    }

    pub fn push(&mut self, clause: Comparison) {
        self.clauses.push(clause);
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// A PATCH target path: `[urn:]attr[\[filter\]][.subAttr]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrPath {
    /// Schema URN prefix for extension attributes.
    pub urn: Option<String>,
    pub attr: String,
    pub filter: Option<ValueFilter>,
    pub sub_attr: Option<String>,
}

impl AttrPath {
    pub fn new(attr: impl Into<String>) -> Self {
        Self { urn: None, attr: attr.into(), filter: None, sub_attr: None }
    }

    pub fn with_urn(mut self, urn: impl Into<String>) -> Self {
        self.urn = Some(urn.into());
        self
    }

    pub fn with_filter(mut self, filter: ValueFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_sub_attr(mut self, sub_attr: impl Into<String>) -> Self {
        self.sub_attr = Some(sub_attr.into());
        self
    }
}
