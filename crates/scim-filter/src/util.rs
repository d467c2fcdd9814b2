//! Attribute path formatting helpers.

use std::fmt;

use serde_json::Value;

use crate::types::{AttrPath, Comparison, ValueFilter};

/// Separator placed between filter clauses.
pub const OPERATOR_AND: &str = " AND ";

/// Convert an attribute path AST to its wire form.
pub fn attr_path_to_string(path: &AttrPath) -> String {
    let mut out = String::new();
    if let Some(urn) = &path.urn {
        out.push_str(urn);
        out.push(':');
    }
    out.push_str(&path.attr);
    if let Some(filter) = &path.filter {
        out.push('[');
        out.push_str(&filter_to_string(filter));
        out.push(']');
    }
    if let Some(sub) = &path.sub_attr {
        out.push('.');
        out.push_str(sub);
    }
    out
}

/// Format the clauses of a value filter, without the surrounding brackets.
pub fn filter_to_string(filter: &ValueFilter) -> String {
    filter
        .clauses
        .iter()
        .map(comparison_to_string)
        .collect::<Vec<_>>()
        .join(OPERATOR_AND)
}

fn comparison_to_string(clause: &Comparison) -> String {
    format!("{} {} {}", clause.attr, clause.op.as_str(), literal_to_string(&clause.value))
}

/// Render a filter literal.
///
/// Strings are double-quoted with embedded `"` escaped as `\"`. Everything
/// else is written in its natural JSON text form, unquoted.
pub fn literal_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", escape_quotes(s)),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::from("null"),
        other => other.to_string(),
    }
}

/// Escape double quotes with a backslash. Backslashes are left as-is.
pub fn escape_quotes(input: &str) -> String {
    if !input.contains('"') {
        return input.to_string();
    }
    input.replace('"', "\\\"")
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&attr_path_to_string(self))
    }
}

impl fmt::Display for ValueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&filter_to_string(self))
    }
}
