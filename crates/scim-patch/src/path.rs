//! Protocol paths for complex values.
//!
//! Single-valued complex attributes are addressed by name. An element of a
//! multi-valued attribute is addressed by a value filter built from the
//! element's non-null primitive sub-attributes, e.g.
//! `emails[value EQ "bjensen@example.com" AND type EQ "work" AND primary EQ true]`.

use scim_filter::{AttrPath, Comparison, ValueFilter};

use crate::schema::FieldRegistry;
use crate::value::AttrValue;

/// Path of `value` under the attribute at `base`.
///
/// The filter must match what the server currently holds, so callers pass
/// the original element, never the modified one.
pub fn path_for(registry: &FieldRegistry, base: &str, value: &AttrValue) -> String {
    attr_path_for(registry, AttrPath::new(base), value).to_string()
}

/// [`path_for`] over an already structured base, e.g. one qualified by an
/// extension URN.
pub fn attr_path_for(registry: &FieldRegistry, path: AttrPath, value: &AttrValue) -> AttrPath {
    match value {
        AttrValue::Complex(record) => {
            if !record.record_type().is_multi_valued() {
                return path;
            }
            let mut filter = ValueFilter::default();
            for field in registry.fields_of(record.record_type()).iter() {
                // Nested complex and list sub-attributes have no literal form.
                if let Some(literal) = record.get(field.name()).and_then(AttrValue::to_literal) {
                    filter.push(Comparison::eq(field.name(), literal));
                }
            }
            path.with_filter(filter)
        }
        // Elements of simple multi-valued attributes are matched on `value`.
        other => match other.to_literal() {
            Some(literal) => path.with_filter(ValueFilter::new(vec![Comparison::eq("value", literal)])),
            None => path,
        },
    }
}
