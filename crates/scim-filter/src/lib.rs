//! SCIM attribute paths and value filters ([RFC 7644 §3.5.2](https://www.rfc-editor.org/rfc/rfc7644#section-3.5.2)).
//!
//! This crate builds, formats and parses the `path` strings carried by
//! SCIM PATCH operations, including value-filter selectors that address one
//! element of a multi-valued attribute.
//!
//! # Example
//!
//! ```
//! use scim_filter::{AttrPath, AttrPathParser, Comparison, ValueFilter};
//! use serde_json::json;
//!
//! let filter = ValueFilter::new(vec![
//!     Comparison::eq("type", json!("work")),
//!     Comparison::eq("primary", json!(true)),
//! ]);
//! let path = AttrPath::new("emails").with_filter(filter);
//! assert_eq!(path.to_string(), "emails[type EQ \"work\" AND primary EQ true]");
//!
//! let parsed = AttrPathParser::parse(&path.to_string()).unwrap();
//! assert_eq!(parsed, path);
//! ```

mod types;
pub use types::*;

mod parser;
pub use parser::{AttrPathParser, ParseError};

mod util;
pub use util::{attr_path_to_string, escape_quotes, filter_to_string, literal_to_string, OPERATOR_AND};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_attr() {
        let path = AttrPathParser::parse("userName").unwrap();
        assert_eq!(path.attr, "userName");
        assert!(path.urn.is_none());
        assert!(path.filter.is_none());
        assert!(path.sub_attr.is_none());
    }

    #[test]
    fn test_parse_sub_attr() {
        let path = AttrPathParser::parse("name.givenName").unwrap();
        assert_eq!(path.attr, "name");
        assert_eq!(path.sub_attr.as_deref(), Some("givenName"));
    }

    #[test]
    fn test_parse_urn_prefix() {
        let path = AttrPathParser::parse(
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:employeeNumber",
        )
        .unwrap();
        assert_eq!(
            path.urn.as_deref(),
            Some("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User")
        );
        assert_eq!(path.attr, "employeeNumber");
    }

    #[test]
    fn test_parse_urn_with_sub_attr() {
        let path = AttrPathParser::parse(
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.value",
        )
        .unwrap();
        assert_eq!(path.attr, "manager");
        assert_eq!(path.sub_attr.as_deref(), Some("value"));
    }

    #[test]
    fn test_parse_filter() {
        let path = AttrPathParser::parse("emails[type eq \"work\" and primary EQ false]").unwrap();
        let filter = path.filter.unwrap();
        assert_eq!(filter.clauses.len(), 2);
        assert_eq!(filter.clauses[0], Comparison::eq("type", json!("work")));
        assert_eq!(filter.clauses[1], Comparison::eq("primary", json!(false)));
    }

    #[test]
    fn test_parse_filter_then_sub_attr() {
        let path = AttrPathParser::parse("addresses[type EQ \"home\"].locality").unwrap();
        assert_eq!(path.attr, "addresses");
        assert_eq!(path.sub_attr.as_deref(), Some("locality"));
        assert_eq!(path.filter.unwrap().clauses.len(), 1);
    }

    #[test]
    fn test_parse_empty_filter() {
        let path = AttrPathParser::parse("emails[]").unwrap();
        assert_eq!(path.filter, Some(ValueFilter::default()));
    }

    #[test]
    fn test_parse_numbers_and_null() {
        let filter = AttrPathParser::parse_filter("weight ge -1.5 AND size lt 10 AND x eq null").unwrap();
        assert_eq!(filter.clauses[0].op, CompareOp::Ge);
        assert_eq!(filter.clauses[0].value, json!(-1.5));
        assert_eq!(filter.clauses[1].value, json!(10));
        assert_eq!(filter.clauses[2].value, json!(null));
    }

    #[test]
    fn test_parse_escaped_quote() {
        let filter = AttrPathParser::parse_filter(r#"display EQ "say \"hi\"""#).unwrap();
        assert_eq!(filter.clauses[0].value, json!("say \"hi\""));
    }

    #[test]
    fn test_parse_rejects_or() {
        let err = AttrPathParser::parse("emails[type EQ \"a\" or type EQ \"b\"]").unwrap_err();
        assert_eq!(err, ParseError::UnsupportedLogical("or".into()));
    }

    #[test]
    fn test_parse_unknown_operator() {
        let err = AttrPathParser::parse_filter("type xx \"a\"").unwrap_err();
        assert_eq!(err, ParseError::UnknownOperator("xx".into()));
    }

    #[test]
    fn test_parse_unclosed() {
        assert_eq!(
            AttrPathParser::parse("emails[type EQ \"a]").unwrap_err(),
            ParseError::UnclosedString
        );
        assert_eq!(
            AttrPathParser::parse("emails[type EQ \"a\"").unwrap_err(),
            ParseError::UnexpectedEnd
        );
    }

    #[test]
    fn test_format_parse_roundtrip_of_generated_selector() {
        let path = AttrPath::new("emails").with_filter(ValueFilter::new(vec![
            Comparison::eq("value", json!("a\"b@example.com")),
            Comparison::eq("primary", json!(false)),
        ]));
        let text = path.to_string();
        assert_eq!(text, "emails[value EQ \"a\\\"b@example.com\" AND primary EQ false]");
        assert_eq!(AttrPathParser::parse(&text).unwrap(), path);
    }
}
