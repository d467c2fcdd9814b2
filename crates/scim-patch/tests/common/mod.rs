#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use scim_patch::{AttrValue, FieldDescriptor, FieldRegistry, PatchGenerator, Record, RecordType};

pub const USER_URN: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const ENTERPRISE_URN: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

/// Route engine logs to the test writer; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Generator with an isolated registry so tests do not share cache state.
pub fn generator() -> PatchGenerator {
    init_tracing();
    PatchGenerator::with_registry(Arc::new(FieldRegistry::new()))
}

// ── Record types ──────────────────────────────────────────────────────────

pub fn name_type() -> Arc<RecordType> {
    static TY: OnceLock<Arc<RecordType>> = OnceLock::new();
    TY.get_or_init(|| {
        RecordType::builder("Name")
            .field(FieldDescriptor::string("formatted"))
            .field(FieldDescriptor::string("familyName"))
            .field(FieldDescriptor::string("givenName"))
            .field(FieldDescriptor::string("middleName"))
            .field(FieldDescriptor::string("honorificPrefix"))
            .field(FieldDescriptor::string("honorificSuffix"))
            .build()
    })
    .clone()
}

pub fn email_type() -> Arc<RecordType> {
    static TY: OnceLock<Arc<RecordType>> = OnceLock::new();
    TY.get_or_init(|| {
        RecordType::builder("Email")
            .multi_valued(true)
            .field(FieldDescriptor::string("value"))
            .field(FieldDescriptor::string("display"))
            .field(FieldDescriptor::string("type"))
            .field(FieldDescriptor::boolean("primary"))
            .build()
    })
    .clone()
}

pub fn address_type() -> Arc<RecordType> {
    static TY: OnceLock<Arc<RecordType>> = OnceLock::new();
    TY.get_or_init(|| {
        RecordType::builder("Address")
            .multi_valued(true)
            .field(FieldDescriptor::string("formatted"))
            .field(FieldDescriptor::string("streetAddress"))
            .field(FieldDescriptor::string("locality"))
            .field(FieldDescriptor::string("region"))
            .field(FieldDescriptor::string("postalCode"))
            .field(FieldDescriptor::string("country"))
            .field(FieldDescriptor::string("type"))
            .field(FieldDescriptor::boolean("primary"))
            .build()
    })
    .clone()
}

pub fn group_ref_type() -> Arc<RecordType> {
    static TY: OnceLock<Arc<RecordType>> = OnceLock::new();
    TY.get_or_init(|| {
        RecordType::builder("GroupRef")
            .multi_valued(true)
            .field(FieldDescriptor::string("value"))
            .field(FieldDescriptor::string("display"))
            .build()
    })
    .clone()
}

pub fn meta_type() -> Arc<RecordType> {
    static TY: OnceLock<Arc<RecordType>> = OnceLock::new();
    TY.get_or_init(|| {
        RecordType::builder("Meta")
            .field(FieldDescriptor::string("resourceType"))
            .field(FieldDescriptor::string("version"))
            .build()
    })
    .clone()
}

pub fn manager_type() -> Arc<RecordType> {
    static TY: OnceLock<Arc<RecordType>> = OnceLock::new();
    TY.get_or_init(|| {
        RecordType::builder("Manager")
            .field(FieldDescriptor::string("value"))
            .field(FieldDescriptor::string("displayName"))
            .build()
    })
    .clone()
}

pub fn enterprise_type() -> Arc<RecordType> {
    static TY: OnceLock<Arc<RecordType>> = OnceLock::new();
    TY.get_or_init(|| {
        RecordType::builder("EnterpriseUser")
            .schema(ENTERPRISE_URN)
            .field(FieldDescriptor::string("employeeNumber"))
            .field(FieldDescriptor::string("costCenter"))
            .field(FieldDescriptor::string("organization"))
            .field(FieldDescriptor::string("division"))
            .field(FieldDescriptor::string("department"))
            .field(FieldDescriptor::complex("manager", manager_type()))
            .build()
    })
    .clone()
}

pub fn user_type() -> Arc<RecordType> {
    static TY: OnceLock<Arc<RecordType>> = OnceLock::new();
    TY.get_or_init(|| {
        RecordType::builder("User")
            .schema(USER_URN)
            .field(FieldDescriptor::string("id").read_only())
            .field(FieldDescriptor::string("externalId"))
            .field(FieldDescriptor::complex("meta", meta_type()).read_only())
            .field(FieldDescriptor::string("userName"))
            .field(FieldDescriptor::complex("name", name_type()))
            .field(FieldDescriptor::string("displayName"))
            .field(FieldDescriptor::string("nickName"))
            .field(FieldDescriptor::string("title"))
            .field(FieldDescriptor::boolean("active"))
            .field(FieldDescriptor::integer("loginCount"))
            .field(FieldDescriptor::decimal("riskScore"))
            .field(FieldDescriptor::complex("emails", email_type()).multi_valued())
            .field(FieldDescriptor::complex("addresses", address_type()).multi_valued())
            .field(FieldDescriptor::complex("groups", group_ref_type()).multi_valued().read_only())
            .field(FieldDescriptor::complex("enterpriseUser", enterprise_type()).extension(ENTERPRISE_URN))
            .field(FieldDescriptor::string("schemas").multi_valued().read_only())
            .field(FieldDescriptor::string("SCHEMA").static_field())
            .build()
    })
    .clone()
}

pub fn group_type() -> Arc<RecordType> {
    static TY: OnceLock<Arc<RecordType>> = OnceLock::new();
    TY.get_or_init(|| {
        RecordType::builder("Group")
            .field(FieldDescriptor::string("displayName"))
            .build()
    })
    .clone()
}

// ── Fixtures ──────────────────────────────────────────────────────────────

/// Build a record, panicking on undeclared fields or mismatched values.
pub fn record(ty: Arc<RecordType>, fields: &[(&str, AttrValue)]) -> Record {
    let mut r = Record::new(ty);
    for (name, value) in fields {
        r.set(name, value.clone())
            .unwrap_or_else(|e| panic!("cannot set {name}: {e}"));
    }
    r
}

pub fn email(value: &str, kind: &str, primary: bool) -> Record {
    record(
        email_type(),
        &[("value", value.into()), ("type", kind.into()), ("primary", primary.into())],
    )
}

/// Distinct, fully populated email numbered `n`.
pub fn numbered_email(n: u32) -> Record {
    record(
        email_type(),
        &[
            ("value", format!("{n}@email.com").into()),
            ("display", format!("display {n}").into()),
            ("type", n.to_string().into()),
            ("primary", false.into()),
        ],
    )
}

pub fn emails(items: impl IntoIterator<Item = Option<Record>>) -> AttrValue {
    AttrValue::List(items.into_iter().map(|e| e.map(AttrValue::from)).collect())
}

pub fn original_user() -> Record {
    let address = record(
        address_type(),
        &[
            ("formatted", "Nilgiris, Western Ghats, India".into()),
            ("streetAddress", "Highway".into()),
            ("locality", "Nilgiris".into()),
            ("region", "West Coast".into()),
            ("postalCode", "000000".into()),
            ("country", "IN".into()),
            ("type", "Home".into()),
        ],
    );
    let name = record(
        name_type(),
        &[
            ("formatted", "Thar (Angulate)".into()),
            ("familyName", "Angulate".into()),
            ("givenName", "Thar".into()),
        ],
    );
    let meta = record(meta_type(), &[("resourceType", "User".into()), ("version", "W/\"1\"".into())]);
    record(
        user_type(),
        &[
            ("id", "2819c223".into()),
            ("meta", meta.into()),
            ("userName", "thar".into()),
            ("name", name.into()),
            ("displayName", "Nilgiri Thar".into()),
            ("active", true.into()),
            (
                "emails",
                emails([
                    Some(email("thar@westernghats.org", "Office", true)),
                    Some(email("thar@nilgiris.org", "Home", true)),
                ]),
            ),
            ("addresses", AttrValue::list([address])),
            ("schemas", AttrValue::list([USER_URN])),
        ],
    )
}

pub fn enterprise(fields: &[(&str, AttrValue)]) -> Record {
    record(enterprise_type(), fields)
}

/// Mutable access to a nested record field.
pub fn nested_mut<'a>(r: &'a mut Record, field: &str) -> &'a mut Record {
    match r.get_mut(field) {
        Some(AttrValue::Complex(inner)) => inner,
        other => panic!("{field} is not a record: {other:?}"),
    }
}

/// Mutable access to element `i` of a multi-valued complex field.
pub fn element_mut<'a>(r: &'a mut Record, field: &str, i: usize) -> &'a mut Record {
    match r.get_mut(field) {
        Some(AttrValue::List(items)) => match items.get_mut(i) {
            Some(Some(AttrValue::Complex(inner))) => inner,
            other => panic!("{field}[{i}] is not a record: {other:?}"),
        },
        other => panic!("{field} is not a list: {other:?}"),
    }
}

/// Push an element onto a multi-valued field.
pub fn push_element(r: &mut Record, field: &str, element: Record) {
    match r.get_mut(field) {
        Some(AttrValue::List(items)) => items.push(Some(element.into())),
        other => panic!("{field} is not a list: {other:?}"),
    }
}
