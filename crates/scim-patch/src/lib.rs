//! scim-patch — compute SCIM PATCH requests from two versions of a resource.
//!
//! Given a modified and an original [`Record`] of the same [`RecordType`],
//! [`PatchGenerator`] walks the declared fields and emits the ordered
//! `add`/`remove`/`replace` operations that turn the original into the
//! modified version, addressed with RFC 7644 attribute paths.
//!
//! # Example
//!
//! ```
//! use scim_patch::{FieldDescriptor, OpKind, PatchGenerator, Record, RecordType};
//!
//! let user = RecordType::builder("User")
//!     .schema("urn:ietf:params:scim:schemas:core:2.0:User")
//!     .field(FieldDescriptor::string("id").read_only())
//!     .field(FieldDescriptor::string("userName"))
//!     .field(FieldDescriptor::string("title"))
//!     .build();
//!
//! let original = Record::new(user.clone()).with("userName", "bjensen").unwrap();
//! let modified = original.clone().with("title", "Tour Guide").unwrap();
//!
//! let pr = PatchGenerator::new().create("2819c223", &modified, &original).unwrap();
//! assert_eq!(pr.len(), 1);
//! assert_eq!(pr.operations()[0].op, OpKind::Add);
//! assert_eq!(pr.operations()[0].path.as_deref(), Some("title"));
//! ```

pub mod diff;
pub mod error;
pub mod patch;
pub mod path;
pub mod schema;
pub mod value;

pub use diff::PatchGenerator;
pub use error::PatchError;
pub use patch::{OpKind, PatchOperation, PatchRequest, PATCH_OP_SCHEMA};
pub use path::path_for;
pub use schema::{FieldDescriptor, FieldRegistry, FieldType, PrimitiveKind, RecordType, Shape};
pub use value::{AttrValue, Record};
