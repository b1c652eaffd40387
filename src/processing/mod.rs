//! In-memory record transformations.
//!
//! The processing layer operates on [`crate::types::Record`] values. Everything here is pure and
//! synchronous: inputs are borrowed, outputs are new values, nothing is shared between calls.
//!
//! Currently implemented:
//!
//! - [`extract_codes()`]: de-duplicated user codes of one sub-table column
//! - [`build_selection()`]: user entities for a list of codes
//! - [`project()`]: write each tracked column's union onto its flat target field
//!
//! ## Example: project a record
//!
//! ```rust
//! use subtable_flatten::config::FieldMapping;
//! use subtable_flatten::processing::project;
//! use subtable_flatten::types::Record;
//! use serde_json::json;
//!
//! let record = Record::from_json(json!({
//!     "members": {"type": "SUBTABLE", "value": [
//!         {"id": "1", "value": {"owner": {"type": "USER_SELECT", "value": [{"code": "u1"}, {"code": "u2"}]}}},
//!         {"id": "2", "value": {"owner": {"type": "USER_SELECT", "value": [{"code": "u2"}, {"code": "u4"}]}}}
//!     ]},
//!     "owner_all": {"type": "USER_SELECT", "value": []}
//! }))
//! .unwrap();
//!
//! let mapping = FieldMapping::new("members").track("owner", "owner_all");
//! let out = project(&record, &mapping);
//!
//! assert_eq!(
//!     out.get("owner_all").unwrap().to_json(),
//!     json!({"type": "USER_SELECT", "value": [{"code": "u1"}, {"code": "u2"}, {"code": "u4"}]})
//! );
//! ```

pub mod build;
pub mod extract;
pub mod project;

pub use build::build_selection;
pub use extract::extract_codes;
pub use project::{ProjectionStats, project, project_with_stats};
