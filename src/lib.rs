//! `subtable-flatten` projects grouped user selections held in a record's sub-table onto flat
//! fields of the same record.
//!
//! Given a [`types::Record`] with a `SUBTABLE` field whose rows carry `USER_SELECT` cells, the
//! primary entrypoint [`processing::project`] collects, for each tracked column, the
//! de-duplicated union of user codes across all rows (first-seen order) and writes it into the
//! corresponding top-level target field. The input record is never mutated.
//!
//! ## Record model
//!
//! Records use the common `{fieldCode: {"type": ..., "value": ...}}` JSON shape. Field values are
//! dispatched on their `type` tag:
//!
//! - [`types::FieldValue::Subtable`]: `SUBTABLE`, an ordered list of [`types::Row`]s
//! - [`types::FieldValue::UserSelect`]: `USER_SELECT`, an ordered list of [`types::UserEntity`]s
//! - [`types::FieldValue::Other`]: everything else, carried through untouched
//!
//! ## Projection rules
//!
//! - Missing sub-table, or one with zero rows: the record is returned unchanged.
//! - Target field missing: it is not created; that column's result is dropped.
//! - Malformed rows and cells are skipped, never fatal.
//! - Written entities carry only `code` (`name` is omitted).
//!
//! ## Quick example
//!
//! ```rust
//! use subtable_flatten::config::FieldMapping;
//! use subtable_flatten::ingestion::record_from_str;
//! use subtable_flatten::processing::project;
//!
//! # fn main() -> Result<(), subtable_flatten::FlattenError> {
//! let record = record_from_str(r#"{
//!     "reviews": {"type": "SUBTABLE", "value": [
//!         {"id": "1", "value": {"reviewer": {"type": "USER_SELECT", "value": [{"code": "u1", "name": "Ann"}]}}},
//!         {"id": "2", "value": {"reviewer": {"type": "USER_SELECT", "value": [{"code": "u1"}, {"code": "u3"}]}}}
//!     ]},
//!     "reviewers": {"type": "USER_SELECT", "value": []}
//! }"#)?;
//!
//! let mapping = FieldMapping::new("reviews").track("reviewer", "reviewers");
//! let out = project(&record, &mapping);
//!
//! let codes: Vec<&str> = out
//!     .get("reviewers")
//!     .and_then(|v| v.as_user_select())
//!     .map(|s| s.codes().collect())
//!     .unwrap_or_default();
//! assert_eq!(codes, vec!["u1", "u3"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: record, field value, row and user entity types
//! - [`config`]: the field mapping naming the sub-table and tracked columns
//! - [`processing`]: extraction, value construction and projection
//! - [`ingestion`]: JSON / NDJSON record reading and writing
//! - [`execution`]: parallel batch projection with metrics and observer hooks
//! - [`error`]: error types used by the fallible edges

pub mod config;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use error::{FlattenError, FlattenResult};
