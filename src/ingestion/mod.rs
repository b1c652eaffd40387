//! Record I/O for hosts that exchange records as JSON.
//!
//! The projection core never reads or writes anything; this module is the thin adapter between
//! JSON text and [`crate::types::Record`] values:
//!
//! - [`records_from_path`] / [`records_from_str`]: a single object, an array of objects, or NDJSON
//! - [`record_from_str`]: exactly one object
//! - [`records_to_string`]: pretty JSON array or NDJSON
//!
//! Fields the engine does not rewrite serialize back to the same JSON value they were read from.

pub mod json;

pub use json::{
    RecordFormat, record_from_str, records_from_path, records_from_str, records_to_string,
};
