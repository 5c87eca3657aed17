//! Core entryview: the record-store driver boundary.
//!
//! This layer names the things every other layer talks about:
//! - `Value`: dynamically typed data carried through unchanged
//! - `Entry`: one record, with native fields and own properties
//! - `Library`: an unordered provider of entries plus its field names,
//!   identified per handle by a `LibraryId`
//! - `RecordStore`: lookup of libraries by name
//!
//! Drivers implement the traits; the access layer consumes them.
//!
//! # Example
//!
//! ```rust
//! use entryview_core_store::{Entry, Error, Value};
//!
//! fn title_of(entry: &dyn Entry) -> Result<Option<Value>, Error> {
//!     entry.read_native_field("Title")
//! }
//! ```

pub mod convert;
mod error;
mod field_name;
mod traits;
mod value;

pub use error::Error;
pub use field_name::{lower_camel, sanitize_accessor_key};
pub use traits::{Entry, EntryId, Library, LibraryId, RecordStore};
pub use value::Value;
