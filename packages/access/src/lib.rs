//! Uniform access to entries whose data lives in inconsistent places.
//!
//! Entries from a record store expose values either through the driver's
//! named-field accessor or as own properties, sometimes under the exact field
//! name and sometimes under its lower-camel form. This crate hides that:
//!
//! - `Resolver`: read / write / delete a named value through a fixed fallback
//!   chain, absorbing every failure into a log line and a sentinel result
//! - projection (`Resolver::project`, `project_all`, `write_all`): bulk
//!   versions of the same
//! - `Augmenter`: snapshot a library into an ordered, iterable `LibraryView`
//!   and front every entry with per-field accessors
//! - `BufferedLog` / `LogCrateSink`: the logging collaborator
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use entryview_access::{Augmenter, Resolver};
//! use entryview_memory_store::{FieldExposure, MemoryLibrary};
//!
//! let books = MemoryLibrary::new("Books", ["Title", "pageCount"])
//!     .with_exposure(FieldExposure::Mirrored);
//! books.push(books.entry_builder().field("Title", "A").field("pageCount", 5i64));
//!
//! let resolver = Arc::new(Resolver::default());
//! let augmenter = Augmenter::new(resolver.clone());
//! let view = augmenter.materialize(&books).unwrap();
//!
//! let rows = resolver.project_all(view.entries(), &["Title", "pageCount"]);
//! assert_eq!(rows[0]["pageCount"], entryview_core_store::Value::Integer(5));
//! ```

mod accessors;
mod augmenter;
mod config;
mod diagnostic;
mod error;
mod logging;
mod projector;
mod resolver;
mod services;
mod view;

pub use accessors::{Accessor, AccessorTable, EntryAccessors};
pub use augmenter::{library_fields, lookup_library, Augmenter};
pub use config::{AccessConfig, AugmentConfig, EmptyLibraryPolicy, LoggingConfig};
pub use diagnostic::Diagnostic;
pub use error::AccessError;
pub use logging::{BufferedLog, LogCrateSink, LogSink, Severity, DEFAULT_LOG_FILE};
pub use projector::Projection;
pub use resolver::{Representation, Resolution, Resolver, UNTITLED};
pub use services::Services;
pub use view::{FieldKey, KeyCollision, LibraryView};
