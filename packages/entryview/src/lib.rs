//! entryview: uniform, fault-tolerant access to entries of an external record store.
//!
//! Entries of a record store keep their values in inconsistent places: behind
//! the driver's named-field accessor, or as own properties under the exact or
//! lower-camel field name. entryview reads, writes and deletes through all of
//! them with one call, projects whole libraries into plain maps, and wraps a
//! library in an ordered, iterable view with per-field accessors.
//!
//! The layers are re-exported here:
//!
//! - [`core`]: `Value`, the `Entry` / `Library` / `RecordStore` driver traits
//! - [`memory`]: an in-memory driver
//! - [`access`]: `Resolver`, `Augmenter`, `LibraryView`, logging and config
//!
//! ```rust
//! use entryview::memory::{FieldExposure, MemoryLibrary, MemoryStore};
//! use entryview::{AccessConfig, Services, Value};
//!
//! let store = MemoryStore::new();
//! let books = store.insert(
//!     MemoryLibrary::new("Books", ["Title", "pageCount"]).with_exposure(FieldExposure::Mirrored),
//! );
//! books.push(books.entry_builder().field("Title", "A").field("pageCount", 5i64));
//! books.push(books.entry_builder().field("Title", "B"));
//!
//! let mut config = AccessConfig::default();
//! config.logging.enabled = false;
//! let services = Services::from_config(&config);
//! let view = services.augmenter().open(&store, "Books").unwrap();
//!
//! let b = view.entry(1).unwrap();
//! assert!(services.resolver().write(b.as_ref(), "pageCount", 10i64));
//! assert_eq!(services.resolver().read(b.as_ref(), "PageCount"), Some(Value::Integer(10)));
//! ```

pub use entryview_access as access;
pub use entryview_core_store as core;
pub use entryview_memory_store as memory;

pub use entryview_access::{
    AccessConfig, AccessError, Augmenter, BufferedLog, LibraryView, Projection, Resolver,
    Services, Severity,
};
pub use entryview_core_store::{Entry, EntryId, Error, Library, LibraryId, RecordStore, Value};
