//! In-memory record-store driver.
//!
//! Libraries, entries and their native fields live in process memory. Useful
//! for tests, for scripting hosts that hand over a JSON dump, and as the
//! reference implementation of the driver traits.

pub mod entry;
pub mod fixture;
pub mod library;
pub mod store;

pub use entry::{EntryBuilder, FieldExposure, MemoryEntry};
pub use fixture::LibraryFixture;
pub use library::MemoryLibrary;
pub use store::MemoryStore;
