//! In-memory libraries.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use entryview_core_store::{Entry, EntryId, Error, Library, LibraryId, Value};

use crate::entry::{EntryBuilder, FieldExposure, MemoryEntry};

/// A library held in memory.
///
/// Entries are kept in insertion order; `entries()` hands out a fresh
/// snapshot of the current list on every call.
///
/// # Example
///
/// ```rust
/// use entryview_memory_store::{FieldExposure, MemoryLibrary};
/// use entryview_core_store::{Library, Value};
///
/// let books = MemoryLibrary::new("Books", ["Title", "pageCount"])
///     .with_exposure(FieldExposure::Mirrored);
/// books.push(books.entry_builder().field("Title", "Dune"));
///
/// let entries = books.entries().unwrap();
/// assert_eq!(entries.len(), 1);
/// assert_eq!(
///     entries[0].read_native_field("Title").unwrap(),
///     Some(Value::from("Dune"))
/// );
/// ```
pub struct MemoryLibrary {
    id: LibraryId,
    name: String,
    schema: Arc<[String]>,
    exposure: FieldExposure,
    entries: RwLock<Vec<Arc<MemoryEntry>>>,
}

impl MemoryLibrary {
    /// Create an empty library with the given field names.
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: LibraryId::new(uuid::Uuid::new_v4().to_string()),
            name: name.into(),
            schema: fields.into_iter().map(Into::into).collect(),
            exposure: FieldExposure::default(),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Set how native fields of entries built afterwards are exposed.
    pub fn with_exposure(mut self, exposure: FieldExposure) -> Self {
        self.exposure = exposure;
        self
    }

    /// Start building an entry that matches this library's schema.
    pub fn entry_builder(&self) -> EntryBuilder {
        EntryBuilder::new(self.schema.clone(), self.exposure)
    }

    /// Build and append an entry.
    pub fn push(&self, builder: EntryBuilder) -> Arc<MemoryEntry> {
        let entry = Arc::new(builder.build());
        log::debug!("Adding entry {} to library {}", entry.id(), self.name);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        entry
    }

    /// Append an entry from a map of values.
    ///
    /// Keys naming schema fields become native fields; the rest become own
    /// properties.
    pub fn insert(&self, values: BTreeMap<String, Value>) -> Arc<MemoryEntry> {
        let builder = values
            .into_iter()
            .fold(self.entry_builder(), |b, (k, v)| b.field(k, v));
        self.push(builder)
    }

    /// Remove an entry by id. Returns `true` if it was present.
    pub fn remove(&self, id: &EntryId) -> bool {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|e| &e.id() != id);
        entries.len() != before
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the library holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Library for MemoryLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> LibraryId {
        self.id.clone()
    }

    fn entries(&self) -> Result<Vec<Arc<dyn Entry>>, Error> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|e| e.clone() as Arc<dyn Entry>)
            .collect())
    }

    fn fields(&self) -> Result<Vec<String>, Error> {
        Ok(self.schema.to_vec())
    }
}

impl std::fmt::Debug for MemoryLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLibrary")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("fields", &self.schema)
            .field("entry_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;

    #[test]
    fn entries_keep_insertion_order() {
        let library = MemoryLibrary::new("Books", ["Title"]);
        let a = library.push(library.entry_builder().field("Title", "A"));
        let b = library.push(library.entry_builder().field("Title", "B"));

        let entries = library.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id(), a.id());
        assert_eq!(entries[1].id(), b.id());
    }

    #[test]
    fn insert_splits_fields_and_properties() {
        let library = MemoryLibrary::new("Books", ["Title"]);
        let entry = library.insert(btree! {
            "Title".to_string() => Value::from("Dune"),
            "rating".to_string() => Value::from(5i64),
        });

        assert_eq!(
            entry.read_native_field("Title").unwrap(),
            Some(Value::from("Dune"))
        );
        assert_eq!(entry.property("rating"), Some(Value::from(5i64)));
    }

    #[test]
    fn remove_by_id() {
        let library = MemoryLibrary::new("Books", ["Title"]);
        let entry = library.push(library.entry_builder().id("x"));

        assert!(library.remove(&entry.id()));
        assert!(!library.remove(&entry.id()));
        assert!(library.is_empty());
    }

    #[test]
    fn fields_in_schema_order() {
        let library = MemoryLibrary::new("Books", ["Title", "Author", "pageCount"]);
        assert_eq!(
            library.fields().unwrap(),
            vec!["Title", "Author", "pageCount"]
        );
        assert_eq!(library.name(), "Books");
    }

    #[test]
    fn same_name_different_handles() {
        let first = MemoryLibrary::new("Books", ["Title"]);
        let second = MemoryLibrary::new("Books", ["Title"]);

        assert_eq!(first.id(), first.id());
        assert_ne!(first.id(), second.id());
    }
}
