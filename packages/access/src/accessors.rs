//! Per-entry computed accessors.
//!
//! Every entry in a materialized library gets an `AccessorTable`: one slot
//! per field, keyed by the field's sanitized accessor key. A live slot reads
//! and writes through the resolver on every access; a static slot holds a
//! copy taken at install time, for entries that cannot host live accessors.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use entryview_core_store::{Entry, Value};
use indexmap::IndexMap;

use crate::projector::Projection;
use crate::resolver::Resolver;

/// One installed accessor.
#[derive(Clone, Debug, PartialEq)]
pub enum Accessor {
    /// Routes get and set through the resolver for `field`.
    Live { field: String },
    /// Holds a copy of `field` taken at install time. Setting it replaces
    /// the copy and never reaches the entry.
    Static { field: String, value: Option<Value> },
}

impl Accessor {
    /// The library field this accessor stands for.
    pub fn field(&self) -> &str {
        match self {
            Accessor::Live { field } | Accessor::Static { field, .. } => field,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Accessor::Live { .. })
    }
}

/// Accessors installed on one entry, in install order.
#[derive(Debug, Default)]
pub struct AccessorTable {
    slots: RwLock<IndexMap<String, Accessor>>,
}

impl AccessorTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> RwLockReadGuard<'_, IndexMap<String, Accessor>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn slots_mut(&self) -> RwLockWriteGuard<'_, IndexMap<String, Accessor>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install an accessor under `key` unless one is already there.
    ///
    /// `make` runs under the table's write lock and may still decline by
    /// returning `None`. Returns `true` if an accessor was installed.
    pub fn install_with<F>(&self, key: &str, make: F) -> bool
    where
        F: FnOnce() -> Option<Accessor>,
    {
        let mut slots = self.slots_mut();
        if slots.contains_key(key) {
            return false;
        }
        match make() {
            Some(accessor) => {
                slots.insert(key.to_string(), accessor);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<Accessor> {
        self.slots().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.slots().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    fn replace_static(&self, key: &str, value: Value) -> bool {
        match self.slots_mut().get_mut(key) {
            Some(Accessor::Static { value: slot, .. }) => {
                *slot = Some(value);
                true
            }
            _ => false,
        }
    }
}

/// The accessors of one entry, bound to the entry and a resolver.
///
/// Obtained from `LibraryView::accessors`.
pub struct EntryAccessors<'a> {
    entry: &'a Arc<dyn Entry>,
    table: &'a AccessorTable,
    resolver: &'a Resolver,
}

impl<'a> EntryAccessors<'a> {
    pub(crate) fn new(
        entry: &'a Arc<dyn Entry>,
        table: &'a AccessorTable,
        resolver: &'a Resolver,
    ) -> Self {
        Self {
            entry,
            table,
            resolver,
        }
    }

    pub fn entry(&self) -> &'a Arc<dyn Entry> {
        self.entry
    }

    /// Installed accessor keys, in install order.
    pub fn keys(&self) -> Vec<String> {
        self.table.keys()
    }

    pub fn has(&self, key: &str) -> bool {
        self.table.contains(key)
    }

    /// The library field behind `key`.
    pub fn field_for(&self, key: &str) -> Option<String> {
        self.table.get(key).map(|a| a.field().to_string())
    }

    /// Whether `key` is live, `None` if nothing is installed under it.
    pub fn is_live(&self, key: &str) -> Option<bool> {
        self.table.get(key).map(|a| a.is_live())
    }

    /// Read through the accessor. `None` if nothing is installed under `key`
    /// or the field does not resolve.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.table.get(key)? {
            Accessor::Live { field } => self.resolver.read(self.entry.as_ref(), &field),
            Accessor::Static { value, .. } => value,
        }
    }

    /// Write through the accessor. Returns `false` if nothing is installed
    /// under `key` or the write was rejected.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        match self.table.get(key) {
            Some(Accessor::Live { field }) => {
                self.resolver.write(self.entry.as_ref(), &field, value)
            }
            Some(Accessor::Static { .. }) => self.table.replace_static(key, value.into()),
            None => false,
        }
    }

    /// Every accessor's current value, keyed by accessor key.
    pub fn snapshot(&self) -> Projection {
        self.keys()
            .into_iter()
            .map(|key| {
                let value = self.get(&key).unwrap_or_default();
                (key, value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::BufferedLog;
    use entryview_memory_store::MemoryLibrary;

    fn live(field: &str) -> Option<Accessor> {
        Some(Accessor::Live {
            field: field.to_string(),
        })
    }

    #[test]
    fn install_is_once_per_key() {
        let table = AccessorTable::new();
        assert!(table.install_with("page_count", || live("Page Count")));
        assert!(!table.install_with("page_count", || live("page-count")));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("page_count").unwrap().field(), "Page Count");
    }

    #[test]
    fn install_can_decline() {
        let table = AccessorTable::new();
        assert!(!table.install_with("title", || None));
        assert!(table.is_empty());
    }

    #[test]
    fn keys_in_install_order() {
        let table = AccessorTable::new();
        table.install_with("title", || live("Title"));
        table.install_with("author", || live("Author"));
        assert_eq!(table.keys(), vec!["title", "author"]);
    }

    #[test]
    fn live_accessor_reads_and_writes_through() {
        let resolver = Resolver::new(Arc::new(BufferedLog::new()));
        let books = MemoryLibrary::new("Books", ["Page Count"]);
        let entry: Arc<dyn Entry> = books.push(books.entry_builder().field("Page Count", 100i64));

        let table = AccessorTable::new();
        table.install_with("page_count", || live("Page Count"));
        let accessors = EntryAccessors::new(&entry, &table, &resolver);

        assert_eq!(accessors.get("page_count"), Some(Value::Integer(100)));
        assert!(accessors.set("page_count", 120i64));
        assert_eq!(
            entry.read_native_field("Page Count").unwrap(),
            Some(Value::Integer(120))
        );
        assert_eq!(accessors.field_for("page_count").as_deref(), Some("Page Count"));
        assert_eq!(accessors.is_live("page_count"), Some(true));
    }

    #[test]
    fn static_accessor_is_detached() {
        let resolver = Resolver::new(Arc::new(BufferedLog::new()));
        let books = MemoryLibrary::new("Books", ["Title"]);
        let entry: Arc<dyn Entry> = books.push(books.entry_builder().field("Title", "Dune"));

        let table = AccessorTable::new();
        table.install_with("title", || {
            Some(Accessor::Static {
                field: "Title".to_string(),
                value: Some(Value::from("Dune")),
            })
        });
        let accessors = EntryAccessors::new(&entry, &table, &resolver);

        assert!(accessors.set("title", "Emma"));
        assert_eq!(accessors.get("title"), Some(Value::from("Emma")));
        assert_eq!(
            entry.read_native_field("Title").unwrap(),
            Some(Value::from("Dune"))
        );
        assert_eq!(accessors.is_live("title"), Some(false));
    }

    #[test]
    fn unknown_key() {
        let resolver = Resolver::new(Arc::new(BufferedLog::new()));
        let books = MemoryLibrary::new("Books", ["Title"]);
        let entry: Arc<dyn Entry> = books.push(books.entry_builder());
        let table = AccessorTable::new();
        let accessors = EntryAccessors::new(&entry, &table, &resolver);

        assert_eq!(accessors.get("title"), None);
        assert!(!accessors.set("title", "x"));
        assert!(!accessors.has("title"));
        assert_eq!(accessors.is_live("title"), None);
    }

    #[test]
    fn snapshot_collects_current_values() {
        let resolver = Resolver::new(Arc::new(BufferedLog::new()));
        let books = MemoryLibrary::new("Books", ["Title", "Author"]);
        let entry: Arc<dyn Entry> = books.push(books.entry_builder().field("Title", "Dune"));

        let table = AccessorTable::new();
        table.install_with("title", || live("Title"));
        table.install_with("author", || live("Author"));
        let snapshot = EntryAccessors::new(&entry, &table, &resolver).snapshot();

        assert_eq!(snapshot["title"], Value::from("Dune"));
        assert_eq!(snapshot["author"], Value::Null);
    }
}
