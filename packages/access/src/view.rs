//! `LibraryView`: an ordered snapshot of a library.
//!
//! The view captures the library's entries and field list once, at
//! materialization. Entries added to or removed from the library afterwards
//! are not reflected; values read through the entries always are.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use entryview_core_store::{Entry, LibraryId, Value};

use crate::accessors::{AccessorTable, EntryAccessors};
use crate::error::AccessError;
use crate::projector::Projection;
use crate::resolver::Resolver;

/// A library field and the accessor key it was installed under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldKey {
    pub field: String,
    pub key: String,
}

/// Two fields that sanitize to the same accessor key. Only `kept` gets an
/// accessor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyCollision {
    pub key: String,
    pub kept: String,
    pub dropped: String,
}

/// Accessor keys planned for a library's fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct KeyPlan {
    pub(crate) fields: Vec<FieldKey>,
    pub(crate) collisions: Vec<KeyCollision>,
}

pub struct LibraryView {
    name: String,
    library: LibraryId,
    plan: KeyPlan,
    entries: Vec<Arc<dyn Entry>>,
    accessors: Vec<Arc<AccessorTable>>,
    resolver: Arc<Resolver>,
    installed: usize,
}

impl LibraryView {
    pub(crate) fn new(
        name: String,
        library: LibraryId,
        plan: KeyPlan,
        entries: Vec<Arc<dyn Entry>>,
        accessors: Vec<Arc<AccessorTable>>,
        resolver: Arc<Resolver>,
        installed: usize,
    ) -> Self {
        debug_assert_eq!(entries.len(), accessors.len());
        Self {
            name,
            library,
            plan,
            entries,
            accessors,
            resolver,
            installed,
        }
    }

    /// The name of the library this view was materialized from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The handle this view was materialized from.
    pub fn library_id(&self) -> &LibraryId {
        &self.library
    }

    /// Fields with accessors, in schema order. Fields dropped by a key
    /// collision are not listed.
    pub fn fields(&self) -> &[FieldKey] {
        &self.plan.fields
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The backing sequence, in driver order.
    pub fn entries(&self) -> &[Arc<dyn Entry>] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn Entry>> {
        self.entries.get(index)
    }

    /// The entry at `index`.
    ///
    /// # Errors
    ///
    /// `AccessError::IndexOutOfBounds` outside `0..len()`.
    pub fn entry(&self, index: usize) -> Result<&Arc<dyn Entry>, AccessError> {
        self.entries
            .get(index)
            .ok_or_else(|| AccessError::IndexOutOfBounds {
                library: self.name.clone(),
                index,
                len: self.entries.len(),
            })
    }

    /// The accessors installed on the entry at `index`.
    pub fn accessors(&self, index: usize) -> Result<EntryAccessors<'_>, AccessError> {
        let entry = self.entry(index)?;
        Ok(EntryAccessors::new(
            entry,
            &self.accessors[index],
            &self.resolver,
        ))
    }

    /// Every entry's accessor values, in entry order.
    pub fn snapshot(&self) -> Vec<Projection> {
        self.entries
            .iter()
            .zip(&self.accessors)
            .map(|(entry, table)| EntryAccessors::new(entry, table, &self.resolver).snapshot())
            .collect()
    }

    /// Collisions found while planning accessor keys.
    pub fn key_collisions(&self) -> &[KeyCollision] {
        &self.plan.collisions
    }

    /// How many accessors the materialization that built this view installed.
    pub fn installed_accessors(&self) -> usize {
        self.installed
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn Entry>> {
        self.entries.iter()
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Arc<dyn Entry>, usize, &LibraryView),
    {
        for (index, entry) in self.entries.iter().enumerate() {
            f(entry, index, self);
        }
    }

    pub fn map<T, F>(&self, mut f: F) -> Vec<T>
    where
        F: FnMut(&Arc<dyn Entry>, usize, &LibraryView) -> T,
    {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| f(entry, index, self))
            .collect()
    }

    pub fn filter<F>(&self, mut f: F) -> Vec<Arc<dyn Entry>>
    where
        F: FnMut(&Arc<dyn Entry>, usize, &LibraryView) -> bool,
    {
        self.entries
            .iter()
            .enumerate()
            .filter(|(index, entry)| f(*entry, *index, self))
            .map(|(_, entry)| Arc::clone(entry))
            .collect()
    }

    /// `true` as soon as one entry matches; `false` on an empty view.
    pub fn some<F>(&self, f: F) -> bool
    where
        F: FnMut(&Arc<dyn Entry>, usize, &LibraryView) -> bool,
    {
        self.find_index(f).is_some()
    }

    /// `false` as soon as one entry fails; `true` on an empty view.
    pub fn every<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&Arc<dyn Entry>, usize, &LibraryView) -> bool,
    {
        self.find_index(|entry, index, view| !f(entry, index, view))
            .is_none()
    }

    pub fn find<F>(&self, f: F) -> Option<&Arc<dyn Entry>>
    where
        F: FnMut(&Arc<dyn Entry>, usize, &LibraryView) -> bool,
    {
        self.find_index(f).map(|index| &self.entries[index])
    }

    pub fn find_index<F>(&self, mut f: F) -> Option<usize>
    where
        F: FnMut(&Arc<dyn Entry>, usize, &LibraryView) -> bool,
    {
        self.entries
            .iter()
            .enumerate()
            .find(|(index, entry)| f(*entry, *index, self))
            .map(|(index, _)| index)
    }

    pub fn reduce<T, F>(&self, init: T, mut f: F) -> T
    where
        F: FnMut(T, &Arc<dyn Entry>, usize, &LibraryView) -> T,
    {
        self.entries
            .iter()
            .enumerate()
            .fold(init, |acc, (index, entry)| f(acc, entry, index, self))
    }

    /// Read `field` from every entry, `Value::Null` where it does not resolve.
    pub fn column(&self, field: &str) -> Vec<Value> {
        self.entries
            .iter()
            .map(|entry| self.resolver.read(entry.as_ref(), field).unwrap_or_default())
            .collect()
    }
}

impl<'a> IntoIterator for &'a LibraryView {
    type Item = &'a Arc<dyn Entry>;
    type IntoIter = std::slice::Iter<'a, Arc<dyn Entry>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Index<usize> for LibraryView {
    type Output = Arc<dyn Entry>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl fmt::Debug for LibraryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryView")
            .field("name", &self.name)
            .field("library", &self.library)
            .field("fields", &self.plan.fields)
            .field("len", &self.entries.len())
            .field("collisions", &self.plan.collisions)
            .finish_non_exhaustive()
    }
}
