//! In-memory record store: named libraries.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use entryview_core_store::{Error, Library, RecordStore};

use crate::library::MemoryLibrary;

/// A record store holding libraries by name.
#[derive(Default)]
pub struct MemoryStore {
    libraries: RwLock<BTreeMap<String, Arc<MemoryLibrary>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a library, replacing any library of the same name.
    pub fn insert(&self, library: MemoryLibrary) -> Arc<MemoryLibrary> {
        let library = Arc::new(library);
        self.libraries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(library.name().to_string(), library.clone());
        library
    }

    /// Get the concrete library by name.
    pub fn get(&self, name: &str) -> Option<Arc<MemoryLibrary>> {
        self.libraries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names of all libraries, sorted.
    pub fn names(&self) -> Vec<String> {
        self.libraries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl RecordStore for MemoryStore {
    fn library(&self, name: &str) -> Result<Option<Arc<dyn Library>>, Error> {
        Ok(self.get(name).map(|l| l as Arc<dyn Library>))
    }
}
