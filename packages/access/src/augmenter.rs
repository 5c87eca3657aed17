//! Materializing libraries into `LibraryView`s.
//!
//! `Augmenter::materialize` snapshots a library's entries and field list,
//! then fronts every entry with one accessor per field. Accessors live in a
//! registry outside the entries themselves, one slot per library name, so
//! materializing the same library again installs nothing twice. A slot is
//! tied to the library handle it was built for and is rebuilt when a
//! different handle shows up under the same name.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use entryview_core_store::{
    sanitize_accessor_key, Entry, EntryId, Library, LibraryId, RecordStore,
};
use indexmap::IndexMap;

use crate::accessors::{Accessor, AccessorTable};
use crate::config::{AugmentConfig, EmptyLibraryPolicy};
use crate::diagnostic::Diagnostic;
use crate::error::AccessError;
use crate::resolver::Resolver;
use crate::view::{FieldKey, KeyCollision, KeyPlan, LibraryView};

/// Find a library by name.
///
/// # Errors
///
/// `AccessError::LibraryNotFound` if the store has no such library, or the
/// store's own error.
pub fn lookup_library(store: &dyn RecordStore, name: &str) -> Result<Arc<dyn Library>, AccessError> {
    store
        .library(name)?
        .ok_or_else(|| AccessError::LibraryNotFound {
            library: name.to_string(),
        })
}

/// The library's field names, in schema order.
pub fn library_fields(library: &dyn Library) -> Result<Vec<String>, AccessError> {
    Ok(library.fields()?)
}

/// Accessor tables of one library handle, by entry id.
struct Instrumented {
    library: LibraryId,
    tables: HashMap<EntryId, Arc<AccessorTable>>,
}

impl Instrumented {
    fn new(library: LibraryId) -> Self {
        Self {
            library,
            tables: HashMap::new(),
        }
    }
}

/// Builds and caches `LibraryView`s and owns the accessor registry.
pub struct Augmenter {
    resolver: Arc<Resolver>,
    config: AugmentConfig,
    views: RwLock<HashMap<String, Arc<LibraryView>>>,
    registry: RwLock<HashMap<String, Instrumented>>,
}

impl Augmenter {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self::with_config(resolver, AugmentConfig::default())
    }

    pub fn with_config(resolver: Arc<Resolver>, config: AugmentConfig) -> Self {
        Self {
            resolver,
            config,
            views: RwLock::new(HashMap::new()),
            registry: RwLock::new(HashMap::new()),
        }
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    pub fn config(&self) -> &AugmentConfig {
        &self.config
    }

    /// Snapshot `library` into a fresh view and install any missing
    /// accessors. The view replaces whatever was cached under the library's
    /// name, and accessor tables of entries no longer in the library are
    /// dropped.
    ///
    /// # Errors
    ///
    /// `AccessError::EmptyCollection` if the library has no entries and the
    /// policy is `Reject`; `AccessError::Store` if enumeration fails.
    pub fn materialize(&self, library: &dyn Library) -> Result<Arc<LibraryView>, AccessError> {
        let name = library.name().to_string();
        let id = library.id();

        let entries = library.entries()?;
        if entries.is_empty() && self.config.empty_library == EmptyLibraryPolicy::Reject {
            return Err(AccessError::EmptyCollection { library: name });
        }

        let plan = plan_keys(&library.fields()?);
        for collision in &plan.collisions {
            self.resolver.emit(Diagnostic::KeyCollision {
                library: name.clone(),
                key: collision.key.clone(),
                kept: collision.kept.clone(),
                dropped: collision.dropped.clone(),
            });
        }

        let (tables, installed) = self.instrument_all(&name, &id, &entries, &plan.fields);

        log::debug!(
            "Materialized library {} ({} entries, {} fields, {} accessors installed)",
            name,
            entries.len(),
            plan.fields.len(),
            installed
        );

        let view = Arc::new(LibraryView::new(
            name.clone(),
            id,
            plan,
            entries,
            tables,
            self.resolver.clone(),
            installed,
        ));
        self.views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, view.clone());
        Ok(view)
    }

    /// Look up and materialize a library by name.
    pub fn open(&self, store: &dyn RecordStore, name: &str) -> Result<Arc<LibraryView>, AccessError> {
        let library = lookup_library(store, name)?;
        self.materialize(library.as_ref())
    }

    /// The cached view for the library named `library`, if any.
    pub fn view(&self, library: &str) -> Option<Arc<LibraryView>> {
        self.views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(library)
            .cloned()
    }

    /// The entry at `index` of the library's view. The library is
    /// materialized first if no view is cached for this handle.
    ///
    /// # Errors
    ///
    /// `AccessError::IndexOutOfBounds` outside `0..len`, plus any error
    /// from `materialize`.
    pub fn indexed(&self, library: &dyn Library, index: usize) -> Result<Arc<dyn Entry>, AccessError> {
        let view = match self.view(library.name()) {
            Some(view) if *view.library_id() == library.id() => view,
            _ => self.materialize(library)?,
        };
        view.entry(index).cloned()
    }

    pub fn first(&self, library: &dyn Library) -> Result<Arc<dyn Entry>, AccessError> {
        self.indexed(library, 0)
    }

    /// Drop the cached view for `library`. Installed accessors stay. Returns
    /// `true` if a view was cached.
    pub fn invalidate(&self, library: &str) -> bool {
        self.views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(library)
            .is_some()
    }

    /// Drop every cached view and every installed accessor.
    pub fn reset(&self) {
        self.views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// The accessors installed on entry `id` of the library named `library`.
    pub fn accessor_table(&self, library: &str, id: &EntryId) -> Option<Arc<AccessorTable>> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(library)
            .and_then(|slot| slot.tables.get(id))
            .cloned()
    }

    /// Find or create the table of every entry, install missing accessors,
    /// and forget tables of entries that are gone. Runs under the registry
    /// write lock so concurrent materializations install each accessor once.
    fn instrument_all(
        &self,
        name: &str,
        library: &LibraryId,
        entries: &[Arc<dyn Entry>],
        fields: &[FieldKey],
    ) -> (Vec<Arc<AccessorTable>>, usize) {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let slot = registry
            .entry(name.to_string())
            .or_insert_with(|| Instrumented::new(library.clone()));
        if slot.library != *library {
            log::debug!("Library {} has a new handle; rebuilding its accessors", name);
            *slot = Instrumented::new(library.clone());
        }

        let mut previous = std::mem::take(&mut slot.tables);
        let mut installed = 0;
        let mut tables = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = entry.id();
            let table = match previous.remove(&id) {
                Some(table) => table,
                None => slot.tables.get(&id).cloned().unwrap_or_default(),
            };
            installed += self.instrument(entry, &table, fields);
            slot.tables.insert(id, table.clone());
            tables.push(table);
        }

        if !previous.is_empty() {
            log::debug!(
                "Dropped accessors of {} entries no longer in library {}",
                previous.len(),
                name
            );
        }
        (tables, installed)
    }

    /// Install accessors for `fields` on one entry. A key the entry already
    /// owns as a property is left alone.
    fn instrument(&self, entry: &Arc<dyn Entry>, table: &AccessorTable, fields: &[FieldKey]) -> usize {
        let mut installed = 0;
        for FieldKey { field, key } in fields {
            if entry.has_own_property(key) {
                continue;
            }
            if table.install_with(key, || Some(self.accessor_for(entry.as_ref(), field))) {
                installed += 1;
            }
        }
        installed
    }

    fn accessor_for(&self, entry: &dyn Entry, field: &str) -> Accessor {
        if entry.supports_live_accessors() {
            return Accessor::Live {
                field: field.to_string(),
            };
        }

        self.resolver.emit(Diagnostic::UnsupportedAccessorInstall {
            field: field.to_string(),
            entry: entry.id(),
        });
        Accessor::Static {
            field: field.to_string(),
            value: self.resolver.read(entry, field),
        }
    }
}

impl std::fmt::Debug for Augmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let views = self.views.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Augmenter")
            .field("config", &self.config)
            .field("views", &views.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Sanitize every field name. When two fields share a key the first one
/// keeps it.
fn plan_keys(fields: &[String]) -> KeyPlan {
    let mut owners: IndexMap<String, &str> = IndexMap::with_capacity(fields.len());
    let mut collisions = Vec::new();

    for field in fields {
        let key = sanitize_accessor_key(field);
        match owners.get(&key) {
            Some(&kept) => collisions.push(KeyCollision {
                key,
                kept: kept.to_string(),
                dropped: field.clone(),
            }),
            None => {
                owners.insert(key, field.as_str());
            }
        }
    }

    let fields = owners
        .into_iter()
        .map(|(key, field)| FieldKey {
            field: field.to_string(),
            key,
        })
        .collect();
    KeyPlan { fields, collisions }
}
