//! In-memory entries.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use entryview_core_store::{Entry, EntryId, Error, Value};

/// How native fields show up on an entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldExposure {
    /// Native fields are reachable only through the named-field accessor.
    #[default]
    NativeOnly,
    /// Every native field that holds a value is also published as an own
    /// property of the same name, the way scripting hosts expose entries.
    Mirrored,
}

#[derive(Default)]
struct EntryState {
    fields: BTreeMap<String, Value>,
    /// `None` is the absent sentinel left behind by `clear_property`.
    properties: BTreeMap<String, Option<Value>>,
}

/// An entry held in memory.
///
/// Native fields are restricted to the library schema: reading a name outside
/// it yields undefined, writing one fails with `UnknownField`.
pub struct MemoryEntry {
    id: EntryId,
    schema: Arc<[String]>,
    exposure: FieldExposure,
    failing_reads: BTreeSet<String>,
    read_only: BTreeSet<String>,
    rejected_properties: BTreeSet<String>,
    live_accessors: bool,
    state: RwLock<EntryState>,
}

impl MemoryEntry {
    fn state(&self) -> RwLockReadGuard<'_, EntryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, EntryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn in_schema(&self, name: &str) -> bool {
        self.schema.iter().any(|f| f == name)
    }

    fn check_property_writable(&self, key: &str) -> Result<(), Error> {
        if self.rejected_properties.contains(key) {
            return Err(Error::Property {
                key: key.to_string(),
                message: "property is not writable".to_string(),
            });
        }
        Ok(())
    }
}

impl Entry for MemoryEntry {
    fn id(&self) -> EntryId {
        self.id.clone()
    }

    fn read_native_field(&self, name: &str) -> Result<Option<Value>, Error> {
        if self.failing_reads.contains(name) {
            return Err(Error::native(name, "field accessor raised"));
        }
        if !self.in_schema(name) {
            return Ok(None);
        }
        Ok(self.state().fields.get(name).cloned())
    }

    fn write_native_field(&self, name: &str, value: Value) -> Result<(), Error> {
        if !self.in_schema(name) {
            return Err(Error::UnknownField {
                field: name.to_string(),
            });
        }
        if self.read_only.contains(name) {
            return Err(Error::ReadOnlyField {
                field: name.to_string(),
            });
        }

        let mut state = self.state_mut();
        if self.exposure == FieldExposure::Mirrored {
            state
                .properties
                .insert(name.to_string(), Some(value.clone()));
        }
        state.fields.insert(name.to_string(), value);
        Ok(())
    }

    fn has_own_property(&self, key: &str) -> bool {
        self.state().properties.contains_key(key)
    }

    fn property(&self, key: &str) -> Option<Value> {
        self.state()
            .properties
            .get(key)
            .map(|v| v.clone().unwrap_or_default())
    }

    fn set_property(&self, key: &str, value: Value) -> Result<(), Error> {
        self.check_property_writable(key)?;
        self.state_mut()
            .properties
            .insert(key.to_string(), Some(value));
        Ok(())
    }

    fn clear_property(&self, key: &str) -> Result<(), Error> {
        self.check_property_writable(key)?;
        self.state_mut().properties.insert(key.to_string(), None);
        Ok(())
    }

    fn property_keys(&self) -> Vec<String> {
        self.state().properties.keys().cloned().collect()
    }

    fn supports_live_accessors(&self) -> bool {
        self.live_accessors
    }
}

impl std::fmt::Debug for MemoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("MemoryEntry")
            .field("id", &self.id)
            .field("fields", &state.fields)
            .field("properties", &state.properties)
            .finish()
    }
}

/// Builds a `MemoryEntry` for a given schema.
///
/// Obtain one from `MemoryLibrary::entry_builder` so the schema and exposure
/// match the library, then hand it back to `MemoryLibrary::push`.
pub struct EntryBuilder {
    id: Option<EntryId>,
    schema: Arc<[String]>,
    exposure: FieldExposure,
    fields: BTreeMap<String, Value>,
    properties: BTreeMap<String, Option<Value>>,
    failing_reads: BTreeSet<String>,
    read_only: BTreeSet<String>,
    rejected_properties: BTreeSet<String>,
    live_accessors: bool,
}

impl EntryBuilder {
    pub(crate) fn new(schema: Arc<[String]>, exposure: FieldExposure) -> Self {
        Self {
            id: None,
            schema,
            exposure,
            fields: BTreeMap::new(),
            properties: BTreeMap::new(),
            failing_reads: BTreeSet::new(),
            read_only: BTreeSet::new(),
            rejected_properties: BTreeSet::new(),
            live_accessors: true,
        }
    }

    /// Use a fixed id instead of a generated one.
    pub fn id(mut self, id: impl Into<EntryId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set a native field. Names outside the schema are kept as own
    /// properties instead, since the store has nowhere else to put them.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        if self.schema.iter().any(|f| *f == name) {
            self.fields.insert(name, value);
        } else {
            self.properties.insert(name, Some(value));
        }
        self
    }

    /// Set an own property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), Some(value.into()));
        self
    }

    /// Make native reads of `name` fail.
    pub fn failing_read(mut self, name: impl Into<String>) -> Self {
        self.failing_reads.insert(name.into());
        self
    }

    /// Make native writes of `name` fail with `ReadOnlyField`.
    pub fn read_only(mut self, name: impl Into<String>) -> Self {
        self.read_only.insert(name.into());
        self
    }

    /// Make assigning or clearing the own property `key` fail with
    /// `Error::Property`. The builder can still give it an initial value.
    pub fn rejecting_property(mut self, key: impl Into<String>) -> Self {
        self.rejected_properties.insert(key.into());
        self
    }

    /// Report that live accessors cannot be installed on this entry.
    pub fn without_live_accessors(mut self) -> Self {
        self.live_accessors = false;
        self
    }

    pub fn build(self) -> MemoryEntry {
        let mut properties = self.properties;
        if self.exposure == FieldExposure::Mirrored {
            for (name, value) in &self.fields {
                properties.insert(name.clone(), Some(value.clone()));
            }
        }

        MemoryEntry {
            id: self
                .id
                .unwrap_or_else(|| EntryId::new(uuid::Uuid::new_v4().to_string())),
            schema: self.schema,
            exposure: self.exposure,
            failing_reads: self.failing_reads,
            read_only: self.read_only,
            rejected_properties: self.rejected_properties,
            live_accessors: self.live_accessors,
            state: RwLock::new(EntryState {
                fields: self.fields,
                properties,
            }),
        }
    }
}
