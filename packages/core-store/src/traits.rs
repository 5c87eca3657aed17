//! Driver traits: Entry, Library, RecordStore.

use std::fmt;
use std::sync::Arc;

use crate::{Error, Value};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                $name(id)
            }
        }
    };
}

string_id!(
    /// Stable identity of an entry, assigned by the driver. Unique within
    /// one library only.
    EntryId
);

string_id!(
    /// Identity of one library handle. A library replaced under the same
    /// name gets a new id.
    LibraryId
);

/// One record held by a library.
///
/// An entry exposes data two ways: through the driver's generic named-field
/// accessor ("native fields"), and as directly addressable own properties.
/// Which values live where is up to the driver and may differ between
/// entries of the same library.
///
/// Methods take `&self`; drivers that allow mutation use interior locking so
/// that a shared `Arc<dyn Entry>` can be read and written from any thread.
///
/// # Object Safety
///
/// This trait is object-safe: entries travel as `Arc<dyn Entry>`.
pub trait Entry: Send + Sync {
    /// The driver-assigned identity. Never changes for the life of the entry.
    fn id(&self) -> EntryId;

    /// Read a native field.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The field is undefined for this entry.
    /// * `Ok(Some(value))` - The field's value, which may be `Value::Null`.
    /// * `Err(Error)` - The accessor itself failed.
    fn read_native_field(&self, name: &str) -> Result<Option<Value>, Error>;

    /// Write a native field. Fails if the driver rejects the name or value.
    fn write_native_field(&self, name: &str, value: Value) -> Result<(), Error>;

    /// Whether the entry itself owns a property under exactly this key.
    fn has_own_property(&self, key: &str) -> bool;

    /// The value of an own property, `None` if the entry does not own it.
    ///
    /// A property that was cleared still exists and reads as `Value::Null`.
    fn property(&self, key: &str) -> Option<Value>;

    /// Assign an own property.
    fn set_property(&self, key: &str, value: Value) -> Result<(), Error>;

    /// Reset an own property to the absent sentinel, keeping its slot.
    fn clear_property(&self, key: &str) -> Result<(), Error>;

    /// Keys of all own properties.
    fn property_keys(&self) -> Vec<String>;

    /// Whether this entry can be fronted by live accessors. When it cannot,
    /// the access layer falls back to static copies.
    fn supports_live_accessors(&self) -> bool {
        true
    }
}

/// An unordered provider of entries: one library in the record store.
pub trait Library: Send + Sync {
    /// The library's name.
    fn name(&self) -> &str;

    /// The handle's identity. Stable for the life of the handle.
    fn id(&self) -> LibraryId;

    /// Enumerate the entries currently in the library.
    fn entries(&self) -> Result<Vec<Arc<dyn Entry>>, Error>;

    /// The library's field names, in schema order.
    fn fields(&self) -> Result<Vec<String>, Error>;
}

/// Lookup of libraries by name.
pub trait RecordStore: Send + Sync {
    /// Find a library.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No library has that name.
    /// * `Ok(Some(library))` - The library.
    /// * `Err(Error)` - The store failed.
    fn library(&self, name: &str) -> Result<Option<Arc<dyn Library>>, Error>;
}

// Blanket implementations for shared and boxed handles

impl<T: Entry + ?Sized> Entry for Arc<T> {
    fn id(&self) -> EntryId {
        self.as_ref().id()
    }

    fn read_native_field(&self, name: &str) -> Result<Option<Value>, Error> {
        self.as_ref().read_native_field(name)
    }

    fn write_native_field(&self, name: &str, value: Value) -> Result<(), Error> {
        self.as_ref().write_native_field(name, value)
    }

    fn has_own_property(&self, key: &str) -> bool {
        self.as_ref().has_own_property(key)
    }

    fn property(&self, key: &str) -> Option<Value> {
        self.as_ref().property(key)
    }

    fn set_property(&self, key: &str, value: Value) -> Result<(), Error> {
        self.as_ref().set_property(key, value)
    }

    fn clear_property(&self, key: &str) -> Result<(), Error> {
        self.as_ref().clear_property(key)
    }

    fn property_keys(&self) -> Vec<String> {
        self.as_ref().property_keys()
    }

    fn supports_live_accessors(&self) -> bool {
        self.as_ref().supports_live_accessors()
    }
}

impl<T: Library + ?Sized> Library for Arc<T> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn id(&self) -> LibraryId {
        self.as_ref().id()
    }

    fn entries(&self) -> Result<Vec<Arc<dyn Entry>>, Error> {
        self.as_ref().entries()
    }

    fn fields(&self) -> Result<Vec<String>, Error> {
        self.as_ref().fields()
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    fn library(&self, name: &str) -> Result<Option<Arc<dyn Library>>, Error> {
        self.as_ref().library(name)
    }
}
