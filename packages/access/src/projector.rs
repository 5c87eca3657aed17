//! Bulk projection and bulk writes.

use std::sync::Arc;

use entryview_core_store::convert::from_value;
use entryview_core_store::{Entry, Error, Value};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use crate::resolver::Resolver;

/// Requested field name to resolved value, in request order. Unresolved
/// fields map to `Value::Null`.
pub type Projection = IndexMap<String, Value>;

impl Resolver {
    /// Read every name in `names` from one entry.
    ///
    /// Keys follow the order of `names`. A name requested twice keeps its
    /// first position.
    pub fn project<S: AsRef<str>>(&self, entry: &dyn Entry, names: &[S]) -> Projection {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), self.read(entry, name).unwrap_or_default())
            })
            .collect()
    }

    /// Project every entry. The result has exactly one row per entry, in
    /// entry order, however many fields fail to resolve.
    pub fn project_all<S: AsRef<str>>(
        &self,
        entries: &[Arc<dyn Entry>],
        names: &[S],
    ) -> Vec<Projection> {
        entries
            .iter()
            .map(|entry| self.project(entry.as_ref(), names))
            .collect()
    }

    /// Project one entry straight into a serde type.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decode` if the projected values do not fit `T`.
    pub fn project_as<T, S>(&self, entry: &dyn Entry, names: &[S]) -> Result<T, Error>
    where
        T: DeserializeOwned,
        S: AsRef<str>,
    {
        let map = self.project(entry, names).into_iter().collect();
        from_value(Value::Map(map))
    }

    /// Write every pair. All writes are attempted; returns `true` only if
    /// each one succeeded.
    pub fn write_all<I, K, V>(&self, entry: &dyn Entry, fields: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        fields.into_iter().fold(true, |all, (name, value)| {
            let written = self.write(entry, name.as_ref(), value);
            all && written
        })
    }

    /// Delete every name. All deletes are attempted; returns `true` only if
    /// each one succeeded.
    pub fn delete_all<S: AsRef<str>>(&self, entry: &dyn Entry, names: &[S]) -> bool {
        names.iter().fold(true, |all, name| {
            let deleted = self.delete(entry, name.as_ref());
            all && deleted
        })
    }
}
