//! Loading libraries from JSON.

use entryview_core_store::convert::json_to_value;
use entryview_core_store::Error;
use serde::Deserialize;

use crate::entry::FieldExposure;
use crate::library::MemoryLibrary;

/// The JSON shape of a library dump.
///
/// ```json
/// {
///   "fields": ["Title", "pageCount"],
///   "exposure": "mirrored",
///   "entries": [{ "Title": "A", "pageCount": 5 }, { "Title": "B" }]
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct LibraryFixture {
    pub fields: Vec<String>,
    #[serde(default)]
    pub exposure: FieldExposure,
    #[serde(default)]
    pub entries: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl LibraryFixture {
    /// Build a library named `name` holding the fixture's entries.
    pub fn into_library(self, name: impl Into<String>) -> MemoryLibrary {
        let library = MemoryLibrary::new(name, self.fields).with_exposure(self.exposure);
        for values in self.entries {
            let builder = values
                .into_iter()
                .fold(library.entry_builder(), |b, (k, v)| {
                    b.field(k, json_to_value(v))
                });
            library.push(builder);
        }
        library
    }
}

impl MemoryLibrary {
    /// Build a library from a JSON dump.
    pub fn from_json(name: impl Into<String>, json: serde_json::Value) -> Result<Self, Error> {
        let fixture: LibraryFixture =
            serde_json::from_value(json).map_err(|e| Error::decode(e.to_string()))?;
        Ok(fixture.into_library(name))
    }

    /// Build a library from JSON text.
    pub fn from_json_str(name: impl Into<String>, json: &str) -> Result<Self, Error> {
        let fixture: LibraryFixture =
            serde_json::from_str(json).map_err(|e| Error::decode(e.to_string()))?;
        Ok(fixture.into_library(name))
    }
}
