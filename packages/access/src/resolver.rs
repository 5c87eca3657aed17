//! Field resolution: one name, three places a value can live.
//!
//! An entry may hold a value as a native field, as an own property under the
//! exact field name, or as an own property under the lower-camel form of the
//! name. The resolver tries them in that order and never lets a failure
//! escape: reads yield `None`, writes and deletes yield `false`, and the
//! reason goes to the log sink.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use entryview_core_store::{lower_camel, Entry, Error, Value};

use crate::diagnostic::Diagnostic;
use crate::logging::{LogCrateSink, LogSink};

/// Fallback title for entries whose `Title` does not resolve.
pub const UNTITLED: &str = "Untitled";

const TITLE_FIELD: &str = "Title";

/// One place a named value can live on an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Representation {
    /// Reached through the driver's named-field accessor.
    NativeField,
    /// An own property named exactly like the field.
    ExactProperty,
    /// An own property named with the field's first character lowercased.
    LowerCamelProperty,
}

enum Mutation {
    Set(Value),
    Delete,
}

impl Representation {
    /// Resolution order. Native always wins when it yields a value.
    pub const CHAIN: [Representation; 3] = [
        Representation::NativeField,
        Representation::ExactProperty,
        Representation::LowerCamelProperty,
    ];

    /// The name or property key this representation looks under.
    pub fn key(self, name: &str) -> Cow<'_, str> {
        match self {
            Representation::NativeField | Representation::ExactProperty => Cow::Borrowed(name),
            Representation::LowerCamelProperty => lower_camel(name),
        }
    }

    /// Whether trying this representation can add anything for `name`. The
    /// lower-camel lookup is skipped when it would repeat the exact one.
    pub fn applies_to(self, name: &str) -> bool {
        match self {
            Representation::LowerCamelProperty => matches!(lower_camel(name), Cow::Owned(_)),
            _ => true,
        }
    }

    /// Read `name` from this representation only. `Ok(None)` means this
    /// representation does not hold it.
    pub fn read(self, entry: &dyn Entry, name: &str) -> Result<Option<Value>, Error> {
        match self {
            Representation::NativeField => entry.read_native_field(name),
            _ => {
                let key = self.key(name);
                if entry.has_own_property(&key) {
                    Ok(entry.property(&key))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Apply a mutation. `Ok(false)` means a property representation does not
    /// own the key and declined.
    fn apply(self, entry: &dyn Entry, name: &str, mutation: &Mutation) -> Result<bool, Error> {
        if self == Representation::NativeField {
            let value = match mutation {
                Mutation::Set(value) => value.clone(),
                Mutation::Delete => Value::Null,
            };
            return entry.write_native_field(name, value).map(|()| true);
        }

        let key = self.key(name);
        if !entry.has_own_property(&key) {
            return Ok(false);
        }
        match mutation {
            Mutation::Set(value) => entry.set_property(&key, value.clone())?,
            Mutation::Delete => entry.clear_property(&key)?,
        }
        Ok(true)
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::NativeField => f.write_str("field"),
            Representation::ExactProperty | Representation::LowerCamelProperty => {
                f.write_str("property")
            }
        }
    }
}

/// Outcome of resolving a name without any reporting.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Found {
        value: Value,
        source: Representation,
    },
    /// No representation holds the name.
    Missing,
    /// The native accessor raised.
    Failed(Error),
}

impl Resolution {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolution::Found { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<Representation> {
        match self {
            Resolution::Found { source, .. } => Some(*source),
            _ => None,
        }
    }
}

/// Reads, writes and deletes named values on entries.
///
/// Construct one per log sink and share it (it is `Send + Sync`); every view
/// and accessor built by an `Augmenter` routes through the resolver it was
/// given.
pub struct Resolver {
    log: Arc<dyn LogSink>,
}

impl Resolver {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self { log }
    }

    /// The sink diagnostics go to.
    pub fn log(&self) -> &Arc<dyn LogSink> {
        &self.log
    }

    pub(crate) fn emit(&self, diagnostic: Diagnostic) {
        diagnostic.emit(self.log.as_ref());
    }

    /// Walk the fallback chain without reporting anything.
    pub fn resolve(&self, entry: &dyn Entry, name: &str) -> Resolution {
        for representation in Representation::CHAIN {
            if !representation.applies_to(name) {
                continue;
            }
            match representation.read(entry, name) {
                Ok(Some(value)) => {
                    return Resolution::Found {
                        value,
                        source: representation,
                    }
                }
                Ok(None) => continue,
                Err(e) => return Resolution::Failed(e),
            }
        }
        Resolution::Missing
    }

    /// Read `name`, or `None` when nothing holds it or the driver failed.
    ///
    /// A native field that holds an explicit null reads as `Some(Value::Null)`.
    pub fn read(&self, entry: &dyn Entry, name: &str) -> Option<Value> {
        match self.resolve(entry, name) {
            Resolution::Found { value, .. } => Some(value),
            Resolution::Missing => {
                self.emit(Diagnostic::FieldNotFound {
                    field: name.to_string(),
                    title: self.title(entry),
                });
                None
            }
            Resolution::Failed(reason) => {
                self.emit(Diagnostic::ResolutionError {
                    field: name.to_string(),
                    title: self.title(entry),
                    reason,
                });
                None
            }
        }
    }

    /// The entry's `Title`, or `"Untitled"`. Used for log messages only, so
    /// it resolves silently.
    pub fn title(&self, entry: &dyn Entry) -> String {
        match self.resolve(entry, TITLE_FIELD) {
            Resolution::Found { value, .. } if !value.is_null() => value.to_string(),
            _ => UNTITLED.to_string(),
        }
    }

    /// Write `name`. Returns `true` if some representation accepted it.
    pub fn write(&self, entry: &dyn Entry, name: &str, value: impl Into<Value>) -> bool {
        self.mutate(entry, name, Mutation::Set(value.into()))
    }

    /// Clear `name`: native fields are set to null, properties keep their
    /// slot but lose their value.
    pub fn delete(&self, entry: &dyn Entry, name: &str) -> bool {
        self.mutate(entry, name, Mutation::Delete)
    }

    fn mutate(&self, entry: &dyn Entry, name: &str, mutation: Mutation) -> bool {
        let native_error = match Representation::NativeField.apply(entry, name, &mutation) {
            Ok(_) => {
                self.report_success(entry, Representation::NativeField, name, &mutation);
                return true;
            }
            Err(e) => e,
        };

        for representation in &Representation::CHAIN[1..] {
            if !representation.applies_to(name) {
                continue;
            }
            match representation.apply(entry, name, &mutation) {
                Ok(true) => {
                    let key = representation.key(name);
                    self.report_success(entry, *representation, &key, &mutation);
                    return true;
                }
                Ok(false) => continue,
                Err(reason) => {
                    let key = representation.key(name).into_owned();
                    let title = self.title(entry);
                    self.emit(match mutation {
                        Mutation::Set(_) => Diagnostic::PropertyWriteError { key, title, reason },
                        Mutation::Delete => Diagnostic::PropertyDeleteError { key, title, reason },
                    });
                    return false;
                }
            }
        }

        let field = name.to_string();
        self.emit(match mutation {
            Mutation::Set(_) => Diagnostic::WriteFailure {
                field,
                reason: native_error,
            },
            Mutation::Delete => Diagnostic::DeleteFailure {
                field,
                reason: native_error,
            },
        });
        false
    }

    fn report_success(
        &self,
        entry: &dyn Entry,
        target: Representation,
        key: &str,
        mutation: &Mutation,
    ) {
        let key = key.to_string();
        let title = self.title(entry);
        self.emit(match mutation {
            Mutation::Set(value) => Diagnostic::Written {
                target,
                key,
                value: value.clone(),
                title,
            },
            Mutation::Delete => Diagnostic::Deleted { target, key, title },
        });
    }
}

impl Default for Resolver {
    /// A resolver reporting through the `log` facade.
    fn default() -> Self {
        Self::new(Arc::new(LogCrateSink))
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{BufferedLog, Severity};
    use entryview_memory_store::{FieldExposure, MemoryLibrary};

    fn resolver() -> (Arc<BufferedLog>, Resolver) {
        let log = Arc::new(BufferedLog::new());
        let resolver = Resolver::new(log.clone());
        (log, resolver)
    }

    fn library() -> MemoryLibrary {
        MemoryLibrary::new("Books", ["Title", "PageCount", "Author"])
    }

    fn logged(log: &BufferedLog, severity: Severity) -> Vec<String> {
        let tag = format!("[{}] ", severity);
        log.lines()
            .into_iter()
            .filter_map(|line| line.split_once(&tag).map(|(_, m)| m.to_string()))
            .collect()
    }

    #[test]
    fn native_field_wins_over_properties() {
        let (_, resolver) = resolver();
        let books = library();
        let entry = books.push(
            books
                .entry_builder()
                .field("Title", "native")
                .property("Title", "exact")
                .property("title", "camel"),
        );

        let resolution = resolver.resolve(entry.as_ref(), "Title");
        assert_eq!(resolution.source(), Some(Representation::NativeField));
        assert_eq!(resolution.into_value(), Some(Value::from("native")));
    }

    #[test]
    fn exact_property_before_lower_camel() {
        let (_, resolver) = resolver();
        let books = library();
        let entry = books.push(
            books
                .entry_builder()
                .property("PageCount", 1i64)
                .property("pageCount", 2i64),
        );

        let resolution = resolver.resolve(entry.as_ref(), "PageCount");
        assert_eq!(resolution.source(), Some(Representation::ExactProperty));
        assert_eq!(resolver.read(entry.as_ref(), "PageCount"), Some(Value::Integer(1)));
    }

    #[test]
    fn lower_camel_is_last_resort() {
        let (log, resolver) = resolver();
        let books = library();
        let entry = books.push(books.entry_builder().property("pageCount", 300i64));

        assert_eq!(
            resolver.resolve(entry.as_ref(), "PageCount").source(),
            Some(Representation::LowerCamelProperty)
        );
        assert_eq!(
            resolver.read(entry.as_ref(), "PageCount"),
            Some(Value::Integer(300))
        );
        assert!(log.is_empty());
    }

    #[test]
    fn explicit_native_null_is_a_value() {
        let (log, resolver) = resolver();
        let books = library();
        let entry = books.push(books.entry_builder().field("Author", Value::Null));

        assert_eq!(resolver.read(entry.as_ref(), "Author"), Some(Value::Null));
        assert!(logged(&log, Severity::Warning).is_empty());
    }

    #[test]
    fn missing_field_warns_and_yields_none() {
        let (log, resolver) = resolver();
        let books = library();
        let entry = books.push(books.entry_builder().field("Title", "Dune"));

        assert_eq!(resolver.read(entry.as_ref(), "Author"), None);
        assert_eq!(
            logged(&log, Severity::Warning),
            vec!["Field or property \"Author\" not found for entry \"Dune\"."]
        );
    }

    #[test]
    fn native_failure_is_absorbed() {
        let (log, resolver) = resolver();
        let books = library();
        let entry = books.push(
            books
                .entry_builder()
                .failing_read("Author")
                .property("Author", "shadowed"),
        );

        assert!(matches!(
            resolver.resolve(entry.as_ref(), "Author"),
            Resolution::Failed(Error::Native { .. })
        ));
        assert_eq!(resolver.read(entry.as_ref(), "Author"), None);

        let errors = logged(&log, Severity::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Error getting field/property \"Author\""));
    }

    #[test]
    fn title_falls_back_to_untitled() {
        let (log, resolver) = resolver();
        let books = library();
        let untitled = books.push(books.entry_builder());
        let null_title = books.push(books.entry_builder().field("Title", Value::Null));
        let camel = books.push(books.entry_builder().property("title", "Emma"));

        assert_eq!(resolver.title(untitled.as_ref()), UNTITLED);
        assert_eq!(resolver.title(null_title.as_ref()), UNTITLED);
        assert_eq!(resolver.title(camel.as_ref()), "Emma");
        assert!(log.is_empty());
    }

    #[test]
    fn write_prefers_native() {
        let (log, resolver) = resolver();
        let books = library();
        let entry = books.push(books.entry_builder().property("Author", "prop"));

        assert!(resolver.write(entry.as_ref(), "Author", "Herbert"));
        assert_eq!(
            entry.read_native_field("Author").unwrap(),
            Some(Value::from("Herbert"))
        );
        assert_eq!(entry.property("Author"), Some(Value::from("prop")));
        assert_eq!(
            logged(&log, Severity::Info),
            vec!["Set field \"Author\" to \"Herbert\" for entry \"Untitled\"."]
        );
    }

    #[test]
    fn write_falls_back_to_owned_properties() {
        let (log, resolver) = resolver();
        let books = library();
        let entry = books.push(books.entry_builder().property("rating", 3i64));

        assert!(resolver.write(entry.as_ref(), "Rating", 5i64));
        assert_eq!(entry.property("rating"), Some(Value::Integer(5)));
        assert_eq!(resolver.read(entry.as_ref(), "Rating"), Some(Value::Integer(5)));
        assert_eq!(
            logged(&log, Severity::Info),
            vec!["Set property \"rating\" to \"5\" for entry \"Untitled\"."]
        );
    }

    #[test]
    fn write_without_any_target_fails() {
        let (log, resolver) = resolver();
        let books = library();
        let entry = books.push(books.entry_builder());

        assert!(!resolver.write(entry.as_ref(), "Rating", 5i64));
        assert!(!entry.has_own_property("Rating"));

        let errors = logged(&log, Severity::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Cannot set field or property \"Rating\""));
        assert!(errors[0].contains("unknown field"));
    }

    #[test]
    fn read_only_native_falls_back_to_property() {
        let (_, resolver) = resolver();
        let books = library();
        let entry = books.push(
            books
                .entry_builder()
                .read_only("Author")
                .property("author", "old"),
        );

        assert!(resolver.write(entry.as_ref(), "Author", "new"));
        assert_eq!(entry.property("author"), Some(Value::from("new")));
    }

    #[test]
    fn delete_nulls_native_field() {
        let (log, resolver) = resolver();
        let books = library();
        let entry = books.push(books.entry_builder().field("Author", "Herbert"));

        assert!(resolver.delete(entry.as_ref(), "Author"));
        assert_eq!(entry.read_native_field("Author").unwrap(), Some(Value::Null));
        assert_eq!(
            logged(&log, Severity::Info),
            vec!["Deleted field \"Author\" for entry \"Untitled\"."]
        );
    }

    #[test]
    fn delete_keeps_property_slot() {
        let (_, resolver) = resolver();
        let books = library();
        let entry = books.push(books.entry_builder().property("rating", 4i64));

        assert!(resolver.delete(entry.as_ref(), "Rating"));
        assert!(entry.has_own_property("rating"));
        assert_eq!(entry.property("rating"), Some(Value::Null));
    }

    #[test]
    fn delete_without_any_target_fails() {
        let (log, resolver) = resolver();
        let books = library();
        let entry = books.push(books.entry_builder());

        assert!(!resolver.delete(entry.as_ref(), "Rating"));
        let errors = logged(&log, Severity::Error);
        assert!(errors[0].starts_with("Cannot delete field or property \"Rating\""));
    }

    #[test]
    fn rejected_exact_property_stops_the_chain() {
        let (log, resolver) = resolver();
        let books = library();
        let entry = books.push(
            books
                .entry_builder()
                .property("Rating", 1i64)
                .property("rating", 2i64)
                .rejecting_property("Rating"),
        );

        assert!(!resolver.write(entry.as_ref(), "Rating", 5i64));
        assert_eq!(entry.property("Rating"), Some(Value::Integer(1)));
        assert_eq!(entry.property("rating"), Some(Value::Integer(2)));

        let errors = logged(&log, Severity::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Error setting property \"Rating\" for entry \"Untitled\""));
        assert!(errors[0].contains("not writable"));
        assert!(logged(&log, Severity::Info).is_empty());
    }

    #[test]
    fn rejected_property_delete_fails() {
        let (log, resolver) = resolver();
        let books = library();
        let entry = books.push(
            books
                .entry_builder()
                .property("rating", 4i64)
                .rejecting_property("rating"),
        );

        assert!(!resolver.delete(entry.as_ref(), "Rating"));
        assert_eq!(entry.property("rating"), Some(Value::Integer(4)));

        let errors = logged(&log, Severity::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Error deleting property \"rating\" for entry \"Untitled\""));
    }

    #[test]
    fn round_trip_through_mirrored_entry() {
        let (_, resolver) = resolver();
        let books = MemoryLibrary::new("Books", ["Title", "pageCount"])
            .with_exposure(FieldExposure::Mirrored);
        let entry = books.push(books.entry_builder().field("Title", "B"));

        assert!(resolver.write(entry.as_ref(), "pageCount", 10i64));
        assert_eq!(resolver.read(entry.as_ref(), "pageCount"), Some(Value::Integer(10)));
        assert_eq!(resolver.read(entry.as_ref(), "PageCount"), Some(Value::Integer(10)));
    }

    #[test]
    fn lower_camel_skipped_when_identical() {
        assert!(!Representation::LowerCamelProperty.applies_to("pageCount"));
        assert!(Representation::LowerCamelProperty.applies_to("PageCount"));
        assert_eq!(Representation::LowerCamelProperty.key("PageCount"), "pageCount");
    }
}
