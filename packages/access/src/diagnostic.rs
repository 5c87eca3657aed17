//! What the access layer reports instead of failing.

use entryview_core_store::{EntryId, Error, Value};

use crate::logging::{LogSink, Severity};
use crate::resolver::Representation;

/// A reportable event. Rendered with `Display` and handed to the log sink at
/// the severity given by `severity()`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The native accessor raised while reading.
    #[error("Error getting field/property \"{field}\" for entry \"{title}\": {reason}")]
    ResolutionError {
        field: String,
        title: String,
        reason: Error,
    },

    /// No representation held the field.
    #[error("Field or property \"{field}\" not found for entry \"{title}\".")]
    FieldNotFound { field: String, title: String },

    #[error("Set {target} \"{key}\" to \"{value}\" for entry \"{title}\".")]
    Written {
        target: Representation,
        key: String,
        value: Value,
        title: String,
    },

    #[error("Deleted {target} \"{key}\" for entry \"{title}\".")]
    Deleted {
        target: Representation,
        key: String,
        title: String,
    },

    /// No representation accepted a write.
    #[error("Cannot set field or property \"{field}\": {reason}")]
    WriteFailure { field: String, reason: Error },

    /// No representation accepted a delete.
    #[error("Cannot delete field or property \"{field}\": {reason}")]
    DeleteFailure { field: String, reason: Error },

    /// An owned property refused an assignment.
    #[error("Error setting property \"{key}\" for entry \"{title}\": {reason}")]
    PropertyWriteError {
        key: String,
        title: String,
        reason: Error,
    },

    /// An owned property refused to be cleared.
    #[error("Error deleting property \"{key}\" for entry \"{title}\": {reason}")]
    PropertyDeleteError {
        key: String,
        title: String,
        reason: Error,
    },

    /// The entry cannot host a live accessor; a static copy was stored.
    #[error("Unable to define accessor for field \"{field}\" on entry {entry}; stored a static copy.")]
    UnsupportedAccessorInstall { field: String, entry: EntryId },

    /// Two fields sanitize to the same accessor key.
    #[error("Fields \"{kept}\" and \"{dropped}\" of library \"{library}\" share accessor key \"{key}\"; keeping \"{kept}\".")]
    KeyCollision {
        library: String,
        key: String,
        kept: String,
        dropped: String,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::Written { .. } | Diagnostic::Deleted { .. } => Severity::Info,
            Diagnostic::FieldNotFound { .. }
            | Diagnostic::UnsupportedAccessorInstall { .. }
            | Diagnostic::KeyCollision { .. } => Severity::Warning,
            Diagnostic::ResolutionError { .. }
            | Diagnostic::WriteFailure { .. }
            | Diagnostic::DeleteFailure { .. }
            | Diagnostic::PropertyWriteError { .. }
            | Diagnostic::PropertyDeleteError { .. } => Severity::Error,
        }
    }

    /// Hand this diagnostic to `sink`.
    pub fn emit(&self, sink: &dyn LogSink) {
        sink.log(&self.to_string(), self.severity());
    }
}
