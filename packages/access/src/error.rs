//! Errors raised out of the access layer.
//!
//! Only caller precondition violations end up here. Data-shape problems
//! (missing fields, rejected writes) are absorbed by the resolver and show up
//! as `Diagnostic`s in the log instead.

#[derive(thiserror::Error, Debug)]
pub enum AccessError {
    #[error("Library \"{library}\" not found.")]
    LibraryNotFound { library: String },

    #[error("No entries found in library \"{library}\".")]
    EmptyCollection { library: String },

    #[error("Index {index} out of bounds for library \"{library}\" ({len} entries).")]
    IndexOutOfBounds {
        library: String,
        index: usize,
        len: usize,
    },

    #[error("Store error: {0}")]
    Store(#[from] entryview_core_store::Error),

    #[error("Config error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
