//! Error types for the driver layer.

/// Errors raised by record-store drivers.
///
/// These describe what the store itself refused. Whether a refusal is fatal
/// is decided by the access layer, which absorbs most of them.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The library schema has no field with this name.
    #[error("unknown field {field:?}")]
    UnknownField { field: String },

    /// The field exists but the driver does not accept writes to it.
    #[error("field {field:?} is read-only")]
    ReadOnlyField { field: String },

    /// The native accessor itself failed.
    #[error("native accessor failed for {field:?}: {message}")]
    Native { field: String, message: String },

    /// An own property refused an assignment.
    #[error("property {key:?} rejected assignment: {message}")]
    Property { key: String, message: String },

    /// Data could not be decoded into the requested shape.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Data could not be encoded.
    #[error("encode error: {message}")]
    Encode { message: String },

    /// Generic error with message.
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    pub fn native(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Native {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Error::Encode {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Error::Other {
            message: message.into(),
        }
    }
}
