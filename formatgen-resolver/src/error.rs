//! Error types for formatter lookups.

use formatgen_schema::SchemaError;
use thiserror::Error;

/// Error type for formatter lookup operations.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The provider list is unusable. Fatal for the whole generation pass.
    #[error("resolver configuration error: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },

    /// The queried type cannot be inspected.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

impl LookupError {
    /// Creates a configuration error with the given message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns true if this error must abort the whole generation pass.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
