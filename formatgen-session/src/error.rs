//! Error types for generation sessions.

use formatgen_codegen::CodegenError;
use formatgen_resolver::LookupError;
use formatgen_schema::{SchemaError, TypeRef};
use std::path::PathBuf;
use thiserror::Error;

/// Error type for generation session operations.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Formatter lookup failed.
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// A type could not be inspected.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Some units of a flush failed.
    #[error(transparent)]
    Flush(#[from] FlushError),
}

impl GenerateError {
    /// Returns true if the error must abort the whole generation pass.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Lookup(e) if e.is_fatal())
    }
}

/// Outcome of a flush in which at least one unit failed.
///
/// Successful units were written and registered; failed units stay pending.
#[derive(Debug, Error)]
#[error("{} formatter(s) failed to generate, {} written", .failures.len(), .written.len())]
pub struct FlushError {
    /// Files written before and after the failures.
    pub written: Vec<PathBuf>,
    /// Each failed type with its error.
    pub failures: Vec<(TypeRef, CodegenError)>,
}

impl FlushError {
    /// Returns the types that failed.
    #[must_use]
    pub fn failed_types(&self) -> Vec<&TypeRef> {
        self.failures.iter().map(|(ty, _)| ty).collect()
    }
}

/// Error type for generator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Output root is empty.
    #[error("output root must not be empty")]
    EmptyOutputRoot,

    /// Namespace is not a dotted identifier path.
    #[error("invalid namespace '{namespace}'")]
    InvalidNamespace {
        /// Rejected namespace.
        namespace: String,
    },

    /// File extension is empty or contains a separator.
    #[error("invalid file extension '{extension}'")]
    InvalidExtension {
        /// Rejected extension.
        extension: String,
    },
}
