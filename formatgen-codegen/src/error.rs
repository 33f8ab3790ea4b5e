//! Error types for code generation.

use formatgen_schema::{SchemaError, TypeRef};
use std::path::PathBuf;
use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The type cannot be described.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A directory or file could not be written.
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        /// Path being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Another type's formatter already occupies the output file.
    #[error("{} already holds the formatter for {existing}", .path.display())]
    PathCollision {
        /// Contested output file.
        path: PathBuf,
        /// Type whose formatter owns the file.
        existing: TypeRef,
    },
}

impl CodegenError {
    /// Creates an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
