//! Formatter provider trait.

use crate::error::LookupError;
use formatgen_schema::{TypeCatalog, TypeRef};

/// A formatter known to exist for exactly one target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterHandle {
    /// Type the formatter serializes.
    pub target: TypeRef,
    /// Formatter type name.
    pub formatter: String,
    /// Name of the provider that produced it.
    pub provider: String,
}

impl FormatterHandle {
    /// Creates a new handle.
    #[must_use]
    pub fn new(
        target: TypeRef,
        formatter: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            target,
            formatter: formatter.into(),
            provider: provider.into(),
        }
    }
}

/// A provider that can produce a formatter for a type or decline.
///
/// Providers are queried in a fixed priority order; the first one returning
/// `Some` wins.
pub trait FormatterResolver: Send + Sync {
    /// Stable provider name, unique within a registry.
    fn name(&self) -> &str;

    /// Returns a formatter for `ty`, or `None` to decline.
    ///
    /// # Errors
    /// Returns `LookupError` if the type cannot be inspected or the provider
    /// itself is misconfigured.
    fn get_formatter(
        &self,
        ty: &TypeRef,
        catalog: &TypeCatalog,
    ) -> Result<Option<FormatterHandle>, LookupError>;
}
