//! # formatgen Codegen
//!
//! Formatter source generation from catalog types.
//!
//! This crate provides:
//! - Serialization info extraction ([`SerializationInfoBuilder`])
//! - Type label resolution for generated code ([`resolve_label`])
//! - The Utf8Json formatter template
//! - An emitter writing one formatter file per type

pub mod emitter;
pub mod error;
pub mod info;
pub mod template;

pub use emitter::{
    DEFAULT_EXTENSION, DEFAULT_NAMESPACE, DEFAULT_OUTPUT_ROOT, Emitter, GenerationUnit,
};
pub use error::CodegenError;
pub use info::{
    MemberSerializationInfo, ObjectSerializationInfo, SerializationInfoBuilder, resolve_label,
};
pub use template::FormatterTemplate;

use formatgen_schema::{TypeCatalog, TypeRef};

/// Renders the formatter source for a single catalog type without writing it.
///
/// # Arguments
/// * `catalog` - Catalog holding the type
/// * `ty` - Class or struct to render
/// * `namespace` - Namespace of the generated formatter
///
/// # Errors
/// Returns `CodegenError` if the type cannot be described.
pub fn render_type(
    catalog: &TypeCatalog,
    ty: &TypeRef,
    namespace: &str,
) -> Result<String, CodegenError> {
    let info = SerializationInfoBuilder::new(catalog).describe(ty)?;
    Ok(FormatterTemplate::new(namespace, vec![info]).transform_text())
}
