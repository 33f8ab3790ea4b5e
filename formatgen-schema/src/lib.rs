//! # formatgen Schema
//!
//! Structural type metadata consumed by the formatter generator.
//!
//! This crate provides:
//! - Primitive types and their canonical aliases
//! - Type references as they appear in field declarations
//! - An explicit type catalog standing in for runtime reflection
//! - An XML manifest parser for building catalogs from files
//! - Catalog validation

pub mod catalog;
pub mod error;
pub mod parser;
pub mod types;
pub mod validation;

pub use catalog::TypeCatalog;
pub use error::{ParseError, SchemaError};
pub use parser::{parse_catalog, parse_catalog_file, parse_type_expr};
pub use types::{FieldDef, PrimitiveType, TypeDef, TypeKind, TypeRef};
pub use validation::{validate_catalog, validate_generic_shape};
