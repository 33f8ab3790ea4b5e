//! # formatgen Resolver
//!
//! Answers "does a formatter already exist for this type?".
//!
//! This crate provides:
//! - The [`FormatterResolver`] provider trait
//! - The fixed built-in providers (primitives, platform types, enums,
//!   generic containers, attribute-declared formatters)
//! - A registry of previously generated formatters, seeded from disk
//! - [`FormatterRegistry`], which composes them in priority order

pub mod builtin;
pub mod error;
pub mod generated;
pub mod registry;
pub mod resolver;

pub use builtin::{
    AttributeFormatterResolver, BuiltinResolver, DynamicGenericResolver, EnumResolver,
    PlatformResolver,
};
pub use error::LookupError;
pub use generated::{GeneratedFormatterResolver, TARGET_MARKER, read_target_marker};
pub use registry::{FormatterRegistry, RegistryBuilder};
pub use resolver::{FormatterHandle, FormatterResolver};
