//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```
//! use formatgen::prelude::*;
//! ```

// Type model
pub use formatgen_schema::{
    FieldDef, PrimitiveType, TypeCatalog, TypeDef, TypeKind, TypeRef, parse_catalog,
    parse_catalog_file,
};

// Lookup
pub use formatgen_resolver::{FormatterHandle, FormatterRegistry, FormatterResolver};

// Codegen
pub use formatgen_codegen::{Emitter, ObjectSerializationInfo, SerializationInfoBuilder};

// Session
pub use formatgen_session::{
    ChannelHost, GenerateError, GenerationSession, GeneratorConfig, HostEnvironment, HostEvents,
    HostMode, HostSignal, Reflected, SchedulerState,
};
