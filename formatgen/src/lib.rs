//! # formatgen
//!
//! Development-time discovery and generation of Utf8Json formatters.
//!
//! formatgen finds the user types that lack a serialization formatter,
//! walks everything they depend on, and writes an `IJsonFormatter<T>`
//! source file for each of them.
//!
//! ## Features
//!
//! - **Explicit type catalog** - Built in code or loaded from an XML manifest
//! - **Ordered provider stack** - Built-in, platform, enum, generic-container,
//!   attribute and previously generated formatters pre-empt generation
//! - **Closure discovery** - Cycles, generics and arrays handled structurally
//! - **Deferred batching** - Flushes run at the host's next idle point
//!
//! ## Quick Start
//!
//! ```no_run
//! use formatgen::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(parse_catalog_file("types.xml".as_ref())?);
//! let (host, events) = ChannelHost::new(HostMode::Interactive);
//! let session = GenerationSession::new(GeneratorConfig::default(), catalog, Arc::new(host))?;
//!
//! session.request_generation(&TypeRef::named("Game.Player"))?;
//! while let Some(HostSignal::ScheduleFlush) = events.try_recv() {
//!     session.on_idle()?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`schema`] - Type model, catalog and manifest parser
//! - [`resolver`] - Formatter providers and lookup service
//! - [`codegen`] - Serialization info and formatter emission
//! - [`session`] - Walker, scheduler and generation session

pub mod prelude;

/// Type model, catalog and manifest parsing.
pub mod schema {
    pub use formatgen_schema::*;
}

/// Formatter providers and lookup.
pub mod resolver {
    pub use formatgen_resolver::*;
}

/// Serialization info extraction and source emission.
pub mod codegen {
    pub use formatgen_codegen::*;
}

/// Dependency walking, scheduling and sessions.
pub mod session {
    pub use formatgen_session::*;
}
