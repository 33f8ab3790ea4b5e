//! # formatgen Session
//!
//! Discovery and batching of formatter generation.
//!
//! This crate provides:
//! - The type dependency walker filling the pending set
//! - The flush scheduler and its host abstraction
//! - [`GenerationSession`], the explicit state of one generation pass
//! - Generator configuration

pub mod config;
pub mod error;
pub mod host;
pub mod pending;
pub mod reflect;
pub mod scheduler;
pub mod session;
pub mod walker;

pub use config::{GeneratorConfig, GeneratorConfigBuilder};
pub use error::{ConfigError, FlushError, GenerateError};
pub use host::{ChannelHost, HostEnvironment, HostEvents, HostMode, HostSignal};
pub use pending::PendingSet;
pub use reflect::Reflected;
pub use scheduler::{Scheduler, SchedulerState};
pub use session::GenerationSession;
pub use walker::{TypeWalker, WalkOutcome};
