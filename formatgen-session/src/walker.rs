//! Type dependency walker.
//!
//! Computes the transitive closure of types that need a generated formatter
//! and enqueues them with the scheduler. Primitives, text, enums and
//! anything a provider already covers are leaves. Generic containers and
//! arrays are never enqueued themselves; only their arguments are walked.

use crate::error::GenerateError;
use crate::scheduler::Scheduler;
use formatgen_resolver::FormatterRegistry;
use formatgen_schema::{SchemaError, TypeCatalog, TypeRef, validate_generic_shape};
use tracing::debug;

/// Result of one successful walk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Types this walk added to the pending set, in discovery order.
    pub enqueued: Vec<TypeRef>,
    /// Containers no provider covers, which will never get a formatter.
    pub uncovered_containers: Vec<TypeRef>,
}

/// Walks a type graph against a catalog and formatter registry.
pub struct TypeWalker<'a> {
    catalog: &'a TypeCatalog,
    registry: &'a FormatterRegistry,
    scheduler: &'a Scheduler,
}

impl<'a> TypeWalker<'a> {
    /// Creates a new walker.
    #[must_use]
    pub fn new(
        catalog: &'a TypeCatalog,
        registry: &'a FormatterRegistry,
        scheduler: &'a Scheduler,
    ) -> Self {
        Self {
            catalog,
            registry,
            scheduler,
        }
    }

    /// Enqueues `ty` and everything it depends on that lacks a formatter.
    ///
    /// A type is enqueued only once its own lookup and description succeed.
    /// Types enqueued before an error stay pending: another request may
    /// already rely on them.
    ///
    /// # Errors
    /// Returns `GenerateError::Schema` if a reachable type cannot be
    /// inspected, or `GenerateError::Lookup` if a provider fails.
    pub fn walk(&self, ty: &TypeRef) -> Result<WalkOutcome, GenerateError> {
        let mut outcome = WalkOutcome::default();
        self.visit(ty, &mut outcome)?;
        Ok(outcome)
    }

    fn visit(&self, ty: &TypeRef, outcome: &mut WalkOutcome) -> Result<(), GenerateError> {
        if self.scheduler.contains(ty) {
            return Ok(());
        }

        if ty.is_primitive() || ty.is_text() || self.catalog.is_enum(ty) {
            return Ok(());
        }

        match ty {
            TypeRef::Generic { args, .. } => {
                validate_generic_shape(ty)?;
                self.check_container(ty, outcome)?;
                debug!("Unwrap {}", ty);
                for arg in args {
                    self.visit(arg, outcome)?;
                }
                return Ok(());
            }
            TypeRef::Array(element) => {
                self.check_container(ty, outcome)?;
                debug!("Unwrap {}", ty);
                return self.visit(element, outcome);
            }
            TypeRef::Primitive(_) | TypeRef::Named(_) => {}
        }

        if let Some(handle) = self.registry.get_formatter(ty, self.catalog)? {
            debug!("Skip {}: covered by {} ({})", ty, handle.formatter, handle.provider);
            return Ok(());
        }

        let def = self.catalog.resolve_object(ty)?;
        if !self.scheduler.try_enqueue(ty.clone()) {
            return Ok(());
        }
        outcome.enqueued.push(ty.clone());

        for field in def.serializable_fields() {
            debug!("Recurse {}.{}: {}", def.full_name(), field.name, field.ty);
            self.visit(&field.ty, outcome).map_err(|e| match e {
                GenerateError::Schema(source) => GenerateError::Schema(SchemaError::InvalidField {
                    owner: def.full_name(),
                    field: field.name.clone(),
                    source: Box::new(source),
                }),
                other => other,
            })?;
        }

        Ok(())
    }

    fn check_container(
        &self,
        ty: &TypeRef,
        outcome: &mut WalkOutcome,
    ) -> Result<(), GenerateError> {
        if self.registry.get_formatter(ty, self.catalog)?.is_none() {
            debug!("No provider covers container {}", ty);
            outcome.uncovered_containers.push(ty.clone());
        }
        Ok(())
    }
}
