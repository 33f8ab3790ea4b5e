//! Type catalog.
//!
//! The catalog replaces runtime reflection: it is the single place the
//! generator asks "what kind of type is this, and what are its fields".

use crate::error::SchemaError;
use crate::types::{TypeDef, TypeRef};
use std::collections::HashMap;

/// Immutable registry of named type definitions.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: Vec<TypeDef>,
    type_map: HashMap<String, usize>,
}

impl TypeCatalog {
    /// Creates a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type definition.
    ///
    /// # Errors
    /// Returns `SchemaError::DuplicateDefinition` if the full name is taken.
    pub fn add_type(&mut self, type_def: TypeDef) -> Result<(), SchemaError> {
        let name = type_def.full_name();
        if self.type_map.contains_key(&name) {
            return Err(SchemaError::DuplicateDefinition { name });
        }
        self.type_map.insert(name, self.types.len());
        self.types.push(type_def);
        Ok(())
    }

    /// Adds a type definition, builder style.
    ///
    /// # Errors
    /// Returns `SchemaError::DuplicateDefinition` if the full name is taken.
    pub fn with_type(mut self, type_def: TypeDef) -> Result<Self, SchemaError> {
        self.add_type(type_def)?;
        Ok(self)
    }

    /// Looks up a type by full name.
    #[must_use]
    pub fn get_type(&self, full_name: &str) -> Option<&TypeDef> {
        self.type_map.get(full_name).map(|&idx| &self.types[idx])
    }

    /// Returns true if a type with the given full name exists.
    #[must_use]
    pub fn has_type(&self, full_name: &str) -> bool {
        self.type_map.contains_key(full_name)
    }

    /// Resolves a named reference to its definition.
    ///
    /// # Errors
    /// Returns `SchemaError::UnknownType` for names the catalog does not hold,
    /// and for references that are not named types at all.
    pub fn resolve(&self, ty: &TypeRef) -> Result<&TypeDef, SchemaError> {
        match ty {
            TypeRef::Named(name) => self
                .get_type(name)
                .ok_or_else(|| SchemaError::unknown_type(name.as_str())),
            other => Err(SchemaError::unknown_type(other.to_string())),
        }
    }

    /// Resolves a reference to a class or struct definition.
    ///
    /// # Errors
    /// Returns `SchemaError::UnknownType` or `SchemaError::NotAnObjectType`.
    pub fn resolve_object(&self, ty: &TypeRef) -> Result<&TypeDef, SchemaError> {
        let def = self.resolve(ty)?;
        if def.is_enum() {
            return Err(SchemaError::NotAnObjectType {
                name: def.full_name(),
            });
        }
        Ok(def)
    }

    /// Returns true if the reference names a catalog enum.
    #[must_use]
    pub fn is_enum(&self, ty: &TypeRef) -> bool {
        ty.catalog_name()
            .and_then(|name| self.get_type(name))
            .is_some_and(TypeDef::is_enum)
    }

    /// Iterates over definitions in insertion order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter()
    }

    /// Returns the number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the catalog holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDef, PrimitiveType};

    fn sample() -> TypeCatalog {
        TypeCatalog::new()
            .with_type(
                TypeDef::class("Player", "Game")
                    .with_field(FieldDef::new("id", PrimitiveType::Int32)),
            )
            .and_then(|c| c.with_type(TypeDef::enumeration("Color", "Game")))
            .expect("valid catalog")
    }

    #[test]
    fn test_lookup() {
        let catalog = sample();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.has_type("Game.Player"));
        assert!(!catalog.has_type("Player"));
        assert_eq!(catalog.get_type("Game.Player").unwrap().fields.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut catalog = sample();
        let err = catalog.add_type(TypeDef::class("Player", "Game")).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateDefinition { name } if name == "Game.Player"));
    }

    #[test]
    fn test_resolve() {
        let catalog = sample();
        assert!(catalog.resolve(&TypeRef::named("Game.Player")).is_ok());
        assert!(matches!(
            catalog.resolve(&TypeRef::named("Game.Missing")),
            Err(SchemaError::UnknownType { .. })
        ));
        assert!(matches!(
            catalog.resolve_object(&TypeRef::named("Game.Color")),
            Err(SchemaError::NotAnObjectType { .. })
        ));
    }

    #[test]
    fn test_is_enum() {
        let catalog = sample();
        assert!(catalog.is_enum(&TypeRef::named("Game.Color")));
        assert!(!catalog.is_enum(&TypeRef::named("Game.Player")));
        assert!(!catalog.is_enum(&TypeRef::named("Game.Missing")));
        assert!(!catalog.is_enum(&TypeRef::string()));
    }
}
