//! Catalog validation utilities.
//!
//! Generated source has to compile, so every reference a field makes must be
//! resolvable and every generic argument list well-formed before emission.

use crate::catalog::TypeCatalog;
use crate::error::SchemaError;
use crate::types::{TypeRef, definition_arity};

/// Validates every field of every type in the catalog.
///
/// `is_external` accepts names that live outside the catalog but are known
/// to some formatter provider (`System.DateTime`, engine types, ...).
///
/// # Errors
/// Returns the first `SchemaError::InvalidField` found.
pub fn validate_catalog(
    catalog: &TypeCatalog,
    is_external: impl Fn(&str) -> bool,
) -> Result<(), SchemaError> {
    let known = |name: &str| catalog.has_type(name) || is_external(name);
    for type_def in catalog.types() {
        for field in &type_def.fields {
            validate_shape(&field.ty, &known).map_err(|source| SchemaError::InvalidField {
                owner: type_def.full_name(),
                field: field.name.clone(),
                source: Box::new(source),
            })?;
        }
    }
    Ok(())
}

/// Validates generic argument lists only, ignoring whether names resolve.
///
/// # Errors
/// Returns `SchemaError::MalformedGeneric`.
pub fn validate_generic_shape(ty: &TypeRef) -> Result<(), SchemaError> {
    validate_shape(ty, &|_| true)
}

fn validate_shape(ty: &TypeRef, known: &dyn Fn(&str) -> bool) -> Result<(), SchemaError> {
    match ty {
        TypeRef::Primitive(_) => Ok(()),
        TypeRef::Named(name) => {
            if known(name) {
                Ok(())
            } else {
                Err(SchemaError::unknown_type(name.as_str()))
            }
        }
        TypeRef::Generic { definition, args } => {
            if args.is_empty() {
                return Err(SchemaError::malformed_generic(
                    definition.as_str(),
                    "no type arguments",
                ));
            }
            if let Some(arity) = definition_arity(definition) {
                if arity != args.len() {
                    return Err(SchemaError::malformed_generic(
                        definition.as_str(),
                        format!("declares {} type arguments, got {}", arity, args.len()),
                    ));
                }
            }
            args.iter().try_for_each(|arg| validate_shape(arg, known))
        }
        TypeRef::Array(element) => validate_shape(element, known),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDef, PrimitiveType, TypeDef};

    #[test]
    fn test_valid_catalog() {
        let catalog = TypeCatalog::new()
            .with_type(
                TypeDef::class("Player", "Game")
                    .with_field(FieldDef::new("id", PrimitiveType::Int32))
                    .with_field(FieldDef::new(
                        "friends",
                        TypeRef::list(TypeRef::named("Game.Player")),
                    )),
            )
            .unwrap();
        assert!(validate_catalog(&catalog, |_| false).is_ok());
    }

    #[test]
    fn test_unknown_field_type() {
        let catalog = TypeCatalog::new()
            .with_type(
                TypeDef::class("Player", "Game")
                    .with_field(FieldDef::new("pet", TypeRef::named("Game.Pet"))),
            )
            .unwrap();
        let err = validate_catalog(&catalog, |_| false).unwrap_err();
        match err {
            SchemaError::InvalidField { owner, field, source } => {
                assert_eq!(owner, "Game.Player");
                assert_eq!(field, "pet");
                assert!(matches!(*source, SchemaError::UnknownType { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(validate_catalog(&catalog, |name| name == "Game.Pet").is_ok());
    }

    #[test]
    fn test_malformed_generics() {
        let empty = TypeRef::generic("Box`1", Vec::new());
        assert!(matches!(
            validate_generic_shape(&empty),
            Err(SchemaError::MalformedGeneric { .. })
        ));

        let wrong_arity = TypeRef::generic("Dictionary`2", vec![TypeRef::string()]);
        assert!(matches!(
            validate_generic_shape(&wrong_arity),
            Err(SchemaError::MalformedGeneric { .. })
        ));

        let nested = TypeRef::list(TypeRef::generic("Pair`2", vec![TypeRef::string()]));
        assert!(validate_generic_shape(&nested).is_err());

        let no_suffix = TypeRef::generic("Map", vec![TypeRef::string(), TypeRef::string()]);
        assert!(validate_generic_shape(&no_suffix).is_ok());
    }
}
