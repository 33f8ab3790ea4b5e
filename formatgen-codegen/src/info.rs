//! Serialization metadata extracted from catalog types.
//!
//! The builder turns a catalog class or struct into the descriptor the
//! formatter template renders. Member selection goes through
//! [`FieldDef::is_serializable`], the same filter the dependency walker
//! recurses with, so every member emitted here has been walked.

use crate::error::CodegenError;
use formatgen_schema::types::strip_arity;
use formatgen_schema::{FieldDef, TypeCatalog, TypeRef, validate_generic_shape};

/// Labels written and read with direct `JsonWriter`/`JsonReader` calls.
const PRIMITIVE_LABELS: &[&str] = &[
    "bool", "byte", "sbyte", "short", "ushort", "int", "uint", "long", "ulong", "float", "double",
    "string",
];

/// One serializable member of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSerializationInfo {
    /// Declared as a field (always true, properties are not modelled).
    pub is_field: bool,
    /// Can be read when serializing.
    pub is_readable: bool,
    /// Can be assigned when deserializing.
    pub is_writable: bool,
    /// JSON property name.
    pub name: String,
    /// Member name in the declaring type.
    pub member_name: String,
    /// Type as referenced from generated code (`int`, `List<Foo>`, `Ns.Foo`).
    pub type_label: String,
    /// Un-aliased runtime short name (`Int32`, `` List`1 ``).
    pub short_type_name: String,
}

impl MemberSerializationInfo {
    /// Describes a field.
    #[must_use]
    pub fn from_field(field: &FieldDef) -> Self {
        Self {
            is_field: true,
            is_readable: true,
            is_writable: true,
            name: field.name.clone(),
            member_name: field.name.clone(),
            type_label: resolve_label(&field.ty),
            short_type_name: field.ty.short_name(),
        }
    }

    /// Returns true if the member is written with a direct writer call.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        PRIMITIVE_LABELS.contains(&self.type_label.as_str())
    }

    /// Returns the statement serializing this member from `value`.
    #[must_use]
    pub fn serialize_call(&self) -> String {
        if self.is_primitive() {
            format!("writer.Write{}(value.{})", self.short_type_name, self.member_name)
        } else {
            format!(
                "formatterResolver.GetFormatterWithVerify<{}>().Serialize(ref writer, value.{}, formatterResolver)",
                self.type_label, self.member_name
            )
        }
    }

    /// Returns the expression reading this member from `reader`.
    #[must_use]
    pub fn deserialize_call(&self) -> String {
        if self.is_primitive() {
            format!("reader.Read{}()", self.short_type_name)
        } else {
            format!(
                "formatterResolver.GetFormatterWithVerify<{}>().Deserialize(ref reader, formatterResolver)",
                self.type_label
            )
        }
    }
}

/// Type-level descriptor of a formatter target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSerializationInfo {
    /// Simple name.
    pub name: String,
    /// Runtime full name (`Ns.Outer+Inner`).
    pub full_name: String,
    /// Namespace, empty for the global namespace.
    pub namespace: String,
    /// Reference type (true) or value type (false).
    pub is_class: bool,
    /// A parameterless constructor is available.
    pub has_constructor: bool,
    /// Constructor parameters, empty when none are modelled.
    pub constructor_parameters: Vec<MemberSerializationInfo>,
    /// Serializable members in declaration order.
    pub members: Vec<MemberSerializationInfo>,
}

impl ObjectSerializationInfo {
    /// Returns the generated formatter class name.
    #[must_use]
    pub fn formatter_name(&self) -> String {
        format!("{}Formatter", self.name)
    }

    /// Returns the fully-qualified name usable from generated code.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("global::{}", self.full_name.replace('+', "."))
    }

    /// Returns the type reference the formatter was generated for.
    #[must_use]
    pub fn target(&self) -> TypeRef {
        TypeRef::named(self.full_name.as_str())
    }
}

/// Builds serialization descriptors from a catalog.
pub struct SerializationInfoBuilder<'a> {
    catalog: &'a TypeCatalog,
}

impl<'a> SerializationInfoBuilder<'a> {
    /// Creates a new builder over `catalog`.
    #[must_use]
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self { catalog }
    }

    /// Describes a catalog class or struct.
    ///
    /// # Errors
    /// Returns `CodegenError::Schema` if `ty` is not a catalog class or
    /// struct, or one of its member types has a malformed generic argument
    /// list.
    pub fn describe(&self, ty: &TypeRef) -> Result<ObjectSerializationInfo, CodegenError> {
        let def = self.catalog.resolve_object(ty)?;

        let mut members = Vec::new();
        for field in def.serializable_fields() {
            validate_generic_shape(&field.ty)?;
            members.push(MemberSerializationInfo::from_field(field));
        }

        Ok(ObjectSerializationInfo {
            name: def.name.clone(),
            full_name: def.full_name(),
            namespace: def.namespace.clone(),
            is_class: def.is_class(),
            has_constructor: def.has_default_constructor,
            constructor_parameters: Vec::new(),
            members,
        })
    }
}

/// Renders a type reference the way generated code refers to it.
///
/// Primitives map to their language alias, generics render as
/// `Outer<Arg1,Arg2>` with arguments resolved recursively, arrays as
/// `Element[]`, and everything else as the full name with nested-type
/// separators normalized to dots.
#[must_use]
pub fn resolve_label(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Primitive(p) => p
            .alias()
            .map_or_else(|| p.full_name().to_string(), str::to_string),
        TypeRef::Named(name) => name.replace('+', "."),
        TypeRef::Generic { definition, args } => {
            let args: Vec<String> = args.iter().map(resolve_label).collect();
            format!("{}<{}>", strip_arity(definition).replace('+', "."), args.join(","))
        }
        TypeRef::Array(element) => format!("{}[]", resolve_label(element)),
    }
}
