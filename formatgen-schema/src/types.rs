//! Type model definitions.
//!
//! This module contains the structural metadata that stands in for runtime
//! reflection: primitive types, type references as written in field
//! declarations, and the named type definitions held by a catalog.

use std::fmt;

/// Primitive and text types known to every formatter resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Boolean.
    Boolean,
    /// UTF-16 code unit.
    Char,
    /// Signed 8-bit integer.
    SByte,
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// 32-bit floating point.
    Single,
    /// 64-bit floating point.
    Double,
    /// Text string.
    String,
}

impl PrimitiveType {
    /// Every primitive type, in type-code order.
    pub const ALL: [Self; 13] = [
        Self::Boolean,
        Self::Char,
        Self::SByte,
        Self::Byte,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Single,
        Self::Double,
        Self::String,
    ];

    /// Returns the runtime (un-aliased) short name.
    #[must_use]
    pub const fn runtime_name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Char => "Char",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Single => "Single",
            Self::Double => "Double",
            Self::String => "String",
        }
    }

    /// Returns the runtime fully-qualified name.
    #[must_use]
    pub const fn full_name(&self) -> &'static str {
        match self {
            Self::Boolean => "System.Boolean",
            Self::Char => "System.Char",
            Self::SByte => "System.SByte",
            Self::Byte => "System.Byte",
            Self::Int16 => "System.Int16",
            Self::UInt16 => "System.UInt16",
            Self::Int32 => "System.Int32",
            Self::UInt32 => "System.UInt32",
            Self::Int64 => "System.Int64",
            Self::UInt64 => "System.UInt64",
            Self::Single => "System.Single",
            Self::Double => "System.Double",
            Self::String => "System.String",
        }
    }

    /// Returns the canonical language alias, if the alias table has one.
    ///
    /// `Char` has no entry and renders by its full name.
    #[must_use]
    pub const fn alias(&self) -> Option<&'static str> {
        match self {
            Self::Boolean => Some("bool"),
            Self::Char => None,
            Self::SByte => Some("sbyte"),
            Self::Byte => Some("byte"),
            Self::Int16 => Some("short"),
            Self::UInt16 => Some("ushort"),
            Self::Int32 => Some("int"),
            Self::UInt32 => Some("uint"),
            Self::Int64 => Some("long"),
            Self::UInt64 => Some("ulong"),
            Self::Single => Some("float"),
            Self::Double => Some("double"),
            Self::String => Some("string"),
        }
    }

    /// Parses a primitive from its alias, runtime name or full name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let short = name.strip_prefix("System.").unwrap_or(name);
        Self::ALL.into_iter().find(|p| {
            p.runtime_name() == short
                || p.alias() == Some(name)
                || (name == "char" && *p == Self::Char)
        })
    }

    /// Returns true for the text string type.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::String)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

/// A reference to a type as it appears in a field declaration.
///
/// This is the identity used by the pending set and by formatter lookups;
/// two references denote the same type iff they are structurally equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Primitive or text type.
    Primitive(PrimitiveType),
    /// Named type resolved through the catalog (class, struct or enum).
    Named(String),
    /// Constructed generic type.
    Generic {
        /// Full name of the open generic, optionally with an arity suffix (`` List`1 ``).
        definition: String,
        /// Type arguments in declaration order.
        args: Vec<TypeRef>,
    },
    /// Single-dimension array.
    Array(Box<TypeRef>),
}

impl TypeRef {
    /// Creates a named type reference.
    #[must_use]
    pub fn named(full_name: impl Into<String>) -> Self {
        Self::Named(full_name.into())
    }

    /// Creates a constructed generic reference.
    #[must_use]
    pub fn generic(definition: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Generic {
            definition: definition.into(),
            args,
        }
    }

    /// Creates an array reference.
    #[must_use]
    pub fn array(element: TypeRef) -> Self {
        Self::Array(Box::new(element))
    }

    /// Creates a `System.Collections.Generic.List<T>` reference.
    #[must_use]
    pub fn list(element: TypeRef) -> Self {
        Self::generic("System.Collections.Generic.List`1", vec![element])
    }

    /// Creates a `System.Collections.Generic.Dictionary<K, V>` reference.
    #[must_use]
    pub fn dictionary(key: TypeRef, value: TypeRef) -> Self {
        Self::generic("System.Collections.Generic.Dictionary`2", vec![key, value])
    }

    /// Shorthand for `TypeRef::Primitive(PrimitiveType::String)`.
    #[must_use]
    pub const fn string() -> Self {
        Self::Primitive(PrimitiveType::String)
    }

    /// Returns the generic arguments, empty for non-generic types.
    #[must_use]
    pub fn generic_args(&self) -> &[TypeRef] {
        match self {
            Self::Generic { args, .. } => args,
            _ => &[],
        }
    }

    /// Returns the element type of an array.
    #[must_use]
    pub fn element_type(&self) -> Option<&TypeRef> {
        match self {
            Self::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Returns true for primitives other than the text type.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(p) if !p.is_text())
    }

    /// Returns true for the text string type.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Primitive(p) if p.is_text())
    }

    /// Returns the catalog name of a named reference.
    #[must_use]
    pub fn catalog_name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the un-aliased short name (`Int32`, `` List`1 ``, `Foo[]`).
    #[must_use]
    pub fn short_name(&self) -> String {
        match self {
            Self::Primitive(p) => p.runtime_name().to_string(),
            Self::Named(name) => last_segment(name).to_string(),
            Self::Generic { definition, .. } => last_segment(definition).to_string(),
            Self::Array(element) => format!("{}[]", element.short_name()),
        }
    }
}

impl fmt::Display for TypeRef {
    /// Renders in the manifest type-expression syntax, which parses back to an equal reference.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Named(name) => f.write_str(name),
            Self::Generic { definition, args } => {
                write!(f, "{definition}[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str("]")
            }
            Self::Array(element) => write!(f, "{element}[]"),
        }
    }
}

impl From<PrimitiveType> for TypeRef {
    fn from(value: PrimitiveType) -> Self {
        Self::Primitive(value)
    }
}

/// Returns the generic definition name with every arity suffix removed.
///
/// Nested segments are kept: `` Ns.Outer`1+Inner `` becomes `Ns.Outer+Inner`.
#[must_use]
pub fn strip_arity(definition: &str) -> String {
    let mut stripped = String::with_capacity(definition.len());
    let mut chars = definition.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '`' {
            while chars.peek().is_some_and(|d| d.is_ascii_digit()) {
                chars.next();
            }
        } else {
            stripped.push(c);
        }
    }
    stripped
}

/// Returns the declared arity of a generic definition (`` List`1 `` -> 1).
///
/// Nested generic definitions carry the arity of every level, so
/// `` Outer`1+Inner`2 `` declares 3 arguments. Returns `None` when no
/// suffix is present or a suffix is not numeric.
#[must_use]
pub fn definition_arity(definition: &str) -> Option<usize> {
    let mut total = None;
    for suffix in definition.split('`').skip(1) {
        let digits: String = suffix.chars().take_while(char::is_ascii_digit).collect();
        let arity: usize = digits.parse().ok()?;
        total = Some(total.unwrap_or(0) + arity);
    }
    total
}

fn last_segment(name: &str) -> &str {
    name.rsplit(['.', '+']).next().unwrap_or(name)
}

/// Structural kind of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeKind {
    /// Reference type.
    #[default]
    Class,
    /// Value type.
    Struct,
    /// Enumeration.
    Enum,
}

impl TypeKind {
    /// Parses a kind from its manifest spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "class" => Some(Self::Class),
            "struct" => Some(Self::Struct),
            "enum" => Some(Self::Enum),
            _ => None,
        }
    }
}

/// A named type held by the catalog.
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Simple name.
    pub name: String,
    /// Namespace (empty for the global namespace).
    pub namespace: String,
    /// Enclosing type chain for nested types (`Outer` or `Outer+Middle`).
    pub declaring_type: Option<String>,
    /// Structural kind.
    pub kind: TypeKind,
    /// Whether a parameterless constructor can be synthesized.
    pub has_default_constructor: bool,
    /// Formatter named by a `[JsonFormatter]` attribute.
    pub formatter: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDef>,
}

impl TypeDef {
    /// Creates a new type definition with no fields.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            declaring_type: None,
            kind,
            has_default_constructor: kind != TypeKind::Enum,
            formatter: None,
            fields: Vec::new(),
        }
    }

    /// Creates a class definition.
    #[must_use]
    pub fn class(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::new(name, namespace, TypeKind::Class)
    }

    /// Creates a struct definition.
    #[must_use]
    pub fn structure(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::new(name, namespace, TypeKind::Struct)
    }

    /// Creates an enum definition.
    #[must_use]
    pub fn enumeration(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::new(name, namespace, TypeKind::Enum)
    }

    /// Appends a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Marks the type as nested inside `declaring_type`.
    #[must_use]
    pub fn nested_in(mut self, declaring_type: impl Into<String>) -> Self {
        self.declaring_type = Some(declaring_type.into());
        self
    }

    /// Attaches a `[JsonFormatter]` attribute.
    #[must_use]
    pub fn with_formatter(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    /// Returns the runtime full name (`Ns.Outer+Inner`).
    #[must_use]
    pub fn full_name(&self) -> String {
        let mut full = String::new();
        if !self.namespace.is_empty() {
            full.push_str(&self.namespace);
            full.push('.');
        }
        if let Some(outer) = &self.declaring_type {
            full.push_str(outer);
            full.push('+');
        }
        full.push_str(&self.name);
        full
    }

    /// Returns a reference to this type.
    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::Named(self.full_name())
    }

    /// Returns true for reference types.
    #[must_use]
    pub const fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class)
    }

    /// Returns true for enumerations.
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum)
    }

    /// Returns the fields that take part in serialization.
    pub fn serializable_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_serializable())
    }
}

/// A field declared on a named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Declared type.
    pub ty: TypeRef,
    /// Static (type-level) field.
    pub is_static: bool,
    /// Publicly visible.
    pub is_public: bool,
    /// Carries `[IgnoreDataMember]`.
    pub ignore_data_member: bool,
    /// Carries `[NonSerialized]`.
    pub non_serialized: bool,
}

impl FieldDef {
    /// Creates a public instance field.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            is_static: false,
            is_public: true,
            ignore_data_member: false,
            non_serialized: false,
        }
    }

    /// Marks the field static.
    #[must_use]
    pub fn mark_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Marks the field non-public.
    #[must_use]
    pub fn mark_private(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Marks the field `[IgnoreDataMember]`.
    #[must_use]
    pub fn mark_ignored(mut self) -> Self {
        self.ignore_data_member = true;
        self
    }

    /// Marks the field `[NonSerialized]`.
    #[must_use]
    pub fn mark_non_serialized(mut self) -> Self {
        self.non_serialized = true;
        self
    }

    /// Field filter shared by the dependency walk and the member extraction.
    ///
    /// Both sides must agree, otherwise generated code would reference fields
    /// the walk never checked.
    #[must_use]
    pub const fn is_serializable(&self) -> bool {
        self.is_public && !self.is_static && !self.ignore_data_member && !self.non_serialized
    }
}
