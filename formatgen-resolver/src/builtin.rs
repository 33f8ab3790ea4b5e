//! Built-in formatter providers.
//!
//! These mirror the fixed resolver stack every generated formatter runs
//! against: primitives and well-known library types first, then engine
//! types, enums, generic containers and attribute-declared formatters.

use crate::error::LookupError;
use crate::resolver::{FormatterHandle, FormatterResolver};
use formatgen_schema::types::strip_arity;
use formatgen_schema::{PrimitiveType, TypeCatalog, TypeRef};

/// Well-known library types with a built-in formatter.
const WELL_KNOWN: &[(&str, &str)] = &[
    ("System.Object", "PrimitiveObjectFormatter"),
    ("System.Decimal", "DecimalFormatter"),
    ("System.DateTime", "ISO8601DateTimeFormatter"),
    ("System.DateTimeOffset", "ISO8601DateTimeOffsetFormatter"),
    ("System.TimeSpan", "ISO8601TimeSpanFormatter"),
    ("System.Guid", "GuidFormatter"),
    ("System.Uri", "UriFormatter"),
    ("System.Version", "VersionFormatter"),
    ("System.Type", "TypeFormatter"),
    ("System.Text.StringBuilder", "StringBuilderFormatter"),
    ("System.Collections.BitArray", "BitArrayFormatter"),
    ("System.Collections.ArrayList", "NonGenericListFormatter"),
    ("System.Collections.Hashtable", "NonGenericDictionaryFormatter"),
];

/// Engine value types covered by the platform provider.
const PLATFORM_TYPES: &[&str] = &[
    "UnityEngine.Vector2",
    "UnityEngine.Vector3",
    "UnityEngine.Vector4",
    "UnityEngine.Quaternion",
    "UnityEngine.Color",
    "UnityEngine.Bounds",
    "UnityEngine.Rect",
];

/// Generic container definitions (arity suffix stripped) the generic
/// provider constructs formatters for.
const GENERIC_CONTAINERS: &[&str] = &[
    "System.Nullable",
    "System.Lazy",
    "System.Tuple",
    "System.ValueTuple",
    "System.ArraySegment",
    "System.Collections.Generic.List",
    "System.Collections.Generic.LinkedList",
    "System.Collections.Generic.Queue",
    "System.Collections.Generic.Stack",
    "System.Collections.Generic.HashSet",
    "System.Collections.Generic.Dictionary",
    "System.Collections.Generic.SortedDictionary",
    "System.Collections.Generic.SortedList",
    "System.Collections.Generic.KeyValuePair",
    "System.Collections.Generic.IEnumerable",
    "System.Collections.Generic.ICollection",
    "System.Collections.Generic.IList",
    "System.Collections.Generic.IDictionary",
    "System.Collections.Generic.ISet",
    "System.Collections.Generic.IReadOnlyCollection",
    "System.Collections.Generic.IReadOnlyList",
    "System.Collections.Generic.IReadOnlyDictionary",
    "System.Collections.ObjectModel.ReadOnlyCollection",
    "System.Collections.ObjectModel.ObservableCollection",
    "System.Collections.ObjectModel.ReadOnlyObservableCollection",
    "System.Collections.Concurrent.ConcurrentBag",
    "System.Collections.Concurrent.ConcurrentQueue",
    "System.Collections.Concurrent.ConcurrentStack",
    "System.Collections.Concurrent.ConcurrentDictionary",
    "System.Linq.ILookup",
    "System.Linq.IGrouping",
];

/// Primitives, text, byte arrays and well-known library types.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinResolver;

impl BuiltinResolver {
    /// Provider name.
    pub const NAME: &'static str = "builtin";

    /// Returns true if `full_name` is a well-known library type.
    #[must_use]
    pub fn is_well_known(full_name: &str) -> bool {
        WELL_KNOWN.iter().any(|(name, _)| *name == full_name)
    }
}

impl FormatterResolver for BuiltinResolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_formatter(
        &self,
        ty: &TypeRef,
        _catalog: &TypeCatalog,
    ) -> Result<Option<FormatterHandle>, LookupError> {
        let formatter = match ty {
            TypeRef::Primitive(PrimitiveType::String) => "NullableStringFormatter".to_string(),
            TypeRef::Primitive(p) => format!("{}Formatter", p.runtime_name()),
            TypeRef::Array(element) if **element == TypeRef::Primitive(PrimitiveType::Byte) => {
                "ByteArrayFormatter".to_string()
            }
            TypeRef::Named(name) => {
                match WELL_KNOWN.iter().find(|(known, _)| *known == name.as_str()) {
                    Some((_, formatter)) => (*formatter).to_string(),
                    None => return Ok(None),
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(FormatterHandle::new(ty.clone(), formatter, Self::NAME)))
    }
}

/// Engine-specific value types.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformResolver;

impl PlatformResolver {
    /// Provider name.
    pub const NAME: &'static str = "platform";

    /// Returns true if `full_name` is an engine type this provider covers.
    #[must_use]
    pub fn is_platform_type(full_name: &str) -> bool {
        PLATFORM_TYPES.contains(&full_name)
    }
}

impl FormatterResolver for PlatformResolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_formatter(
        &self,
        ty: &TypeRef,
        _catalog: &TypeCatalog,
    ) -> Result<Option<FormatterHandle>, LookupError> {
        let covered = ty
            .catalog_name()
            .is_some_and(|name| Self::is_platform_type(name));
        if !covered {
            return Ok(None);
        }
        let formatter = format!("{}Formatter", ty.short_name());
        Ok(Some(FormatterHandle::new(ty.clone(), formatter, Self::NAME)))
    }
}

/// Catalog enums, serialized by name.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumResolver;

impl EnumResolver {
    /// Provider name.
    pub const NAME: &'static str = "enum";
}

impl FormatterResolver for EnumResolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_formatter(
        &self,
        ty: &TypeRef,
        catalog: &TypeCatalog,
    ) -> Result<Option<FormatterHandle>, LookupError> {
        if catalog.is_enum(ty) {
            Ok(Some(FormatterHandle::new(ty.clone(), "EnumFormatter`1", Self::NAME)))
        } else {
            Ok(None)
        }
    }
}

/// Arrays and known generic containers.
///
/// Containers are covered regardless of their arguments; the arguments
/// themselves are looked up when the container formatter runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicGenericResolver;

impl DynamicGenericResolver {
    /// Provider name.
    pub const NAME: &'static str = "dynamic-generic";

    /// Returns true if the generic definition is a known container.
    #[must_use]
    pub fn is_known_container(definition: &str) -> bool {
        GENERIC_CONTAINERS.contains(&strip_arity(definition).as_str())
    }
}

impl FormatterResolver for DynamicGenericResolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_formatter(
        &self,
        ty: &TypeRef,
        _catalog: &TypeCatalog,
    ) -> Result<Option<FormatterHandle>, LookupError> {
        let formatter = match ty {
            TypeRef::Array(_) => "ArrayFormatter`1".to_string(),
            TypeRef::Generic { definition, args } if Self::is_known_container(definition) => {
                let stripped = strip_arity(definition);
                let short = stripped.rsplit('.').next().unwrap_or(&stripped);
                format!("{}Formatter`{}", short.trim_start_matches('I'), args.len())
            }
            _ => return Ok(None),
        };
        Ok(Some(FormatterHandle::new(ty.clone(), formatter, Self::NAME)))
    }
}

/// Types carrying a `[JsonFormatter]` attribute.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttributeFormatterResolver;

impl AttributeFormatterResolver {
    /// Provider name.
    pub const NAME: &'static str = "attribute";
}

impl FormatterResolver for AttributeFormatterResolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_formatter(
        &self,
        ty: &TypeRef,
        catalog: &TypeCatalog,
    ) -> Result<Option<FormatterHandle>, LookupError> {
        Ok(ty
            .catalog_name()
            .and_then(|name| catalog.get_type(name))
            .and_then(|def| def.formatter.as_ref())
            .map(|formatter| FormatterHandle::new(ty.clone(), formatter.as_str(), Self::NAME)))
    }
}
