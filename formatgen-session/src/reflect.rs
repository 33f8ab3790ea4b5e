//! Mapping from Rust types to catalog type references.

use formatgen_schema::{PrimitiveType, TypeRef};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A Rust type that stands for a catalog type.
///
/// Implemented for the primitives, `String` and the standard containers;
/// implement it for marker types to request generation by type:
///
/// ```
/// use formatgen_schema::TypeRef;
/// use formatgen_session::Reflected;
///
/// struct Player;
///
/// impl Reflected for Player {
///     fn type_ref() -> TypeRef {
///         TypeRef::named("Game.Player")
///     }
/// }
///
/// assert_eq!(<Vec<Player>>::type_ref().to_string(), "System.Collections.Generic.List`1[Game.Player]");
/// ```
pub trait Reflected {
    /// Returns the catalog reference for this type.
    fn type_ref() -> TypeRef;
}

macro_rules! impl_reflected_primitive {
    ($($ty:ty => $primitive:ident),* $(,)?) => {
        $(
            impl Reflected for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::Primitive(PrimitiveType::$primitive)
                }
            }
        )*
    };
}

impl_reflected_primitive! {
    bool => Boolean,
    char => Char,
    i8 => SByte,
    u8 => Byte,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Single,
    f64 => Double,
    String => String,
    &str => String,
}

impl<T: Reflected> Reflected for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::list(T::type_ref())
    }
}

impl<T: Reflected, const N: usize> Reflected for [T; N] {
    fn type_ref() -> TypeRef {
        TypeRef::array(T::type_ref())
    }
}

impl<T: Reflected> Reflected for Box<[T]> {
    fn type_ref() -> TypeRef {
        TypeRef::array(T::type_ref())
    }
}

impl<T: Reflected> Reflected for Option<T> {
    fn type_ref() -> TypeRef {
        TypeRef::generic("System.Nullable`1", vec![T::type_ref()])
    }
}

impl<T: Reflected> Reflected for HashSet<T> {
    fn type_ref() -> TypeRef {
        TypeRef::generic("System.Collections.Generic.HashSet`1", vec![T::type_ref()])
    }
}

impl<K: Reflected, V: Reflected> Reflected for HashMap<K, V> {
    fn type_ref() -> TypeRef {
        TypeRef::dictionary(K::type_ref(), V::type_ref())
    }
}

impl<K: Reflected, V: Reflected> Reflected for BTreeMap<K, V> {
    fn type_ref() -> TypeRef {
        TypeRef::generic(
            "System.Collections.Generic.SortedDictionary`2",
            vec![K::type_ref(), V::type_ref()],
        )
    }
}
