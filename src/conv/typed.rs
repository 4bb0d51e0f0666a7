//! Association of Micheline type expressions with Rust types
//!
//! Big-map lookups require the Micheline type of the key alongside its
//! value, and contract parameters are typed by annotated `pair` trees.
//! [`Typed`] provides that type statically, so that it never has to be
//! reconstructed by inspecting a value.

use std::collections::{BTreeMap, BTreeSet};

use crate::micheline::{MichelineType, TypePrim};

/// Trait for types with a fixed Micheline type expression
pub trait Typed {
    /// Returns the Micheline type of every value of `Self`
    fn mich_type() -> MichelineType;
}

impl<T: Typed + ?Sized> Typed for &T {
    fn mich_type() -> MichelineType {
        T::mich_type()
    }
}

impl<T: Typed> Typed for Box<T> {
    fn mich_type() -> MichelineType {
        T::mich_type()
    }
}

macro_rules! impl_typed_prim {
    ($($t:ty => $prim:ident),* $(,)?) => {
        $(
            impl Typed for $t {
                fn mich_type() -> MichelineType {
                    MichelineType::prim(TypePrim::$prim)
                }
            }
        )*
    };
}

impl_typed_prim! {
    bool => bool,
    () => unit,
    String => string,
    str => string,
}

impl<T: Typed> Typed for Option<T> {
    fn mich_type() -> MichelineType {
        MichelineType::option(T::mich_type())
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn mich_type() -> MichelineType {
        MichelineType::list(T::mich_type())
    }
}

impl<T: Typed> Typed for BTreeSet<T> {
    fn mich_type() -> MichelineType {
        MichelineType::set(T::mich_type())
    }
}

impl<K: Typed, V: Typed> Typed for BTreeMap<K, V> {
    fn mich_type() -> MichelineType {
        MichelineType::map(K::mich_type(), V::mich_type())
    }
}

impl<A: Typed, B: Typed> Typed for (A, B) {
    fn mich_type() -> MichelineType {
        MichelineType::pair(A::mich_type(), B::mich_type())
    }
}

impl<A: Typed, B: Typed, C: Typed> Typed for (A, B, C) {
    fn mich_type() -> MichelineType {
        MichelineType::Pair {
            args: vec![A::mich_type(), B::mich_type(), C::mich_type()],
            annots: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn container_types() {
        assert_eq!(
            <Option<Vec<bool>>>::mich_type().to_string(),
            "option (list bool)"
        );
        assert_eq!(
            <BTreeMap<String, (bool, ())>>::mich_type().to_string(),
            "map string (pair bool unit)"
        );
        assert_eq!(<(bool, bool, String)>::mich_type().to_string(), "pair bool bool string");
    }
}
