use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ReflectError;
use crate::primitive::{Primitive, PrimitiveMut};
use crate::reflect::{Map, Pointer, Reflect, ReflectMut, ReflectRef, Seq, downcast_boxed};

// ═══════════════════════════════════════════════════════════════
//  Scalars
// ═══════════════════════════════════════════════════════════════

macro_rules! impl_reflect_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl Reflect for $ty {
            fn zero() -> Self {
                <$ty>::default()
            }

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Primitive(Primitive::$variant(*self))
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Primitive(PrimitiveMut::$variant(self))
            }
        }
    )*};
}

impl_reflect_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
}

impl Reflect for String {
    fn zero() -> Self {
        String::new()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::String(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::String(self)
    }
}

impl Reflect for Duration {
    fn zero() -> Self {
        Duration::ZERO
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Duration(*self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Duration(self)
    }
}

/// Implement [`Reflect`] for a leaf type the engines should not look into.
///
/// The type must be `Clone` so same-type values can be assigned. Its zero
/// value is `Default::default()` unless one is given after `=`. With
/// `from_str` the type also gets a [`TextParsable`](crate::TextParsable)
/// hook built from its `FromStr` impl; adding `display` reports its
/// `Display` form when it is used as a map key.
///
/// ```ignore
/// refl::impl_reflect_opaque!(Level, from_str, display);
/// refl::impl_reflect_opaque!(Endpoint = Endpoint::unset(), from_str);
/// ```
#[macro_export]
macro_rules! impl_reflect_opaque {
    (@zero) => {
        ::std::default::Default::default()
    };
    (@zero $zero:expr) => {
        $zero
    };
    (@common $ty:ty $(, $zero:expr)?) => {
        fn zero() -> Self {
            $crate::impl_reflect_opaque!(@zero $($zero)?)
        }

        fn reflect_ref(&self) -> $crate::ReflectRef<'_> {
            $crate::ReflectRef::Opaque(self)
        }

        fn reflect_mut(&mut self) -> $crate::ReflectMut<'_> {
            $crate::ReflectMut::Opaque(self)
        }

        fn copy_from(&mut self, src: &dyn $crate::Reflect) -> bool {
            match $crate::AsAny::as_any(src).downcast_ref::<$ty>() {
                ::std::option::Option::Some(value) => {
                    *self = ::std::clone::Clone::clone(value);
                    true
                }
                ::std::option::Option::None => false,
            }
        }
    };
    (@hook) => {
        fn text_hook(&mut self) -> ::std::option::Option<&mut dyn $crate::TextParsable> {
            ::std::option::Option::Some(self)
        }
    };
    (@from_str $ty:ty) => {
        impl $crate::TextParsable for $ty {
            fn parse_text(&mut self, text: &str) -> ::std::result::Result<(), $crate::BoxError> {
                *self = text.parse::<$ty>().map_err($crate::BoxError::from)?;
                ::std::result::Result::Ok(())
            }
        }
    };
    ($ty:ty $(= $zero:expr)?) => {
        impl $crate::Reflect for $ty {
            $crate::impl_reflect_opaque!(@common $ty $(, $zero)?);
        }
    };
    ($ty:ty $(= $zero:expr)?, from_str) => {
        impl $crate::Reflect for $ty {
            $crate::impl_reflect_opaque!(@common $ty $(, $zero)?);
            $crate::impl_reflect_opaque!(@hook);
        }
        $crate::impl_reflect_opaque!(@from_str $ty);
    };
    ($ty:ty $(= $zero:expr)?, from_str, display) => {
        impl $crate::Reflect for $ty {
            $crate::impl_reflect_opaque!(@common $ty $(, $zero)?);
            $crate::impl_reflect_opaque!(@hook);

            fn display_text(&self) -> ::std::option::Option<::std::string::String> {
                ::std::option::Option::Some(::std::string::ToString::to_string(self))
            }
        }
        $crate::impl_reflect_opaque!(@from_str $ty);
    };
}

impl_reflect_opaque!(char, from_str, display);
impl_reflect_opaque!(IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED), from_str, display);
impl_reflect_opaque!(Ipv4Addr = Ipv4Addr::UNSPECIFIED, from_str, display);
impl_reflect_opaque!(Ipv6Addr = Ipv6Addr::UNSPECIFIED, from_str, display);
impl_reflect_opaque!(SocketAddr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)), from_str, display);
impl_reflect_opaque!(PathBuf, from_str);

// ═══════════════════════════════════════════════════════════════
//  Sequences
// ═══════════════════════════════════════════════════════════════

impl<T: Reflect> Reflect for Vec<T> {
    fn zero() -> Self {
        Vec::new()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Seq(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Seq(self)
    }
}

impl<T: Reflect> Seq for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        <[T]>::get(self, index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        <[T]>::get_mut(self, index).map(|v| v as &mut dyn Reflect)
    }

    fn new_element(&self) -> Box<dyn Reflect> {
        Box::new(T::zero())
    }

    fn set_elements(&mut self, elements: Vec<Box<dyn Reflect>>) -> Result<(), ReflectError> {
        let items = downcast_all::<T>(elements)?;
        *self = items;
        Ok(())
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn zero() -> Self {
        std::array::from_fn(|_| T::zero())
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Seq(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Seq(self)
    }
}

impl<T: Reflect, const N: usize> Seq for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        <[T]>::get(self, index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        <[T]>::get_mut(self, index).map(|v| v as &mut dyn Reflect)
    }

    fn new_element(&self) -> Box<dyn Reflect> {
        Box::new(T::zero())
    }

    fn set_elements(&mut self, elements: Vec<Box<dyn Reflect>>) -> Result<(), ReflectError> {
        let length_mismatch = |actual| ReflectError::LengthMismatch {
            dst_type: type_name::<[T; N]>(),
            expected: N,
            actual,
        };
        if elements.len() != N {
            return Err(length_mismatch(elements.len()));
        }
        let items = downcast_all::<T>(elements)?;
        *self = <[T; N]>::try_from(items).map_err(|v| length_mismatch(v.len()))?;
        Ok(())
    }
}

fn downcast_all<T: Reflect>(elements: Vec<Box<dyn Reflect>>) -> Result<Vec<T>, ReflectError> {
    elements
        .into_iter()
        .map(|e| downcast_boxed::<T>(e, type_name::<T>()))
        .collect()
}

// ═══════════════════════════════════════════════════════════════
//  Maps
// ═══════════════════════════════════════════════════════════════

macro_rules! impl_reflect_map {
    ($map:ident, $($key_bound:path),+) => {
        impl<K, V> Reflect for $map<K, V>
        where
            K: Reflect $(+ $key_bound)+,
            V: Reflect,
        {
            fn zero() -> Self {
                $map::new()
            }

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Map(self)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Map(self)
            }
        }

        impl<K, V> Map for $map<K, V>
        where
            K: Reflect $(+ $key_bound)+,
            V: Reflect,
        {
            fn len(&self) -> usize {
                $map::len(self)
            }

            fn entries(&self) -> Vec<(&dyn Reflect, &dyn Reflect)> {
                self.iter()
                    .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect))
                    .collect()
            }

            fn entries_mut(&mut self) -> Vec<(&dyn Reflect, &mut dyn Reflect)> {
                self.iter_mut()
                    .map(|(k, v)| (k as &dyn Reflect, v as &mut dyn Reflect))
                    .collect()
            }

            fn new_key(&self) -> Box<dyn Reflect> {
                Box::new(K::zero())
            }

            fn new_value(&self) -> Box<dyn Reflect> {
                Box::new(V::zero())
            }

            fn set_entries(
                &mut self,
                entries: Vec<(Box<dyn Reflect>, Box<dyn Reflect>)>,
            ) -> Result<(), ReflectError> {
                let mut map = $map::new();
                for (key, value) in entries {
                    let key = downcast_boxed::<K>(key, type_name::<K>())?;
                    let value = downcast_boxed::<V>(value, type_name::<V>())?;
                    map.insert(key, value);
                }
                *self = map;
                Ok(())
            }
        }
    };
}

impl_reflect_map!(HashMap, Eq, Hash);
impl_reflect_map!(BTreeMap, Ord);

// ═══════════════════════════════════════════════════════════════
//  Pointers
// ═══════════════════════════════════════════════════════════════

impl<T: Reflect> Reflect for Option<T> {
    fn zero() -> Self {
        None
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }
}

impl<T: Reflect> Pointer for Option<T> {
    fn is_nil(&self) -> bool {
        self.is_none()
    }

    fn elem(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|v| v as &dyn Reflect)
    }

    fn elem_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|v| v as &mut dyn Reflect)
    }

    fn new_elem(&self) -> Box<dyn Reflect> {
        Box::new(T::zero())
    }

    fn bind(&mut self, elem: Box<dyn Reflect>) -> Result<(), ReflectError> {
        *self = Some(downcast_boxed::<T>(elem, type_name::<T>())?);
        Ok(())
    }

    fn set_nil(&mut self) -> Result<(), ReflectError> {
        *self = None;
        Ok(())
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn zero() -> Self {
        Box::new(T::zero())
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }
}

impl<T: Reflect> Pointer for Box<T> {
    fn is_nil(&self) -> bool {
        false
    }

    fn elem(&self) -> Option<&dyn Reflect> {
        Some(&**self)
    }

    fn elem_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(&mut **self)
    }

    fn new_elem(&self) -> Box<dyn Reflect> {
        Box::new(T::zero())
    }

    fn bind(&mut self, elem: Box<dyn Reflect>) -> Result<(), ReflectError> {
        **self = downcast_boxed::<T>(elem, type_name::<T>())?;
        Ok(())
    }

    fn set_nil(&mut self) -> Result<(), ReflectError> {
        Err(ReflectError::incompatible("nil", type_name::<Box<T>>()))
    }
}
