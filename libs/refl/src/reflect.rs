use std::any::Any;
use std::fmt;
use std::time::Duration;

use crate::error::ReflectError;
use crate::field::Field;
use crate::primitive::{Primitive, PrimitiveMut};
use crate::text::{SharedTextParsable, TextParsable};

/// Structural category of a reflected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    /// `std::time::Duration`, parsed with duration literal syntax.
    Duration,
    Struct,
    /// `Vec<T>` and `[T; N]`.
    Seq,
    Map,
    /// `Option<T>` (nullable) and `Box<T>` (never nil).
    Pointer,
    /// Leaf with no inner structure the engines can see.
    Opaque,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Duration => "duration",
            Kind::Struct => "struct",
            Kind::Seq => "seq",
            Kind::Map => "map",
            Kind::Pointer => "pointer",
            Kind::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// Upcasts to `Any`, implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A value whose shape can be inspected and modified at runtime.
///
/// Implemented by the library for primitives, `String`, `Duration`, `Vec`,
/// arrays, `HashMap`, `BTreeMap`, `Option` and `Box`, and generated for user
/// structs by `#[derive(Reflect)]`.
pub trait Reflect: AsAny {
    /// The value a nil pointer, a new element or a cleared value starts
    /// from. `Default::default()` where the type has one; types without
    /// `Default` pick their own (`0.0.0.0` for IP addresses).
    fn zero() -> Self
    where
        Self: Sized;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn reflect_ref(&self) -> ReflectRef<'_>;

    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    fn kind(&self) -> Kind {
        self.reflect_ref().kind()
    }

    /// Hook taking `&self`; checked before [`Reflect::text_hook`].
    fn shared_text_hook(&self) -> Option<&dyn SharedTextParsable> {
        None
    }

    /// Hook taking `&mut self`.
    fn text_hook(&mut self) -> Option<&mut dyn TextParsable> {
        None
    }

    /// Overwrite `self` with a copy of `src` when both have the same type.
    /// Opaque leaves and derived structs copy the whole value; returning
    /// `false` makes a struct fall back to field-wise conversion.
    fn copy_from(&mut self, src: &dyn Reflect) -> bool {
        let _ = src;
        false
    }

    /// Display representation for opaque leaves, used for map keys.
    fn display_text(&self) -> Option<String> {
        None
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.type_name())
    }
}

/// Read-only view of a reflected value.
pub enum ReflectRef<'a> {
    Primitive(Primitive),
    String(&'a str),
    Duration(Duration),
    Struct(&'a dyn Struct),
    Seq(&'a dyn Seq),
    Map(&'a dyn Map),
    Pointer(&'a dyn Pointer),
    Opaque(&'a dyn Reflect),
}

/// Mutable view of a reflected value.
pub enum ReflectMut<'a> {
    Primitive(PrimitiveMut<'a>),
    String(&'a mut String),
    Duration(&'a mut Duration),
    Struct(&'a mut dyn Struct),
    Seq(&'a mut dyn Seq),
    Map(&'a mut dyn Map),
    Pointer(&'a mut dyn Pointer),
    Opaque(&'a mut dyn Reflect),
}

impl ReflectRef<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            ReflectRef::Primitive(p) => p.kind(),
            ReflectRef::String(_) => Kind::String,
            ReflectRef::Duration(_) => Kind::Duration,
            ReflectRef::Struct(_) => Kind::Struct,
            ReflectRef::Seq(_) => Kind::Seq,
            ReflectRef::Map(_) => Kind::Map,
            ReflectRef::Pointer(_) => Kind::Pointer,
            ReflectRef::Opaque(_) => Kind::Opaque,
        }
    }
}

impl ReflectMut<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            ReflectMut::Primitive(p) => p.kind(),
            ReflectMut::String(_) => Kind::String,
            ReflectMut::Duration(_) => Kind::Duration,
            ReflectMut::Struct(_) => Kind::Struct,
            ReflectMut::Seq(_) => Kind::Seq,
            ReflectMut::Map(_) => Kind::Map,
            ReflectMut::Pointer(_) => Kind::Pointer,
            ReflectMut::Opaque(_) => Kind::Opaque,
        }
    }
}

/// A struct with named fields in declaration order.
pub trait Struct: Reflect {
    fn fields(&self) -> &'static [Field];

    fn field_at(&self, index: usize) -> Option<&dyn Reflect>;

    fn field_at_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    fn field(&self, name: &str) -> Option<&dyn Reflect> {
        let index = self.fields().iter().position(|f| f.name == name)?;
        self.field_at(index)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Reflect> {
        let index = self.fields().iter().position(|f| f.name == name)?;
        self.field_at_mut(index)
    }
}

/// An indexable sequence: `Vec<T>` or `[T; N]`.
pub trait Seq: Reflect {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// A zero value of the element type.
    fn new_element(&self) -> Box<dyn Reflect>;

    /// Replace every element at once. Fails without modifying `self` when an
    /// element has the wrong type or a fixed-size sequence gets the wrong
    /// number of elements.
    fn set_elements(&mut self, elements: Vec<Box<dyn Reflect>>) -> Result<(), ReflectError>;
}

/// A key/value container.
pub trait Map: Reflect {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in the container's own iteration order.
    fn entries(&self) -> Vec<(&dyn Reflect, &dyn Reflect)>;

    fn entries_mut(&mut self) -> Vec<(&dyn Reflect, &mut dyn Reflect)>;

    fn new_key(&self) -> Box<dyn Reflect>;

    fn new_value(&self) -> Box<dyn Reflect>;

    /// Replace every entry at once; fails without modifying `self` when a key
    /// or value has the wrong type.
    fn set_entries(
        &mut self,
        entries: Vec<(Box<dyn Reflect>, Box<dyn Reflect>)>,
    ) -> Result<(), ReflectError>;
}

/// A reference to a single pointee.
pub trait Pointer: Reflect {
    fn is_nil(&self) -> bool;

    fn elem(&self) -> Option<&dyn Reflect>;

    fn elem_mut(&mut self) -> Option<&mut dyn Reflect>;

    /// A zero value of the pointee type, not yet bound.
    fn new_elem(&self) -> Box<dyn Reflect>;

    /// Point at `elem`, which must have come from [`Pointer::new_elem`].
    fn bind(&mut self, elem: Box<dyn Reflect>) -> Result<(), ReflectError>;

    /// Reset to nil. Fails for pointers that cannot be nil.
    fn set_nil(&mut self) -> Result<(), ReflectError>;
}

/// Downcast a boxed reflected value to its concrete type.
pub(crate) fn downcast_boxed<T: Reflect>(
    value: Box<dyn Reflect>,
    dst_type: &'static str,
) -> Result<T, ReflectError> {
    let src_type = value.type_name();
    value
        .into_any()
        .downcast::<T>()
        .map(|b| *b)
        .map_err(|_| ReflectError::incompatible(src_type, dst_type))
}
