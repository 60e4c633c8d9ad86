use std::fmt;

use crate::reflect::Kind;

/// Copy of a primitive scalar, tagged with its declared width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
}

/// Mutable handle to a primitive scalar.
#[derive(Debug)]
pub enum PrimitiveMut<'a> {
    Bool(&'a mut bool),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
}

impl Primitive {
    pub fn kind(&self) -> Kind {
        match self {
            Primitive::Bool(_) => Kind::Bool,
            Primitive::I8(_)
            | Primitive::I16(_)
            | Primitive::I32(_)
            | Primitive::I64(_)
            | Primitive::Isize(_) => Kind::Int,
            Primitive::U8(_)
            | Primitive::U16(_)
            | Primitive::U32(_)
            | Primitive::U64(_)
            | Primitive::Usize(_) => Kind::Uint,
            Primitive::F32(_) | Primitive::F64(_) => Kind::Float,
        }
    }

    /// Declared bit width; `1` for `bool`.
    pub fn bits(&self) -> u32 {
        match self {
            Primitive::Bool(_) => 1,
            Primitive::I8(_) | Primitive::U8(_) => 8,
            Primitive::I16(_) | Primitive::U16(_) => 16,
            Primitive::I32(_) | Primitive::U32(_) | Primitive::F32(_) => 32,
            Primitive::I64(_) | Primitive::U64(_) | Primitive::F64(_) => 64,
            Primitive::Isize(_) => isize::BITS,
            Primitive::Usize(_) => usize::BITS,
        }
    }

    /// Integer value widened to `i128`; `None` for floats and `bool`.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Primitive::I8(v) => v as i128,
            Primitive::I16(v) => v as i128,
            Primitive::I32(v) => v as i128,
            Primitive::I64(v) => v as i128,
            Primitive::Isize(v) => v as i128,
            Primitive::U8(v) => v as i128,
            Primitive::U16(v) => v as i128,
            Primitive::U32(v) => v as i128,
            Primitive::U64(v) => v as i128,
            Primitive::Usize(v) => v as i128,
            Primitive::Bool(_) | Primitive::F32(_) | Primitive::F64(_) => return None,
        })
    }

    fn as_f64(&self) -> Option<f64> {
        match *self {
            Primitive::F32(v) => Some(v as f64),
            Primitive::F64(v) => Some(v),
            _ => self.as_i128().map(|v| v as f64),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Bool(v) => write!(f, "{v}"),
            Primitive::I8(v) => write!(f, "{v}"),
            Primitive::I16(v) => write!(f, "{v}"),
            Primitive::I32(v) => write!(f, "{v}"),
            Primitive::I64(v) => write!(f, "{v}"),
            Primitive::Isize(v) => write!(f, "{v}"),
            Primitive::U8(v) => write!(f, "{v}"),
            Primitive::U16(v) => write!(f, "{v}"),
            Primitive::U32(v) => write!(f, "{v}"),
            Primitive::U64(v) => write!(f, "{v}"),
            Primitive::Usize(v) => write!(f, "{v}"),
            Primitive::F32(v) => write!(f, "{v}"),
            Primitive::F64(v) => write!(f, "{v}"),
        }
    }
}

// Numeric conversions follow `as` semantics: integers wrap or truncate,
// floats saturate when narrowed to integers.
macro_rules! convert_numeric {
    ($slot:expr, $src:expr, $ty:ty) => {{
        match $src {
            Primitive::F32(v) => **$slot = v as $ty,
            Primitive::F64(v) => **$slot = v as $ty,
            other => match other.as_i128() {
                Some(v) => **$slot = v as $ty,
                None => return false,
            },
        }
        true
    }};
}

impl PrimitiveMut<'_> {
    /// Current value.
    pub fn get(&self) -> Primitive {
        match self {
            PrimitiveMut::Bool(v) => Primitive::Bool(**v),
            PrimitiveMut::I8(v) => Primitive::I8(**v),
            PrimitiveMut::I16(v) => Primitive::I16(**v),
            PrimitiveMut::I32(v) => Primitive::I32(**v),
            PrimitiveMut::I64(v) => Primitive::I64(**v),
            PrimitiveMut::Isize(v) => Primitive::Isize(**v),
            PrimitiveMut::U8(v) => Primitive::U8(**v),
            PrimitiveMut::U16(v) => Primitive::U16(**v),
            PrimitiveMut::U32(v) => Primitive::U32(**v),
            PrimitiveMut::U64(v) => Primitive::U64(**v),
            PrimitiveMut::Usize(v) => Primitive::Usize(**v),
            PrimitiveMut::F32(v) => Primitive::F32(**v),
            PrimitiveMut::F64(v) => Primitive::F64(**v),
        }
    }

    pub fn kind(&self) -> Kind {
        self.get().kind()
    }

    pub fn bits(&self) -> u32 {
        self.get().bits()
    }

    /// Convert `src` into this slot. Returns `false` when the pair is not
    /// convertible (`bool` only converts to and from `bool`).
    pub fn convert_from(&mut self, src: Primitive) -> bool {
        match self {
            PrimitiveMut::Bool(slot) => match src {
                Primitive::Bool(v) => {
                    **slot = v;
                    true
                }
                _ => false,
            },
            _ if src.kind() == Kind::Bool => false,
            PrimitiveMut::I8(slot) => convert_numeric!(slot, src, i8),
            PrimitiveMut::I16(slot) => convert_numeric!(slot, src, i16),
            PrimitiveMut::I32(slot) => convert_numeric!(slot, src, i32),
            PrimitiveMut::I64(slot) => convert_numeric!(slot, src, i64),
            PrimitiveMut::Isize(slot) => convert_numeric!(slot, src, isize),
            PrimitiveMut::U8(slot) => convert_numeric!(slot, src, u8),
            PrimitiveMut::U16(slot) => convert_numeric!(slot, src, u16),
            PrimitiveMut::U32(slot) => convert_numeric!(slot, src, u32),
            PrimitiveMut::U64(slot) => convert_numeric!(slot, src, u64),
            PrimitiveMut::Usize(slot) => convert_numeric!(slot, src, usize),
            PrimitiveMut::F32(slot) => match src.as_f64() {
                Some(v) => {
                    **slot = v as f32;
                    true
                }
                None => false,
            },
            PrimitiveMut::F64(slot) => match src.as_f64() {
                Some(v) => {
                    **slot = v;
                    true
                }
                None => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_conversion_uses_cast_semantics() {
        let mut small = 0u8;
        assert!(PrimitiveMut::U8(&mut small).convert_from(Primitive::I32(300)));
        assert_eq!(small, 44);

        let mut int = 0i64;
        assert!(PrimitiveMut::I64(&mut int).convert_from(Primitive::F64(-2.9)));
        assert_eq!(int, -2);

        let mut float = 0f32;
        assert!(PrimitiveMut::F32(&mut float).convert_from(Primitive::U16(7)));
        assert_eq!(float, 7.0);
    }

    #[test]
    fn bool_only_converts_to_bool() {
        let mut flag = false;
        assert!(!PrimitiveMut::Bool(&mut flag).convert_from(Primitive::I32(1)));
        assert!(PrimitiveMut::Bool(&mut flag).convert_from(Primitive::Bool(true)));
        assert!(flag);

        let mut int = 5i32;
        assert!(!PrimitiveMut::I32(&mut int).convert_from(Primitive::Bool(true)));
        assert_eq!(int, 5);
    }

    #[test]
    fn widths_follow_declared_type() {
        assert_eq!(Primitive::I16(0).bits(), 16);
        assert_eq!(Primitive::F32(0.0).bits(), 32);
        assert_eq!(Primitive::Usize(0).bits(), usize::BITS);
        assert_eq!(Primitive::U8(0).kind(), Kind::Uint);
    }
}
