//! String and value assignment into reflected targets.

use std::time::Duration;

use crate::error::{ParseFailure, ReflectError};
use crate::parse::{parse_bool, parse_duration, parse_float, parse_int, parse_uint};
use crate::primitive::{Primitive, PrimitiveMut};
use crate::reflect::{Reflect, ReflectMut, ReflectRef};
use crate::target::Target;

/// Convert `src` to the target's type and store it.
///
/// A nil pointer target is filled with a freshly allocated pointee, bound
/// only if the conversion succeeds. On any error the target is unchanged.
pub fn assign_string_to_value(dst: Target<'_>, src: &str) -> Result<(), ReflectError> {
    let dst = dst.into_settable()?;

    if let ReflectMut::Pointer(ptr) = dst.reflect_mut() {
        if ptr.is_nil() {
            let mut fresh = ptr.new_elem();
            tracing::trace!(target_type = fresh.type_name(), "allocating pointee for nil pointer");
            assign_text(&mut *fresh, src)?;
            return ptr.bind(fresh);
        }
        if let Some(elem) = ptr.elem_mut() {
            return assign_text(elem, src);
        }
    }
    assign_text(dst, src)
}

/// [`assign_string_to_value`] for a concrete destination.
pub fn assign_string<T: Reflect>(dst: &mut T, src: &str) -> Result<(), ReflectError> {
    assign_string_to_value(Target::new(dst), src)
}

/// Convert the value `src` into the target.
///
/// String sources are parsed as by [`assign_string_to_value`]. Other sources
/// are converted when the pair is convertible; sequences and maps are
/// rebuilt element by element and committed only when every element
/// converted.
pub fn assign_value(dst: Target<'_>, src: &dyn Reflect) -> Result<(), ReflectError> {
    let dst = dst.into_settable()?;
    convert_into(dst, src)
}

/// [`assign_value`] for concrete destination and source.
pub fn assign<D: Reflect, S: Reflect>(dst: &mut D, src: &S) -> Result<(), ReflectError> {
    assign_value(Target::new(dst), src)
}

// ═══════════════════════════════════════════════════════════════
//  Text
// ═══════════════════════════════════════════════════════════════

fn assign_text(v: &mut dyn Reflect, src: &str) -> Result<(), ReflectError> {
    if let Some(result) = run_text_hook(v, src) {
        return result;
    }

    let target_type = v.type_name();
    let parse_err = |reason: ParseFailure| ReflectError::parse(src, target_type, reason);
    match v.reflect_mut() {
        ReflectMut::Duration(slot) => {
            *slot = parse_duration(src).map_err(parse_err)?;
            Ok(())
        }
        ReflectMut::Primitive(slot) => assign_primitive(slot, src).map_err(parse_err),
        ReflectMut::String(slot) => {
            src.clone_into(slot);
            Ok(())
        }
        _ => Err(ReflectError::UnsupportedType {
            raw: src.to_string(),
            target_type,
        }),
    }
}

/// Look for a text hook on the value (shared, then exclusive), then on the
/// pointee when the value is itself a non-nil pointer.
fn run_text_hook(v: &mut dyn Reflect, src: &str) -> Option<Result<(), ReflectError>> {
    if let Some(result) = run_own_hook(v, src) {
        return Some(result);
    }
    if let ReflectMut::Pointer(ptr) = v.reflect_mut() {
        if let Some(inner) = ptr.elem_mut() {
            return run_own_hook(inner, src);
        }
    }
    None
}

fn run_own_hook(v: &mut dyn Reflect, src: &str) -> Option<Result<(), ReflectError>> {
    if let Some(hook) = v.shared_text_hook() {
        tracing::trace!(target_type = v.type_name(), "dispatching shared text hook");
        return Some(hook.parse_text_shared(src).map_err(ReflectError::Hook));
    }
    let target_type = v.type_name();
    if let Some(hook) = v.text_hook() {
        tracing::trace!(target_type, "dispatching text hook");
        return Some(hook.parse_text(src).map_err(ReflectError::Hook));
    }
    None
}

macro_rules! parse_signed {
    ($slot:expr, $src:expr, $ty:ty) => {
        **$slot = parse_int($src, <$ty>::BITS)? as $ty
    };
}

macro_rules! parse_unsigned {
    ($slot:expr, $src:expr, $ty:ty) => {
        **$slot = parse_uint($src, <$ty>::BITS)? as $ty
    };
}

fn assign_primitive(mut slot: PrimitiveMut<'_>, src: &str) -> Result<(), ParseFailure> {
    match &mut slot {
        PrimitiveMut::Bool(v) => **v = parse_bool(src)?,
        PrimitiveMut::I8(v) => parse_signed!(v, src, i8),
        PrimitiveMut::I16(v) => parse_signed!(v, src, i16),
        PrimitiveMut::I32(v) => parse_signed!(v, src, i32),
        PrimitiveMut::I64(v) => parse_signed!(v, src, i64),
        PrimitiveMut::Isize(v) => parse_signed!(v, src, isize),
        PrimitiveMut::U8(v) => parse_unsigned!(v, src, u8),
        PrimitiveMut::U16(v) => parse_unsigned!(v, src, u16),
        PrimitiveMut::U32(v) => parse_unsigned!(v, src, u32),
        PrimitiveMut::U64(v) => parse_unsigned!(v, src, u64),
        PrimitiveMut::Usize(v) => parse_unsigned!(v, src, usize),
        PrimitiveMut::F32(v) => **v = parse_float(src, 32)? as f32,
        PrimitiveMut::F64(v) => **v = parse_float(src, 64)?,
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
//  Values
// ═══════════════════════════════════════════════════════════════

/// Follow non-nil pointers down to the innermost value. Stops at a nil
/// pointer, which is returned as is.
fn indirect(mut src: &dyn Reflect) -> &dyn Reflect {
    while let ReflectRef::Pointer(ptr) = src.reflect_ref() {
        match ptr.elem() {
            Some(inner) => src = inner,
            None => break,
        }
    }
    src
}

fn convert_into(dst: &mut dyn Reflect, src: &dyn Reflect) -> Result<(), ReflectError> {
    let src = indirect(src);
    let src_type = src.type_name();
    let dst_type = dst.type_name();

    match src.reflect_ref() {
        ReflectRef::String(s) => return assign_string_to_value(Target::new(dst), s),
        ReflectRef::Pointer(_) => {
            // Only a nil pointer survives `indirect`.
            return match dst.reflect_mut() {
                ReflectMut::Pointer(ptr) => ptr.set_nil(),
                _ => Err(ReflectError::incompatible(src_type, dst_type)),
            };
        }
        _ => {}
    }

    if let ReflectMut::Pointer(ptr) = dst.reflect_mut() {
        if ptr.is_nil() {
            let mut fresh = ptr.new_elem();
            tracing::trace!(target_type = fresh.type_name(), "allocating pointee for nil pointer");
            convert_into(&mut *fresh, src)?;
            return ptr.bind(fresh);
        }
        if let Some(elem) = ptr.elem_mut() {
            return convert_into(elem, src);
        }
    }

    let incompatible = || ReflectError::incompatible(src_type, dst_type);
    let same_type = src.as_any().type_id() == (*dst).as_any().type_id();
    if same_type && dst.copy_from(src) {
        return Ok(());
    }

    match (dst.reflect_mut(), src.reflect_ref()) {
        (ReflectMut::Primitive(mut slot), ReflectRef::Primitive(value)) => {
            if slot.convert_from(value) {
                Ok(())
            } else {
                Err(incompatible())
            }
        }
        (ReflectMut::Duration(slot), ReflectRef::Duration(value)) => {
            *slot = value;
            Ok(())
        }
        (ReflectMut::Duration(slot), ReflectRef::Primitive(value)) => {
            *slot = duration_from_nanos(value).ok_or_else(incompatible)?;
            Ok(())
        }
        (ReflectMut::Primitive(mut slot), ReflectRef::Duration(value)) => {
            let nanos = i64::try_from(value.as_nanos()).map_err(|_| incompatible())?;
            if slot.convert_from(Primitive::I64(nanos)) {
                Ok(())
            } else {
                Err(incompatible())
            }
        }
        (ReflectMut::Struct(dst_struct), ReflectRef::Struct(src_struct)) if same_type => {
            for index in 0..src_struct.fields().len() {
                let (Some(to), Some(from)) = (dst_struct.field_at_mut(index), src_struct.field_at(index)) else {
                    continue;
                };
                convert_into(to, from)?;
            }
            Ok(())
        }
        (ReflectMut::Seq(dst_seq), ReflectRef::Seq(src_seq)) => {
            let mut elements = Vec::with_capacity(src_seq.len());
            for index in 0..src_seq.len() {
                let Some(from) = src_seq.get(index) else {
                    continue;
                };
                let mut element = dst_seq.new_element();
                convert_into(&mut *element, from)?;
                elements.push(element);
            }
            dst_seq.set_elements(elements)
        }
        (ReflectMut::Map(dst_map), ReflectRef::Map(src_map)) => {
            let mut entries = Vec::with_capacity(src_map.len());
            for (from_key, from_value) in src_map.entries() {
                let mut key = dst_map.new_key();
                convert_into(&mut *key, from_key)?;
                let mut value = dst_map.new_value();
                convert_into(&mut *value, from_value)?;
                entries.push((key, value));
            }
            dst_map.set_entries(entries)
        }
        _ => Err(incompatible()),
    }
}

/// A nanosecond count as a duration. Floats are truncated; negative,
/// non-finite and out-of-range counts have no duration.
fn duration_from_nanos(value: Primitive) -> Option<Duration> {
    let float = match value {
        Primitive::F32(v) => v as f64,
        Primitive::F64(v) => v,
        other => return u64::try_from(other.as_i128()?).ok().map(Duration::from_nanos),
    };
    if !float.is_finite() || float < 0.0 || float >= u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(float as u64))
}
