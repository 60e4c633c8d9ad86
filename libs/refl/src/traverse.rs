//! Pre-order walk over every nested value.
//!
//! Each node is reported with its path from the root:
//!
//! | node              | path                   |
//! |-------------------|------------------------|
//! | struct field      | `parent.name` / `name` |
//! | sequence element  | `parent[3]`            |
//! | map value         | `parent[key]` / `parent[]` |
//! | pointee           | `*(parent)`            |
//!
//! The first callback error stops the walk and is returned unchanged.

use std::any::Any;

use crate::field::Field;
use crate::parse::format_duration;
use crate::reflect::{Reflect, ReflectMut, ReflectRef};

/// Position of the current node.
#[derive(Debug, Clone)]
pub struct State<'u> {
    pub path: String,
    pub depth: usize,
    /// Caller value attached with [`Traverser::with_value`], passed unchanged
    /// to every node.
    pub value: Option<&'u dyn Any>,
}

impl<'u> State<'u> {
    fn root(value: Option<&'u dyn Any>) -> Self {
        Self {
            path: String::new(),
            depth: 0,
            value,
        }
    }

    fn next(&self, path: String) -> Self {
        Self {
            path,
            depth: self.depth + 1,
            value: self.value,
        }
    }

    /// The attached caller value, if it has type `T`.
    pub fn user_value<T: Any>(&self) -> Option<&'u T> {
        self.value?.downcast_ref::<T>()
    }

    fn field_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.path)
        }
    }

    fn index_path(&self, index: usize) -> String {
        format!("{}[{index}]", self.path)
    }

    fn key_path(&self, key: &dyn Reflect) -> String {
        match key_text(key) {
            Some(key) => format!("{}[{key}]", self.path),
            None => format!("{}[]", self.path),
        }
    }

    fn pointee_path(&self) -> String {
        format!("*({})", self.path)
    }
}

/// Display form of a map key; `None` when the key type has none.
fn key_text(key: &dyn Reflect) -> Option<String> {
    match key.reflect_ref() {
        ReflectRef::Primitive(p) => Some(p.to_string()),
        ReflectRef::String(s) => Some(s.to_string()),
        ReflectRef::Duration(d) => Some(format_duration(d)),
        _ => key.display_text(),
    }
}

type Visit<'f, 'u, E> = dyn FnMut(&dyn Reflect, &State<'u>, Option<&Field>) -> Result<(), E> + 'f;
type VisitMut<'f, 'u, E> = dyn FnMut(&mut dyn Reflect, &State<'u>, Option<&Field>) -> Result<(), E> + 'f;

/// Walk configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct Traverser<'u> {
    value: Option<&'u dyn Any>,
}

impl<'u> Traverser<'u> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a caller value, visible to every node as [`State::value`].
    pub fn with_value(mut self, value: &'u dyn Any) -> Self {
        self.value = Some(value);
        self
    }

    /// Visit `v` and everything nested in it.
    pub fn walk<E, F>(&self, v: &dyn Reflect, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&dyn Reflect, &State<'u>, Option<&Field>) -> Result<(), E>,
    {
        walk_node(v, &State::root(self.value), None, &mut visit)
    }

    /// Like [`Traverser::walk`], but the callback may modify each node before
    /// its children are visited.
    pub fn walk_mut<E, F>(&self, v: &mut dyn Reflect, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&mut dyn Reflect, &State<'u>, Option<&Field>) -> Result<(), E>,
    {
        walk_node_mut(v, &State::root(self.value), None, &mut visit)
    }

    /// Visit struct fields only. Other nodes are descended into but not
    /// reported.
    pub fn fields<E, F>(&self, v: &dyn Reflect, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&dyn Reflect, &State<'u>, &Field) -> Result<(), E>,
    {
        self.walk(v, |value, state, field| match field {
            Some(field) => visit(value, state, field),
            None => Ok(()),
        })
    }

    pub fn fields_mut<E, F>(&self, v: &mut dyn Reflect, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&mut dyn Reflect, &State<'u>, &Field) -> Result<(), E>,
    {
        self.walk_mut(v, |value, state, field| match field {
            Some(field) => visit(value, state, field),
            None => Ok(()),
        })
    }
}

fn walk_node<'u, E>(
    v: &dyn Reflect,
    state: &State<'u>,
    field: Option<&Field>,
    visit: &mut Visit<'_, 'u, E>,
) -> Result<(), E> {
    if let Err(e) = visit(v, state, field) {
        tracing::debug!(path = %state.path, depth = state.depth, "traversal stopped by callback");
        return Err(e);
    }

    match v.reflect_ref() {
        ReflectRef::Struct(s) => {
            for field in s.fields() {
                if let Some(child) = s.field_at(field.index) {
                    walk_node(child, &state.next(state.field_path(field.name)), Some(field), visit)?;
                }
            }
        }
        ReflectRef::Seq(seq) => {
            for index in 0..seq.len() {
                if let Some(child) = seq.get(index) {
                    walk_node(child, &state.next(state.index_path(index)), None, visit)?;
                }
            }
        }
        ReflectRef::Map(map) => {
            for (key, child) in map.entries() {
                walk_node(child, &state.next(state.key_path(key)), None, visit)?;
            }
        }
        ReflectRef::Pointer(ptr) => {
            if let Some(child) = ptr.elem() {
                walk_node(child, &state.next(state.pointee_path()), None, visit)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn walk_node_mut<'u, E>(
    v: &mut dyn Reflect,
    state: &State<'u>,
    field: Option<&Field>,
    visit: &mut VisitMut<'_, 'u, E>,
) -> Result<(), E> {
    if let Err(e) = visit(v, state, field) {
        tracing::debug!(path = %state.path, depth = state.depth, "traversal stopped by callback");
        return Err(e);
    }

    match v.reflect_mut() {
        ReflectMut::Struct(s) => {
            for field in s.fields() {
                if let Some(child) = s.field_at_mut(field.index) {
                    walk_node_mut(child, &state.next(state.field_path(field.name)), Some(field), visit)?;
                }
            }
        }
        ReflectMut::Seq(seq) => {
            for index in 0..seq.len() {
                if let Some(child) = seq.get_mut(index) {
                    walk_node_mut(child, &state.next(state.index_path(index)), None, visit)?;
                }
            }
        }
        ReflectMut::Map(map) => {
            for (key, child) in map.entries_mut() {
                walk_node_mut(child, &state.next(state.key_path(key)), None, visit)?;
            }
        }
        ReflectMut::Pointer(ptr) => {
            if let Some(child) = ptr.elem_mut() {
                walk_node_mut(child, &state.next(state.pointee_path()), None, visit)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Visit `v` and everything nested in it, in pre-order.
pub fn traverse<E, F>(v: &dyn Reflect, visit: F) -> Result<(), E>
where
    F: FnMut(&dyn Reflect, &State<'_>, Option<&Field>) -> Result<(), E>,
{
    Traverser::new().walk(v, visit)
}

/// [`traverse`] with mutable access to every node.
pub fn traverse_mut<E, F>(v: &mut dyn Reflect, visit: F) -> Result<(), E>
where
    F: FnMut(&mut dyn Reflect, &State<'_>, Option<&Field>) -> Result<(), E>,
{
    Traverser::new().walk_mut(v, visit)
}

/// [`traverse`] restricted to struct fields.
pub fn traverse_fields<E, F>(v: &dyn Reflect, visit: F) -> Result<(), E>
where
    F: FnMut(&dyn Reflect, &State<'_>, &Field) -> Result<(), E>,
{
    Traverser::new().fields(v, visit)
}

pub fn traverse_fields_mut<E, F>(v: &mut dyn Reflect, visit: F) -> Result<(), E>
where
    F: FnMut(&mut dyn Reflect, &State<'_>, &Field) -> Result<(), E>,
{
    Traverser::new().fields_mut(v, visit)
}

/// Reset `v` to its zero value.
pub fn clear<T: Reflect>(v: &mut T) {
    *v = T::zero();
}

#[cfg(test)]
mod tests;
