//! Assign string values to nodes addressed by traversal path.

use std::convert::Infallible;

use crate::assign::assign_string_to_value;
use crate::error::ReflectError;
use crate::reflect::Reflect;
use crate::target::Target;
use crate::traverse::traverse_mut;

/// Parse `src` into the node of `dst` whose traversal path is `path`.
///
/// Paths use the traversal syntax (`Server.Port`, `Hosts[0]`,
/// `Limits[burst]`, `*(Timeout)`). Nil pointers are not descended into, so a
/// path below one is unknown until the pointer is set.
pub fn assign_path(dst: &mut dyn Reflect, path: &str, src: &str) -> Result<(), ReflectError> {
    // Keys without a display form all render as `[]`; only the first is bound.
    let mut outcome = None;
    let Ok(()) = traverse_mut::<Infallible, _>(dst, |value, state, _| {
        if outcome.is_none() && state.path == path {
            outcome = Some(assign_string_to_value(Target::new(value), src));
        }
        Ok(())
    });

    outcome.unwrap_or_else(|| Err(ReflectError::UnknownPath(path.to_string())))
}

/// Apply several [`assign_path`] calls in order, stopping on the first error.
pub fn assign_paths<I, P, S>(dst: &mut dyn Reflect, pairs: I) -> Result<(), ReflectError>
where
    I: IntoIterator<Item = (P, S)>,
    P: AsRef<str>,
    S: AsRef<str>,
{
    for (path, src) in pairs {
        let (path, src) = (path.as_ref(), src.as_ref());
        tracing::debug!(path, "assigning path");
        assign_path(dst, path, src)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
