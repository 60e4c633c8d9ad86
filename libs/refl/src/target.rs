use crate::error::ReflectError;
use crate::reflect::{Kind, Reflect};

/// Handle to a storage location whose type is only known at runtime.
///
/// Built from `&mut` a target is settable; [`Target::read_only`] wraps a
/// shared reference and refuses every assignment with
/// [`ReflectError::NotAssignable`].
pub struct Target<'a> {
    slot: Slot<'a>,
}

enum Slot<'a> {
    Settable(&'a mut dyn Reflect),
    ReadOnly(&'a dyn Reflect),
}

impl<'a> Target<'a> {
    pub fn new(value: &'a mut dyn Reflect) -> Self {
        Self {
            slot: Slot::Settable(value),
        }
    }

    pub fn read_only(value: &'a dyn Reflect) -> Self {
        Self {
            slot: Slot::ReadOnly(value),
        }
    }

    pub fn can_set(&self) -> bool {
        matches!(self.slot, Slot::Settable(_))
    }

    pub fn get(&self) -> &dyn Reflect {
        match &self.slot {
            Slot::Settable(v) => &**v,
            Slot::ReadOnly(v) => *v,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut dyn Reflect> {
        match &mut self.slot {
            Slot::Settable(v) => Some(&mut **v),
            Slot::ReadOnly(_) => None,
        }
    }

    pub fn kind(&self) -> Kind {
        self.get().kind()
    }

    pub fn type_name(&self) -> &'static str {
        self.get().type_name()
    }

    /// The writable reference, or `NotAssignable`.
    pub fn into_settable(self) -> Result<&'a mut dyn Reflect, ReflectError> {
        match self.slot {
            Slot::Settable(v) => Ok(v),
            Slot::ReadOnly(_) => Err(ReflectError::NotAssignable),
        }
    }
}

impl<'a, T: Reflect> From<&'a mut T> for Target<'a> {
    fn from(value: &'a mut T) -> Self {
        Target::new(value)
    }
}

impl std::fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("type", &self.type_name())
            .field("settable", &self.can_set())
            .finish()
    }
}
