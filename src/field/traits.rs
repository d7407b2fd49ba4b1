// Slot access contract between a guard and the object it is attached to

use super::types::StateValue;

/// An object that owns state slots addressed by field name
///
/// The guard never stores per-subject state itself; it reads and writes
/// exactly one slot through this trait. Serializing concurrent writers to
/// the same subject is the implementor's responsibility.
pub trait Subject {
    /// Current value of the slot, `None` when nothing was ever written
    fn state(&self, field: &str) -> Option<StateValue>;

    /// Overwrite the slot. Called only after the guard accepted the value.
    fn store_state(&mut self, field: &str, value: StateValue);
}

impl<S: Subject + ?Sized> Subject for &mut S {
    fn state(&self, field: &str) -> Option<StateValue> {
        (**self).state(field)
    }

    fn store_state(&mut self, field: &str, value: StateValue) {
        (**self).store_state(field, value)
    }
}

impl<S: Subject + ?Sized> Subject for Box<S> {
    fn state(&self, field: &str) -> Option<StateValue> {
        (**self).state(field)
    }

    fn store_state(&mut self, field: &str, value: StateValue) {
        (**self).store_state(field, value)
    }
}
