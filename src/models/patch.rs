//! Tagged patch type for partial updates
//!
//! Ledger updates distinguish "leave unchanged" from "clear this field".
//! Relying on an absent key for no-op and an empty string for clear is how
//! data gets lost, so updates carry an explicit three-state tag.

use serde::{Deserialize, Serialize};

/// A partial-update instruction for an optional field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Patch<T> {
    /// Leave the field as it is
    Unchanged,
    /// Set the field to a new value
    Set(T),
    /// Clear the field (set to None)
    Clear,
}

// Manual impl, no T: Default bound
impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unchanged
    }
}

impl<T> Patch<T> {
    /// Check whether this patch leaves the field untouched
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }

    /// Apply the patch to an optional slot, returning true if it changed
    pub fn apply_to(self, slot: &mut Option<T>) -> bool {
        match self {
            Patch::Unchanged => false,
            Patch::Set(value) => {
                *slot = Some(value);
                true
            }
            Patch::Clear => {
                let was_set = slot.is_some();
                *slot = None;
                was_set
            }
        }
    }

    /// The value this patch would leave in the slot, if it touches it
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    /// `Some(v)` becomes `Set(v)`, `None` becomes `Clear`
    ///
    /// For "absent means unchanged" semantics, construct `Patch::Unchanged`
    /// explicitly; it is the `Default`.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Clear,
        }
    }
}
