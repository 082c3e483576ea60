//! Merge-patch field wrapper.

use serde::{Deserialize, Deserializer};

use super::{StoreError, StoreResult};

/// One field of a merge-patch payload.
///
/// Distinguishes a field that was left out of the payload from one that was
/// explicitly set to `null`. Use with `#[serde(default)]` so that missing
/// fields deserialize as [`Patch::Absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// The value the field would take after the patch, if the patch touches
    /// it at all.
    pub fn as_update(&self) -> Option<Option<&T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(value) => Some(Some(value)),
        }
    }

    /// Apply to a nullable column.
    pub fn apply(self, target: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *target = None,
            Patch::Value(value) => *target = Some(value),
        }
    }

    /// Apply to a `NOT NULL` column; an explicit `null` is rejected.
    pub fn apply_required(self, target: &mut T, field: &str) -> StoreResult<()> {
        match self {
            Patch::Absent => Ok(()),
            Patch::Null => Err(StoreError::invalid_argument(format!(
                "{field} cannot be null"
            ))),
            Patch::Value(value) => {
                *target = value;
                Ok(())
            }
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}
