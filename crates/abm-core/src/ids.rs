//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as ordered map keys.
//! Ordering matters: the engine iterates agents, rooms, and tasks in
//! ascending id order so that identical inputs give identical runs.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Identity of an agent.  Chosen by the caller (e.g. a staff number).
    pub struct AgentId(u32);
}

typed_id! {
    /// Identity of a task, allocated sequentially by the task registry.
    /// Also the final tie-breaker in queue ordering.
    pub struct TaskId(u32);
}

typed_id! {
    pub struct BuildingId(u32);
}

typed_id! {
    pub struct FloorId(u32);
}

typed_id! {
    /// Index of a room in the Space.  Lowest id wins equal-cost path ties.
    pub struct RoomId(u32);
}

typed_id! {
    pub struct DoorId(u32);
}

typed_id! {
    /// Index of a room component (bed, workstation).
    pub struct ComponentId(u32);
}
