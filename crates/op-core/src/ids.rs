//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into SoA `Vec`s via `id.0 as usize`, but callers should
//! prefer the `.index()` helpers for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — equivalent to the inner type's max value.
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
    /// Stable integer identifier for an agent. Never reused within a run
    /// once assigned, even after the agent is removed (invariant I4, §3).
    pub struct AgentId(u64);
}

typed_id! {
    /// Index of a road in the runtime road graph.
    pub struct RoadId(u32);
}

typed_id! {
    /// Index of a section within a road's ordered section list.
    pub struct SectionId(u32);
}

typed_id! {
    /// Index of a lane in the runtime graph's lane arena.
    pub struct LaneId(u32);
}

typed_id! {
    /// Index of a junction in the runtime road graph.
    pub struct JunctionId(u32);
}

typed_id! {
    /// Index of a geometry element (the quad spanned by two adjacent
    /// joints) in the flattened array the spatial index points into.
    pub struct GeometryElementId(u32);
}

typed_id! {
    /// Index of a world object (stationary or moving).
    pub struct ObjectId(u64);
}

typed_id! {
    /// Index of a component within its owning agent's component list.
    pub struct ComponentId(u32);
}

typed_id! {
    /// Identifies one endpoint (a source output port or a target input
    /// port) of a channel within a component.
    pub struct LinkId(u32);
}

typed_id! {
    /// Index of a scheduler task in the global task arena.
    pub struct TaskId(u64);
}

typed_id! {
    /// Index of an event in the event network's current-tick event list.
    pub struct EventId(u64);
}
