//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Node IDs are handed out by the
//! graph from a monotonically increasing counter, so ordering by ID is also
//! insertion order; several algorithms rely on that for deterministic
//! tie-breaking.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// The raw integer value.
            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Stable, opaque identifier of a graph node.  Never reused after removal.
    pub struct NodeId(u64);
}

typed_id! {
    /// Identifier of one vehicle run as supplied by upstream ingestion.
    pub struct TripId(u32);
}

typed_id! {
    /// Identifier of a road segment in the external road-matching engine.
    pub struct RoadSegmentId(u64);
}

impl NodeId {
    /// The ID that follows this one in allocation order.
    #[inline]
    pub fn next(self) -> NodeId {
        NodeId(self.0 + 1)
    }
}
