//! Opaque ID newtypes for modules and wires.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Ord`, and `Serialize`/`Deserialize`.
//! IDs are created by [`Arena::alloc`](crate::arena::Arena::alloc). Their ordering
//! is allocation order, which the scheduler uses as its deterministic tie-break.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a module instance in a [`Circuit`](crate::Circuit).
    ModuleId,
    "m"
);

define_id!(
    /// Opaque, copyable ID for a single-bit wire in a [`Circuit`](crate::Circuit).
    WireId,
    "w"
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn id_roundtrip() {
        let id = ModuleId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
        assert_eq!(<WireId as ArenaId>::from_raw(7).as_raw(), 7);
    }

    #[test]
    fn ordered_by_index() {
        let set: BTreeSet<ModuleId> = [3, 1, 2].into_iter().map(ModuleId::from_raw).collect();
        let raw: Vec<u32> = set.into_iter().map(ModuleId::as_raw).collect();
        assert_eq!(raw, vec![1, 2, 3]);
    }

    #[test]
    fn display() {
        assert_eq!(ModuleId::from_raw(5).to_string(), "m5");
        assert_eq!(WireId::from_raw(12).to_string(), "w12");
    }

    #[test]
    fn serde_roundtrip() {
        let id = WireId::from_raw(99);
        let json = serde_json::to_string(&id).unwrap();
        let back: WireId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
