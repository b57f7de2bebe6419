//! Opaque ID newtypes for hierarchy entities.
//!
//! IDs are ordered by allocation, which gives every ordered collection of
//! them (nets, adjacency sets) a deterministic, declaration-order iteration.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
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
    };
}

define_id!(
    /// A component (hierarchy node).
    ComponentId
);

define_id!(
    /// A signal endpoint: port, wire, constant, or a field/slice view of one.
    EndpointId
);

define_id!(
    /// An interned type in the [`TypeDb`](crate::types::TypeDb).
    TypeId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn id_roundtrip() {
        assert_eq!(EndpointId::from_raw(42).as_raw(), 42);
    }

    #[test]
    fn ids_sort_by_allocation() {
        let set: BTreeSet<_> = [3, 1, 2].into_iter().map(ComponentId::from_raw).collect();
        let raw: Vec<u32> = set.into_iter().map(ComponentId::as_raw).collect();
        assert_eq!(raw, vec![1, 2, 3]);
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = TypeId::from_raw(9);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(serde_json::from_str::<TypeId>(&json).unwrap(), id);
    }
}
