//! Type-safe identifier wrappers around host entity indices.
//!
//! The host engine addresses players by slot index and weapons by entity
//! index. Both are plain integers on the wire, so each gets its own newtype
//! to prevent accidental mixing at compile time. A slot index is stable for
//! the lifetime of a connection and may be reused by the next player who
//! takes the slot.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a `u32` entity index with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an identifier from a raw host index.
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Return the raw host index.
            pub const fn into_inner(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(index: u32) -> Self {
                Self(index)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Stable per-session identifier of a connected player (the host slot index).
    PlayerId
}

define_id! {
    /// Identifier of a weapon entity held in a player's inventory.
    WeaponId
}
