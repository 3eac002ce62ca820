//! Shared type definitions for the kill-reward refiller module.
//!
//! This crate holds the value types that cross the boundary between the
//! host game engine and the refiller core: entity handles, input buttons,
//! refill policies and the transient kill/weapon records read once per
//! callback.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for player slots and weapon entities
//! - [`enums`] -- Policy enumerations and the input button mask
//! - [`structs`] -- Kill events, weapon snapshots, replicated field tags

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AmmoRefill, Buttons, MAX_VITAL, ParseTokenError, RefillAmount, Verbosity};
pub use ids::{PlayerId, WeaponId};
pub use structs::{KillEvent, NetworkedField, WeaponSnapshot};
