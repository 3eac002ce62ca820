//! Transient records exchanged with the host engine.
//!
//! None of these are cached by the core across callbacks: a [`KillEvent`]
//! is read once when the host delivers it, and a [`WeaponSnapshot`] is
//! read fresh every time a weapon is inspected.

use serde::{Deserialize, Serialize};

use crate::ids::{PlayerId, WeaponId};

/// Notification that a player's body was eliminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillEvent {
    /// The player who died.
    pub victim: PlayerId,
    /// The player credited with the kill, if any (absent for world damage).
    pub attacker: Option<PlayerId>,
    /// The player credited with the assist, if any.
    pub assister: Option<PlayerId>,
}

impl KillEvent {
    /// Whether the victim is credited with killing themselves.
    pub fn is_self_kill(&self) -> bool {
        self.attacker == Some(self.victim)
    }
}

/// Ammunition state of one weapon, with capacities from its static definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSnapshot {
    /// Rounds loaded in the primary magazine.
    pub primary_clip: u32,
    /// Rounds loaded in the secondary magazine. Zero when unused.
    pub secondary_clip: u32,
    /// Rounds held in reserve, or `None` if the weapon has no reserve pool.
    pub reserve: Option<u32>,
    /// Primary magazine capacity.
    pub max_clip: u32,
    /// Primary reserve capacity.
    pub max_reserve: u32,
}

impl WeaponSnapshot {
    /// True when the reserve pool is absent or holds nothing.
    pub const fn reserve_empty(&self) -> bool {
        matches!(self.reserve, None | Some(0))
    }

    /// True when the primary magazine holds nothing.
    pub const fn clip_empty(&self) -> bool {
        self.primary_clip == 0
    }
}

/// A replicated property whose change must be announced to the host for
/// network sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkedField {
    /// A player's health.
    Health(PlayerId),
    /// A player's armor.
    Armor(PlayerId),
    /// A weapon's primary magazine.
    PrimaryClip(WeaponId),
    /// A weapon's secondary magazine.
    SecondaryClip(WeaponId),
    /// A weapon's primary reserve.
    Reserve(WeaponId),
}
