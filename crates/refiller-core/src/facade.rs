//! Capability trait through which the core reads and writes game entities.
//!
//! The host engine owns every entity. The core never holds a reference to
//! one across callbacks; it addresses players and weapons by id and asks
//! the [`EntityAccess`] implementation each time. Any of those calls may
//! find the entity gone (a player disconnected, a weapon was dropped and
//! destroyed), which surfaces as an [`EntityError`] rather than a panic.

use refiller_types::{Buttons, NetworkedField, PlayerId, WeaponId, WeaponSnapshot};

/// Errors raised by the host when an entity cannot be accessed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityError {
    /// The player is no longer connected.
    #[error("player {0} is gone")]
    PlayerGone(PlayerId),

    /// The player has no valid body to read or write.
    #[error("player {0} has no pawn")]
    PawnMissing(PlayerId),

    /// The weapon entity no longer exists.
    #[error("weapon {0} is gone")]
    WeaponGone(WeaponId),

    /// The weapon has no static definition data (clip/reserve capacities).
    #[error("weapon {0} has no definition data")]
    MissingWeaponData(WeaponId),

    /// The weapon has no reserve pool to write.
    #[error("weapon {0} has no reserve slot")]
    NoReserveSlot(WeaponId),

    /// Any other host-side failure.
    #[error("host error: {message}")]
    Host {
        /// Description of the failure.
        message: String,
    },
}

impl EntityError {
    /// The weapon cannot be read at all (destroyed, or no definition data).
    /// Such a weapon is skipped rather than treated as a fault.
    pub const fn is_unusable_weapon(&self) -> bool {
        matches!(self, Self::WeaponGone(_) | Self::MissingWeaponData(_))
    }
}

/// Access to player and weapon state in the host engine.
///
/// Every write must be followed by [`notify_state_changed`] for the same
/// field, otherwise clients never see the new value. The core does this
/// explicitly; implementations must not notify on their own.
///
/// [`notify_state_changed`]: EntityAccess::notify_state_changed
pub trait EntityAccess {
    /// Every player currently holding a slot.
    fn connected_players(&self) -> Vec<PlayerId>;

    /// Whether `player` still holds a valid connection.
    fn is_connected(&self, player: PlayerId) -> bool;

    /// Whether `player`'s body is alive.
    fn is_alive(&self, player: PlayerId) -> bool;

    /// Whether `player` has a valid body entity.
    fn has_pawn(&self, player: PlayerId) -> bool;

    /// Input buttons held by `player` this frame.
    fn buttons(&self, player: PlayerId) -> Result<Buttons, EntityError>;

    /// Current health. May exceed 100.
    fn health(&self, player: PlayerId) -> Result<i32, EntityError>;

    /// Overwrite health.
    fn set_health(&mut self, player: PlayerId, value: i32) -> Result<(), EntityError>;

    /// Current armor.
    fn armor(&self, player: PlayerId) -> Result<i32, EntityError>;

    /// Overwrite armor.
    fn set_armor(&mut self, player: PlayerId, value: i32) -> Result<(), EntityError>;

    /// Every weapon in `player`'s inventory.
    fn weapons(&self, player: PlayerId) -> Result<Vec<WeaponId>, EntityError>;

    /// The weapon `player` is holding, if any.
    fn active_weapon(&self, player: PlayerId) -> Result<Option<WeaponId>, EntityError>;

    /// Ammunition counts and capacities of `weapon`.
    fn weapon_ammo(&self, weapon: WeaponId) -> Result<WeaponSnapshot, EntityError>;

    /// Overwrite the primary magazine.
    fn set_primary_clip(&mut self, weapon: WeaponId, rounds: u32) -> Result<(), EntityError>;

    /// Overwrite the secondary magazine.
    fn set_secondary_clip(&mut self, weapon: WeaponId, rounds: u32) -> Result<(), EntityError>;

    /// Overwrite the primary reserve.
    fn set_reserve(&mut self, weapon: WeaponId, rounds: u32) -> Result<(), EntityError>;

    /// Announce a changed replicated field to the network layer.
    fn notify_state_changed(&mut self, field: NetworkedField) -> Result<(), EntityError>;

    /// Connected, alive, and in possession of a valid body.
    fn is_eligible(&self, player: PlayerId) -> bool {
        self.is_connected(player) && self.is_alive(player) && self.has_pawn(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unreadable_weapons_are_unusable() {
        let weapon = WeaponId::new(4);
        assert!(EntityError::WeaponGone(weapon).is_unusable_weapon());
        assert!(EntityError::MissingWeaponData(weapon).is_unusable_weapon());
        assert!(!EntityError::NoReserveSlot(weapon).is_unusable_weapon());
        assert!(!EntityError::PlayerGone(PlayerId::new(1)).is_unusable_weapon());
    }
}
