//! In-memory [`EntityAccess`] implementation.
//!
//! [`SandboxWorld`] stands in for the game engine in tests and in the
//! host binary's scripted round. It keeps players and weapons in ordered
//! maps, counts every write, and records every networked-field
//! notification in call order so callers can assert on exactly what would
//! have been replicated.

use std::collections::BTreeMap;

use refiller_types::{Buttons, NetworkedField, PlayerId, WeaponId, WeaponSnapshot};

use crate::facade::{EntityAccess, EntityError};

/// A player slot in the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxPlayer {
    /// Connection is valid.
    pub connected: bool,
    /// Body is alive.
    pub alive: bool,
    /// Body entity exists.
    pub has_pawn: bool,
    /// Buttons held this frame.
    pub buttons: Buttons,
    /// Health.
    pub health: i32,
    /// Armor.
    pub armor: i32,
    /// Inventory, in pickup order.
    pub weapons: Vec<WeaponId>,
    /// Wielded weapon.
    pub active_weapon: Option<WeaponId>,
}

/// Initial ammunition and capacities for a sandbox weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponSpec {
    /// Rounds in the primary magazine.
    pub primary_clip: u32,
    /// Rounds in the secondary magazine.
    pub secondary_clip: u32,
    /// Reserve rounds, `None` for weapons without a reserve pool.
    pub reserve: Option<u32>,
    /// Primary magazine capacity.
    pub max_clip: u32,
    /// Reserve capacity.
    pub max_reserve: u32,
}

impl WeaponSpec {
    /// A 30/90 rifle with the given loaded and reserve rounds.
    pub const fn rifle(primary_clip: u32, reserve: u32) -> Self {
        Self {
            primary_clip,
            secondary_clip: 0,
            reserve: Some(reserve),
            max_clip: 30,
            max_reserve: 90,
        }
    }

    /// A 12/24 pistol with the given loaded and reserve rounds.
    pub const fn pistol(primary_clip: u32, reserve: u32) -> Self {
        Self {
            primary_clip,
            secondary_clip: 0,
            reserve: Some(reserve),
            max_clip: 12,
            max_reserve: 24,
        }
    }
}

/// A weapon entity in the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxWeapon {
    /// Rounds in the primary magazine.
    pub primary_clip: u32,
    /// Rounds in the secondary magazine.
    pub secondary_clip: u32,
    /// Reserve rounds, `None` for weapons without a reserve pool.
    pub reserve: Option<u32>,
    /// Primary magazine capacity.
    pub max_clip: u32,
    /// Reserve capacity.
    pub max_reserve: u32,
    /// When set, the definition data is unreadable.
    pub definition_missing: bool,
}

impl From<WeaponSpec> for SandboxWeapon {
    fn from(spec: WeaponSpec) -> Self {
        Self {
            primary_clip: spec.primary_clip,
            secondary_clip: spec.secondary_clip,
            reserve: spec.reserve,
            max_clip: spec.max_clip,
            max_reserve: spec.max_reserve,
            definition_missing: false,
        }
    }
}

/// In-memory game world.
#[derive(Debug, Clone, Default)]
pub struct SandboxWorld {
    players: BTreeMap<PlayerId, SandboxPlayer>,
    weapons: BTreeMap<WeaponId, SandboxWeapon>,
    next_weapon: u32,
    notifications: Vec<NetworkedField>,
    writes: u32,
}

impl SandboxWorld {
    /// An empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `player` with a living body, empty-handed.
    pub fn spawn_player(&mut self, player: PlayerId, health: i32, armor: i32) {
        self.players.insert(
            player,
            SandboxPlayer {
                connected: true,
                alive: true,
                has_pawn: true,
                buttons: Buttons::NONE,
                health,
                armor,
                weapons: Vec::new(),
                active_weapon: None,
            },
        );
    }

    /// Create a weapon and put it in `player`'s inventory. The first weapon
    /// a player receives becomes the active one.
    pub fn give_weapon(&mut self, player: PlayerId, spec: WeaponSpec) -> WeaponId {
        self.next_weapon = self.next_weapon.saturating_add(1);
        let weapon = WeaponId::new(self.next_weapon);
        self.weapons.insert(weapon, SandboxWeapon::from(spec));
        if let Some(slot) = self.players.get_mut(&player) {
            slot.weapons.push(weapon);
            slot.active_weapon.get_or_insert(weapon);
        }
        weapon
    }

    /// Make `weapon` the one `player` is holding.
    pub fn wield(&mut self, player: PlayerId, weapon: WeaponId) {
        if let Some(slot) = self.players.get_mut(&player) {
            slot.active_weapon = Some(weapon);
        }
    }

    /// Set the buttons `player` holds this frame.
    pub fn set_buttons(&mut self, player: PlayerId, buttons: Buttons) {
        if let Some(slot) = self.players.get_mut(&player) {
            slot.buttons = buttons;
        }
    }

    /// Kill `player`'s body.
    pub fn kill(&mut self, player: PlayerId) {
        if let Some(slot) = self.players.get_mut(&player) {
            slot.alive = false;
        }
    }

    /// Free `player`'s slot and destroy their weapons.
    pub fn disconnect(&mut self, player: PlayerId) {
        if let Some(slot) = self.players.remove(&player) {
            for weapon in slot.weapons {
                self.weapons.remove(&weapon);
            }
        }
    }

    /// Make `weapon`'s definition data unreadable.
    pub fn break_weapon(&mut self, weapon: WeaponId) {
        if let Some(entry) = self.weapons.get_mut(&weapon) {
            entry.definition_missing = true;
        }
    }

    /// Direct access to a player slot.
    pub fn player_mut(&mut self, player: PlayerId) -> Option<&mut SandboxPlayer> {
        self.players.get_mut(&player)
    }

    /// Direct access to a weapon.
    pub fn weapon_mut(&mut self, weapon: WeaponId) -> Option<&mut SandboxWeapon> {
        self.weapons.get_mut(&weapon)
    }

    /// Every notification sent so far, in order.
    pub fn notifications(&self) -> &[NetworkedField] {
        &self.notifications
    }

    /// Number of entity writes so far.
    pub const fn write_count(&self) -> u32 {
        self.writes
    }

    /// Forget recorded writes and notifications.
    pub fn clear_log(&mut self) {
        self.notifications.clear();
        self.writes = 0;
    }

    fn player(&self, player: PlayerId) -> Result<&SandboxPlayer, EntityError> {
        match self.players.get(&player) {
            Some(slot) if slot.connected => Ok(slot),
            _ => Err(EntityError::PlayerGone(player)),
        }
    }

    fn pawn_mut(&mut self, player: PlayerId) -> Result<&mut SandboxPlayer, EntityError> {
        match self.players.get_mut(&player) {
            Some(slot) if slot.connected && slot.has_pawn => Ok(slot),
            Some(slot) if slot.connected => Err(EntityError::PawnMissing(player)),
            _ => Err(EntityError::PlayerGone(player)),
        }
    }

    fn weapon(&self, weapon: WeaponId) -> Result<&SandboxWeapon, EntityError> {
        match self.weapons.get(&weapon) {
            Some(entry) if entry.definition_missing => Err(EntityError::MissingWeaponData(weapon)),
            Some(entry) => Ok(entry),
            None => Err(EntityError::WeaponGone(weapon)),
        }
    }

    fn weapon_entry_mut(&mut self, weapon: WeaponId) -> Result<&mut SandboxWeapon, EntityError> {
        self.weapons
            .get_mut(&weapon)
            .ok_or(EntityError::WeaponGone(weapon))
    }

    const fn record_write(&mut self) {
        self.writes = self.writes.saturating_add(1);
    }
}

impl EntityAccess for SandboxWorld {
    fn connected_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|(_, slot)| slot.connected)
            .map(|(&id, _)| id)
            .collect()
    }

    fn is_connected(&self, player: PlayerId) -> bool {
        self.player(player).is_ok()
    }

    fn is_alive(&self, player: PlayerId) -> bool {
        self.player(player).is_ok_and(|slot| slot.alive)
    }

    fn has_pawn(&self, player: PlayerId) -> bool {
        self.player(player).is_ok_and(|slot| slot.has_pawn)
    }

    fn buttons(&self, player: PlayerId) -> Result<Buttons, EntityError> {
        self.player(player).map(|slot| slot.buttons)
    }

    fn health(&self, player: PlayerId) -> Result<i32, EntityError> {
        self.player(player).map(|slot| slot.health)
    }

    fn set_health(&mut self, player: PlayerId, value: i32) -> Result<(), EntityError> {
        self.pawn_mut(player)?.health = value;
        self.record_write();
        Ok(())
    }

    fn armor(&self, player: PlayerId) -> Result<i32, EntityError> {
        self.player(player).map(|slot| slot.armor)
    }

    fn set_armor(&mut self, player: PlayerId, value: i32) -> Result<(), EntityError> {
        self.pawn_mut(player)?.armor = value;
        self.record_write();
        Ok(())
    }

    fn weapons(&self, player: PlayerId) -> Result<Vec<WeaponId>, EntityError> {
        self.player(player).map(|slot| slot.weapons.clone())
    }

    fn active_weapon(&self, player: PlayerId) -> Result<Option<WeaponId>, EntityError> {
        self.player(player).map(|slot| slot.active_weapon)
    }

    fn weapon_ammo(&self, weapon: WeaponId) -> Result<WeaponSnapshot, EntityError> {
        let entry = self.weapon(weapon)?;
        Ok(WeaponSnapshot {
            primary_clip: entry.primary_clip,
            secondary_clip: entry.secondary_clip,
            reserve: entry.reserve,
            max_clip: entry.max_clip,
            max_reserve: entry.max_reserve,
        })
    }

    fn set_primary_clip(&mut self, weapon: WeaponId, rounds: u32) -> Result<(), EntityError> {
        self.weapon_entry_mut(weapon)?.primary_clip = rounds;
        self.record_write();
        Ok(())
    }

    fn set_secondary_clip(&mut self, weapon: WeaponId, rounds: u32) -> Result<(), EntityError> {
        self.weapon_entry_mut(weapon)?.secondary_clip = rounds;
        self.record_write();
        Ok(())
    }

    fn set_reserve(&mut self, weapon: WeaponId, rounds: u32) -> Result<(), EntityError> {
        let entry = self.weapon_entry_mut(weapon)?;
        let Some(reserve) = entry.reserve.as_mut() else {
            return Err(EntityError::NoReserveSlot(weapon));
        };
        *reserve = rounds;
        self.record_write();
        Ok(())
    }

    fn notify_state_changed(&mut self, field: NetworkedField) -> Result<(), EntityError> {
        self.notifications.push(field);
        Ok(())
    }
}
