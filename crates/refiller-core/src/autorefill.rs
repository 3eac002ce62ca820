//! Reserve auto-refill driven by reload and attack button edges.
//!
//! Once per frame the tracker looks at every eligible player's buttons and
//! active weapon. A press arms a one-shot refill for that button; holding
//! the button does not re-arm it, and releasing it disarms it so that the
//! next press starts fresh:
//!
//! ```text
//! Released --press--> Pressed(unconsumed) --refill--> Pressed(consumed)
//!     ^                        |                            |
//!     +-------release----------+------------release---------+
//! ```
//!
//! - **Reload**: pressed, unconsumed, reserve empty: reserve is set to its
//!   capacity. The magazine is left alone so the engine's own reload
//!   animation draws from the new reserve.
//! - **Attack**: pressed, unconsumed, magazine empty and reserve empty:
//!   same reserve refill.
//!
//! Both triggers read the same weapon snapshot and may fire in the same
//! frame.

use std::collections::BTreeMap;

use refiller_types::{Buttons, NetworkedField, PlayerId, WeaponId, WeaponSnapshot};
use tracing::{error, trace};

use crate::facade::{EntityAccess, EntityError};

/// Edge-tracking state of one player's reload and attack buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerRefillState {
    /// Reload was held on the previous observation.
    pub reload_pressed: bool,
    /// Attack was held on the previous observation.
    pub attack_pressed: bool,
    /// The current reload press already triggered its refill.
    pub reload_consumed: bool,
    /// The current attack press already triggered its refill.
    pub attack_consumed: bool,
}

impl PlayerRefillState {
    /// Record this frame's buttons. Any transition, up or down, clears the
    /// consumed flag of that button.
    pub const fn observe(&mut self, buttons: Buttons) {
        track_edge(
            &mut self.reload_pressed,
            &mut self.reload_consumed,
            buttons.contains(Buttons::RELOAD),
        );
        track_edge(
            &mut self.attack_pressed,
            &mut self.attack_consumed,
            buttons.contains(Buttons::ATTACK),
        );
    }

    /// Reload is held and its refill has not fired yet.
    pub const fn reload_armed(self) -> bool {
        self.reload_pressed && !self.reload_consumed
    }

    /// Attack is held and its refill has not fired yet.
    pub const fn attack_armed(self) -> bool {
        self.attack_pressed && !self.attack_consumed
    }
}

const fn track_edge(pressed: &mut bool, consumed: &mut bool, now: bool) {
    if *pressed != now {
        *pressed = now;
        *consumed = false;
    }
}

/// What one [`AutoRefillTracker::run_tick`] pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Eligible players inspected.
    pub players_checked: u32,
    /// Reload triggers that fired.
    pub reload_refills: u32,
    /// Attack triggers that fired.
    pub attack_refills: u32,
    /// Players skipped because of an entity fault.
    pub faults: u32,
}

/// Which triggers fired for one player this frame.
#[derive(Debug, Clone, Copy, Default)]
struct Fired {
    reload: bool,
    attack: bool,
}

/// Owner of every connected player's [`PlayerRefillState`].
#[derive(Debug, Clone, Default)]
pub struct AutoRefillTracker {
    states: BTreeMap<PlayerId, PlayerRefillState>,
}

impl AutoRefillTracker {
    /// An empty tracker.
    pub const fn new() -> Self {
        Self {
            states: BTreeMap::new(),
        }
    }

    /// Start tracking `player` from the released, unconsumed state,
    /// discarding anything recorded under the same id.
    pub fn track(&mut self, player: PlayerId) {
        self.states.insert(player, PlayerRefillState::default());
    }

    /// Stop tracking `player`. Returns whether an entry existed.
    pub fn forget(&mut self, player: PlayerId) -> bool {
        self.states.remove(&player).is_some()
    }

    /// Recorded state of `player`, if tracked.
    pub fn state(&self, player: PlayerId) -> Option<PlayerRefillState> {
        self.states.get(&player).copied()
    }

    /// Number of tracked players.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no player is tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Run one frame of edge detection and auto-refill over every eligible
    /// player. A fault on one player is logged and the pass moves on.
    pub fn run_tick<W: EntityAccess + ?Sized>(&mut self, world: &mut W) -> TickReport {
        let mut report = TickReport::default();

        for player in world.connected_players() {
            if !world.is_eligible(player) {
                continue;
            }
            report.players_checked = report.players_checked.saturating_add(1);

            match self.tick_player(world, player) {
                Ok(fired) => {
                    if fired.reload {
                        report.reload_refills = report.reload_refills.saturating_add(1);
                    }
                    if fired.attack {
                        report.attack_refills = report.attack_refills.saturating_add(1);
                    }
                }
                Err(err) => {
                    error!(%player, %err, "Auto-refill failed for player");
                    report.faults = report.faults.saturating_add(1);
                }
            }
        }

        report
    }

    fn tick_player<W: EntityAccess + ?Sized>(
        &mut self,
        world: &mut W,
        player: PlayerId,
    ) -> Result<Fired, EntityError> {
        let buttons = world.buttons(player)?;
        let state = self.states.entry(player).or_default();
        state.observe(buttons);

        let mut fired = Fired::default();
        if !state.reload_armed() && !state.attack_armed() {
            return Ok(fired);
        }

        let Some((weapon, ammo)) = active_weapon_ammo(&*world, player)? else {
            return Ok(fired);
        };

        let mut refilled = false;

        if state.reload_armed() && ammo.reserve_empty() {
            refilled = refill_reserve(world, weapon, &ammo)?;
            state.reload_consumed = true;
            fired.reload = true;
            trace!(%player, %weapon, "Reserve refilled on reload press");
        }

        if state.attack_armed() && ammo.clip_empty() && ammo.reserve_empty() {
            if !refilled {
                refill_reserve(world, weapon, &ammo)?;
            }
            state.attack_consumed = true;
            fired.attack = true;
            trace!(%player, %weapon, "Reserve refilled on attack with empty weapon");
        }

        Ok(fired)
    }
}

/// The active weapon and its ammunition, or `None` when the player holds
/// nothing usable this frame.
fn active_weapon_ammo<W: EntityAccess + ?Sized>(
    world: &W,
    player: PlayerId,
) -> Result<Option<(WeaponId, WeaponSnapshot)>, EntityError> {
    let Some(weapon) = world.active_weapon(player)? else {
        return Ok(None);
    };
    match world.weapon_ammo(weapon) {
        Ok(ammo) => Ok(Some((weapon, ammo))),
        Err(err) if err.is_unusable_weapon() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Set the reserve to capacity. Weapons without a reserve pool are left
/// as they are. Returns whether a write happened.
fn refill_reserve<W: EntityAccess + ?Sized>(
    world: &mut W,
    weapon: WeaponId,
    ammo: &WeaponSnapshot,
) -> Result<bool, EntityError> {
    if ammo.reserve.is_none() || ammo.reserve == Some(ammo.max_reserve) {
        return Ok(false);
    }
    world.set_reserve(weapon, ammo.max_reserve)?;
    world.notify_state_changed(NetworkedField::Reserve(weapon))?;
    Ok(true)
}
