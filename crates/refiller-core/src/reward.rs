//! Post-kill reward engine.
//!
//! A kill produces one [`PendingReward`]: the ids of the players to reward
//! plus a copy of the policy at the moment of the kill. The reward is not
//! applied inside the kill event; the host simulates one more step first,
//! so eligibility is checked again when [`apply_reward`] runs at the start
//! of the next frame.
//!
//! Per recipient the order is fixed: ammunition, then health, then armor.
//! A weapon that cannot be read is skipped, exactly as the auto-refill pass
//! does. Any other fault on one weapon or one recipient is logged and
//! counted, and the rest of the batch still runs.

use refiller_types::{
    AmmoRefill, KillEvent, NetworkedField, PlayerId, RefillAmount, WeaponId, WeaponSnapshot,
};
use tracing::{debug, error};

use crate::config::Policy;
use crate::facade::{EntityAccess, EntityError};

/// A kill reward waiting for the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReward {
    /// The player who died.
    pub victim: PlayerId,
    /// Players to reward, attacker first.
    pub recipients: Vec<PlayerId>,
    /// Policy in effect when the kill happened.
    pub policy: Policy,
}

impl PendingReward {
    /// Build the reward for `event` under `policy`.
    ///
    /// The set is the attacker plus, when assist rewards are on, an
    /// assister distinct from both attacker and victim. A self-kill yields
    /// an empty set.
    pub fn for_kill(event: &KillEvent, policy: Policy) -> Self {
        let mut recipients = Vec::with_capacity(2);
        if !event.is_self_kill() {
            if let Some(attacker) = event.attacker {
                recipients.push(attacker);
            }
            if policy.assist_refill
                && let Some(assister) = event.assister
                && event.attacker != Some(assister)
                && assister != event.victim
            {
                recipients.push(assister);
            }
        }
        Self {
            victim: event.victim,
            recipients,
            policy,
        }
    }

    /// Whether there is nobody to reward.
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

/// What one [`apply_reward`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardOutcome {
    /// Recipients processed without any fault.
    pub rewarded: u32,
    /// Recipients no longer connected, alive, or embodied.
    pub ineligible: u32,
    /// Faults caught (per weapon or per vital).
    pub faults: u32,
    /// Weapons whose ammunition was written.
    pub weapons_refilled: u32,
}

/// Which vital statistic a reward step touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vital {
    Health,
    Armor,
}

impl Vital {
    fn read<W: EntityAccess + ?Sized>(
        self,
        world: &W,
        player: PlayerId,
    ) -> Result<i32, EntityError> {
        match self {
            Self::Health => world.health(player),
            Self::Armor => world.armor(player),
        }
    }

    fn write<W: EntityAccess + ?Sized>(
        self,
        world: &mut W,
        player: PlayerId,
        value: i32,
    ) -> Result<(), EntityError> {
        match self {
            Self::Health => world.set_health(player, value)?,
            Self::Armor => world.set_armor(player, value)?,
        }
        world.notify_state_changed(self.field(player))
    }

    const fn field(self, player: PlayerId) -> NetworkedField {
        match self {
            Self::Health => NetworkedField::Health(player),
            Self::Armor => NetworkedField::Armor(player),
        }
    }
}

/// Apply a deferred kill reward.
pub fn apply_reward<W: EntityAccess + ?Sized>(
    world: &mut W,
    reward: &PendingReward,
) -> RewardOutcome {
    let mut outcome = RewardOutcome::default();

    for &player in &reward.recipients {
        if !world.is_eligible(player) {
            debug!(%player, victim = %reward.victim, "Reward recipient no longer eligible");
            outcome.ineligible = outcome.ineligible.saturating_add(1);
            continue;
        }

        let faults_before = outcome.faults;
        refill_ammo(world, player, reward.policy.ammo, &mut outcome);
        restore_vital(world, player, Vital::Health, reward.policy.health, &mut outcome);
        restore_vital(world, player, Vital::Armor, reward.policy.armor, &mut outcome);

        if outcome.faults == faults_before {
            outcome.rewarded = outcome.rewarded.saturating_add(1);
        }
    }

    outcome
}

fn refill_ammo<W: EntityAccess + ?Sized>(
    world: &mut W,
    player: PlayerId,
    mode: AmmoRefill,
    outcome: &mut RewardOutcome,
) {
    let weapons = match mode {
        AmmoRefill::Off => return,
        AmmoRefill::All => world.weapons(player),
        AmmoRefill::Current => world
            .active_weapon(player)
            .map(|active| active.into_iter().collect()),
    };

    let weapons: Vec<WeaponId> = match weapons {
        Ok(weapons) => weapons,
        Err(err) => {
            error!(%player, %err, "Failed to list weapons for ammo reward");
            outcome.faults = outcome.faults.saturating_add(1);
            return;
        }
    };

    for weapon in weapons {
        match refill_weapon(world, weapon) {
            Ok(true) => outcome.weapons_refilled = outcome.weapons_refilled.saturating_add(1),
            Ok(false) => {}
            Err(err) if err.is_unusable_weapon() => {
                debug!(%player, %weapon, %err, "Skipping unusable weapon");
            }
            Err(err) => {
                error!(%player, %weapon, %err, "Failed to refill weapon ammo");
                outcome.faults = outcome.faults.saturating_add(1);
            }
        }
    }
}

fn restore_vital<W: EntityAccess + ?Sized>(
    world: &mut W,
    player: PlayerId,
    vital: Vital,
    amount: RefillAmount,
    outcome: &mut RewardOutcome,
) {
    if amount.is_none() {
        return;
    }
    let result = vital.read(&*world, player).and_then(|current| {
        let target = amount.apply(current);
        if target == current {
            Ok(())
        } else {
            vital.write(world, player, target)
        }
    });
    if let Err(err) = result {
        error!(%player, ?vital, %err, "Failed to restore vital");
        outcome.faults = outcome.faults.saturating_add(1);
    }
}

/// Capacity a secondary magazine in use is refilled to.
///
/// Weapon definitions expose no secondary capacity, so the primary one is
/// used. Kept in one place so the rule can change without touching the
/// refill procedure.
const fn secondary_clip_capacity(weapon: &WeaponSnapshot) -> u32 {
    weapon.max_clip
}

/// Fill one weapon's magazines and reserve to capacity.
///
/// Only fields whose value changes are written, and each write is
/// announced with its own notification. Returns whether anything was
/// written.
pub fn refill_weapon<W: EntityAccess + ?Sized>(
    world: &mut W,
    weapon: WeaponId,
) -> Result<bool, EntityError> {
    let ammo = world.weapon_ammo(weapon)?;
    let mut written = false;

    if ammo.primary_clip != ammo.max_clip {
        world.set_primary_clip(weapon, ammo.max_clip)?;
        world.notify_state_changed(NetworkedField::PrimaryClip(weapon))?;
        written = true;
    }

    if let Some(reserve) = ammo.reserve
        && reserve != ammo.max_reserve
    {
        world.set_reserve(weapon, ammo.max_reserve)?;
        world.notify_state_changed(NetworkedField::Reserve(weapon))?;
        written = true;
    }

    let secondary_target = secondary_clip_capacity(&ammo);
    if ammo.secondary_clip > 0 && ammo.secondary_clip != secondary_target {
        world.set_secondary_clip(weapon, secondary_target)?;
        world.notify_state_changed(NetworkedField::SecondaryClip(weapon))?;
        written = true;
    }

    Ok(written)
}
