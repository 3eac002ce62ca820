//! End-to-end scenarios for the refiller module.
//!
//! Each test drives a [`Refiller`] against a [`SandboxWorld`] the way the
//! host would: kill events from event dispatch, then `on_frame` at the
//! start of each following frame.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::too_many_lines)]

use refiller_core::config::{ConfigStore, Policy};
use refiller_core::facade::EntityAccess;
use refiller_core::plugin::Refiller;
use refiller_core::sandbox::{SandboxWorld, WeaponSpec};
use refiller_core::setting::Setting;
use refiller_types::{AmmoRefill, Buttons, KillEvent, NetworkedField, PlayerId, RefillAmount};

const KILLER: PlayerId = PlayerId::new(1);
const VICTIM: PlayerId = PlayerId::new(2);
const HELPER: PlayerId = PlayerId::new(3);

fn refiller(policy: Policy) -> Refiller {
    Refiller::new(ConfigStore::in_memory(policy))
}

fn vitals_only(health: RefillAmount, armor: RefillAmount) -> Policy {
    Policy {
        health,
        armor,
        ammo: AmmoRefill::Off,
        auto_refill_clip: false,
        ..Policy::default()
    }
}

fn kill_by(attacker: PlayerId, assister: Option<PlayerId>) -> KillEvent {
    KillEvent {
        victim: VICTIM,
        attacker: Some(attacker),
        assister,
    }
}

fn arena() -> SandboxWorld {
    let mut world = SandboxWorld::new();
    world.spawn_player(KILLER, 100, 0);
    world.spawn_player(VICTIM, 100, 0);
    world.spawn_player(HELPER, 100, 0);
    world
}

// =============================================================================
// Reward engine
// =============================================================================

#[test]
fn vital_laws_hold_for_every_starting_value() {
    for policy_amount in [RefillAmount::None, RefillAmount::All, RefillAmount::Add(1), RefillAmount::Add(40)] {
        for start in 0..=100 {
            let mut world = arena();
            let killer = world.player_mut(KILLER).unwrap();
            killer.health = start;
            killer.armor = start;
            let mut refiller = refiller(vitals_only(policy_amount, policy_amount));

            refiller.on_kill(&world, &kill_by(KILLER, None));
            refiller.on_frame(&mut world);

            let expected = match policy_amount {
                RefillAmount::None => start,
                RefillAmount::All => 100,
                RefillAmount::Add(n) => (start + i32::try_from(n).unwrap()).min(100),
            };
            assert_eq!(world.health(KILLER).unwrap(), expected, "{policy_amount} from {start}");
            assert_eq!(world.armor(KILLER).unwrap(), expected, "{policy_amount} from {start}");
        }
    }
}

#[test]
fn killer_reward_end_to_end() {
    let mut world = arena();
    let killer = world.player_mut(KILLER).unwrap();
    killer.health = 60;
    killer.armor = 0;
    let rifle = world.give_weapon(KILLER, WeaponSpec::rifle(0, 0));
    let mut refiller = refiller(Policy {
        health: RefillAmount::Add(25),
        armor: RefillAmount::Add(15),
        ammo: AmmoRefill::Current,
        ..Policy::default()
    });

    refiller.on_kill(&world, &kill_by(KILLER, None));
    refiller.on_frame(&mut world);

    assert_eq!(world.health(KILLER).unwrap(), 85);
    assert_eq!(world.armor(KILLER).unwrap(), 15);
    let ammo = world.weapon_ammo(rifle).unwrap();
    assert_eq!(ammo.primary_clip, 30);
    assert_eq!(ammo.reserve, Some(90));
}

#[test]
fn full_health_reward_writes_once() {
    let mut world = arena();
    world.player_mut(KILLER).unwrap().health = 95;
    let mut refiller = refiller(vitals_only(RefillAmount::All, RefillAmount::None));

    refiller.on_kill(&world, &kill_by(KILLER, None));
    refiller.on_frame(&mut world);

    assert_eq!(world.health(KILLER).unwrap(), 100);
    assert_eq!(world.write_count(), 1);
    assert_eq!(world.notifications(), &[NetworkedField::Health(KILLER)]);
}

#[test]
fn ammo_modes_select_weapons() {
    for mode in [AmmoRefill::Off, AmmoRefill::Current, AmmoRefill::All] {
        let mut world = arena();
        let rifle = world.give_weapon(KILLER, WeaponSpec::rifle(4, 10));
        let pistol = world.give_weapon(KILLER, WeaponSpec::pistol(1, 0));
        let mut refiller = refiller(Policy {
            ammo: mode,
            ..vitals_only(RefillAmount::None, RefillAmount::None)
        });

        refiller.on_kill(&world, &kill_by(KILLER, None));
        refiller.on_frame(&mut world);

        let rifle_ammo = world.weapon_ammo(rifle).unwrap();
        let pistol_ammo = world.weapon_ammo(pistol).unwrap();
        match mode {
            AmmoRefill::Off => {
                assert_eq!((rifle_ammo.primary_clip, rifle_ammo.reserve), (4, Some(10)));
                assert_eq!((pistol_ammo.primary_clip, pistol_ammo.reserve), (1, Some(0)));
            }
            AmmoRefill::Current => {
                assert_eq!((rifle_ammo.primary_clip, rifle_ammo.reserve), (30, Some(90)));
                assert_eq!((pistol_ammo.primary_clip, pistol_ammo.reserve), (1, Some(0)));
            }
            AmmoRefill::All => {
                assert_eq!((rifle_ammo.primary_clip, rifle_ammo.reserve), (30, Some(90)));
                assert_eq!((pistol_ammo.primary_clip, pistol_ammo.reserve), (12, Some(24)));
            }
        }
    }
}

#[test]
fn unusable_weapon_is_skipped_and_the_rest_still_refilled() {
    let mut world = arena();
    world.player_mut(KILLER).unwrap().health = 50;
    let broken = world.give_weapon(KILLER, WeaponSpec::rifle(0, 0));
    let pistol = world.give_weapon(KILLER, WeaponSpec::pistol(0, 0));
    world.break_weapon(broken);
    let mut refiller = refiller(Policy {
        ammo: AmmoRefill::All,
        auto_refill_clip: false,
        ..Policy::default()
    });

    refiller.on_kill(&world, &kill_by(KILLER, None));
    let report = refiller.on_frame(&mut world);

    let outcome = report.rewards.first().copied().unwrap();
    assert_eq!(outcome.faults, 0);
    assert_eq!(outcome.rewarded, 1);
    assert_eq!(outcome.weapons_refilled, 1);
    assert_eq!(world.weapon_ammo(pistol).unwrap().primary_clip, 12);
    assert_eq!(world.health(KILLER).unwrap(), 75);
}

#[test]
fn unusable_active_weapon_still_rewards_vitals() {
    let mut world = arena();
    world.player_mut(KILLER).unwrap().health = 50;
    let rifle = world.give_weapon(KILLER, WeaponSpec::rifle(0, 0));
    world.break_weapon(rifle);
    let mut refiller = refiller(Policy {
        ammo: AmmoRefill::Current,
        auto_refill_clip: false,
        ..Policy::default()
    });

    refiller.on_kill(&world, &kill_by(KILLER, None));
    let report = refiller.on_frame(&mut world);

    let outcome = report.rewards.first().copied().unwrap();
    assert_eq!(outcome.faults, 0);
    assert_eq!(outcome.rewarded, 1);
    assert_eq!(outcome.weapons_refilled, 0);
    assert_eq!(world.health(KILLER).unwrap(), 75);
}

#[test]
fn current_mode_follows_weapon_switch() {
    let mut world = arena();
    let rifle = world.give_weapon(KILLER, WeaponSpec::rifle(5, 10));
    let pistol = world.give_weapon(KILLER, WeaponSpec::pistol(2, 4));
    world.wield(KILLER, pistol);
    let mut refiller = refiller(Policy {
        ammo: AmmoRefill::Current,
        ..vitals_only(RefillAmount::None, RefillAmount::None)
    });

    refiller.on_kill(&world, &kill_by(KILLER, None));
    refiller.on_frame(&mut world);

    let pistol_ammo = world.weapon_ammo(pistol).unwrap();
    assert_eq!((pistol_ammo.primary_clip, pistol_ammo.reserve), (12, Some(24)));
    let rifle_ammo = world.weapon_ammo(rifle).unwrap();
    assert_eq!((rifle_ammo.primary_clip, rifle_ammo.reserve), (5, Some(10)));

    // A second kill with the pistol already full changes nothing.
    world.clear_log();
    refiller.on_kill(&world, &kill_by(KILLER, None));
    refiller.on_frame(&mut world);
    assert_eq!(world.write_count(), 0);
    assert!(world.notifications().is_empty());

    // Switching back makes the rifle the refilled one.
    world.wield(KILLER, rifle);
    refiller.on_kill(&world, &kill_by(KILLER, None));
    refiller.on_frame(&mut world);
    let rifle_ammo = world.weapon_ammo(rifle).unwrap();
    assert_eq!((rifle_ammo.primary_clip, rifle_ammo.reserve), (30, Some(90)));
    assert_eq!(
        world.notifications(),
        &[NetworkedField::PrimaryClip(rifle), NetworkedField::Reserve(rifle)]
    );
}

#[test]
fn assister_rewarded_only_when_enabled_distinct_and_alive() {
    // Enabled, distinct, alive.
    let mut world = arena();
    world.player_mut(HELPER).unwrap().health = 10;
    let mut enabled = refiller(vitals_only(RefillAmount::All, RefillAmount::None));
    enabled.on_kill(&world, &kill_by(KILLER, Some(HELPER)));
    enabled.on_frame(&mut world);
    assert_eq!(world.health(HELPER).unwrap(), 100);

    // Disabled.
    let mut world = arena();
    world.player_mut(HELPER).unwrap().health = 10;
    let mut disabled = refiller(Policy {
        assist_refill: false,
        ..vitals_only(RefillAmount::All, RefillAmount::None)
    });
    disabled.on_kill(&world, &kill_by(KILLER, Some(HELPER)));
    disabled.on_frame(&mut world);
    assert_eq!(world.health(HELPER).unwrap(), 10);

    // Dies between the kill and the next frame.
    let mut world = arena();
    world.player_mut(HELPER).unwrap().health = 10;
    let mut late = refiller(vitals_only(RefillAmount::All, RefillAmount::None));
    late.on_kill(&world, &kill_by(KILLER, Some(HELPER)));
    world.kill(HELPER);
    let report = late.on_frame(&mut world);
    assert_eq!(world.health(HELPER).unwrap(), 10);
    assert_eq!(report.rewards.first().map(|o| o.ineligible), Some(1));
}

#[test]
fn attacker_disconnecting_before_frame_gets_nothing() {
    let mut world = arena();
    world.player_mut(KILLER).unwrap().health = 10;
    let mut refiller = refiller(vitals_only(RefillAmount::All, RefillAmount::None));

    refiller.on_kill(&world, &kill_by(KILLER, None));
    world.disconnect(KILLER);
    refiller.on_player_disconnect(KILLER);
    let report = refiller.on_frame(&mut world);

    assert_eq!(report.rewards.first().map(|o| o.rewarded), Some(0));
    assert_eq!(world.write_count(), 0);
}

#[test]
fn suicide_rewards_nobody() {
    let mut world = arena();
    world.player_mut(VICTIM).unwrap().health = 20;
    let mut refiller = refiller(vitals_only(RefillAmount::All, RefillAmount::All));
    let suicide = KillEvent {
        victim: VICTIM,
        attacker: Some(VICTIM),
        assister: Some(HELPER),
    };

    assert!(!refiller.on_kill(&world, &suicide));
    let report = refiller.on_frame(&mut world);
    assert!(report.rewards.is_empty());
    assert_eq!(world.write_count(), 0);
}

// =============================================================================
// Auto-refill tracker
// =============================================================================

#[test]
fn held_reload_refills_once_per_press() {
    let mut world = arena();
    let rifle = world.give_weapon(KILLER, WeaponSpec::rifle(10, 0));
    let mut refiller = refiller(Policy::default());
    refiller.on_player_connect(KILLER);
    world.set_buttons(KILLER, Buttons::RELOAD);

    refiller.on_frame(&mut world);
    assert_eq!(world.weapon_ammo(rifle).unwrap().reserve, Some(90));
    assert_eq!(world.write_count(), 1);

    // Drain the reserve while the button stays down: no second refill.
    world.weapon_mut(rifle).unwrap().reserve = Some(0);
    for _ in 2..=5 {
        let report = refiller.on_frame(&mut world);
        assert_eq!(report.auto_refill.map(|r| r.reload_refills), Some(0));
    }
    assert_eq!(world.write_count(), 1);
    assert_eq!(world.weapon_ammo(rifle).unwrap().reserve, Some(0));

    // Release, then press again: armed afresh.
    world.set_buttons(KILLER, Buttons::NONE);
    refiller.on_frame(&mut world);
    world.set_buttons(KILLER, Buttons::RELOAD);
    let report = refiller.on_frame(&mut world);
    assert_eq!(report.auto_refill.map(|r| r.reload_refills), Some(1));
    assert_eq!(world.weapon_ammo(rifle).unwrap().reserve, Some(90));
}

#[test]
fn attack_refill_needs_empty_clip_and_reserve() {
    let mut world = arena();
    let rifle = world.give_weapon(KILLER, WeaponSpec::rifle(1, 0));
    let mut refiller = refiller(Policy::default());
    world.set_buttons(KILLER, Buttons::ATTACK);

    refiller.on_frame(&mut world);
    assert_eq!(world.weapon_ammo(rifle).unwrap().reserve, Some(0));

    world.weapon_mut(rifle).unwrap().primary_clip = 0;
    refiller.on_frame(&mut world);
    let ammo = world.weapon_ammo(rifle).unwrap();
    assert_eq!(ammo.reserve, Some(90));
    assert_eq!(ammo.primary_clip, 0);
}

#[test]
fn reconnect_starts_from_released_state() {
    let mut world = arena();
    let rifle = world.give_weapon(KILLER, WeaponSpec::rifle(0, 0));
    let mut refiller = refiller(Policy::default());
    refiller.on_player_connect(KILLER);
    world.set_buttons(KILLER, Buttons::RELOAD);
    refiller.on_frame(&mut world);
    assert!(refiller.tracker().state(KILLER).unwrap().reload_consumed);
    assert_eq!(world.weapon_ammo(rifle).unwrap().reserve, Some(90));

    world.disconnect(KILLER);
    refiller.on_player_disconnect(KILLER);
    assert!(refiller.tracker().state(KILLER).is_none());

    world.spawn_player(KILLER, 100, 0);
    let new_rifle = world.give_weapon(KILLER, WeaponSpec::rifle(0, 0));
    refiller.on_player_connect(KILLER);
    let state = refiller.tracker().state(KILLER).unwrap();
    assert!(!state.reload_pressed && !state.reload_consumed);
    assert!(!state.attack_pressed && !state.attack_consumed);

    world.set_buttons(KILLER, Buttons::RELOAD);
    refiller.on_frame(&mut world);
    assert_eq!(world.weapon_ammo(new_rifle).unwrap().reserve, Some(90));
}

#[test]
fn deferred_reward_runs_before_auto_refill_in_same_frame() {
    let mut world = arena();
    let rifle = world.give_weapon(KILLER, WeaponSpec::rifle(0, 0));
    let mut refiller = refiller(Policy {
        ammo: AmmoRefill::Current,
        ..Policy::default()
    });
    world.set_buttons(KILLER, Buttons::RELOAD);

    refiller.on_kill(&world, &kill_by(KILLER, None));
    let report = refiller.on_frame(&mut world);

    // The reward already filled the reserve, so the reload press finds it
    // full and stays armed.
    assert_eq!(report.auto_refill.map(|r| r.reload_refills), Some(0));
    assert_eq!(world.weapon_ammo(rifle).unwrap().reserve, Some(90));
    assert!(!refiller.tracker().state(KILLER).unwrap().reload_consumed);
}

#[test]
fn disabling_auto_refill_at_runtime_stops_the_pass() {
    let mut world = arena();
    let rifle = world.give_weapon(KILLER, WeaponSpec::rifle(0, 0));
    let mut refiller = refiller(Policy::default());
    refiller.apply_setting(Setting::parse("autorefillclip", "0").unwrap());
    world.set_buttons(KILLER, Buttons::RELOAD);

    let report = refiller.on_frame(&mut world);

    assert!(report.auto_refill.is_none());
    assert_eq!(world.weapon_ammo(rifle).unwrap().reserve, Some(0));
}
