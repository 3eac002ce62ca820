//! A scripted round played against the sandbox world.
//!
//! Three players: a killer, a victim and an assister. The round covers a
//! deferred kill reward, a held reload press on an empty reserve, an
//! attack with a fully empty weapon, and a mid-round disconnect.

use refiller_core::plugin::{FrameReport, Refiller};
use refiller_core::sandbox::{SandboxWorld, WeaponSpec};
use refiller_types::{Buttons, KillEvent, PlayerId};
use tracing::{debug, info};

const KILLER: PlayerId = PlayerId::new(1);
const VICTIM: PlayerId = PlayerId::new(2);
const ASSISTER: PlayerId = PlayerId::new(3);

/// Totals over every frame of a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    /// Frames simulated.
    pub frames: u32,
    /// Reward recipients that were fully served.
    pub rewarded: u32,
    /// Reward recipients skipped as ineligible.
    pub ineligible: u32,
    /// Reload-triggered reserve refills.
    pub reload_refills: u32,
    /// Attack-triggered reserve refills.
    pub attack_refills: u32,
    /// Entity faults from rewards and auto-refill.
    pub faults: u32,
}

impl RoundSummary {
    fn absorb(&mut self, report: &FrameReport) {
        self.frames = self.frames.saturating_add(1);
        for outcome in &report.rewards {
            self.rewarded = self.rewarded.saturating_add(outcome.rewarded);
            self.ineligible = self.ineligible.saturating_add(outcome.ineligible);
            self.faults = self.faults.saturating_add(outcome.faults);
        }
        if let Some(tick) = report.auto_refill {
            self.reload_refills = self.reload_refills.saturating_add(tick.reload_refills);
            self.attack_refills = self.attack_refills.saturating_add(tick.attack_refills);
            self.faults = self.faults.saturating_add(tick.faults);
        }
    }
}

struct Round<'a> {
    refiller: &'a mut Refiller,
    world: SandboxWorld,
    summary: RoundSummary,
}

impl Round<'_> {
    fn frame(&mut self) {
        let report = self.refiller.on_frame(&mut self.world);
        debug!(frame = self.summary.frames, ?report, "Frame done");
        self.summary.absorb(&report);
    }
}

/// Play the scripted round with `refiller`'s current policy.
pub fn play_scripted_round(refiller: &mut Refiller) -> RoundSummary {
    let mut world = SandboxWorld::new();
    world.spawn_player(KILLER, 60, 0);
    world.spawn_player(VICTIM, 100, 50);
    world.spawn_player(ASSISTER, 40, 0);
    let rifle = world.give_weapon(KILLER, WeaponSpec::rifle(0, 0));
    let pistol = world.give_weapon(ASSISTER, WeaponSpec::pistol(3, 0));

    for player in [KILLER, VICTIM, ASSISTER] {
        refiller.on_player_connect(player);
    }

    let mut round = Round {
        refiller,
        world,
        summary: RoundSummary::default(),
    };
    round.frame();

    info!(victim = %VICTIM, attacker = %KILLER, assister = %ASSISTER, "Kill");
    let kill = KillEvent {
        victim: VICTIM,
        attacker: Some(KILLER),
        assister: Some(ASSISTER),
    };
    round.refiller.on_kill(&round.world, &kill);
    round.world.kill(VICTIM);
    round.frame();

    // The assister empties their reserve and holds reload for three frames.
    if let Some(weapon) = round.world.weapon_mut(pistol) {
        weapon.reserve = Some(0);
    }
    round.world.set_buttons(ASSISTER, Buttons::RELOAD);
    for _ in 0..3 {
        round.frame();
    }
    round.world.set_buttons(ASSISTER, Buttons::NONE);
    round.frame();

    // The killer fires with nothing left.
    if let Some(weapon) = round.world.weapon_mut(rifle) {
        weapon.primary_clip = 0;
        weapon.reserve = Some(0);
    }
    round.world.set_buttons(KILLER, Buttons::ATTACK);
    round.frame();

    round.world.disconnect(ASSISTER);
    round.refiller.on_player_disconnect(ASSISTER);
    round.frame();

    round.summary
}
