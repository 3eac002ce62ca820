//! Host callback surface.
//!
//! [`Refiller`] is the one object the host engine talks to. It owns the
//! config store, the auto-refill tracker and the next-frame queue, and
//! exposes one method per host callback:
//!
//! | Host callback        | Method                                   |
//! |----------------------|------------------------------------------|
//! | player connected     | [`Refiller::on_player_connect`]          |
//! | player disconnected  | [`Refiller::on_player_disconnect`]       |
//! | player death event   | [`Refiller::on_kill`]                    |
//! | start of every frame | [`Refiller::on_frame`]                   |
//! | console setter       | [`Refiller::apply_setting`]              |
//! | console reload       | [`Refiller::reload_config`]              |
//!
//! A host that controls log output can attach a [`VerbositySink`]; it is
//! told the configured `loglevel` at startup and again every time a
//! setting or a reload changes it.
//!
//! All callbacks arrive on the simulation thread, one at a time, so the
//! tracker table needs no locking. No callback returns an entity fault to
//! the host: faults are logged and the worst outcome is a refill that did
//! not happen this time.

use std::fmt;

use refiller_types::{KillEvent, PlayerId, Verbosity};
use tracing::{debug, error, info};

use crate::autorefill::{AutoRefillTracker, TickReport};
use crate::config::{ConfigError, ConfigStore, Policy};
use crate::facade::EntityAccess;
use crate::reward::{self, PendingReward, RewardOutcome};
use crate::schedule::NextFrameQueue;
use crate::setting::{Setting, SettingChange};

/// Summary of one [`Refiller::on_frame`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// One outcome per deferred kill reward that ran.
    pub rewards: Vec<RewardOutcome>,
    /// Auto-refill pass result, `None` when auto-refill is off.
    pub auto_refill: Option<TickReport>,
}

/// Receiver for the module's log verbosity.
pub trait VerbositySink: fmt::Debug {
    /// The module now logs at `verbosity`.
    fn set_verbosity(&mut self, verbosity: Verbosity);
}

/// The refiller module as seen by the host.
#[derive(Debug)]
pub struct Refiller {
    config: ConfigStore,
    tracker: AutoRefillTracker,
    pending: NextFrameQueue<PendingReward>,
    log_sink: Option<Box<dyn VerbositySink>>,
}

impl Refiller {
    /// Create the module around a loaded config store.
    pub fn new(config: ConfigStore) -> Self {
        Self::build(config, None)
    }

    /// Create the module and keep `sink` in step with the `loglevel`
    /// field. The sink hears the configured level before anything is
    /// logged.
    pub fn with_verbosity_sink(config: ConfigStore, sink: Box<dyn VerbositySink>) -> Self {
        Self::build(config, Some(sink))
    }

    fn build(config: ConfigStore, mut log_sink: Option<Box<dyn VerbositySink>>) -> Self {
        let policy = config.policy();
        if let Some(sink) = log_sink.as_deref_mut() {
            sink.set_verbosity(policy.log_level);
        }
        info!(
            assist = policy.assist_refill,
            health = %policy.health,
            ammo = %policy.ammo,
            armor = %policy.armor,
            auto_refill_clip = policy.auto_refill_clip,
            log_level = %policy.log_level,
            "Refiller loaded"
        );
        Self {
            config,
            tracker: AutoRefillTracker::new(),
            pending: NextFrameQueue::new(),
            log_sink,
        }
    }

    /// The policy in effect.
    pub const fn policy(&self) -> Policy {
        self.config.policy()
    }

    /// The config store.
    pub const fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// The auto-refill tracker.
    pub const fn tracker(&self) -> &AutoRefillTracker {
        &self.tracker
    }

    /// Number of kill rewards waiting for the next frame.
    pub fn pending_rewards(&self) -> usize {
        self.pending.len()
    }

    /// A player took a slot.
    pub fn on_player_connect(&mut self, player: PlayerId) {
        self.tracker.track(player);
        debug!(%player, "Player connected, tracking started");
    }

    /// A player left. Their tracking entry is removed, not reset, so a new
    /// player in the same slot starts clean.
    pub fn on_player_disconnect(&mut self, player: PlayerId) {
        if self.tracker.forget(player) {
            debug!(%player, "Player disconnected, tracking data cleared");
        }
    }

    /// A player died. Defers the reward to the next frame and returns
    /// whether anything was queued.
    pub fn on_kill<W: EntityAccess + ?Sized>(&mut self, world: &W, event: &KillEvent) -> bool {
        if !world.is_connected(event.victim) {
            return false;
        }
        let reward = PendingReward::for_kill(event, self.policy());
        if reward.is_empty() {
            debug!(victim = %event.victim, "Kill earns no reward");
            return false;
        }
        self.pending.defer(reward);
        true
    }

    /// Start of a simulation frame: run deferred kill rewards, then the
    /// auto-refill pass.
    pub fn on_frame<W: EntityAccess + ?Sized>(&mut self, world: &mut W) -> FrameReport {
        let rewards = self
            .pending
            .drain()
            .iter()
            .map(|pending| reward::apply_reward(world, pending))
            .collect();

        let auto_refill = self
            .policy()
            .auto_refill_clip
            .then(|| self.tracker.run_tick(world));

        FrameReport {
            rewards,
            auto_refill,
        }
    }

    /// Apply a validated setting and persist it. A failed save is logged;
    /// the change stays in effect for the session.
    pub fn apply_setting(&mut self, setting: Setting) -> SettingChange {
        let before = self.policy().log_level;
        let change = self.config.apply(setting);
        self.sync_verbosity(before);
        info!(key = %change.key, old = %change.old, new = %change.new, "Setting changed");
        if let Err(err) = self.config.save() {
            error!(%err, "Failed to save config");
        }
        change
    }

    /// Re-read the config file. On error the current policy stays.
    pub fn reload_config(&mut self) -> Result<Policy, ConfigError> {
        let before = self.policy().log_level;
        match self.config.reload() {
            Ok(policy) => {
                self.sync_verbosity(before);
                info!("Configuration reloaded on request");
                Ok(policy)
            }
            Err(err) => {
                error!(%err, "Failed to reload config");
                Err(err)
            }
        }
    }

    fn sync_verbosity(&mut self, before: Verbosity) {
        let now = self.policy().log_level;
        if now != before
            && let Some(sink) = self.log_sink.as_deref_mut()
        {
            sink.set_verbosity(now);
        }
    }
}
