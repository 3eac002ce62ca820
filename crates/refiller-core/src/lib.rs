//! Kill rewards and ammunition auto-refill for a tactical shooter server.
//!
//! When a player scores a kill, the killer (and optionally the assister)
//! gets health, armor and ammunition back according to the active
//! [`Policy`](config::Policy). Independently, a per-frame pass watches the
//! reload and attack buttons and tops up an empty reserve once per press.
//!
//! The host game engine is reached only through the
//! [`EntityAccess`](facade::EntityAccess) trait. Everything runs on the
//! host's simulation thread; the only scheduling primitive is the
//! next-frame queue that defers kill rewards out of event dispatch.
//!
//! # Modules
//!
//! - [`config`] -- Typed policy, JSON config document and the config store.
//! - [`setting`] -- Validated single-field policy mutations.
//! - [`facade`] -- [`EntityAccess`](facade::EntityAccess) capability trait.
//! - [`schedule`] -- Next-frame task queue.
//! - [`reward`] -- Post-kill reward engine.
//! - [`autorefill`] -- Button edge tracker and reserve auto-refill.
//! - [`plugin`] -- [`Refiller`](plugin::Refiller), the host callback surface.
//! - [`sandbox`] -- In-memory [`EntityAccess`](facade::EntityAccess) world.

pub mod autorefill;
pub mod config;
pub mod facade;
pub mod plugin;
pub mod reward;
pub mod sandbox;
pub mod schedule;
pub mod setting;
