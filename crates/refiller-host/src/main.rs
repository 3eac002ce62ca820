//! Sandbox host for the kill-reward refiller.
//!
//! Stands in for the game server: it owns the config file, the log
//! filter and a [`SandboxWorld`](refiller_core::sandbox::SandboxWorld),
//! and drives a [`Refiller`] through one scripted round.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging with a swappable filter
//! 2. Load the config from `$REFILLER_CONFIG` (default `configs/refiller.json`)
//! 3. Create the module with the log filter attached, so the filter
//!    follows the `loglevel` field from then on
//! 4. Apply `key=value` overrides from the command line and persist them
//! 5. Play the scripted round and log its summary

mod error;
mod round;

use std::path::PathBuf;

use refiller_core::config::ConfigStore;
use refiller_core::plugin::{Refiller, VerbositySink};
use refiller_core::setting::Setting;
use refiller_types::Verbosity;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use crate::error::HostError;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "REFILLER_CONFIG";

/// Config file used when [`CONFIG_ENV`] is unset.
const DEFAULT_CONFIG_PATH: &str = "configs/refiller.json";

/// Filter used until the config is read. The module starts at the default
/// `loglevel` (errors only).
const INITIAL_FILTER: &str = "info,refiller_core=error";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// The installed log filter, retargeted whenever the module's verbosity
/// changes.
#[derive(Debug)]
struct LogFilter {
    handle: FilterHandle,
}

impl VerbositySink for LogFilter {
    fn set_verbosity(&mut self, verbosity: Verbosity) {
        if let Err(err) = retarget_log_filter(&self.handle, verbosity) {
            warn!(%err, %verbosity, "Failed to retarget log filter");
        }
    }
}

/// Application entry point for the refiller host.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    let filter = init_tracing();

    info!("refiller-host starting");

    // 2. Load configuration.
    let store = load_store()?;

    // 3. Create the module; the filter follows `loglevel` from here on.
    let sink = LogFilter { handle: filter };
    let mut refiller = Refiller::with_verbosity_sink(store, Box::new(sink));

    // 4. Command-line overrides.
    let accepted = apply_overrides(&mut refiller, std::env::args().skip(1));
    if accepted > 0 {
        info!(accepted, "Command-line overrides applied");
    }

    // 5. Play the round.
    let summary = round::play_scripted_round(&mut refiller);
    info!(
        frames = summary.frames,
        rewarded = summary.rewarded,
        ineligible = summary.ineligible,
        reload_refills = summary.reload_refills,
        attack_refills = summary.attack_refills,
        faults = summary.faults,
        "refiller-host shutdown complete"
    );

    Ok(())
}

/// Install the fmt subscriber behind a reloadable [`EnvFilter`].
fn init_tracing() -> FilterHandle {
    let (filter, handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(INITIAL_FILTER)),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
    handle
}

fn load_store() -> Result<ConfigStore, HostError> {
    let path = std::env::var_os(CONFIG_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let store = ConfigStore::load(path.clone())?;
    info!(path = %path.display(), "Configuration loaded");
    Ok(store)
}

/// Apply every `key=value` argument as a setting. Rejected arguments are
/// reported and skipped. Returns the number accepted.
fn apply_overrides<I>(refiller: &mut Refiller, args: I) -> usize
where
    I: IntoIterator<Item = String>,
{
    let mut accepted: usize = 0;
    for arg in args {
        match Setting::parse_assignment(&arg) {
            Ok(setting) => {
                refiller.apply_setting(setting);
                accepted = accepted.saturating_add(1);
            }
            Err(err) => warn!(%arg, %err, "Rejected setting override"),
        }
    }
    accepted
}

/// Swap the active filter for one that logs the refiller module at
/// `verbosity`. The host itself stays at `info` unless `RUST_LOG` says
/// otherwise.
fn retarget_log_filter(handle: &FilterHandle, verbosity: Verbosity) -> Result<(), HostError> {
    let directive = format!("refiller_core={}", verbosity.level_filter()).parse::<Directive>()?;
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
        .add_directive(directive);
    handle.reload(filter)?;
    info!(%verbosity, "Log filter retargeted");
    Ok(())
}
