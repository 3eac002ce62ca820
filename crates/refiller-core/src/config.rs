//! Configuration loading and the typed refill policy.
//!
//! The on-disk document is a flat JSON object using the server's console
//! variable names (`css_refiller_health`, ...). It is parsed into
//! [`PluginConfig`], then validated field by field into a [`Policy`]:
//! integer fields are clamped into range and a malformed token falls back
//! to the value the field held before the load, so one bad entry never
//! discards the rest of the file. Fields are decoded leniently: a number
//! where a token is expected is read as its digits, and a value of the
//! wrong JSON type is treated like any other malformed entry. Only a file
//! that is not a JSON object at all fails the load.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use refiller_types::{AmmoRefill, ParseTokenError, RefillAmount, Verbosity};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::setting::{Setting, SettingChange, SettingKey};

/// Schema version written to new config files.
pub const CONFIG_VERSION: u32 = 1;

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write the configuration file.
    #[error("config file I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The file is not a valid config document.
    #[error("failed to parse config JSON: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// Validated refill policy.
///
/// Immutable within a frame; replaced wholesale on reload or field by
/// field through [`ConfigStore::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Whether the assisting player is rewarded as well.
    pub assist_refill: bool,
    /// Health restored per kill.
    pub health: RefillAmount,
    /// Armor restored per kill.
    pub armor: RefillAmount,
    /// Which weapons get their ammunition restored per kill.
    pub ammo: AmmoRefill,
    /// Whether empty reserves are topped up on reload/attack presses.
    pub auto_refill_clip: bool,
    /// Minimum severity of log output.
    pub log_level: Verbosity,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            assist_refill: true,
            health: RefillAmount::Add(25),
            armor: RefillAmount::Add(15),
            ammo: AmmoRefill::Current,
            auto_refill_clip: true,
            log_level: Verbosity::Error,
        }
    }
}

impl Policy {
    /// Validate a parsed document, using `prior` for any malformed token.
    pub fn from_config(config: &PluginConfig, prior: &Self) -> Self {
        Self {
            assist_refill: integer_or_keep(
                SettingKey::Assist,
                config.assist,
                prior.assist_refill,
                clamp_toggle,
            ),
            health: parse_or_keep(SettingKey::Health, &config.health, prior.health),
            armor: parse_or_keep(SettingKey::Armor, &config.armor, prior.armor),
            ammo: parse_or_keep(SettingKey::Ammo, &config.ammo, prior.ammo),
            auto_refill_clip: integer_or_keep(
                SettingKey::AutoRefillClip,
                config.auto_refill_clip,
                prior.auto_refill_clip,
                clamp_toggle,
            ),
            log_level: integer_or_keep(
                SettingKey::LogLevel,
                config.log_level,
                prior.log_level,
                Verbosity::from_index_clamped,
            ),
        }
    }

    /// The canonical token currently stored for `key`.
    pub fn value(&self, key: SettingKey) -> String {
        match key {
            SettingKey::Assist => toggle_token(self.assist_refill).to_owned(),
            SettingKey::Health => self.health.to_string(),
            SettingKey::Ammo => self.ammo.to_string(),
            SettingKey::Armor => self.armor.to_string(),
            SettingKey::AutoRefillClip => toggle_token(self.auto_refill_clip).to_owned(),
            SettingKey::LogLevel => self.log_level.to_string(),
        }
    }
}

/// The config file document, in the console variable naming of the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Document schema version.
    #[serde(
        rename = "ConfigVersion",
        default = "default_version",
        deserialize_with = "lenient_version"
    )]
    pub version: u32,

    /// Assist reward toggle (`0`/`1`, clamped). `None` when unreadable.
    #[serde(
        rename = "css_refiller_assist",
        default = "default_enabled",
        deserialize_with = "lenient_integer"
    )]
    pub assist: Option<i64>,

    /// Health token (`all`, `0`, or a positive number).
    #[serde(
        rename = "css_refiller_health",
        default = "default_health",
        deserialize_with = "lenient_token"
    )]
    pub health: String,

    /// Ammo token (`all`, `current`, or `off`).
    #[serde(
        rename = "css_refiller_ammo",
        default = "default_ammo",
        deserialize_with = "lenient_token"
    )]
    pub ammo: String,

    /// Armor token (`all`, `0`, or a positive number).
    #[serde(
        rename = "css_refiller_armor",
        default = "default_armor",
        deserialize_with = "lenient_token"
    )]
    pub armor: String,

    /// Auto-refill toggle (`0`/`1`, clamped). `None` when unreadable.
    #[serde(
        rename = "css_refiller_autorefillclip",
        default = "default_enabled",
        deserialize_with = "lenient_integer"
    )]
    pub auto_refill_clip: Option<i64>,

    /// Log level `0..=5` (clamped). `None` when unreadable.
    #[serde(
        rename = "css_refiller_loglevel",
        default = "default_log_level",
        deserialize_with = "lenient_integer"
    )]
    pub log_level: Option<i64>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self::from(&Policy::default())
    }
}

impl From<&Policy> for PluginConfig {
    fn from(policy: &Policy) -> Self {
        Self {
            version: CONFIG_VERSION,
            assist: Some(i64::from(policy.assist_refill)),
            health: policy.health.to_string(),
            ammo: policy.ammo.to_string(),
            armor: policy.armor.to_string(),
            auto_refill_clip: Some(i64::from(policy.auto_refill_clip)),
            log_level: Some(i64::from(policy.log_level.index())),
        }
    }
}

impl PluginConfig {
    /// Parse a config document from a JSON string.
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the document as indented JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Owner of the active [`Policy`] and the file it is persisted to.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    /// The validated policy in effect.
    policy: Policy,
    /// Backing file. `None` keeps the store purely in memory.
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// A store that never touches disk.
    pub const fn in_memory(policy: Policy) -> Self {
        Self { policy, path: None }
    }

    /// Load the store from `path`.
    ///
    /// A missing file is created with default values. Malformed fields
    /// fall back to their defaults.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut store = Self {
            policy: Policy::default(),
            path: Some(path.into()),
        };
        store.reload()?;
        Ok(store)
    }

    /// Re-read the backing file, replacing the policy wholesale.
    ///
    /// Malformed fields keep their current value. If the file has
    /// disappeared, the current policy is written back instead. On error
    /// the current policy is left untouched.
    pub fn reload(&mut self) -> Result<Policy, ConfigError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(self.policy);
        };

        if !path.exists() {
            info!(path = %path.display(), "Config file missing, writing current values");
            self.save()?;
            return Ok(self.policy);
        }

        let contents = std::fs::read_to_string(path)?;
        let document = PluginConfig::parse(&contents)?;
        self.policy = Policy::from_config(&document, &self.policy);
        info!(path = %path.display(), "Config loaded");
        Ok(self.policy)
    }

    /// Write the current policy to the backing file, creating parent
    /// directories as needed. A no-op for in-memory stores.
    pub fn save(&self) -> Result<(), ConfigError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = PluginConfig::from(&self.policy).to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Apply one validated field change. Other fields are untouched.
    pub fn apply(&mut self, setting: Setting) -> SettingChange {
        let key = setting.key();
        let old = self.policy.value(key);
        match setting {
            Setting::Assist(enabled) => self.policy.assist_refill = enabled,
            Setting::Health(amount) => self.policy.health = amount,
            Setting::Ammo(mode) => self.policy.ammo = mode,
            Setting::Armor(amount) => self.policy.armor = amount,
            Setting::AutoRefillClip(enabled) => self.policy.auto_refill_clip = enabled,
            Setting::LogLevel(level) => self.policy.log_level = level,
        }
        SettingChange {
            key,
            old,
            new: self.policy.value(key),
        }
    }

    /// The policy in effect.
    pub const fn policy(&self) -> Policy {
        self.policy
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn parse_or_keep<T>(key: SettingKey, raw: &str, prior: T) -> T
where
    T: FromStr<Err = ParseTokenError> + std::fmt::Display + Copy,
{
    match raw.parse() {
        Ok(value) => value,
        Err(err) => {
            warn!(field = %key, %err, kept = %prior, "Invalid config value, keeping previous");
            prior
        }
    }
}

fn integer_or_keep<T>(key: SettingKey, raw: Option<i64>, prior: T, convert: fn(i64) -> T) -> T
where
    T: std::fmt::Display + Copy,
{
    raw.map_or_else(
        || {
            warn!(field = %key, kept = %prior, "Invalid config value, keeping previous");
            prior
        },
        convert,
    )
}

/// A token field: strings pass through, anything else becomes its JSON
/// text and is validated like any other token.
fn lenient_token<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(token) => token,
        other => other.to_string(),
    })
}

/// An integer field: numbers, numeric strings and booleans are accepted,
/// anything else decodes to `None`.
fn lenient_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(flag) => Some(i64::from(flag)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

fn lenient_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(lenient_integer(deserializer)?
        .and_then(|version| u32::try_from(version).ok())
        .unwrap_or(CONFIG_VERSION))
}

const fn clamp_toggle(raw: i64) -> bool {
    raw >= 1
}

const fn toggle_token(enabled: bool) -> &'static str {
    if enabled { "1" } else { "0" }
}

const fn default_version() -> u32 {
    CONFIG_VERSION
}

#[allow(clippy::unnecessary_wraps)]
const fn default_enabled() -> Option<i64> {
    Some(1)
}

fn default_health() -> String {
    String::from("25")
}

fn default_ammo() -> String {
    String::from("current")
}

fn default_armor() -> String {
    String::from("15")
}

#[allow(clippy::unnecessary_wraps)]
const fn default_log_level() -> Option<i64> {
    Some(4)
}
