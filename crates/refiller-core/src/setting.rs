//! Validated single-field policy mutations.
//!
//! A console command such as `css_refiller_sethealth 50` arrives as a key
//! and a raw value. [`Setting::parse`] validates the pair before anything
//! is touched; a rejected value leaves the policy exactly as it was.

use core::fmt;
use core::str::FromStr;

use refiller_types::{AmmoRefill, ParseTokenError, RefillAmount, Verbosity};

/// Prefix shared by the server's console variable names.
const CVAR_PREFIX: &str = "css_refiller_";

/// Errors produced while validating a setting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingError {
    /// The key names no policy field.
    #[error("unknown setting {key:?}")]
    UnknownKey {
        /// The rejected key.
        key: String,
    },

    /// A toggle received something other than `0` or `1`.
    #[error("invalid value {value:?} for {key}: use 0 or 1")]
    InvalidToggle {
        /// The toggle being set.
        key: SettingKey,
        /// The rejected value.
        value: String,
    },

    /// A token field received a value outside its grammar.
    #[error("invalid value for {key}: {source}")]
    InvalidValue {
        /// The field being set.
        key: SettingKey,
        /// Why the token was rejected.
        source: ParseTokenError,
    },
}

/// One field of the refill policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Assist reward toggle.
    Assist,
    /// Health reward.
    Health,
    /// Ammo reward.
    Ammo,
    /// Armor reward.
    Armor,
    /// Auto-refill toggle.
    AutoRefillClip,
    /// Log verbosity.
    LogLevel,
}

impl SettingKey {
    /// Every key, in config file order.
    pub const ALL: [Self; 6] = [
        Self::Assist,
        Self::Health,
        Self::Ammo,
        Self::Armor,
        Self::AutoRefillClip,
        Self::LogLevel,
    ];

    /// The bare key name (`health`, `autorefillclip`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Assist => "assist",
            Self::Health => "health",
            Self::Ammo => "ammo",
            Self::Armor => "armor",
            Self::AutoRefillClip => "autorefillclip",
            Self::LogLevel => "loglevel",
        }
    }
}

impl FromStr for SettingKey {
    type Err = SettingError;

    /// Accepts the bare name, the console variable (`css_refiller_health`)
    /// or the setter command (`css_refiller_sethealth`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let bare = lowered.strip_prefix(CVAR_PREFIX).unwrap_or(&lowered);
        let bare = bare.strip_prefix("set").unwrap_or(bare);
        Self::ALL
            .into_iter()
            .find(|key| key.name() == bare)
            .ok_or_else(|| SettingError::UnknownKey { key: s.to_owned() })
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated new value for exactly one policy field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    /// Reward the assister too.
    Assist(bool),
    /// Health reward.
    Health(RefillAmount),
    /// Ammo reward.
    Ammo(AmmoRefill),
    /// Armor reward.
    Armor(RefillAmount),
    /// Auto-refill of empty reserves.
    AutoRefillClip(bool),
    /// Log verbosity.
    LogLevel(Verbosity),
}

impl Setting {
    /// Validate `value` for the field named by `key`.
    pub fn parse(key: &str, value: &str) -> Result<Self, SettingError> {
        let key: SettingKey = key.parse()?;
        let invalid = |source| SettingError::InvalidValue { key, source };
        match key {
            SettingKey::Assist => parse_toggle(key, value).map(Self::Assist),
            SettingKey::AutoRefillClip => parse_toggle(key, value).map(Self::AutoRefillClip),
            SettingKey::Health => value.parse().map(Self::Health).map_err(invalid),
            SettingKey::Armor => value.parse().map(Self::Armor).map_err(invalid),
            SettingKey::Ammo => value.parse().map(Self::Ammo).map_err(invalid),
            SettingKey::LogLevel => value.parse().map(Self::LogLevel).map_err(invalid),
        }
    }

    /// Parse a `key=value` assignment.
    pub fn parse_assignment(assignment: &str) -> Result<Self, SettingError> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| SettingError::UnknownKey {
                key: assignment.to_owned(),
            })?;
        Self::parse(key, value)
    }

    /// The field this setting changes.
    pub const fn key(self) -> SettingKey {
        match self {
            Self::Assist(_) => SettingKey::Assist,
            Self::Health(_) => SettingKey::Health,
            Self::Ammo(_) => SettingKey::Ammo,
            Self::Armor(_) => SettingKey::Armor,
            Self::AutoRefillClip(_) => SettingKey::AutoRefillClip,
            Self::LogLevel(_) => SettingKey::LogLevel,
        }
    }
}

/// Record of an applied setting, with canonical old and new tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    /// The field that changed.
    pub key: SettingKey,
    /// Token before the change.
    pub old: String,
    /// Token after the change.
    pub new: String,
}

fn parse_toggle(key: SettingKey, value: &str) -> Result<bool, SettingError> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(SettingError::InvalidToggle {
            key,
            value: value.to_owned(),
        }),
    }
}
