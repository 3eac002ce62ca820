//! Enumeration types for refill policies, log verbosity and input buttons.
//!
//! Policy values travel through the config file and console settings as
//! short string tokens (`"all"`, `"0"`, `"25"`, `"current"`, ...). Every
//! enum here owns its token grammar through [`FromStr`] and renders its
//! canonical token back through [`Display`], so a value read from disk and
//! written back is unchanged.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

/// Upper bound for health and armor produced by a kill reward.
pub const MAX_VITAL: i32 = 100;

/// A token that does not belong to the grammar of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseTokenError {
    /// Not `all`, `0`, or a positive integer.
    #[error("invalid refill amount {token:?}: expected all, 0, or a positive number")]
    RefillAmount {
        /// The rejected token.
        token: String,
    },

    /// Not `all`, `current`, or `off`.
    #[error("invalid ammo mode {token:?}: expected all, current, or off")]
    AmmoRefill {
        /// The rejected token.
        token: String,
    },

    /// Not an integer in `0..=5`.
    #[error("invalid log level {token:?}: expected a number from 0 to 5")]
    Verbosity {
        /// The rejected token.
        token: String,
    },
}

// ---------------------------------------------------------------------------
// Health / armor
// ---------------------------------------------------------------------------

/// How much health (or armor) a kill restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RefillAmount {
    /// Leave the value untouched (token `"0"`).
    None,
    /// Restore to [`MAX_VITAL`] (token `"all"`).
    All,
    /// Add a fixed amount, capped at [`MAX_VITAL`] (a positive integer token).
    Add(u32),
}

impl RefillAmount {
    /// Compute the value after the reward is applied to `current`.
    ///
    /// `None` returns `current` unchanged. `All` always yields [`MAX_VITAL`],
    /// and `Add(n)` yields `min(MAX_VITAL, current + n)`, so a value that was
    /// already above the cap is brought down to it.
    pub fn apply(self, current: i32) -> i32 {
        match self {
            Self::None => current,
            Self::All => MAX_VITAL,
            Self::Add(amount) => {
                let amount = i32::try_from(amount).unwrap_or(i32::MAX);
                current.saturating_add(amount).min(MAX_VITAL)
            }
        }
    }

    /// Whether this policy never changes the value.
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

impl FromStr for RefillAmount {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match token.parse::<u32>() {
            Ok(0) => Ok(Self::None),
            Ok(amount) => Ok(Self::Add(amount)),
            Err(_) => Err(ParseTokenError::RefillAmount {
                token: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for RefillAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("0"),
            Self::All => f.write_str("all"),
            Self::Add(amount) => write!(f, "{amount}"),
        }
    }
}

impl TryFrom<String> for RefillAmount {
    type Error = ParseTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RefillAmount> for String {
    fn from(value: RefillAmount) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Ammo
// ---------------------------------------------------------------------------

/// Which weapons a kill reward refills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AmmoRefill {
    /// No ammunition is restored.
    Off,
    /// Only the weapon the player is holding.
    Current,
    /// Every weapon in the player's inventory.
    All,
}

impl FromStr for AmmoRefill {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "current" => Ok(Self::Current),
            "all" => Ok(Self::All),
            _ => Err(ParseTokenError::AmmoRefill {
                token: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for AmmoRefill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Current => "current",
            Self::All => "all",
        })
    }
}

impl TryFrom<String> for AmmoRefill {
    type Error = ParseTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AmmoRefill> for String {
    fn from(value: AmmoRefill) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Verbosity
// ---------------------------------------------------------------------------

/// Minimum severity the module logs, numbered 0 (most verbose) to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verbosity {
    /// 0: everything, including per-tick auto-refill hits.
    Trace,
    /// 1: lifecycle events such as disconnect cleanup.
    Debug,
    /// 2: load, reload and setting changes.
    Information,
    /// 3: config fallbacks.
    Warning,
    /// 4: entity faults (default).
    Error,
    /// 5: critical only. The module emits nothing at this level.
    Critical,
}

impl Verbosity {
    /// Map an integer to a level, clamping it into `0..=5`.
    pub const fn from_index_clamped(index: i64) -> Self {
        match index {
            i64::MIN..=0 => Self::Trace,
            1 => Self::Debug,
            2 => Self::Information,
            3 => Self::Warning,
            4 => Self::Error,
            _ => Self::Critical,
        }
    }

    /// The numeric level as stored in the config file.
    pub const fn index(self) -> u8 {
        match self {
            Self::Trace => 0,
            Self::Debug => 1,
            Self::Information => 2,
            Self::Warning => 3,
            Self::Error => 4,
            Self::Critical => 5,
        }
    }

    /// The `tracing` filter equivalent to this level.
    pub const fn level_filter(self) -> LevelFilter {
        match self {
            Self::Trace => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Information => LevelFilter::INFO,
            Self::Warning => LevelFilter::WARN,
            Self::Error => LevelFilter::ERROR,
            Self::Critical => LevelFilter::OFF,
        }
    }
}

impl FromStr for Verbosity {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(index @ 0..=5) => Ok(Self::from_index_clamped(index)),
            _ => Err(ParseTokenError::Verbosity {
                token: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

// ---------------------------------------------------------------------------
// Input buttons
// ---------------------------------------------------------------------------

/// Raw input button bitmask as reported by the host for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Buttons(pub u64);

impl Buttons {
    /// No buttons held.
    pub const NONE: Self = Self(0);
    /// Primary fire.
    pub const ATTACK: Self = Self(1 << 0);
    /// Reload.
    pub const RELOAD: Self = Self(1 << 13);

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Both masks combined.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Set the bits of `other`.
    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear the bits of `other`.
    pub const fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}
