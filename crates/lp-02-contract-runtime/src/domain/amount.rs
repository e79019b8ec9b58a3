//! # Amount
//!
//! Unsigned fixed-point token amount with six fractional digits.
//!
//! Amounts cross contract boundaries as canonical decimal text
//! (`"50.000000"`), so both sides of an invocation agree on the exact value.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits carried by an [`Amount`].
pub const AMOUNT_DECIMALS: usize = 6;

const MICROS_PER_UNIT: u128 = 1_000_000;

/// Errors from parsing decimal amount text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Input was empty.
    #[error("amount is empty")]
    Empty,

    /// Input is not a plain unsigned decimal.
    #[error("invalid amount {0:?}: expected an unsigned decimal")]
    Malformed(String),

    /// More fractional digits than the fixed scale.
    #[error("invalid amount {0:?}: at most 6 fractional digits")]
    TooPrecise(String),

    /// Value does not fit the representation.
    #[error("amount {0:?} is out of range")]
    Overflow(String),
}

/// A non-negative decimal amount held as micro-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u128);

impl Amount {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Whole units, e.g. `Amount::from_units(50)` is `50.000000`.
    pub fn from_units(units: u64) -> Self {
        Self(u128::from(units) * MICROS_PER_UNIT)
    }

    /// Raw micro-units.
    pub fn from_micros(micros: u128) -> Self {
        Self(micros)
    }

    /// Value in micro-units.
    pub fn micros(&self) -> u128 {
        self.0
    }

    /// Returns true for zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction, `None` if `other > self`.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() || !digits_only(int_part) || !digits_only(frac_part) {
            return Err(AmountError::Malformed(s.to_string()));
        }
        if s.ends_with('.') {
            return Err(AmountError::Malformed(s.to_string()));
        }
        if frac_part.len() > AMOUNT_DECIMALS {
            return Err(AmountError::TooPrecise(s.to_string()));
        }

        let overflow = || AmountError::Overflow(s.to_string());
        let units: u128 = int_part.parse().map_err(|_| overflow())?;
        let mut frac: u128 = 0;
        if !frac_part.is_empty() {
            frac = frac_part.parse().map_err(|_| overflow())?;
            frac *= 10u128.pow((AMOUNT_DECIMALS - frac_part.len()) as u32);
        }
        units
            .checked_mul(MICROS_PER_UNIT)
            .and_then(|m| m.checked_add(frac))
            .map(Self)
            .ok_or_else(overflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:06}",
            self.0 / MICROS_PER_UNIT,
            self.0 % MICROS_PER_UNIT
        )
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
