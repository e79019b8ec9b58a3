//! # Argument Access
//!
//! Contract functions receive their arguments as raw byte strings. `Args`
//! gives positional, typed access with errors that name the offending
//! position.

use crate::domain::amount::{Amount, AmountError};
use std::str::FromStr;
use thiserror::Error;

/// Errors from reading function arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// Wrong number of arguments.
    #[error("incorrect number of arguments: expected {expected}, got {actual}")]
    Count { expected: usize, actual: usize },

    /// Argument is not UTF-8 text.
    #[error("argument {index} is not valid UTF-8")]
    NotText { index: usize },

    /// Argument is empty where a value is required.
    #[error("argument {index} must not be empty")]
    Empty { index: usize },

    /// Argument is not a valid amount.
    #[error("argument {index}: {source}")]
    Amount { index: usize, source: AmountError },

    /// Argument could not be parsed as the requested type.
    #[error("argument {index}: cannot parse {value:?} as {expected}")]
    Parse {
        index: usize,
        value: String,
        expected: &'static str,
    },
}

/// Positional view over a function's arguments.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    raw: &'a [Vec<u8>],
}

impl<'a> Args<'a> {
    /// Wrap raw arguments (function name already stripped).
    pub fn new(raw: &'a [Vec<u8>]) -> Self {
        Self { raw }
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Fail unless exactly `expected` arguments were passed.
    pub fn expect_len(&self, expected: usize) -> Result<(), ArgumentError> {
        if self.raw.len() == expected {
            Ok(())
        } else {
            Err(ArgumentError::Count {
                expected,
                actual: self.raw.len(),
            })
        }
    }

    /// Argument `index` as non-empty text.
    pub fn text(&self, index: usize) -> Result<&'a str, ArgumentError> {
        let raw = self.raw.get(index).ok_or(ArgumentError::Count {
            expected: index + 1,
            actual: self.raw.len(),
        })?;
        let text = std::str::from_utf8(raw).map_err(|_| ArgumentError::NotText { index })?;
        if text.is_empty() {
            return Err(ArgumentError::Empty { index });
        }
        Ok(text)
    }

    /// Argument `index` as a strictly positive [`Amount`].
    pub fn amount(&self, index: usize) -> Result<Amount, ArgumentError> {
        let amount: Amount = self
            .text(index)?
            .parse()
            .map_err(|source| ArgumentError::Amount { index, source })?;
        if amount.is_zero() {
            return Err(ArgumentError::Parse {
                index,
                value: amount.to_string(),
                expected: "positive amount",
            });
        }
        Ok(amount)
    }

    /// Argument `index` parsed with [`FromStr`].
    pub fn parse<T: FromStr>(&self, index: usize, expected: &'static str) -> Result<T, ArgumentError> {
        let text = self.text(index)?;
        text.parse().map_err(|_| ArgumentError::Parse {
            index,
            value: text.to_string(),
            expected,
        })
    }
}
