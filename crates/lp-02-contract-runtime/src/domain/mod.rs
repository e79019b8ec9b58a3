//! # Domain Module
//!
//! Amounts, argument access, responses and runtime entities.

pub mod amount;
pub mod args;
pub mod entities;
pub mod response;

pub use amount::{Amount, AmountError, AMOUNT_DECIMALS};
pub use args::{ArgumentError, Args};
pub use entities::{Invocation, RuntimeConfig, Simulation};
pub use response::{Response, STATUS_ERROR, STATUS_OK};
