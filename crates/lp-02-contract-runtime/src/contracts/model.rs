//! # Contract Entities
//!
//! Record kinds stored by the sample contracts. Each kind names its key
//! prefix explicitly; renaming a type never moves its records.

use crate::domain::amount::Amount;
use lp_01_world_state::Entity;
use serde::{Deserialize, Serialize};

/// A physical asset tracked by the asset contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Asset {
    #[serde(rename = "ID")]
    pub id: String,
    pub color: String,
    pub size: u32,
    pub owner: String,
    pub appraised_value: u64,
}

impl Entity for Asset {
    const KIND: &'static str = "Asset";
    fn id(&self) -> &str {
        &self.id
    }
}

/// A registered person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub sex: String,
}

impl Entity for User {
    const KIND: &'static str = "User";
    fn id(&self) -> &str {
        &self.id
    }
}

/// Token balance of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Account identifier (client id or `contract::<name>`).
    pub id: String,
    /// Human-readable owner (certificate common name).
    pub owner: String,
    pub balance: Amount,
    /// Unix seconds of the last change.
    pub last_updated: u64,
}

impl Entity for Balance {
    const KIND: &'static str = "Balance";
    fn id(&self) -> &str {
        &self.id
    }
}

/// Repayment state of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Open,
    Paid,
}

/// Debt taken on by minting against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub owner: String,
    pub principal_amount: Amount,
    pub remaining_principal: Amount,
    pub start_date: u64,
    pub end_date: u64,
    pub loan_status: LoanStatus,
}

impl Entity for Loan {
    const KIND: &'static str = "Loan";
    fn id(&self) -> &str {
        &self.id
    }
}

/// A repayment against a loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub loan_id: String,
    pub payment_amount: Amount,
    pub payment_date: u64,
}

impl Entity for Payment {
    const KIND: &'static str = "Payment";
    fn id(&self) -> &str {
        &self.id
    }
}

/// Token metadata, set once by `Initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
}

impl Entity for TokenInfo {
    const KIND: &'static str = "TokenInfo";
    fn id(&self) -> &str {
        &self.id
    }
}
