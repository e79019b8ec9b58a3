//! # Sample Contracts
//!
//! | Name | Type | Role |
//! |------|------|------|
//! | `basic` | [`AssetContract`] | Asset and user CRUD |
//! | `token` | [`TokenContract`] | Fungible token, debt-backed minting |
//! | `lending` | [`LendingContract`] | Calls into `token` on the client's behalf |

pub mod asset;
pub mod lending;
pub mod model;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use asset::AssetContract;
pub use lending::LendingContract;
pub use model::{Asset, Balance, Loan, LoanStatus, Payment, TokenInfo, User};
pub use token::{contract_account, TokenContract};

use crate::errors::RuntimeError;
use crate::ports::TransactionHandler;
use crate::runtime::ContractRuntime;
use shared_types::{ChannelId, ContractName};
use std::sync::Arc;

/// Deployment name of the asset contract.
pub const ASSET_CONTRACT: &str = "basic";
/// Deployment name of the token contract.
pub const TOKEN_CONTRACT: &str = "token";
/// Deployment name of the lending contract.
pub const LENDING_CONTRACT: &str = "lending";

/// Create `channel` on `runtime` and deploy the three sample contracts on it.
pub fn deploy_samples(runtime: &ContractRuntime, channel: &ChannelId) -> Result<(), RuntimeError> {
    runtime.create_channel(channel);
    let samples: [(&str, Arc<dyn TransactionHandler>); 3] = [
        (ASSET_CONTRACT, Arc::new(AssetContract::new())),
        (TOKEN_CONTRACT, Arc::new(TokenContract::new())),
        (LENDING_CONTRACT, Arc::new(LendingContract::new())),
    ];
    for (name, handler) in samples {
        runtime.deploy(channel, ContractName::new(name)?, handler)?;
    }
    Ok(())
}
