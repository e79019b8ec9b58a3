//! # Token Contract
//!
//! Fungible token with debt-backed minting.
//!
//! Accounts are keyed by the caller's client id; a contract calling in
//! through another contract holds the account `contract::<name>`.
//! Every function except `Initialize` requires the token to be initialized.

use super::model::{Balance, Loan, LoanStatus, Payment, TokenInfo};
use crate::context::TransactionContext;
use crate::domain::amount::Amount;
use crate::domain::args::Args;
use crate::errors::ContractError;
use crate::ports::TransactionHandler;
use lp_01_world_state::StoreError;
use shared_types::ContractName;
use tracing::{debug, info};

const TOKEN_INFO_ID: &str = "token";

/// Term of a new loan.
pub const LOAN_TERM_SECS: u64 = 365 * 24 * 60 * 60;

/// Account identifier held by a contract.
pub fn contract_account(contract: &ContractName) -> String {
    format!("contract::{contract}")
}

/// The token ledger.
#[derive(Debug, Default)]
pub struct TokenContract;

impl TokenContract {
    /// Create the contract.
    pub fn new() -> Self {
        Self
    }

    fn token_info(ctx: &TransactionContext<'_>) -> Result<TokenInfo, ContractError> {
        ctx.store().read(TOKEN_INFO_ID).map_err(|e| match e {
            StoreError::NotFound { .. } => ContractError::Rejected(
                "contract options need to be set before calling any function, call Initialize() to initialize contract"
                    .into(),
            ),
            other => other.into(),
        })
    }

    fn balance_of(ctx: &TransactionContext<'_>, account: &str) -> Result<Amount, ContractError> {
        match ctx.store().read::<Balance>(account) {
            Ok(balance) => Ok(balance.balance),
            Err(e) if e.is_not_found() => Ok(Amount::ZERO),
            Err(e) => Err(e.into()),
        }
    }

    fn credit(
        ctx: &TransactionContext<'_>,
        account: &str,
        owner: &str,
        amount: Amount,
    ) -> Result<(), ContractError> {
        let store = ctx.store();
        let now = ctx.stub().tx_timestamp();
        match store.read::<Balance>(account) {
            Ok(mut balance) => {
                balance.balance = balance
                    .balance
                    .checked_add(amount)
                    .ok_or_else(|| ContractError::Rejected(format!("balance overflow for {account}")))?;
                balance.last_updated = now;
                store.update(&balance)?;
            }
            Err(e) if e.is_not_found() => {
                store.create(&Balance {
                    id: account.to_string(),
                    owner: owner.to_string(),
                    balance: amount,
                    last_updated: now,
                })?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn debit(ctx: &TransactionContext<'_>, account: &str, amount: Amount) -> Result<(), ContractError> {
        let store = ctx.store();
        let insufficient = |available| ContractError::InsufficientFunds {
            account: account.to_string(),
            available,
            required: amount,
        };
        let mut balance = match store.read::<Balance>(account) {
            Ok(balance) => balance,
            Err(e) if e.is_not_found() => return Err(insufficient(Amount::ZERO)),
            Err(e) => return Err(e.into()),
        };
        balance.balance = balance
            .balance
            .checked_sub(amount)
            .ok_or_else(|| insufficient(balance.balance))?;
        balance.last_updated = ctx.stub().tx_timestamp();
        store.update(&balance)?;
        Ok(())
    }

    fn transfer(
        ctx: &TransactionContext<'_>,
        from: &str,
        to: &str,
        amount: Amount,
    ) -> Result<(), ContractError> {
        if from == to {
            return Err(ContractError::Rejected(
                "cannot transfer to and from same client account".into(),
            ));
        }
        Self::token_info(ctx)?;
        Self::debit(ctx, from, amount)?;
        Self::credit(ctx, to, to, amount)?;
        info!(from, to, amount = %amount, "Transferred tokens");
        Ok(())
    }

    fn mint_to_caller(ctx: &TransactionContext<'_>, amount: Amount) -> Result<(), ContractError> {
        let mut info = Self::token_info(ctx)?;
        let caller = ctx.stub().creator();
        Self::credit(ctx, &caller.id(), &caller.common_name, amount)?;
        info.total_supply = info
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| ContractError::Rejected("total supply overflow".into()))?;
        ctx.store().update(&info)?;
        info!(minter = %caller.common_name, amount = %amount, total_supply = %info.total_supply, "Minted tokens");
        Ok(())
    }

    fn initialize(&self, ctx: &TransactionContext<'_>, args: Args<'_>) -> Result<Vec<u8>, ContractError> {
        args.expect_len(3)?;
        let store = ctx.store();
        if store.exists::<TokenInfo>(TOKEN_INFO_ID)? {
            return Err(ContractError::Rejected(
                "contract options are already set, client is not authorized to change them".into(),
            ));
        }
        store.create(&TokenInfo {
            id: TOKEN_INFO_ID.into(),
            name: args.text(0)?.to_string(),
            symbol: args.text(1)?.to_string(),
            decimals: args.parse(2, "decimals")?,
            total_supply: Amount::ZERO,
        })?;
        Ok(Vec::new())
    }

    fn mint_from_debt(&self, ctx: &TransactionContext<'_>, amount: Amount) -> Result<Vec<u8>, ContractError> {
        Self::mint_to_caller(ctx, amount)?;

        let store = ctx.store();
        let caller = ctx.stub().creator();
        let loan_id = caller.id();
        let now = ctx.stub().tx_timestamp();
        let fresh = Loan {
            id: loan_id.clone(),
            owner: caller.common_name.clone(),
            principal_amount: amount,
            remaining_principal: amount,
            start_date: now,
            end_date: now.saturating_add(LOAN_TERM_SECS),
            loan_status: LoanStatus::Open,
        };
        match store.read::<Loan>(&loan_id) {
            Ok(mut loan) if loan.loan_status == LoanStatus::Open => {
                let overflow = || ContractError::Rejected("loan principal overflow".into());
                loan.principal_amount = loan.principal_amount.checked_add(amount).ok_or_else(overflow)?;
                loan.remaining_principal = loan.remaining_principal.checked_add(amount).ok_or_else(overflow)?;
                store.update(&loan)?;
            }
            Ok(_) => store.update(&fresh)?,
            Err(e) if e.is_not_found() => store.create(&fresh)?,
            Err(e) => return Err(e.into()),
        }
        debug!(loan_id = %loan_id, amount = %amount, "Recorded loan");
        Ok(Vec::new())
    }

    fn pay_off(&self, ctx: &TransactionContext<'_>, amount: Amount) -> Result<Vec<u8>, ContractError> {
        let store = ctx.store();
        let caller = ctx.stub().creator().id();
        let mut loan: Loan = match store.read(&caller) {
            Ok(loan) => loan,
            Err(e) if e.is_not_found() => {
                return Err(ContractError::Rejected(format!("no open loan for {caller}")))
            }
            Err(e) => return Err(e.into()),
        };
        if loan.loan_status == LoanStatus::Paid {
            return Err(ContractError::Rejected(format!("no open loan for {caller}")));
        }
        if amount > loan.remaining_principal {
            return Err(ContractError::Rejected(format!(
                "payment {amount} exceeds remaining principal {}",
                loan.remaining_principal
            )));
        }

        let mut info = Self::token_info(ctx)?;
        Self::debit(ctx, &caller, amount)?;
        info.total_supply = info
            .total_supply
            .checked_sub(amount)
            .ok_or_else(|| ContractError::Rejected("total supply underflow".into()))?;
        store.update(&info)?;

        loan.remaining_principal = loan
            .remaining_principal
            .checked_sub(amount)
            .unwrap_or(Amount::ZERO);
        if loan.remaining_principal.is_zero() {
            loan.loan_status = LoanStatus::Paid;
        }
        store.update(&loan)?;

        store.create(&Payment {
            id: format!("payment-{}", ctx.stub().tx_id()),
            loan_id: loan.id.clone(),
            payment_amount: amount,
            payment_date: ctx.stub().tx_timestamp(),
        })?;
        info!(loan_id = %loan.id, amount = %amount, remaining = %loan.remaining_principal, "Loan payment");
        Ok(Vec::new())
    }
}

impl TransactionHandler for TokenContract {
    fn invoke(
        &self,
        ctx: &TransactionContext<'_>,
        function: &str,
        args: Args<'_>,
    ) -> Result<Vec<u8>, ContractError> {
        let caller = ctx.client_id();
        match function {
            "Initialize" => self.initialize(ctx, args),
            "Mint" => {
                args.expect_len(1)?;
                Self::mint_to_caller(ctx, args.amount(0)?)?;
                Ok(Vec::new())
            }
            "MintFromDebt" => {
                args.expect_len(1)?;
                self.mint_from_debt(ctx, args.amount(0)?)
            }
            "Transfer" => {
                args.expect_len(2)?;
                Self::transfer(ctx, &caller, args.text(0)?, args.amount(1)?)?;
                Ok(Vec::new())
            }
            "TransferFromChaincode" => {
                args.expect_len(2)?;
                let Some(source) = ctx.stub().invoking_contract() else {
                    return Err(ContractError::Unauthorized(
                        "TransferFromChaincode can only be called by another contract".into(),
                    ));
                };
                Self::transfer(ctx, &contract_account(source), args.text(1)?, args.amount(0)?)?;
                Ok(Vec::new())
            }
            "TransferFromUser" => {
                args.expect_len(2)?;
                Self::transfer(ctx, &caller, args.text(1)?, args.amount(0)?)?;
                Ok(Vec::new())
            }
            "PayOff" => {
                args.expect_len(1)?;
                self.pay_off(ctx, args.amount(0)?)
            }
            "BalanceOf" => {
                args.expect_len(1)?;
                Self::token_info(ctx)?;
                Ok(Self::balance_of(ctx, args.text(0)?)?.to_string().into_bytes())
            }
            "ClientAccountBalance" => {
                Self::token_info(ctx)?;
                Ok(Self::balance_of(ctx, &caller)?.to_string().into_bytes())
            }
            "ClientAccountID" => Ok(caller.into_bytes()),
            "TotalSupply" => Ok(Self::token_info(ctx)?.total_supply.to_string().into_bytes()),
            "TokenName" => Ok(Self::token_info(ctx)?.name.into_bytes()),
            "Symbol" => Ok(Self::token_info(ctx)?.symbol.into_bytes()),
            other => Err(ContractError::UnknownFunction(other.to_string())),
        }
    }
}
