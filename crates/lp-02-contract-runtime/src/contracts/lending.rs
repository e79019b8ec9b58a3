//! # Lending Contract
//!
//! Keeps a per-client credit balance and drives the token contract through
//! cross-contract calls. The local write always happens before the call,
//! so a failed call must take it down with the rest of the transaction.

use super::model::Balance;
use crate::context::TransactionContext;
use crate::domain::amount::Amount;
use crate::domain::args::Args;
use crate::errors::ContractError;
use crate::invoker::InvokeArg;
use crate::ports::TransactionHandler;
use shared_types::ContractName;

/// Client-facing lending desk.
#[derive(Debug, Default)]
pub struct LendingContract;

enum Adjust {
    Credit(Amount),
    Debit(Amount),
    Touch,
}

impl LendingContract {
    /// Create the contract.
    pub fn new() -> Self {
        Self
    }

    fn create_balance_for_caller(
        &self,
        ctx: &TransactionContext<'_>,
        args: Args<'_>,
    ) -> Result<Vec<u8>, ContractError> {
        args.expect_len(1)?;
        let initial: Amount = args.parse(0, "amount")?;
        let store = ctx.store();
        let caller = ctx.stub().creator();
        let caller_id = caller.id();
        if store.exists::<Balance>(&caller_id)? {
            return Err(ContractError::Rejected("balance for caller already exists".into()));
        }
        store.create(&Balance {
            id: caller_id,
            owner: caller.common_name.clone(),
            balance: initial,
            last_updated: ctx.stub().tx_timestamp(),
        })?;
        Ok(Vec::new())
    }

    fn adjust_local(ctx: &TransactionContext<'_>, adjust: Adjust) -> Result<(), ContractError> {
        let store = ctx.store();
        let mut balance: Balance = store.read(&ctx.client_id())?;
        balance.balance = match adjust {
            Adjust::Credit(amount) => balance
                .balance
                .checked_add(amount)
                .ok_or_else(|| ContractError::Rejected("balance overflow".into()))?,
            Adjust::Debit(amount) => {
                balance
                    .balance
                    .checked_sub(amount)
                    .ok_or_else(|| ContractError::InsufficientFunds {
                        account: balance.id.clone(),
                        available: balance.balance,
                        required: amount,
                    })?
            }
            Adjust::Touch => balance.balance,
        };
        balance.last_updated = ctx.stub().tx_timestamp();
        store.update(&balance)?;
        Ok(())
    }

    fn target(args: Args<'_>) -> Result<ContractName, ContractError> {
        ContractName::new(args.text(0)?).map_err(|e| ContractError::Rejected(e.to_string()))
    }
}

impl TransactionHandler for LendingContract {
    fn invoke(
        &self,
        ctx: &TransactionContext<'_>,
        function: &str,
        args: Args<'_>,
    ) -> Result<Vec<u8>, ContractError> {
        let invoker = ctx.invoker();
        match function {
            "CreateBalanceForCaller" => self.create_balance_for_caller(ctx, args),
            "CallMintFromDebt" => {
                args.expect_len(2)?;
                let amount = args.amount(1)?;
                Self::adjust_local(ctx, Adjust::Credit(amount))?;
                Ok(invoker.invoke(&Self::target(args)?, "MintFromDebt", &[amount.into()])?)
            }
            "CallTransferFromChaincode" => {
                args.expect_len(3)?;
                let amount = args.amount(1)?;
                Self::adjust_local(ctx, Adjust::Touch)?;
                let call_args: [InvokeArg; 2] = [amount.into(), args.text(2)?.into()];
                Ok(invoker.invoke(&Self::target(args)?, "TransferFromChaincode", &call_args)?)
            }
            "CallTransferFromUser" => {
                args.expect_len(3)?;
                let amount = args.amount(1)?;
                Self::adjust_local(ctx, Adjust::Touch)?;
                let call_args: [InvokeArg; 2] = [amount.into(), args.text(2)?.into()];
                Ok(invoker.invoke(&Self::target(args)?, "TransferFromUser", &call_args)?)
            }
            "CallPayOff" => {
                args.expect_len(2)?;
                let amount = args.amount(1)?;
                Self::adjust_local(ctx, Adjust::Debit(amount))?;
                Ok(invoker.invoke(&Self::target(args)?, "PayOff", &[amount.into()])?)
            }
            "ReadBalance" => {
                let balance: Balance = ctx.store().read(&ctx.client_id())?;
                Ok(serde_json::to_vec(&balance)?)
            }
            other => Err(ContractError::UnknownFunction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::testing::Harness;

    fn funded() -> Harness {
        let net = Harness::new();
        net.submit("token", "Initialize", &["Coin", "CN", "6"]).unwrap();
        net.submit("lending", "CreateBalanceForCaller", &["0"]).unwrap();
        net
    }

    fn local_balance(net: &Harness) -> Amount {
        let balance: Balance =
            serde_json::from_slice(&net.evaluate("lending", "ReadBalance", &[]).unwrap()).unwrap();
        balance.balance
    }

    #[test]
    fn test_create_balance_once() {
        let net = funded();
        let err = net
            .submit("lending", "CreateBalanceForCaller", &["5"])
            .unwrap_err();
        assert_eq!(err, "balance for caller already exists");
    }

    #[test]
    fn test_call_mint_from_debt_updates_both_contracts() {
        let net = funded();
        net.submit("lending", "CallMintFromDebt", &["token", "75"]).unwrap();

        assert_eq!(local_balance(&net), Amount::from_units(75));
        assert_eq!(
            net.evaluate("token", "ClientAccountBalance", &[]).unwrap(),
            b"75.000000"
        );
    }

    #[test]
    fn test_failed_call_rolls_back_local_write() {
        let net = Harness::new();
        net.submit("token", "Initialize", &["Coin", "CN", "6"]).unwrap();
        net.submit("lending", "CreateBalanceForCaller", &["100"]).unwrap();

        // The local debit succeeds; the token contract has no loan to pay off.
        let err = net
            .submit("lending", "CallPayOff", &["token", "5"])
            .unwrap_err();
        assert_eq!(
            err,
            "failed to invoke token: no open loan for x509::CN=alice,OU=client::Org1MSP"
        );
        assert_eq!(local_balance(&net), Amount::from_units(100));
    }

    #[test]
    fn test_local_debit_checked_before_call() {
        let net = funded();
        let err = net
            .submit("lending", "CallPayOff", &["token", "1"])
            .unwrap_err();
        assert!(err.contains("insufficient funds"), "{err}");
    }

    #[test]
    fn test_unknown_token_contract() {
        let net = funded();
        let err = net
            .submit("lending", "CallMintFromDebt", &["nope", "1"])
            .unwrap_err();
        assert_eq!(
            err,
            "failed to invoke nope: chaincode nope not found on channel mychannel"
        );
        assert_eq!(local_balance(&net), Amount::ZERO);
    }

    #[test]
    fn test_transfer_from_chaincode_spends_contract_account() {
        let net = funded();
        net.submit("token", "Mint", &["30"]).unwrap();
        net.submit("token", "Transfer", &["contract::lending", "30"]).unwrap();

        net.submit("lending", "CallTransferFromChaincode", &["token", "12", "carol"])
            .unwrap();
        assert_eq!(
            net.evaluate("token", "BalanceOf", &["contract::lending"]).unwrap(),
            b"18.000000"
        );
        assert_eq!(net.evaluate("token", "BalanceOf", &["carol"]).unwrap(), b"12.000000");
    }

    #[test]
    fn test_transfer_from_user() {
        let net = funded();
        net.submit("token", "Mint", &["5"]).unwrap();
        net.submit("lending", "CallTransferFromUser", &["token", "2", "dave"])
            .unwrap();
        assert_eq!(net.evaluate("token", "ClientAccountBalance", &[]).unwrap(), b"3.000000");
    }
}
