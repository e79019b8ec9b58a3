//! # Cross-Contract Calls Through the Pipeline
//!
//! The lending contract calls the token contract inside one transaction.
//! Either both contracts' writes commit together or neither does.

#[cfg(test)]
mod tests {
    use crate::network::TestNetwork;
    use lp_02_contract_runtime::contracts::Balance;
    use lp_02_contract_runtime::Amount;
    use lp_03_submission_pipeline::{EndorsementFailure, PipelineError};

    async fn funded(net: &TestNetwork, opening: &str) {
        net.contract("token")
            .submit_transaction("Initialize", &["Coin", "CN", "6"])
            .await
            .unwrap();
        net.contract("lending")
            .submit_transaction("CreateBalanceForCaller", &[opening])
            .await
            .unwrap();
    }

    async fn local_balance(net: &TestNetwork) -> Amount {
        let bytes = net
            .contract("lending")
            .evaluate_transaction::<&str>("ReadBalance", &[])
            .await
            .unwrap();
        serde_json::from_slice::<Balance>(&bytes).unwrap().balance
    }

    #[tokio::test]
    async fn test_nested_call_commits_both_contracts() {
        let net = TestNetwork::new();
        funded(&net, "0").await;
        let height = net.height();

        net.contract("lending")
            .submit_transaction("CallMintFromDebt", &["token", "75"])
            .await
            .unwrap();

        assert_eq!(net.height(), height + 1);
        assert_eq!(local_balance(&net).await, Amount::from_units(75));
        assert_eq!(
            net.contract("token")
                .evaluate_transaction::<&str>("ClientAccountBalance", &[])
                .await
                .unwrap(),
            b"75.000000"
        );
        assert_eq!(
            net.contract("token")
                .evaluate_transaction::<&str>("TotalSupply", &[])
                .await
                .unwrap(),
            b"75.000000"
        );
    }

    #[tokio::test]
    async fn test_failed_nested_call_discards_caller_writes() {
        let net = TestNetwork::new();
        funded(&net, "100").await;
        let height = net.height();

        // Debits the caller's local balance, then the token contract refuses.
        let err = net
            .contract("lending")
            .submit_transaction("CallPayOff", &["token", "5"])
            .await
            .unwrap_err();
        match err {
            PipelineError::Endorsement {
                reason: EndorsementFailure::Chaincode { message, .. },
                ..
            } => assert!(message.starts_with("failed to invoke token: no open loan"), "{message}"),
            other => panic!("unexpected {other}"),
        }

        assert_eq!(net.height(), height);
        assert_eq!(local_balance(&net).await, Amount::from_units(100));
    }

    #[tokio::test]
    async fn test_loan_round_trip() {
        let net = TestNetwork::new();
        funded(&net, "0").await;
        let lending = net.contract("lending");

        lending
            .submit_transaction("CallMintFromDebt", &["token", "40"])
            .await
            .unwrap();
        lending
            .submit_transaction("CallPayOff", &["token", "40"])
            .await
            .unwrap();

        assert_eq!(local_balance(&net).await, Amount::ZERO);
        assert_eq!(
            net.contract("token")
                .evaluate_transaction::<&str>("ClientAccountBalance", &[])
                .await
                .unwrap(),
            b"0.000000"
        );
    }

    #[tokio::test]
    async fn test_calling_a_missing_contract() {
        let net = TestNetwork::new();
        funded(&net, "0").await;
        let err = net
            .contract("lending")
            .submit_transaction("CallMintFromDebt", &["nope", "1"])
            .await
            .unwrap_err();
        assert!(
            err.to_string()
                .contains("failed to invoke nope: chaincode nope not found on channel mychannel"),
            "{err}"
        );
        assert_eq!(local_balance(&net).await, Amount::ZERO);
    }
}
