//! # Submission Scenarios
//!
//! Phase timeouts, endorsement policy and retries, seen from the client.

#[cfg(test)]
mod tests {
    use crate::network::{request, TestNetwork};
    use lp_03_submission_pipeline::{
        EndorsementFailure, EndorsementPolicy, Phase, PipelineError, PipelineState,
    };
    use std::collections::HashSet;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    async fn prepare_token(net: &TestNetwork) {
        let token = net.contract("token");
        token
            .submit_transaction("Initialize", &["Coin", "CN", "6"])
            .await
            .unwrap();
        token.submit_transaction("Mint", &["100"]).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_endorsers_time_out_then_retry_succeeds() {
        let net = TestNetwork::new();
        prepare_token(&net).await;
        let height = net.height();

        net.gateway.stall_endorse.store(true, Ordering::SeqCst);
        let mut pipeline = net.context.pipeline();
        let first = pipeline
            .propose(request("token", "Transfer", &["bob", "50"]))
            .unwrap();

        let started = tokio::time::Instant::now();
        let err = pipeline.endorse().await.unwrap_err();
        assert!(started.elapsed() >= Duration::from_secs(15));
        assert_eq!(
            err,
            PipelineError::Endorsement {
                tx_id: first.clone(),
                reason: EndorsementFailure::Timeout(Duration::from_secs(15)),
            }
        );
        assert_eq!(err.phase(), Some(Phase::Endorse));
        assert!(!err.is_indeterminate());
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert_eq!(net.height(), height);

        net.gateway.stall_endorse.store(false, Ordering::SeqCst);
        let second = pipeline
            .propose(request("token", "Transfer", &["bob", "50"]))
            .unwrap();
        assert_ne!(first, second);
        pipeline.endorse().await.unwrap();
        pipeline.submit().await.unwrap();
        let result = pipeline.commit().await.unwrap();
        assert_eq!(result.tx_id, second);
        assert_eq!(
            net.contract("token")
                .evaluate_transaction("BalanceOf", &["bob"])
                .await
                .unwrap(),
            b"50.000000"
        );
    }

    #[tokio::test]
    async fn test_policy_tolerates_one_offline_peer() {
        let net = TestNetwork::with_policy(EndorsementPolicy::new(2, 3));
        prepare_token(&net).await;

        assert!(net.gateway.inner.set_peer_online(0, false));
        let result = net
            .contract("token")
            .submit_transaction("Transfer", &["bob", "10"])
            .await
            .unwrap();
        assert_eq!(result.block_number, net.height() - 1);

        assert!(net.gateway.inner.set_peer_online(1, false));
        let err = net
            .contract("token")
            .submit_transaction("Transfer", &["bob", "10"])
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                PipelineError::Endorsement {
                    reason: EndorsementFailure::Policy(_),
                    ..
                }
            ),
            "{err}"
        );
    }

    #[tokio::test]
    async fn test_clients_share_one_network() {
        let net = TestNetwork::new();
        prepare_token(&net).await;
        let bob = net.client("bob");
        let token = net.contract("token");

        token.submit_transaction("Transfer", &["x509::CN=bob,OU=client::Org1MSP", "30"])
            .await
            .unwrap();
        let bob_token = bob.contract(
            crate::network::channel(),
            shared_types::ContractName::new("token").unwrap(),
        );
        assert_eq!(
            bob_token
                .evaluate_transaction::<&str>("ClientAccountBalance", &[])
                .await
                .unwrap(),
            b"30.000000"
        );
        bob_token
            .submit_transaction("Transfer", &["carol", "5"])
            .await
            .unwrap();
        assert_eq!(
            token.evaluate_transaction("BalanceOf", &["carol"]).await.unwrap(),
            b"5.000000"
        );
    }

    #[tokio::test]
    async fn test_every_submission_gets_a_fresh_id() {
        let net = TestNetwork::new();
        prepare_token(&net).await;
        let token = net.contract("token");

        let mut ids = HashSet::new();
        for _ in 0..5 {
            let result = token
                .submit_transaction("Transfer", &["bob", "1"])
                .await
                .unwrap();
            assert!(ids.insert(result.tx_id));
        }
        assert_eq!(
            token.evaluate_transaction("BalanceOf", &["bob"]).await.unwrap(),
            b"5.000000"
        );
    }

    #[tokio::test]
    async fn test_evaluate_never_commits() {
        let net = TestNetwork::new();
        prepare_token(&net).await;
        let height = net.height();

        let payload = net
            .contract("token")
            .evaluate_transaction("Transfer", &["bob", "10"])
            .await
            .unwrap();
        assert!(payload.is_empty());
        assert_eq!(net.height(), height);
        assert_eq!(
            net.contract("token")
                .evaluate_transaction("BalanceOf", &["bob"])
                .await
                .unwrap(),
            b"0.000000"
        );
    }
}
