//! # Entity Store Through the Pipeline
//!
//! The asset contract's CRUD functions, driven by a client over the
//! in-process network.

#[cfg(test)]
mod tests {
    use crate::network::TestNetwork;
    use lp_02_contract_runtime::contracts::{Asset, User};
    use lp_03_submission_pipeline::{EndorsementFailure, PipelineError};

    fn chaincode_message(err: PipelineError) -> String {
        match err {
            PipelineError::Endorsement {
                reason: EndorsementFailure::Chaincode { message, .. },
                ..
            }
            | PipelineError::Evaluation {
                reason: EndorsementFailure::Chaincode { message, .. },
                ..
            } => message,
            other => panic!("expected a chaincode failure, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_init_ledger_lists_by_kind() {
        let net = TestNetwork::new();
        let basic = net.contract("basic");
        basic.submit_transaction::<&str>("InitLedger", &[]).await.unwrap();

        let assets: Vec<Asset> =
            serde_json::from_slice(&basic.evaluate_transaction::<&str>("GetAllAssets", &[]).await.unwrap())
                .unwrap();
        let ids: Vec<&str> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["asset1", "asset2", "asset3", "asset4", "asset5", "asset6"]);

        let users: Vec<User> =
            serde_json::from_slice(&basic.evaluate_transaction::<&str>("GetAllUsers", &[]).await.unwrap())
                .unwrap();
        assert_eq!(users.len(), 6);
        assert!(users.iter().all(|u| u.id.starts_with("user")));
    }

    #[tokio::test]
    async fn test_asset_lifecycle() {
        let net = TestNetwork::new();
        let basic = net.contract("basic");

        basic
            .submit_transaction("CreateAsset", &["asset7", "purple", "20", "Ana", "900"])
            .await
            .unwrap();
        let err = basic
            .submit_transaction("CreateAsset", &["asset7", "pink", "1", "Bo", "1"])
            .await
            .unwrap_err();
        assert_eq!(chaincode_message(err), "the Asset asset7 already exists");

        let asset: Asset = serde_json::from_slice(
            &basic.evaluate_transaction("ReadAsset", &["asset7"]).await.unwrap(),
        )
        .unwrap();
        assert_eq!(asset.color, "purple");
        assert_eq!(asset.appraised_value, 900);

        let previous = basic
            .submit_transaction("TransferAsset", &["asset7", "Christopher"])
            .await
            .unwrap();
        assert_eq!(previous.result, b"Ana");

        basic
            .submit_transaction("DeleteAsset", &["asset7"])
            .await
            .unwrap();
        assert_eq!(
            basic.evaluate_transaction("AssetExists", &["asset7"]).await.unwrap(),
            b"false"
        );
        let err = basic
            .submit_transaction("UpdateAsset", &["asset7", "red", "1", "Bo", "1"])
            .await
            .unwrap_err();
        assert_eq!(chaincode_message(err), "the Asset asset7 does not exist");
    }

    #[tokio::test]
    async fn test_failed_create_leaves_no_trace() {
        let net = TestNetwork::new();
        let basic = net.contract("basic");
        let height = net.height();

        let err = basic
            .submit_transaction("CreateAsset", &["asset9", "blue", "not-a-number", "Ana", "1"])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Endorsement { .. }), "{err}");
        assert_eq!(net.height(), height);
        assert_eq!(
            basic.evaluate_transaction("AssetExists", &["asset9"]).await.unwrap(),
            b"false"
        );
    }

    #[tokio::test]
    async fn test_user_and_asset_ids_do_not_collide() {
        let net = TestNetwork::new();
        let basic = net.contract("basic");
        basic
            .submit_transaction("CreateAsset", &["x1", "blue", "1", "Ana", "1"])
            .await
            .unwrap();
        basic
            .submit_transaction("CreateUser", &["x1", "Ana", "30", "Female"])
            .await
            .unwrap();

        basic.submit_transaction("DeleteUser", &["x1"]).await.unwrap();
        assert_eq!(
            basic.evaluate_transaction("AssetExists", &["x1"]).await.unwrap(),
            b"true"
        );
    }
}
