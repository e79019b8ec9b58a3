//! # Asset Contract
//!
//! CRUD over assets and users on top of the entity store.

use super::model::{Asset, User};
use crate::context::TransactionContext;
use crate::domain::args::Args;
use crate::errors::ContractError;
use crate::ports::TransactionHandler;
use tracing::info;

/// Asset and user registry.
#[derive(Debug, Default)]
pub struct AssetContract;

impl AssetContract {
    /// Create the contract.
    pub fn new() -> Self {
        Self
    }

    fn init_ledger(&self, ctx: &TransactionContext<'_>) -> Result<Vec<u8>, ContractError> {
        let store = ctx.store();
        let assets = [
            ("asset1", "blue", 5, "Tomoko", 300),
            ("asset2", "red", 5, "Brad", 400),
            ("asset3", "green", 10, "Jin Soo", 500),
            ("asset4", "yellow", 10, "Max", 600),
            ("asset5", "black", 15, "Adriana", 700),
            ("asset6", "white", 15, "Michel", 800),
        ];
        for (id, color, size, owner, appraised_value) in assets {
            store.create(&Asset {
                id: id.into(),
                color: color.into(),
                size,
                owner: owner.into(),
                appraised_value,
            })?;
        }

        let users = [
            ("user1", "Quang", 22, "Male"),
            ("user2", "Huy", 30, "Male"),
            ("user3", "Teo", 21, "Male"),
            ("user4", "Thuy", 18, "Female"),
            ("user5", "Ha", 12, "Female"),
            ("user6", "Hue", 29, "Female"),
        ];
        for (id, name, age, sex) in users {
            store.create(&User {
                id: id.into(),
                name: name.into(),
                age,
                sex: sex.into(),
            })?;
        }
        Ok(Vec::new())
    }

    fn asset_from_args(args: Args<'_>) -> Result<Asset, ContractError> {
        args.expect_len(5)?;
        Ok(Asset {
            id: args.text(0)?.to_string(),
            color: args.text(1)?.to_string(),
            size: args.parse(2, "integer")?,
            owner: args.text(3)?.to_string(),
            appraised_value: args.parse(4, "integer")?,
        })
    }

    fn user_from_args(args: Args<'_>) -> Result<User, ContractError> {
        args.expect_len(4)?;
        Ok(User {
            id: args.text(0)?.to_string(),
            name: args.text(1)?.to_string(),
            age: args.parse(2, "integer")?,
            sex: args.text(3)?.to_string(),
        })
    }

    fn log_caller(ctx: &TransactionContext<'_>, function: &str) {
        if let Some(caller) = ctx.stub().invoking_contract() {
            info!(invoked_by = %caller, function, "Called through another contract");
        }
    }

    fn transfer_asset(&self, ctx: &TransactionContext<'_>, args: Args<'_>) -> Result<Vec<u8>, ContractError> {
        args.expect_len(2)?;
        let store = ctx.store();
        let mut asset: Asset = store.read(args.text(0)?)?;
        let old_owner = std::mem::replace(&mut asset.owner, args.text(1)?.to_string());
        store.update(&asset)?;
        Ok(old_owner.into_bytes())
    }
}

impl TransactionHandler for AssetContract {
    fn invoke(
        &self,
        ctx: &TransactionContext<'_>,
        function: &str,
        args: Args<'_>,
    ) -> Result<Vec<u8>, ContractError> {
        let store = ctx.store();
        match function {
            "InitLedger" => self.init_ledger(ctx),

            "CreateAsset" => {
                store.create(&Self::asset_from_args(args)?)?;
                Ok(Vec::new())
            }
            "ReadAsset" => {
                Self::log_caller(ctx, function);
                args.expect_len(1)?;
                let asset: Asset = store.read(args.text(0)?)?;
                Ok(serde_json::to_vec(&asset)?)
            }
            "UpdateAsset" => {
                store.update(&Self::asset_from_args(args)?)?;
                Ok(Vec::new())
            }
            "DeleteAsset" => {
                args.expect_len(1)?;
                store.delete::<Asset>(args.text(0)?)?;
                Ok(Vec::new())
            }
            "AssetExists" => {
                args.expect_len(1)?;
                Ok(store.exists::<Asset>(args.text(0)?)?.to_string().into_bytes())
            }
            "TransferAsset" => self.transfer_asset(ctx, args),
            "GetAllAssets" => {
                Self::log_caller(ctx, function);
                let assets: Vec<Asset> = store.list_by_kind()?;
                Ok(serde_json::to_vec(&assets)?)
            }

            "CreateUser" => {
                store.create(&Self::user_from_args(args)?)?;
                Ok(Vec::new())
            }
            "ReadUser" => {
                Self::log_caller(ctx, function);
                args.expect_len(1)?;
                let user: User = store.read(args.text(0)?)?;
                Ok(serde_json::to_vec(&user)?)
            }
            "UpdateUser" => {
                store.update(&Self::user_from_args(args)?)?;
                Ok(Vec::new())
            }
            "DeleteUser" => {
                args.expect_len(1)?;
                store.delete::<User>(args.text(0)?)?;
                Ok(Vec::new())
            }
            "GetAllUsers" => {
                Self::log_caller(ctx, function);
                let users: Vec<User> = store.list_by_kind()?;
                Ok(serde_json::to_vec(&users)?)
            }

            other => Err(ContractError::UnknownFunction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::testing::Harness;

    #[test]
    fn test_init_ledger_seeds_assets_and_users() {
        let net = Harness::new();
        net.submit("basic", "InitLedger", &[]).unwrap();

        let assets: Vec<Asset> =
            serde_json::from_slice(&net.evaluate("basic", "GetAllAssets", &[]).unwrap()).unwrap();
        let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["asset1", "asset2", "asset3", "asset4", "asset5", "asset6"]);

        let users: Vec<User> =
            serde_json::from_slice(&net.evaluate("basic", "GetAllUsers", &[]).unwrap()).unwrap();
        assert_eq!(users.len(), 6);
        assert_eq!(users[3].name, "Thuy");
    }

    #[test]
    fn test_init_ledger_twice_fails() {
        let net = Harness::new();
        net.submit("basic", "InitLedger", &[]).unwrap();
        let err = net.submit("basic", "InitLedger", &[]).unwrap_err();
        assert!(err.contains("the Asset asset1 already exists"), "{err}");
    }

    #[test]
    fn test_asset_lifecycle() {
        let net = Harness::new();
        net.submit("basic", "CreateAsset", &["asset7", "pink", "3", "Ana", "90"])
            .unwrap();
        assert_eq!(net.evaluate("basic", "AssetExists", &["asset7"]).unwrap(), b"true");

        let old = net.submit("basic", "TransferAsset", &["asset7", "Bo"]).unwrap();
        assert_eq!(old, b"Ana");

        let asset: Asset =
            serde_json::from_slice(&net.evaluate("basic", "ReadAsset", &["asset7"]).unwrap()).unwrap();
        assert_eq!(asset.owner, "Bo");

        net.submit("basic", "DeleteAsset", &["asset7"]).unwrap();
        assert_eq!(net.evaluate("basic", "AssetExists", &["asset7"]).unwrap(), b"false");
    }

    #[test]
    fn test_missing_entities_report_not_found() {
        let net = Harness::new();
        let err = net
            .submit("basic", "UpdateAsset", &["ghost", "red", "1", "X", "1"])
            .unwrap_err();
        assert_eq!(err, "the Asset ghost does not exist");

        let err = net.submit("basic", "DeleteUser", &["ghost"]).unwrap_err();
        assert_eq!(err, "the User ghost does not exist");
    }

    #[test]
    fn test_bad_arguments() {
        let net = Harness::new();
        let err = net
            .submit("basic", "CreateAsset", &["a", "red", "big", "X", "1"])
            .unwrap_err();
        assert!(err.contains("cannot parse \"big\" as integer"), "{err}");

        let err = net.submit("basic", "CreateUser", &["u"]).unwrap_err();
        assert!(err.contains("incorrect number of arguments"), "{err}");

        let err = net.evaluate("basic", "Nope", &[]).unwrap_err();
        assert_eq!(err, "function Nope not found");
    }
}
