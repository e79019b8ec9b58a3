//! # Key Space Against a Real Store
//!
//! Kinds whose names share a prefix (`User`, `UserX`) must never see each
//! other's records, whatever the ids look like.

#[cfg(test)]
mod tests {
    use lp_01_world_state::{
        decode_key, encode_key, Entity, EntityStore, MemoryWorldState, StoreError,
    };
    use proptest::prelude::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeSet;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct User {
        id: String,
    }

    impl Entity for User {
        const KIND: &'static str = "User";
        fn id(&self) -> &str {
            &self.id
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct UserX {
        id: String,
    }

    impl Entity for UserX {
        const KIND: &'static str = "UserX";
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn id_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9|~ ]{1,8}".prop_filter("separator", |id| !id.contains("||"))
    }

    proptest! {
        #[test]
        fn test_listing_never_crosses_kinds(
            users in prop::collection::btree_set(id_strategy(), 0..12),
            others in prop::collection::btree_set(id_strategy(), 0..12),
        ) {
            let state = MemoryWorldState::new();
            let store = EntityStore::new(&state);
            for id in &users {
                store.create(&User { id: id.clone() }).unwrap();
            }
            for id in &others {
                store.create(&UserX { id: id.clone() }).unwrap();
            }

            let listed: Vec<String> = store
                .list_by_kind::<User>()
                .unwrap()
                .into_iter()
                .map(|u| u.id)
                .collect();
            prop_assert_eq!(listed, users.iter().cloned().collect::<Vec<_>>());

            let listed: BTreeSet<String> = store
                .list_by_kind::<UserX>()
                .unwrap()
                .into_iter()
                .map(|u| u.id)
                .collect();
            prop_assert_eq!(listed, others);
        }

        #[test]
        fn test_key_decodes_to_its_pair(id in id_strategy()) {
            let key = encode_key(User::KIND, &id).unwrap();
            prop_assert_eq!(decode_key(key.as_str()), Some((User::KIND, id.as_str())));
            prop_assert_ne!(key, encode_key(UserX::KIND, &id).unwrap());
        }
    }

    #[test]
    fn test_same_id_in_two_kinds_is_two_records() {
        let state = MemoryWorldState::new();
        let store = EntityStore::new(&state);
        store.create(&User { id: "1".into() }).unwrap();
        store.create(&UserX { id: "1".into() }).unwrap();
        assert_eq!(state.len(), 2);

        store.delete::<User>("1").unwrap();
        assert!(matches!(
            store.read::<User>("1"),
            Err(StoreError::NotFound { kind: "User", .. })
        ));
        assert_eq!(store.read::<UserX>("1").unwrap().id, "1");
    }

    #[test]
    fn test_separator_in_id_rejected_before_storage() {
        let state = MemoryWorldState::new();
        let store = EntityStore::new(&state);
        let err = store.create(&User { id: "a||b".into() }).unwrap_err();
        assert!(matches!(err, StoreError::InvalidIdentifier(_)));
        assert!(state.is_empty());
    }
}
