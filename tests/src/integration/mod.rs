//! Cross-crate scenarios.

mod cross_contract;
mod entity_store;
mod key_space;
mod submission;
