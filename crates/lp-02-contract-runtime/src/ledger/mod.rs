//! # Committed Ledger
//!
//! Versioned world state of one channel plus the validation codes of every
//! transaction it has seen.
//!
//! ## Commit-Time Validation
//!
//! Transactions in a block are validated in order; each one sees the writes
//! of the valid transactions before it.
//!
//! | Check | Failure |
//! |-------|---------|
//! | Tx id not seen before | `DUPLICATE_TXID` |
//! | Every read key still has the version observed | `MVCC_READ_CONFLICT` |
//! | Every range scan returns the same keys and versions | `PHANTOM_READ_CONFLICT` |
//!
//! Only valid transactions apply their writes, all at once.

pub mod simulator;

pub use simulator::{Savepoint, TxSimulator};

use parking_lot::RwLock;
use shared_types::{KeyRead, ReadWriteSet, TransactionId, ValidationCode, Version};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

type StateKey = (String, String);

/// A committed value with the version of its last writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    /// Stored bytes.
    pub value: Vec<u8>,
    /// Version of the transaction that wrote them.
    pub version: Version,
}

#[derive(Default)]
struct LedgerInner {
    state: BTreeMap<StateKey, VersionedValue>,
    height: u64,
    tx_codes: HashMap<TransactionId, ValidationCode>,
}

/// Committed state of one channel.
#[derive(Default)]
pub struct Ledger {
    inner: RwLock<LedgerInner>,
}

impl Ledger {
    /// Empty ledger at height 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed value of `key` in `namespace`.
    pub fn get(&self, namespace: &str, key: &str) -> Option<VersionedValue> {
        self.inner
            .read()
            .state
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }

    /// Committed entries of `namespace` in `[start, end)`, ascending.
    pub fn range(&self, namespace: &str, start: &str, end: &str) -> Vec<(String, VersionedValue)> {
        scan(&self.inner.read().state, namespace, start, end)
    }

    /// Number of committed blocks.
    pub fn height(&self) -> u64 {
        self.inner.read().height
    }

    /// Validation code of a committed transaction.
    pub fn validation_code(&self, tx_id: &TransactionId) -> Option<ValidationCode> {
        self.inner.read().tx_codes.get(tx_id).copied()
    }

    /// Returns true if the transaction id has already been committed
    /// (valid or not).
    pub fn contains_tx(&self, tx_id: &TransactionId) -> bool {
        self.inner.read().tx_codes.contains_key(tx_id)
    }

    /// Commit a block holding a single transaction.
    pub fn commit(&self, tx_id: TransactionId, rwset: ReadWriteSet) -> ValidationCode {
        self.commit_block(vec![(tx_id, rwset)])
            .pop()
            .unwrap_or(ValidationCode::Valid)
    }

    /// Validate and commit a block. Returns one code per transaction, in order.
    pub fn commit_block(&self, transactions: Vec<(TransactionId, ReadWriteSet)>) -> Vec<ValidationCode> {
        let mut inner = self.inner.write();
        let block_num = inner.height;
        let mut codes = Vec::with_capacity(transactions.len());

        for (tx_num, (tx_id, rwset)) in transactions.into_iter().enumerate() {
            let code = if inner.tx_codes.contains_key(&tx_id) {
                ValidationCode::DuplicateTxId
            } else {
                validate(&inner.state, &rwset)
            };

            if code.is_valid() {
                let version = Version::new(block_num, tx_num as u64);
                for write in rwset.writes {
                    let key = (write.namespace, write.key);
                    match write.value {
                        Some(value) => {
                            inner.state.insert(key, VersionedValue { value, version });
                        }
                        None => {
                            inner.state.remove(&key);
                        }
                    }
                }
                debug!(tx_id = %tx_id, block_num, tx_num, "Transaction valid");
            } else {
                warn!(tx_id = %tx_id, block_num, code = %code, "Transaction invalidated");
            }

            // A duplicate never overwrites the code of the original.
            inner.tx_codes.entry(tx_id).or_insert(code);
            codes.push(code);
        }

        inner.height += 1;
        info!(block_num, transactions = codes.len(), "Committed block");
        codes
    }
}

fn scan(
    state: &BTreeMap<StateKey, VersionedValue>,
    namespace: &str,
    start: &str,
    end: &str,
) -> Vec<(String, VersionedValue)> {
    if start >= end {
        return Vec::new();
    }
    state
        .range((namespace.to_string(), start.to_string())..(namespace.to_string(), end.to_string()))
        .map(|((_, key), value)| (key.clone(), value.clone()))
        .collect()
}

fn validate(state: &BTreeMap<StateKey, VersionedValue>, rwset: &ReadWriteSet) -> ValidationCode {
    for read in &rwset.reads {
        let current = state
            .get(&(read.namespace.clone(), read.key.clone()))
            .map(|v| v.version);
        if current != read.version {
            return ValidationCode::MvccReadConflict;
        }
    }

    for query in &rwset.range_queries {
        let current: Vec<KeyRead> = scan(state, &query.namespace, &query.start_key, &query.end_key)
            .into_iter()
            .map(|(key, value)| KeyRead {
                namespace: query.namespace.clone(),
                key,
                version: Some(value.version),
            })
            .collect();
        if current != query.reads {
            return ValidationCode::PhantomReadConflict;
        }
    }

    ValidationCode::Valid
}
