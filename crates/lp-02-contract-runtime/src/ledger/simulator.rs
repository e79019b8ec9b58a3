//! # Transaction Simulator
//!
//! Executes a transaction against committed state without changing it,
//! recording what it read and buffering what it would write.
//!
//! Reads of a key the transaction already wrote return the pending value
//! and are not recorded; range scans merge pending writes over committed
//! entries. Only committed observations go into the read set.

use super::{Ledger, StateKey};
use lp_01_world_state::StorageError;
use parking_lot::Mutex;
use shared_types::{KeyRead, KeyWrite, RangeQueryInfo, ReadWriteSet, Version};
use std::collections::BTreeMap;

#[derive(Default)]
struct SimState {
    reads: BTreeMap<StateKey, Option<Version>>,
    ranges: Vec<RangeQueryInfo>,
    writes: BTreeMap<StateKey, Option<Vec<u8>>>,
}

/// Pending writes at some point of the execution.
#[derive(Debug, Clone)]
pub struct Savepoint {
    writes: BTreeMap<StateKey, Option<Vec<u8>>>,
}

/// Simulation scope of one transaction over one channel's ledger.
pub struct TxSimulator<'l> {
    ledger: &'l Ledger,
    state: Mutex<SimState>,
}

impl<'l> TxSimulator<'l> {
    /// Start a simulation over `ledger`.
    pub fn new(ledger: &'l Ledger) -> Self {
        Self {
            ledger,
            state: Mutex::new(SimState::default()),
        }
    }

    /// Current value of `key`, pending writes first.
    pub fn get(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        let state_key = (namespace.to_string(), key.to_string());
        let mut state = self.state.lock();
        if let Some(pending) = state.writes.get(&state_key) {
            return pending.clone();
        }
        let committed = self.ledger.get(namespace, key);
        state
            .reads
            .entry(state_key)
            .or_insert_with(|| committed.as_ref().map(|v| v.version));
        committed.map(|v| v.value)
    }

    /// Buffer a write.
    pub fn put(&self, namespace: &str, key: &str, value: Vec<u8>) {
        self.state
            .lock()
            .writes
            .insert((namespace.to_string(), key.to_string()), Some(value));
    }

    /// Buffer a delete.
    pub fn delete(&self, namespace: &str, key: &str) {
        self.state
            .lock()
            .writes
            .insert((namespace.to_string(), key.to_string()), None);
    }

    /// Entries of `namespace` in `[start, end)` as this transaction sees them.
    pub fn range(
        &self,
        namespace: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
        if start > end {
            return Err(StorageError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let committed = self.ledger.range(namespace, start, end);
        let mut state = self.state.lock();
        state.ranges.push(RangeQueryInfo {
            namespace: namespace.to_string(),
            start_key: start.to_string(),
            end_key: end.to_string(),
            reads: committed
                .iter()
                .map(|(key, value)| KeyRead {
                    namespace: namespace.to_string(),
                    key: key.clone(),
                    version: Some(value.version),
                })
                .collect(),
        });

        let mut merged: BTreeMap<String, Vec<u8>> = committed
            .into_iter()
            .map(|(key, value)| (key, value.value))
            .collect();
        if start < end {
            let bounds = (namespace.to_string(), start.to_string())..(namespace.to_string(), end.to_string());
            for ((_, key), pending) in state.writes.range(bounds) {
                match pending {
                    Some(value) => merged.insert(key.clone(), value.clone()),
                    None => merged.remove(key),
                };
            }
        }
        Ok(merged.into_iter().collect())
    }

    /// Capture the pending writes.
    pub fn savepoint(&self) -> Savepoint {
        Savepoint {
            writes: self.state.lock().writes.clone(),
        }
    }

    /// Discard every write made since `savepoint`.
    pub fn rollback(&self, savepoint: Savepoint) {
        self.state.lock().writes = savepoint.writes;
    }

    /// Finish the simulation.
    pub fn into_rwset(self) -> ReadWriteSet {
        let state = self.state.into_inner();
        ReadWriteSet {
            reads: state
                .reads
                .into_iter()
                .map(|((namespace, key), version)| KeyRead {
                    namespace,
                    key,
                    version,
                })
                .collect(),
            range_queries: state.ranges,
            writes: state
                .writes
                .into_iter()
                .map(|((namespace, key), value)| KeyWrite {
                    namespace,
                    key,
                    value,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::TransactionId;

    fn seeded() -> Ledger {
        let ledger = Ledger::new();
        let sim = TxSimulator::new(&ledger);
        sim.put("basic", "Asset||a", b"1".to_vec());
        sim.put("basic", "Asset||c", b"3".to_vec());
        ledger.commit(TransactionId::from_raw("seed"), sim.into_rwset());
        ledger
    }

    #[test]
    fn test_reads_record_committed_version() {
        let ledger = seeded();
        let sim = TxSimulator::new(&ledger);

        assert_eq!(sim.get("basic", "Asset||a"), Some(b"1".to_vec()));
        assert_eq!(sim.get("basic", "Asset||z"), None);

        let rwset = sim.into_rwset();
        assert_eq!(rwset.reads.len(), 2);
        assert_eq!(rwset.reads[0].version, Some(Version::new(0, 0)));
        assert_eq!(rwset.reads[1].version, None);
        assert!(rwset.is_read_only());
    }

    #[test]
    fn test_reads_see_own_writes() {
        let ledger = seeded();
        let sim = TxSimulator::new(&ledger);

        sim.put("basic", "Asset||b", b"2".to_vec());
        sim.delete("basic", "Asset||a");
        assert_eq!(sim.get("basic", "Asset||b"), Some(b"2".to_vec()));
        assert_eq!(sim.get("basic", "Asset||a"), None);

        let keys: Vec<_> = sim
            .range("basic", "Asset||", "Asset|}")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["Asset||b", "Asset||c"]);

        // The committed ledger is untouched until commit.
        assert!(ledger.get("basic", "Asset||b").is_none());
    }

    #[test]
    fn test_range_records_committed_keys_only() {
        let ledger = seeded();
        let sim = TxSimulator::new(&ledger);
        sim.put("basic", "Asset||b", b"2".to_vec());
        sim.range("basic", "Asset||", "Asset|}").unwrap();

        let rwset = sim.into_rwset();
        let keys: Vec<_> = rwset.range_queries[0].reads.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Asset||a", "Asset||c"]);
    }

    #[test]
    fn test_rollback_discards_later_writes() {
        let ledger = seeded();
        let sim = TxSimulator::new(&ledger);

        sim.put("lending", "Balance||alice", b"10".to_vec());
        let savepoint = sim.savepoint();
        sim.put("token", "Balance||alice", b"50".to_vec());
        sim.rollback(savepoint);

        let rwset = sim.into_rwset();
        assert_eq!(rwset.writes.len(), 1);
        assert_eq!(rwset.writes[0].namespace, "lending");
    }

    #[test]
    fn test_inverted_range_rejected() {
        let ledger = Ledger::new();
        let sim = TxSimulator::new(&ledger);
        assert!(matches!(
            sim.range("basic", "b", "a"),
            Err(StorageError::InvalidRange { .. })
        ));
    }
}
