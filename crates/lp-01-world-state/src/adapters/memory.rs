use crate::ports::{StateIterator, StorageError, WorldState};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory implementation of `WorldState` for testing.
///
/// Writes apply immediately; there is no transaction scope.
#[derive(Debug)]
pub struct MemoryWorldState {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    available: AtomicBool,
}

impl MemoryWorldState {
    /// Empty, available store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate a backend outage: every call fails with `Unavailable` while false.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Write raw bytes, bypassing the entity layer.
    pub fn insert_raw(&self, key: impl Into<String>, value: Vec<u8>) {
        self.entries.write().insert(key.into(), value);
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory backend offline".into()))
        }
    }
}

impl Default for MemoryWorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldState for MemoryWorldState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.check_available()?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn del_state(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries.write().remove(key);
        Ok(())
    }

    fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<StateIterator<'_>, StorageError> {
        self.check_available()?;
        if start_key > end_key {
            return Err(StorageError::InvalidRange {
                start: start_key.to_string(),
                end: end_key.to_string(),
            });
        }

        // Snapshot the range so the lock is not held across iteration.
        let snapshot: Vec<_> = self
            .entries
            .read()
            .range(start_key.to_string()..end_key.to_string())
            .map(|(k, v)| Ok((k.clone(), v.clone())))
            .collect();
        Ok(Box::new(snapshot.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_operations() {
        let state = MemoryWorldState::new();

        state.put_state("Asset||a", vec![1, 2, 3]).unwrap();
        assert_eq!(state.get_state("Asset||a").unwrap(), Some(vec![1, 2, 3]));

        state.del_state("Asset||a").unwrap();
        assert_eq!(state.get_state("Asset||a").unwrap(), None);
        assert!(state.is_empty());
    }

    #[test]
    fn test_range_scan_is_ordered_and_half_open() {
        let state = MemoryWorldState::new();
        state.insert_raw("A||b", vec![2]);
        state.insert_raw("A||a", vec![1]);
        state.insert_raw("A|}", vec![9]);
        state.insert_raw("B||a", vec![3]);

        let keys: Vec<_> = state
            .get_state_by_range("A||", "A|}")
            .unwrap()
            .map(|entry| entry.unwrap().0)
            .collect();
        assert_eq!(keys, vec!["A||a".to_string(), "A||b".to_string()]);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let state = MemoryWorldState::new();
        assert!(matches!(
            state.get_state_by_range("b", "a"),
            Err(StorageError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_unavailable_backend() {
        let state = MemoryWorldState::new();
        state.set_available(false);
        assert!(matches!(
            state.get_state("k"),
            Err(StorageError::Unavailable(_))
        ));

        state.set_available(true);
        assert!(state.get_state("k").unwrap().is_none());
    }
}
