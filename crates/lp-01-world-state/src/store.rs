//! # Entity Store
//!
//! Generic CRUD over any [`Entity`] kind, built on the key space and the
//! `WorldState` port.
//!
//! ## Existence Invariants
//!
//! | Operation | Precondition | Error |
//! |-----------|--------------|-------|
//! | `create` | absent | `AlreadyExists` |
//! | `read` | present | `NotFound` |
//! | `update` | present | `NotFound` |
//! | `delete` | present | `NotFound` |
//!
//! The existence check and the write are two separate calls on the backing
//! store. Concurrent writers are caught by the host ledger's commit-time
//! conflict detection, not here. `update` is last-write-wins.

use crate::domain::{encode_key, range_bounds, Entity, StoreError};
use crate::ports::{StateIterator, WorldState};
use std::marker::PhantomData;
use tracing::debug;

/// CRUD facade over a borrowed world state.
pub struct EntityStore<'a, S: WorldState + ?Sized> {
    state: &'a S,
}

impl<'a, S: WorldState + ?Sized> EntityStore<'a, S> {
    /// Wrap a world state.
    pub fn new(state: &'a S) -> Self {
        Self { state }
    }

    /// Returns true if `(E::KIND, id)` is stored.
    pub fn exists<E: Entity>(&self, id: &str) -> Result<bool, StoreError> {
        let key = encode_key(E::KIND, id)?;
        Ok(self.state.get_state(key.as_str())?.is_some())
    }

    /// Store a new entity. Fails with `AlreadyExists` if the id is taken.
    pub fn create<E: Entity>(&self, entity: &E) -> Result<(), StoreError> {
        if self.exists::<E>(entity.id())? {
            return Err(StoreError::AlreadyExists {
                kind: E::KIND,
                id: entity.id().to_string(),
            });
        }
        self.write(entity)
    }

    /// Load an entity. Fails with `NotFound` or `Corrupt`.
    pub fn read<E: Entity>(&self, id: &str) -> Result<E, StoreError> {
        let key = encode_key(E::KIND, id)?;
        let bytes = self
            .state
            .get_state(key.as_str())?
            .ok_or_else(|| StoreError::NotFound {
                kind: E::KIND,
                id: id.to_string(),
            })?;
        decode_entity(key.as_str(), id, &bytes)
    }

    /// Overwrite an existing entity. Fails with `NotFound` if absent.
    pub fn update<E: Entity>(&self, entity: &E) -> Result<(), StoreError> {
        if !self.exists::<E>(entity.id())? {
            return Err(StoreError::NotFound {
                kind: E::KIND,
                id: entity.id().to_string(),
            });
        }
        self.write(entity)
    }

    /// Remove an entity. Fails with `NotFound` if absent.
    pub fn delete<E: Entity>(&self, id: &str) -> Result<(), StoreError> {
        if !self.exists::<E>(id)? {
            return Err(StoreError::NotFound {
                kind: E::KIND,
                id: id.to_string(),
            });
        }
        let key = encode_key(E::KIND, id)?;
        self.state.del_state(key.as_str())?;
        debug!(key = %key, "Deleted entity");
        Ok(())
    }

    /// Lazy scan over every entity of kind `E`, ascending by id.
    ///
    /// The scan is fused: after the first error it yields nothing more.
    pub fn scan<E: Entity>(&self) -> Result<EntityScan<'a, E>, StoreError> {
        let range = range_bounds(E::KIND)?;
        let state: &'a S = self.state;
        let inner = state.get_state_by_range(&range.start, &range.end)?;
        Ok(EntityScan {
            inner,
            failed: false,
            _kind: PhantomData,
        })
    }

    /// Every entity of kind `E`, ascending by id.
    ///
    /// All-or-nothing: one undecodable record fails the whole listing.
    pub fn list_by_kind<E: Entity>(&self) -> Result<Vec<E>, StoreError> {
        self.scan::<E>()?.collect()
    }

    fn write<E: Entity>(&self, entity: &E) -> Result<(), StoreError> {
        let key = encode_key(E::KIND, entity.id())?;
        let bytes = serde_json::to_vec(entity).map_err(|e| StoreError::Serialization {
            kind: E::KIND,
            id: entity.id().to_string(),
            reason: e.to_string(),
        })?;
        self.state.put_state(key.as_str(), bytes)?;
        debug!(key = %key, "Wrote entity");
        Ok(())
    }
}

fn decode_entity<E: Entity>(key: &str, id: &str, bytes: &[u8]) -> Result<E, StoreError> {
    let entity: E = serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    if entity.id() != id {
        return Err(StoreError::Corrupt {
            key: key.to_string(),
            reason: format!("record carries id {:?}", entity.id()),
        });
    }
    Ok(entity)
}

/// One-shot iterator over the entities of one kind.
pub struct EntityScan<'a, E: Entity> {
    inner: StateIterator<'a>,
    failed: bool,
    _kind: PhantomData<E>,
}

impl<E: Entity> Iterator for EntityScan<'_, E> {
    type Item = Result<E, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = match self.inner.next()? {
            Ok((key, bytes)) => {
                let id = key
                    .strip_prefix(E::KIND)
                    .and_then(|rest| rest.strip_prefix(crate::domain::KEY_SEPARATOR))
                    .unwrap_or_default()
                    .to_string();
                decode_entity(&key, &id, &bytes)
            }
            Err(e) => Err(StoreError::from(e)),
        };
        self.failed = item.is_err();
        Some(item)
    }
}
