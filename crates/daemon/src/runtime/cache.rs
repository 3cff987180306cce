// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partition state cache: position-based locking over per-partition state.

use projection_core::{CheckpointTag, PartitionState, ROOT_PARTITION};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("partition {0:?} is locked by a different owner")]
    OwnerConflict(String),
    #[error("partition {0:?} is not cached")]
    Absent(String),
}

/// In-memory mapping from partition key to cached state, with a
/// position-based lock that gates which tag may next update the entry.
///
/// The root partition (key `""`) is seeded at [`PartitionStateCache::initialize`]
/// and is never evicted by [`PartitionStateCache::unlock`].
#[derive(Debug, Default)]
pub struct PartitionStateCache {
    entries: HashMap<String, PartitionState>,
}

impl PartitionStateCache {
    pub fn new() -> Self {
        let mut cache = Self { entries: HashMap::new() };
        cache.initialize();
        cache
    }

    /// Clear all entries; seed root with empty state and no lock.
    pub fn initialize(&mut self) {
        self.entries.clear();
        self.entries.insert(ROOT_PARTITION.to_string(), PartitionState::empty());
    }

    pub fn cached_item_count(&self) -> usize {
        self.entries.len()
    }

    /// Upsert `key`'s entry. Fails if it is currently locked at or after
    /// `at` under a different owner than `owner`.
    pub fn cache_and_lock(
        &mut self,
        key: &str,
        state: Vec<u8>,
        at: Option<CheckpointTag>,
        owner: Option<u64>,
    ) -> Result<(), CacheError> {
        if let Some(existing) = self.entries.get(key) {
            if let (Some(locked_at), Some(at)) = (existing.locked_at, at) {
                let owned_elsewhere = existing.owner_tag.is_some() && existing.owner_tag != owner;
                if locked_at >= at && owned_elsewhere {
                    return Err(CacheError::OwnerConflict(key.to_string()));
                }
            }
        }
        self.entries.insert(key.to_string(), PartitionState { state, locked_at: at, owner_tag: owner });
        Ok(())
    }

    /// Return the cached state for `key` and advance its lock to `at`.
    /// Returns `Ok(None)` if the key has never been cached.
    pub fn try_get_and_lock(
        &mut self,
        key: &str,
        at: CheckpointTag,
    ) -> Result<Option<Vec<u8>>, CacheError> {
        let Some(entry) = self.entries.get_mut(key) else { return Ok(None) };
        if let Some(locked_at) = entry.locked_at {
            let owned_elsewhere = entry.owner_tag.is_some();
            if locked_at > at && owned_elsewhere {
                return Err(CacheError::OwnerConflict(key.to_string()));
            }
        }
        entry.locked_at = Some(at);
        Ok(Some(entry.state.clone()))
    }

    /// Read the currently cached state for `key`. Fails if absent.
    pub fn get_locked(&self, key: &str) -> Result<&[u8], CacheError> {
        self.entries.get(key).map(|e| e.state.as_slice()).ok_or_else(|| CacheError::Absent(key.to_string()))
    }

    /// Purge all non-root entries whose lock is strictly less than `upto`.
    pub fn unlock(&mut self, upto: CheckpointTag) {
        self.entries.retain(|key, entry| {
            if key == ROOT_PARTITION {
                return true;
            }
            match entry.locked_at {
                Some(locked_at) => locked_at >= upto,
                None => true,
            }
        });
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
