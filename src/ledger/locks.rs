//! Per-entry exclusive locks
//!
//! Every read-modify-write of an entry holds the lock for its
//! (leaderboard, entrant) slot. A contest takes all of its slots in sorted
//! order under one deadline, so overlapping rosters cannot deadlock and a
//! slow holder surfaces as a retryable timeout.

use crate::error::{LeaderboardError, Result};
use crate::types::{EntrantId, LeaderboardId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::warn;

type SlotKey = (LeaderboardId, EntrantId);
type SlotMap = HashMap<SlotKey, Arc<AsyncMutex<()>>>;

/// Drop slots nobody holds or waits on; the map's own handle is the last one
fn release_idle(locks: &Mutex<SlotMap>, keys: &[SlotKey]) {
    if let Ok(mut locks) = locks.lock() {
        for key in keys {
            let idle = locks
                .get(key)
                .map(|handle| Arc::strong_count(handle) == 1)
                .unwrap_or(false);
            if idle {
                locks.remove(key);
            }
        }
    }
}

/// Held entry locks; dropping the guard releases them
#[derive(Debug)]
pub struct EntryLockGuard {
    keys: Vec<SlotKey>,
    guards: Vec<OwnedMutexGuard<()>>,
    locks: Arc<Mutex<SlotMap>>,
}

impl EntryLockGuard {
    /// Entrants covered by this guard, in acquisition order
    pub fn entrants(&self) -> impl Iterator<Item = EntrantId> + '_ {
        self.keys.iter().map(|(_, entrant_id)| *entrant_id)
    }
}

impl Drop for EntryLockGuard {
    fn drop(&mut self) {
        self.guards.clear();
        release_idle(&self.locks, &self.keys);
    }
}

/// Table of per-slot locks, created on first use and removed once idle
#[derive(Debug)]
pub struct EntryLockTable {
    locks: Arc<Mutex<SlotMap>>,
    timeout: Duration,
}

impl EntryLockTable {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    fn handles(&self, keys: &[SlotKey]) -> Result<Vec<Arc<AsyncMutex<()>>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LeaderboardError::InternalError {
                message: "Failed to acquire lock table".to_string(),
            })?;

        Ok(keys
            .iter()
            .map(|key| locks.entry(*key).or_default().clone())
            .collect())
    }

    /// Lock one entrant's slot on a leaderboard
    pub async fn lock_one(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
    ) -> Result<EntryLockGuard> {
        self.lock_all(leaderboard_id, &[entrant_id]).await
    }

    /// Lock every listed entrant's slot, in ascending entrant order
    pub async fn lock_all(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_ids: &[EntrantId],
    ) -> Result<EntryLockGuard> {
        let mut keys: Vec<SlotKey> = entrant_ids
            .iter()
            .map(|entrant_id| (leaderboard_id, *entrant_id))
            .collect();
        keys.sort();
        keys.dedup();

        let handles = self.handles(&keys)?;
        let acquire = async move {
            let mut guards = Vec::with_capacity(handles.len());
            for handle in handles {
                guards.push(handle.lock_owned().await);
            }
            guards
        };

        match tokio::time::timeout(self.timeout, acquire).await {
            Ok(guards) => Ok(EntryLockGuard {
                keys,
                guards,
                locks: self.locks.clone(),
            }),
            Err(_) => {
                // The abandoned acquisition has dropped its handles by now
                release_idle(&self.locks, &keys);
                let waited_ms = self.timeout.as_millis() as u64;
                warn!(
                    leaderboard_id = %leaderboard_id,
                    entries = keys.len(),
                    waited_ms,
                    "Timed out acquiring entry locks"
                );
                Err(LeaderboardError::LockTimeout { waited_ms }.into())
            }
        }
    }

    /// Number of slots currently held or waited on
    pub fn len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::classify;
    use crate::utils::generate_id;

    #[tokio::test]
    async fn test_lock_all_sorts_and_dedups() {
        let table = EntryLockTable::new(Duration::from_millis(100));
        let leaderboard_id = generate_id();
        let a = generate_id();
        let b = generate_id();

        let guard = table.lock_all(leaderboard_id, &[b, a, b]).await.unwrap();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(guard.entrants().collect::<Vec<_>>(), expected);
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_contended_slot_times_out() {
        let table = EntryLockTable::new(Duration::from_millis(50));
        let leaderboard_id = generate_id();
        let entrant = generate_id();

        let _held = table.lock_one(leaderboard_id, entrant).await.unwrap();
        let err = table.lock_one(leaderboard_id, entrant).await.unwrap_err();

        let kind = classify(&err).unwrap();
        assert!(kind.is_retryable());
    }

    #[tokio::test]
    async fn test_lock_released_on_drop() {
        let table = EntryLockTable::new(Duration::from_millis(50));
        let leaderboard_id = generate_id();
        let entrant = generate_id();

        {
            let _held = table.lock_one(leaderboard_id, entrant).await.unwrap();
        }
        assert!(table.lock_one(leaderboard_id, entrant).await.is_ok());
    }

    #[tokio::test]
    async fn test_idle_slots_are_removed() {
        let table = EntryLockTable::new(Duration::from_millis(50));
        let leaderboard_id = generate_id();
        let entrants: Vec<EntrantId> = (0..4).map(|_| generate_id()).collect();

        {
            let _held = table.lock_all(leaderboard_id, &entrants).await.unwrap();
            assert_eq!(table.len(), 4);
        }
        assert!(table.is_empty());

        for _ in 0..100 {
            let _guard = table.lock_one(leaderboard_id, generate_id()).await.unwrap();
        }
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_slot_kept_while_another_caller_waits() {
        let table = Arc::new(EntryLockTable::new(Duration::from_millis(500)));
        let leaderboard_id = generate_id();
        let entrant = generate_id();

        let held = table.lock_one(leaderboard_id, entrant).await.unwrap();
        let waiter = {
            let table = table.clone();
            tokio::spawn(async move {
                let guard = table.lock_one(leaderboard_id, entrant).await.unwrap();
                let slots = table.len();
                drop(guard);
                slots
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(held);
        assert_eq!(waiter.await.unwrap(), 1);
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_timed_out_acquisition_leaves_no_slots() {
        let table = EntryLockTable::new(Duration::from_millis(20));
        let leaderboard_id = generate_id();
        let busy = generate_id();
        let free = generate_id();

        let held = table.lock_one(leaderboard_id, busy).await.unwrap();
        assert!(table.lock_all(leaderboard_id, &[busy, free]).await.is_err());
        assert_eq!(table.len(), 1);

        drop(held);
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_same_entrant_on_other_leaderboard_is_independent() {
        let table = EntryLockTable::new(Duration::from_millis(50));
        let entrant = generate_id();

        let _held = table.lock_one(generate_id(), entrant).await.unwrap();
        assert!(table.lock_one(generate_id(), entrant).await.is_ok());
    }
}
