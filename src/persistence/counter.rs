//! Persisted counters
//!
//! A counter mirrors one storage key holding a decimal integer. The stored
//! value is read back on construction, on [`PersistedCounter::reload`] and
//! before every increment, so several owners sharing a backend (navigation
//! bar, games) never clobber each other.
//!
//! A failed write or remove leaves the counter dirty: the in-memory value
//! then wins over whatever storage holds, and the pending write is retried
//! on the next mutation or reload.

use std::rc::Rc;

use super::storage::KeyValueStore;

/// Storage key of the application-wide points total
pub const POINTS_KEY: &str = "totalPoints";

/// Storage operation that has not reached the backend yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Write,
    Remove,
}

/// A non-negative integer persisted under a single key
pub struct PersistedCounter {
    key: &'static str,
    store: Rc<dyn KeyValueStore>,
    value: u64,
    pending: Option<Pending>,
}

impl std::fmt::Debug for PersistedCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedCounter")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("pending", &self.pending)
            .finish()
    }
}

impl PersistedCounter {
    /// Load the counter; a missing or unreadable key counts as zero
    pub fn load(key: &'static str, store: Rc<dyn KeyValueStore>) -> Self {
        let mut counter = Self {
            key,
            store,
            value: 0,
            pending: None,
        };
        if let Some(value) = counter.read_stored() {
            counter.value = value;
        }
        counter
    }

    pub fn get(&self) -> u64 {
        self.value
    }

    /// In-memory value not yet persisted
    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    /// Re-read the stored value. A dirty counter first retries its pending
    /// write and keeps its own value while storage still refuses it.
    pub fn reload(&mut self) -> u64 {
        if !self.flush() {
            return self.value;
        }
        if let Some(value) = self.read_stored() {
            self.value = value;
        }
        self.value
    }

    /// Add to the stored total and write it back. Returns the new total.
    pub fn add(&mut self, amount: u64) -> u64 {
        if !self.is_dirty() {
            if let Some(stored) = self.read_stored() {
                self.value = stored;
            }
        }
        self.value = self.value.saturating_add(amount);
        self.pending = Some(Pending::Write);
        self.flush();
        self.value
    }

    /// Overwrite the value
    pub fn set(&mut self, value: u64) {
        self.value = value;
        self.pending = Some(Pending::Write);
        self.flush();
    }

    /// Zero the counter and clear the stored key
    pub fn reset(&mut self) {
        self.value = 0;
        self.pending = Some(Pending::Remove);
        self.flush();
    }

    /// Push the pending operation to storage. Returns false while it still
    /// fails.
    fn flush(&mut self) -> bool {
        let result = match self.pending {
            None => return true,
            Some(Pending::Write) => self.store.set_item(self.key, &self.value.to_string()),
            Some(Pending::Remove) => self.store.remove_item(self.key),
        };
        match result {
            Ok(()) => {
                self.pending = None;
                true
            }
            Err(e) => {
                log::warn!("Could not persist '{}' = {}: {}", self.key, self.value, e);
                false
            }
        }
    }

    /// `None` when the backend fails; unparsable text counts as zero
    fn read_stored(&self) -> Option<u64> {
        match self.store.get_item(self.key) {
            Ok(Some(text)) => match text.trim().parse::<u64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    log::warn!("Ignoring non-numeric '{}' value {:?}", self.key, text);
                    Some(0)
                }
            },
            Ok(None) => Some(0),
            Err(e) => {
                log::warn!("Could not read '{}': {}", self.key, e);
                None
            }
        }
    }
}

/// The rewards economy's running points total
#[derive(Debug)]
pub struct PointsLedger {
    counter: PersistedCounter,
}

impl PointsLedger {
    pub fn load(store: Rc<dyn KeyValueStore>) -> Self {
        let counter = PersistedCounter::load(POINTS_KEY, store);
        log::info!("Points ledger loaded: {} pts", counter.get());
        Self { counter }
    }

    pub fn total_points(&self) -> u64 {
        self.counter.get()
    }

    pub fn add_points(&mut self, amount: u64) -> u64 {
        let total = self.counter.add(amount);
        log::info!("Awarded {} pts (total {})", amount, total);
        total
    }

    pub fn reset_points(&mut self) {
        self.counter.reset();
        log::info!("Points ledger reset");
    }

    /// Pick up changes written by another owner of the same storage
    pub fn reload(&mut self) -> u64 {
        self.counter.reload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn store() -> Rc<MemoryStore> {
        Rc::new(MemoryStore::new())
    }

    #[test]
    fn test_missing_key_is_zero() {
        let ledger = PointsLedger::load(store());
        assert_eq!(ledger.total_points(), 0);
    }

    #[test]
    fn test_add_persists_decimal_text() {
        let store = store();
        let mut ledger = PointsLedger::load(store.clone());
        ledger.add_points(7);
        ledger.add_points(5);
        assert_eq!(ledger.total_points(), 12);
        assert_eq!(store.get_item(POINTS_KEY), Ok(Some("12".to_string())));

        let reloaded = PointsLedger::load(store);
        assert_eq!(reloaded.total_points(), 12);
    }

    #[test]
    fn test_reset_clears_key() {
        let store = store();
        let mut ledger = PointsLedger::load(store.clone());
        ledger.add_points(3);
        ledger.reset_points();
        assert_eq!(ledger.total_points(), 0);
        assert_eq!(store.get_item(POINTS_KEY), Ok(None));
    }

    #[test]
    fn test_shared_store_reconciles() {
        let store = store();
        let mut nav = PointsLedger::load(store.clone());
        let mut game = PointsLedger::load(store.clone());
        nav.add_points(10);
        game.add_points(4);
        assert_eq!(game.total_points(), 14);
        assert_eq!(nav.reload(), 14);
    }

    #[test]
    fn test_garbage_value_counts_as_zero() {
        let store = store();
        store.set_item(POINTS_KEY, "lots").unwrap();
        let mut ledger = PointsLedger::load(store);
        assert_eq!(ledger.total_points(), 0);
        assert_eq!(ledger.add_points(2), 2);
    }

    #[test]
    fn test_write_failure_keeps_memory_value() {
        let store = store();
        let mut counter = PersistedCounter::load("k", store.clone());
        counter.add(4);
        store.set_read_only(true);
        assert_eq!(counter.add(3), 7);
        assert_eq!(counter.get(), 7);
        assert_eq!(store.get_item("k"), Ok(Some("4".to_string())));
        assert!(counter.is_dirty());
    }

    #[test]
    fn test_failed_write_is_retried_after_recovery() {
        let store = store();
        let mut ledger = PointsLedger::load(store.clone());
        ledger.add_points(4);
        store.set_read_only(true);
        assert_eq!(ledger.add_points(3), 7);
        store.set_read_only(false);
        assert_eq!(ledger.add_points(1), 8);
        assert_eq!(store.get_item(POINTS_KEY), Ok(Some("8".to_string())));
    }

    #[test]
    fn test_failed_reset_is_not_undone() {
        let store = store();
        let mut ledger = PointsLedger::load(store.clone());
        ledger.add_points(10);
        store.set_read_only(true);
        ledger.reset_points();
        assert_eq!(ledger.total_points(), 0);
        assert_eq!(store.get_item(POINTS_KEY), Ok(Some("10".to_string())));
        store.set_read_only(false);
        assert_eq!(ledger.add_points(2), 2);
        assert_eq!(store.get_item(POINTS_KEY), Ok(Some("2".to_string())));
    }

    #[test]
    fn test_reload_flushes_pending_reset() {
        let store = store();
        let mut ledger = PointsLedger::load(store.clone());
        ledger.add_points(6);
        store.set_read_only(true);
        ledger.reset_points();
        assert_eq!(ledger.reload(), 0);
        store.set_read_only(false);
        assert_eq!(ledger.reload(), 0);
        assert_eq!(store.get_item(POINTS_KEY), Ok(None));
    }
}
