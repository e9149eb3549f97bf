//! Per-game high score
//!
//! Persisted as a decimal integer, only ever raised.

use std::rc::Rc;

use crate::persistence::{KeyValueStore, PersistedCounter};

/// Storage key for the catcher game's best score
pub const HIGH_SCORE_KEY: &str = "carbonGameHighScore";

#[derive(Debug)]
pub struct HighScore {
    counter: PersistedCounter,
}

impl HighScore {
    /// Load the recorded high score (zero when absent)
    pub fn load(store: Rc<dyn KeyValueStore>) -> Self {
        let counter = PersistedCounter::load(HIGH_SCORE_KEY, store);
        log::info!("Loaded high score {}", counter.get());
        Self { counter }
    }

    pub fn best(&self) -> u64 {
        self.counter.get()
    }

    /// Check if a score beats the record
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.counter.get()
    }

    /// Record `score` if it beats the current best. Returns true when a new
    /// record was written.
    pub fn submit(&mut self, score: u64) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.counter.set(score);
        log::info!("New high score: {}", score);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_only_raises() {
        let store = Rc::new(MemoryStore::new());
        let mut high = HighScore::load(store.clone());
        assert!(high.submit(4));
        assert!(!high.submit(4));
        assert!(!high.submit(2));
        assert!(high.submit(9));
        assert_eq!(high.best(), 9);
        assert_eq!(store.get_item(HIGH_SCORE_KEY), Ok(Some("9".to_string())));
    }

    #[test]
    fn test_zero_never_qualifies_on_fresh_store() {
        let high = HighScore::load(Rc::new(MemoryStore::new()));
        assert!(!high.qualifies(0));
    }

    #[test]
    fn test_survives_reload() {
        let store = Rc::new(MemoryStore::new());
        HighScore::load(store.clone()).submit(12);
        assert_eq!(HighScore::load(store).best(), 12);
    }
}
