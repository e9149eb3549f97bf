//! Local device persistence
//!
//! Features:
//! - Key-value backend trait (LocalStorage on web, in-memory for tests/native)
//! - Persisted decimal counters that write through on every mutation
//! - The application-wide points ledger

pub mod counter;
pub mod storage;

pub use counter::{POINTS_KEY, PersistedCounter, PointsLedger};
pub use storage::{KeyValueStore, MemoryStore, StorageError};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
