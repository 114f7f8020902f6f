//! The Shared Store
//!
//! One `Store` owns all four data structures. It is created once at process
//! start and shared across every connection task as `Arc<Mutex<Store>>` —
//! exactly one process-wide lock guards all command dispatch, so a command
//! is never observed half-applied and the structures stay consistent with
//! each other.
//!
//! The single global lock is a deliberate simplicity-over-throughput choice:
//! command bodies are O(1)–O(chain) and the lock is released before any
//! socket I/O happens.

use std::sync::{Arc, Mutex};

use crate::storage::{HashTable, Queue, Set, Stack};

/// Shared handle to the store, passed to every connection task.
pub type SharedStore = Arc<Mutex<Store>>;

/// The union of all four data structures.
#[derive(Debug, Default)]
pub struct Store {
    pub table: HashTable,
    pub set: Set,
    pub stack: Stack,
    pub queue: Queue,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a store in the process-wide lock.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structures_are_independent() {
        let mut store = Store::new();

        store.table.put("k".into(), "v".into(), "local".into(), "00:00-01:00".into());
        store.set.add("m".into());
        store.stack.push("s".into());
        store.queue.enqueue("q".into());

        // Draining one structure leaves the others alone.
        assert_eq!(store.stack.pop(), Some("s".into()));
        assert_eq!(store.stack.pop(), None);

        assert_eq!(store.table.get("k"), Some("v"));
        assert!(store.set.contains("m"));
        assert_eq!(store.queue.dequeue(), Some("q".into()));
    }

    #[test]
    fn test_poisoned_lock_recovers_intact_store() {
        let shared = {
            let mut store = Store::new();
            store.stack.push("s".into());
            store.into_shared()
        };

        // Poison the lock the way a panicking connection task would.
        let poisoner = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the store lock");
        })
        .join();

        assert!(shared.lock().is_err());

        // The shutdown snapshot path recovers the guard; the data is intact.
        let store = shared.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(store.stack.len(), 1);
    }
}
