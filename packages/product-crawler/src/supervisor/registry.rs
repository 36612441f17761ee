//! Process-wide registry of active crawl sessions, keyed by seed URL.
//!
//! Registration hands out a [`TaskLease`]. Dropping the lease removes the
//! entry, so it is released exactly once whether the session completes,
//! fails, is skipped, or its task panics.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// Handle stored for each live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle {
    pub job_id: Uuid,
    pub accepted_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct ActiveTaskRegistry {
    tasks: Arc<Mutex<HashMap<String, TaskHandle>>>,
}

impl ActiveTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim a seed.
    ///
    /// Returns the existing handle when the seed is already active.
    pub fn try_register(&self, seed: &str) -> Result<TaskLease, TaskHandle> {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(existing) = tasks.get(seed) {
            return Err(*existing);
        }

        let handle = TaskHandle {
            job_id: Uuid::now_v7(),
            accepted_at: Utc::now(),
        };
        tasks.insert(seed.to_string(), handle);
        debug!(seed = %seed, job_id = %handle.job_id, "Seed registered");

        Ok(TaskLease {
            registry: self.clone(),
            seed: seed.to_string(),
            handle,
        })
    }

    pub fn get(&self, seed: &str) -> Option<TaskHandle> {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(seed)
            .copied()
    }

    pub fn is_active(&self, seed: &str) -> bool {
        self.get(seed).is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the entry only if it still belongs to `handle`.
    fn release(&self, seed: &str, handle: &TaskHandle) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if tasks.get(seed).is_some_and(|current| current.job_id == handle.job_id) {
            tasks.remove(seed);
            debug!(seed = %seed, job_id = %handle.job_id, "Seed released");
        }
    }
}

/// Ownership of one registry entry; released on drop.
#[derive(Debug)]
pub struct TaskLease {
    registry: ActiveTaskRegistry,
    seed: String,
    handle: TaskHandle,
}

impl TaskLease {
    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn job_id(&self) -> Uuid {
        self.handle.job_id
    }

    pub fn handle(&self) -> TaskHandle {
        self.handle
    }
}

impl Drop for TaskLease {
    fn drop(&mut self) {
        self.registry.release(&self.seed, &self.handle);
    }
}

impl std::fmt::Debug for ActiveTaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveTaskRegistry")
            .field("active", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_per_seed() {
        let registry = ActiveTaskRegistry::new();

        let lease = registry.try_register("http://shop.com").unwrap();
        let existing = registry.try_register("http://shop.com").unwrap_err();
        assert_eq!(existing.job_id, lease.job_id());

        let other = registry.try_register("http://other.com").unwrap();
        assert_eq!(registry.len(), 2);

        drop(lease);
        drop(other);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_release_on_drop_allows_reregistration() {
        let registry = ActiveTaskRegistry::new();

        let first = registry.try_register("http://shop.com").unwrap();
        let first_id = first.job_id();
        drop(first);

        let second = registry.try_register("http://shop.com").unwrap();
        assert_ne!(second.job_id(), first_id);
        assert!(registry.is_active("http://shop.com"));
    }

    #[test]
    fn test_stale_release_does_not_remove_newer_entry() {
        let registry = ActiveTaskRegistry::new();
        let lease = registry.try_register("http://shop.com").unwrap();
        let stale = lease.handle();
        drop(lease);

        let current = registry.try_register("http://shop.com").unwrap();
        registry.release("http://shop.com", &stale);

        assert_eq!(registry.get("http://shop.com"), Some(current.handle()));
    }

    #[test]
    fn test_concurrent_registration_admits_one() {
        let registry = ActiveTaskRegistry::new();

        let leases: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.try_register("http://shop.com").ok()))
                .collect();
            handles
                .into_iter()
                .filter_map(|h| h.join().unwrap())
                .collect()
        });

        assert_eq!(leases.len(), 1);
        assert_eq!(registry.len(), 1);
    }
}
