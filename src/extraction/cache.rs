//! Memoized extraction results.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use crate::{prelude::*, roster::Roster};

/// Rosters we've already extracted, keyed by
/// [`cache_key`](super::key::cache_key).
///
/// Create one per session and share it between services using an [`Arc`].
/// Entries are never evicted.
///
/// Values are complete `Arc<Roster>`s, so a reader sees either nothing or a
/// finished roster. Writing the same key twice just replaces one copy of a
/// deterministic result with an equal one.
#[derive(Debug, Default)]
pub struct ExtractionCache {
    entries: RwLock<HashMap<String, Arc<Roster>>>,
}

impl ExtractionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a roster.
    pub fn get(&self, key: &str) -> Option<Arc<Roster>> {
        // A panicking writer can't leave a half-inserted value behind, so a
        // poisoned map is still safe to read.
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Store a roster.
    pub fn put(&self, key: String, roster: Arc<Roster>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.insert(key, roster).is_some() {
            debug!("Replaced an existing cache entry");
        }
    }

    /// How many rosters are cached?
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Is the cache empty?
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::generator::generate;

    #[test]
    fn get_returns_what_was_put() {
        let cache = ExtractionCache::new();
        assert!(cache.get("k").is_none());
        let roster = Arc::new(generate(7));
        cache.put("k".to_owned(), roster.clone());
        let cached = cache.get("k").expect("entry should exist");
        assert!(Arc::ptr_eq(&cached, &roster));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_replaces_existing_entries() {
        let cache = ExtractionCache::new();
        cache.put("k".to_owned(), Arc::new(generate(1)));
        cache.put("k".to_owned(), Arc::new(generate(2)));
        assert_eq!(cache.len(), 1);
        assert_eq!(*cache.get("k").unwrap(), generate(2));
    }

    #[test]
    fn concurrent_readers_see_whole_rosters() {
        let cache = Arc::new(ExtractionCache::new());
        let expected = generate(99);
        let handles = (0..8)
            .map(|i| {
                let cache = cache.clone();
                let expected = expected.clone();
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        cache.put("k".to_owned(), Arc::new(generate(99)));
                    }
                    if let Some(roster) = cache.get("k") {
                        assert_eq!(*roster, expected);
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 1);
    }
}
