use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::types::Table;

/// Name → parsed table cache owned by a [`super::RainfallReader`].
///
/// Entries live until [`DatasetCache::clear`]. Population is single-flight per name: while
/// one caller loads a dataset, other callers asking for the same name wait for it instead of
/// parsing the file again.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<String, Arc<Table>>>,
    gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DatasetCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached table for `name`, if any.
    pub fn get(&self, name: &str) -> Option<Arc<Table>> {
        lock(&self.entries).get(name).cloned()
    }

    /// Store `table` under `name`, replacing any previous entry.
    pub fn insert(&self, name: &str, table: Arc<Table>) {
        lock(&self.entries).insert(name.to_owned(), table);
    }

    /// `true` if `name` is cached.
    pub fn contains(&self, name: &str) -> bool {
        lock(&self.entries).contains_key(name)
    }

    /// Number of cached datasets.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached table.
    pub fn clear(&self) {
        lock(&self.entries).clear();
        lock(&self.gates).clear();
    }

    /// Return the cached table for `name`, or run `load` once and cache its result.
    ///
    /// A failed load caches nothing.
    pub fn get_or_try_insert_with<F, E>(&self, name: &str, load: F) -> Result<Arc<Table>, E>
    where
        F: FnOnce() -> Result<Table, E>,
    {
        if let Some(table) = self.get(name) {
            return Ok(table);
        }

        let gate = Arc::clone(lock(&self.gates).entry(name.to_owned()).or_default());
        let result = {
            let _loading = lock(&*gate);
            match self.get(name) {
                Some(table) => Ok(table),
                None => load().map(|table| {
                    let table = Arc::new(table);
                    self.insert(name, Arc::clone(&table));
                    table
                }),
            }
        };
        self.release_gate(name, &gate);
        result
    }

    /// Forget the gate for `name` unless a later caller already replaced it.
    fn release_gate(&self, name: &str, gate: &Arc<Mutex<()>>) {
        let mut gates = lock(&self.gates);
        if gates.get(name).is_some_and(|g| Arc::ptr_eq(g, gate)) {
            gates.remove(name);
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn loads_once_and_returns_same_table() {
        let cache = DatasetCache::new();
        let calls = AtomicUsize::new(0);
        let load = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(Table::new(vec!["a".into()], Vec::new()))
        };
        let first = cache.get_or_try_insert_with("d", load).unwrap();
        let second = cache.get_or_try_insert_with("d", load).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = DatasetCache::new();
        let err = cache.get_or_try_insert_with("d", || Err::<Table, _>("boom"));
        assert_eq!(err.unwrap_err(), "boom");
        assert!(!cache.contains("d"));
        assert!(cache.is_empty());
    }

    #[test]
    fn gates_are_released_after_each_attempt() {
        let cache = DatasetCache::new();
        for i in 0..100 {
            let name = format!("missing-{i}");
            assert!(cache.get_or_try_insert_with(&name, || Err::<Table, _>("absent")).is_err());
        }
        cache.get_or_try_insert_with("d", || Ok::<_, ()>(Table::default())).unwrap();
        assert!(lock(&cache.gates).is_empty());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = DatasetCache::new();
        cache.insert("d", Arc::new(Table::default()));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.get("d").is_none());
    }

    #[test]
    fn concurrent_callers_share_one_load() {
        let cache = Arc::new(DatasetCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    cache
                        .get_or_try_insert_with("slow", || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(Duration::from_millis(20));
                            Ok::<_, ()>(Table::default())
                        })
                        .unwrap()
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
