use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

/// Memo table owned by a `LoaderWorker`.
pub trait Cache {
    type K;
    type V;

    fn get(&self, key: &Self::K) -> Option<&Self::V>;

    fn contains(&self, key: &Self::K) -> bool {
        self.get(key).is_some()
    }

    fn insert(&mut self, key: Self::K, value: Self::V);

    /// Inserts only when nothing is memoized for `key` yet.
    fn insert_absent(&mut self, key: Self::K, value: Self::V);

    fn remove(&mut self, keys: &[Self::K]);
    fn flush(&mut self);
}

impl<K, V, S: BuildHasher> Cache for HashMap<K, V, S>
where
    K: Eq + Hash,
{
    type K = K;
    type V = V;

    fn get(&self, key: &Self::K) -> Option<&Self::V> {
        HashMap::get(self, key)
    }

    fn insert(&mut self, key: Self::K, value: Self::V) {
        HashMap::insert(self, key, value);
    }

    fn insert_absent(&mut self, key: Self::K, value: Self::V) {
        self.entry(key).or_insert(value);
    }

    fn remove(&mut self, keys: &[Self::K]) {
        for key in keys.iter() {
            HashMap::remove(self, key);
        }
    }

    fn flush(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::Cache;
    use std::collections::HashMap;

    #[test]
    fn insert_absent_keeps_existing_entry() {
        let mut cache: HashMap<i64, &str> = HashMap::new();
        Cache::insert(&mut cache, 1, "first");
        cache.insert_absent(1, "second");
        cache.insert_absent(2, "other");
        assert_eq!(Cache::get(&cache, &1), Some(&"first"));
        assert_eq!(Cache::get(&cache, &2), Some(&"other"));
    }

    #[test]
    fn remove_and_flush() {
        let mut cache: HashMap<i64, u64> = HashMap::new();
        Cache::insert(&mut cache, 1, 10);
        Cache::insert(&mut cache, 2, 20);
        Cache::insert(&mut cache, 3, 30);
        Cache::remove(&mut cache, &[1, 2]);
        assert!(!cache.contains(&1));
        assert!(cache.contains(&3));
        Cache::flush(&mut cache);
        assert!(!cache.contains(&3));
    }
}
