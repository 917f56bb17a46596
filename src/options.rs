use std::fmt;
use std::time::Duration;

/// Delay used by the request loaders when nothing else is configured.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(5);

/// Determines when a loader's batch window closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSchedule {
    /// Close the window as soon as the request queue is empty.
    Drain,
    /// Keep the window open for a fixed delay after the first key that missed the cache, then
    /// drain the queue. Tolerates middleware that enqueues loads slightly later than the
    /// initiating call.
    Delay(Duration),
}

impl Default for BatchSchedule {
    fn default() -> Self {
        BatchSchedule::Delay(DEFAULT_BATCH_DELAY)
    }
}

/// Construction options for a `Loader` whose cache key `C` is derived from its input key `K`.
pub struct LoaderOptions<K, C> {
    pub(crate) cache_key: fn(&K) -> C,
    pub(crate) schedule: BatchSchedule,
}

impl<K: Clone> LoaderOptions<K, K> {
    /// Options that cache on the input key itself.
    pub fn identity() -> Self {
        Self { cache_key: K::clone, schedule: BatchSchedule::default() }
    }
}

impl<K: Clone> Default for LoaderOptions<K, K> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<K, C> LoaderOptions<K, C> {
    /// Options that memoize and deduplicate on a projection of the input key.
    pub fn projected(cache_key: fn(&K) -> C) -> Self {
        Self { cache_key, schedule: BatchSchedule::default() }
    }

    pub fn schedule(mut self, schedule: BatchSchedule) -> Self {
        self.schedule = schedule;
        self
    }
}

impl<K, C> fmt::Debug for LoaderOptions<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderOptions").field("schedule", &self.schedule).finish_non_exhaustive()
    }
}
