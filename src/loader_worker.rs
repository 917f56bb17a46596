use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::mem;
use std::time::Duration;

use futures::future::FutureExt;
use tokio::sync::mpsc;

#[cfg(feature = "stats")]
use crate::worker_stats::WorkerStats;
use crate::{
    batch_function::BatchFunction,
    cache::Cache,
    error::{LoadError, LoadResult},
    loader_op::{LoadRequest, LoaderOp},
    options::{BatchSchedule, LoaderOptions},
};

/// A key position of a pending request: either already settled from the memo table when the
/// request arrived, or waiting on the batch keyed by its cache key.
enum Slot<V, C> {
    Settled(LoadResult<V>),
    Staged(C),
}

struct PendingLoad<K, V, C> {
    request: LoadRequest<K, V>,
    slots: Vec<Slot<V, C>>,
}

/// A `LoaderWorker` is the "single-thread" worker task that actually does the loading work.
///
/// Once started, it runs in a loop until the parent Loader aborts it's `JoinHandle` or drops the
/// request queue tx channel.
///
/// The worker can be in one of three states during its lifetime:
///
/// 1. Waiting for requests
/// 2. Collecting the batch window: muxing requests and staging keys for loading.
/// 3. Executing its load batch function.
///
/// One cycle through this loop may be called an "execution frame".
///
/// In state (1), the worker awaits any messages on the request queue channel, idling until work arrives.
///
/// In state (2), Prime and Clear requests are resolved immediately against the memo table. For
/// Load requests, every key whose cache key is memoized is settled right away; the remaining keys
/// are staged, each distinct cache key once, in first-request order. If nothing had to be staged
/// the request is answered immediately. With [`BatchSchedule::Delay`] the window stays open for
/// the configured delay after the first staged request, even when ops answered from the memo table
/// arrived ahead of it; in every case it ends by synchronously draining the request queue.
///
/// In state (3), the worker invokes its `BatchFunction` once with the staged keys. Positional
/// outcomes are memoized and handed to every waiting request. A whole-batch failure (an `Err`
/// from the batch function, or a result of the wrong length) rejects every staged key of the
/// window and is not memoized, so those keys are fetched again by a later load.
pub struct LoaderWorker<K, V, C, F, CacheT, ContextT>
where
    K: 'static + Debug + Clone + Send + Sync,
    V: 'static + Send + Debug + Clone,
    C: 'static + Debug + Clone + Eq + Hash + Send + Sync,
    F: 'static + BatchFunction<K, V, Context = ContextT> + Send,
    CacheT: Cache<K = C, V = LoadResult<V>>,
    ContextT: Send + Sync + 'static,
{
    cache: CacheT,
    request_rx: mpsc::UnboundedReceiver<LoaderOp<K, V>>,
    cache_key: fn(&K) -> C,
    schedule: BatchSchedule,
    keys_to_load: Vec<K>,
    staged: HashSet<C>,
    pending_requests: Vec<PendingLoad<K, V, C>>,
    context: ContextT,
    phantom_batch_function: PhantomData<F>,
    debug_name: &'static str,
    #[cfg(feature = "stats")]
    stats: WorkerStats,
    #[cfg(feature = "stats")]
    keys_requested_in_window: u32,
}

impl<K, V, C, F, CacheT, ContextT> LoaderWorker<K, V, C, F, CacheT, ContextT>
where
    K: 'static + Debug + Clone + Send + Sync,
    V: 'static + Send + Debug + Clone,
    C: 'static + Debug + Clone + Eq + Hash + Send + Sync,
    F: 'static + BatchFunction<K, V, Context = ContextT> + Send,
    CacheT: Cache<K = C, V = LoadResult<V>>,
    ContextT: Send + Sync + 'static,
{
    pub fn new(
        cache: CacheT,
        request_rx: mpsc::UnboundedReceiver<LoaderOp<K, V>>,
        context: ContextT,
        options: LoaderOptions<K, C>,
    ) -> Self {
        let debug_name = std::any::type_name::<F>();
        Self {
            cache,
            request_rx,
            cache_key: options.cache_key,
            schedule: options.schedule,
            keys_to_load: Vec::new(),
            staged: HashSet::new(),
            pending_requests: Vec::new(),
            context,
            phantom_batch_function: PhantomData,
            debug_name,
            #[cfg(feature = "stats")]
            stats: WorkerStats::new(debug_name),
            #[cfg(feature = "stats")]
            keys_requested_in_window: 0,
        }
    }

    pub fn debug_name(&self) -> &'static str {
        self.debug_name
    }

    pub async fn start(mut self) {
        loop {
            // Async await until we receive the first op.
            match self.request_rx.recv().await {
                None => {
                    tracing::info!("Tx channel closed. Terminating LoaderWorker.");
                    return;
                }
                Some(op) => self.mux_op(op),
            }
            // Flush remainder of the op queue before deciding on the window.
            self.drain_queue();
            if self.pending_requests.is_empty() {
                continue;
            }
            // The window opens on the first staged request, whichever op brought it in.
            if let BatchSchedule::Delay(delay) = self.schedule {
                self.hold_window(delay).await;
                self.drain_queue();
            }
            self.execute_load().await;
        }
    }

    fn drain_queue(&mut self) {
        while let Some(Some(op)) = self.request_rx.recv().now_or_never() {
            self.mux_op(op);
        }
    }

    /// Keeps muxing incoming ops until `delay` has elapsed.
    async fn hold_window(&mut self, delay: Duration) {
        let deadline = tokio::time::sleep(delay);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => return,
                op = self.request_rx.recv() => match op {
                    Some(op) => self.mux_op(op),
                    None => return,
                },
            }
        }
    }

    #[tracing::instrument(skip(self))]
    fn mux_op(&mut self, op: LoaderOp<K, V>) {
        match op {
            LoaderOp::Load(request) => self.stage_request(request),
            LoaderOp::Prime(key, value) => {
                self.cache.insert_absent((self.cache_key)(&key), Ok(value));
            }
            LoaderOp::PrimeMany(key_vals) => {
                for (key, value) in key_vals {
                    self.cache.insert_absent((self.cache_key)(&key), Ok(value));
                }
            }
            LoaderOp::Clear(key) => self.cache.remove(&[(self.cache_key)(&key)]),
            LoaderOp::ClearMany(keys) => {
                let cache_keys = keys.iter().map(self.cache_key).collect::<Vec<_>>();
                self.cache.remove(&cache_keys);
            }
            LoaderOp::ClearAll => self.cache.flush(),
        }
    }

    fn stage_request(&mut self, request: LoadRequest<K, V>) {
        let mut slots = Vec::with_capacity(request.keys().len());
        let mut keys_to_load = Vec::new();
        for key in request.keys() {
            let cache_key = (self.cache_key)(key);
            match self.cache.get(&cache_key) {
                Some(outcome) => slots.push(Slot::Settled(outcome.clone())),
                None => {
                    if self.staged.insert(cache_key.clone()) {
                        keys_to_load.push(key.clone());
                    }
                    slots.push(Slot::Staged(cache_key));
                }
            }
        }
        tracing::debug!(requested_keys = ?request.keys(), ?keys_to_load);

        let staged_count = slots.iter().filter(|slot| matches!(slot, Slot::Staged(_))).count();
        #[cfg(feature = "stats")]
        {
            self.stats.record_load_request(slots.len() as u32);
            self.stats.record_cache_hits((slots.len() - staged_count) as u32);
            self.keys_requested_in_window += staged_count as u32;
        }

        if staged_count == 0 {
            let values = slots.into_iter().filter_map(|slot| match slot {
                Slot::Settled(outcome) => Some(outcome),
                Slot::Staged(_) => None,
            });
            request.send_response(values);
        } else {
            self.keys_to_load.extend(keys_to_load);
            self.pending_requests.push(PendingLoad { request, slots });
        }
    }

    #[tracing::instrument(skip(self))]
    async fn execute_load(&mut self) {
        let keys = mem::take(&mut self.keys_to_load);
        self.staged.clear();
        #[cfg(feature = "stats")]
        {
            self.stats.record_load_exec(mem::take(&mut self.keys_requested_in_window));
        }

        let result = F::load(&keys, &self.context).await;
        let failure = match result {
            Ok(values) if values.len() == keys.len() => {
                tracing::debug!(?keys, ?values);
                #[cfg(feature = "stats")]
                {
                    let loaded = values.iter().filter(|value| value.is_ok()).count();
                    self.stats.record_load_exec_completed(keys.len() as u32, loaded as u32);
                }
                for (key, value) in keys.iter().zip(values) {
                    self.cache.insert((self.cache_key)(key), value);
                }
                None
            }
            Ok(values) => {
                Some(LoadError::BatchShape { expected: keys.len(), actual: values.len() })
            }
            Err(e) => Some(e),
        };
        if let Some(e) = failure.as_ref() {
            tracing::warn!(error = %e, key_count = keys.len(), "batch load failed");
            #[cfg(feature = "stats")]
            self.stats.record_batch_failure();
        }

        let outcomes = match failure {
            None => HashMap::new(),
            Some(e) => keys
                .iter()
                .map(|key| ((self.cache_key)(key), Err(e.clone())))
                .collect::<HashMap<C, LoadResult<V>>>(),
        };
        for pending in mem::take(&mut self.pending_requests) {
            let values = pending
                .slots
                .into_iter()
                .map(|slot| match slot {
                    Slot::Settled(outcome) => outcome,
                    Slot::Staged(cache_key) => outcomes
                        .get(&cache_key)
                        .or_else(|| self.cache.get(&cache_key))
                        .cloned()
                        // Every staged key is either memoized or rejected above.
                        .unwrap_or(Err(LoadError::WorkerGone)),
                })
                .collect::<Vec<_>>();
            pending.request.send_response(values);
        }
    }
}
