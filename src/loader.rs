use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Drop;

use tokio::sync::{mpsc, oneshot};
use tracing::{span, Level};
use tracing_futures::Instrument;

use crate::{
    batch_function::BatchFunction,
    error::{LoadError, LoadResult},
    loader_op::{LoadRequest, LoaderOp},
    loader_worker::LoaderWorker,
    options::LoaderOptions,
};

/// Batch loads values from some expensive resource, primarily intended for mitigating GraphQL's
/// N+1 problem.
///
/// Users can call [`Loader::load`] and [`Loader::load_many`] to fetch values from the underlying
/// resource or cache. Every outcome, value or per-key error, is memoized under the key's cache key
/// `C` for the lifetime of the loader. The cache can be cleared with calls to [`Loader::clear`],
/// [`Loader::clear_many`] and [`Loader::clear_all`], and values can be added to the cache
/// out-of-band through the use of [`Loader::prime`] and [`Loader::prime_many`].
///
/// The `Loader` struct acts as an intermediary between the async domain in which `load` calls are
/// invoked and the pseudo-single-threaded domain of the `LoaderWorker`. Callers can invoke the
/// `Loader` from multiple parallel tasks, and the loader will enqueue the requested operations on
/// the request queue for processing by its `LoaderWorker`. The worker processes the requests
/// sequentially and provides results via response oneshot channels back to the Loader.
///
/// Dropping the `Loader` aborts its worker; loads still pending at that point resolve to
/// [`LoadError::WorkerGone`].
pub struct Loader<K, V, C = K>
where
    K: 'static + Debug + Clone + Send + Sync,
    V: 'static + Send + Debug + Clone,
    C: 'static + Debug + Clone + Eq + Hash + Send + Sync,
{
    request_tx: mpsc::UnboundedSender<LoaderOp<K, V>>,
    load_task_handle: tokio::task::JoinHandle<()>,
    _cache_key: std::marker::PhantomData<fn() -> C>,
}

impl<K, V, C> Drop for Loader<K, V, C>
where
    K: 'static + Debug + Clone + Send + Sync,
    V: 'static + Send + Debug + Clone,
    C: 'static + Debug + Clone + Eq + Hash + Send + Sync,
{
    fn drop(&mut self) {
        self.load_task_handle.abort();
    }
}

impl<K, V> Loader<K, V, K>
where
    K: 'static + Debug + Clone + Eq + Hash + Send + Sync,
    V: 'static + Send + Debug + Clone,
{
    /// Creates a new Loader for the provided BatchFunction and Context type, caching on the key
    /// itself and using the default batch schedule.
    ///
    /// Note: the batch function is passed in as a marker for type inference.
    pub fn new<F, ContextT>(batch_fn: F, context: ContextT) -> Self
    where
        ContextT: Send + Sync + 'static,
        F: 'static + BatchFunction<K, V, Context = ContextT> + Send,
    {
        Self::with_options(batch_fn, context, LoaderOptions::identity())
    }
}

impl<K, V, C> Loader<K, V, C>
where
    K: 'static + Debug + Clone + Send + Sync,
    V: 'static + Send + Debug + Clone,
    C: 'static + Debug + Clone + Eq + Hash + Send + Sync,
{
    /// Creates a new Loader with an explicit cache key projection and batch schedule.
    ///
    /// Must be called from within a tokio runtime. No batch is executed until the first load.
    pub fn with_options<F, ContextT>(
        _: F,
        context: ContextT,
        options: LoaderOptions<K, C>,
    ) -> Self
    where
        ContextT: Send + Sync + 'static,
        F: 'static + BatchFunction<K, V, Context = ContextT> + Send,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = LoaderWorker::<K, V, C, F, HashMap<C, LoadResult<V>>, ContextT>::new(
            HashMap::new(),
            rx,
            context,
            options,
        );
        let span = span!(Level::TRACE, "LoaderWorker", loader = worker.debug_name());
        Self {
            request_tx: tx,
            load_task_handle: tokio::task::spawn(worker.start().instrument(span)),
            _cache_key: std::marker::PhantomData,
        }
    }

    /// Loads a value from the underlying resource.
    ///
    /// If an outcome for the key's cache key is already memoized, it is returned as soon as the
    /// request is processed. Otherwise, the key is staged for batch loading in the current batch
    /// window.
    pub async fn load(&self, key: K) -> LoadResult<V> {
        let (response_tx, response_rx) = oneshot::channel();
        if self.send(LoaderOp::Load(LoadRequest::One(key, response_tx))).is_err() {
            return Err(LoadError::WorkerGone);
        }
        response_rx.await.unwrap_or(Err(LoadError::WorkerGone))
    }

    /// Loads many values at once.
    ///
    /// The result is positionally aligned with `keys`; each entry settles independently.
    pub async fn load_many(&self, keys: Vec<K>) -> Vec<LoadResult<V>> {
        let key_count = keys.len();
        let (response_tx, response_rx) = oneshot::channel();
        if self.send(LoaderOp::Load(LoadRequest::Many(keys, response_tx))).is_err() {
            return vec![Err(LoadError::WorkerGone); key_count];
        }
        response_rx.await.unwrap_or_else(|_| vec![Err(LoadError::WorkerGone); key_count])
    }

    /// Adds a value to the cache, unless an outcome is already memoized for the key.
    pub async fn prime(&self, key: K, value: V) {
        let _ = self.send(LoaderOp::Prime(key, value));
    }

    /// Adds many values to the cache at once.
    pub async fn prime_many(&self, key_vals: Vec<(K, V)>) {
        let _ = self.send(LoaderOp::PrimeMany(key_vals));
    }

    /// Removes a value from the cache.
    ///
    /// This key will be reloaded when it is next requested.
    pub async fn clear(&self, key: K) {
        let _ = self.send(LoaderOp::Clear(key));
    }

    /// Removes multiple values from the cache at once.
    ///
    /// These keys will be reloaded when requested.
    pub async fn clear_many(&self, keys: Vec<K>) {
        let _ = self.send(LoaderOp::ClearMany(keys));
    }

    /// Empties the cache.
    pub async fn clear_all(&self) {
        let _ = self.send(LoaderOp::ClearAll);
    }

    fn send(&self, op: LoaderOp<K, V>) -> Result<(), LoadError> {
        self.request_tx.send(op).map_err(|e| {
            tracing::error!(op = ?e.0, "loader worker has terminated");
            LoadError::WorkerGone
        })
    }
}
