use async_trait::async_trait;

use crate::error::BatchResult;

/// A `BatchFunction` defines how a `Loader` fetches batched data from some collaborating store.
/// It receives the keys requested during the loader's most recent batch window, deduplicated by
/// cache key and in first-request order, together with a user defined context struct.
///
/// The returned vector must be positionally aligned with `keys`: entry `i` is the outcome for
/// `keys[i]`. A per-key failure is reported as an `Err` entry and does not affect its siblings.
/// Returning `Err` for the whole call rejects every key of the window. A vector of the wrong
/// length is treated as a whole-batch failure.
///
/// Multiple `BatchFunctions` (and therefore loaders) can share the same context (likely through an
/// `Arc`).
#[async_trait]
pub trait BatchFunction<K, V> {
    type Context;
    async fn load(keys: &[K], context: &Self::Context) -> BatchResult<V>;
}
