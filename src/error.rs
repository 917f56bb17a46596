use thiserror::Error;

use crate::model::Id;

/// Failures reported by the collaborating data store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// The outcome a `load` caller observes when a value cannot be produced.
///
/// A single outcome is handed to every caller sharing a cache key, so the error must be cheap to
/// clone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("could not load {what} for id: {id}")]
    NotFound { what: &'static str, id: Id },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("batch function returned {actual} results for {expected} keys")]
    BatchShape { expected: usize, actual: usize },

    #[error("key for viewer {actual} batched with keys for viewer {expected}")]
    MixedViewers { expected: Id, actual: Id },

    #[error("loader worker is no longer running")]
    WorkerGone,
}

impl LoadError {
    pub fn not_found(what: &'static str, id: Id) -> Self {
        LoadError::NotFound { what, id }
    }
}

/// Positional per-key outcome of a batch.
pub type LoadResult<V> = Result<V, LoadError>;

/// What a `BatchFunction` returns: either a whole-batch failure or one outcome per key.
pub type BatchResult<V> = Result<Vec<LoadResult<V>>, LoadError>;
