use std::slice;

use tokio::sync::oneshot;

use crate::error::{LoadError, LoadResult};

/// Set of possible requests that can be sent to the [`LoaderWorker`]
///
/// The three categories of commands are Load, Prime, and Clear; each of which has a single and
/// many variant for convenience.
#[derive(Debug)]
pub enum LoaderOp<K, V> {
    /// Fetch data from the resource wrapped by this data loader (or the cache).
    Load(LoadRequest<K, V>),
    /// Add values to the cache that were fetched from elsewhere.
    Prime(K, V),
    PrimeMany(Vec<(K, V)>),
    /// Remove values from the cache so that they will be reloaded when they are next requested.
    Clear(K),
    ClearMany(Vec<K>),
    ClearAll,
}

#[derive(Debug)]
pub enum LoadRequest<K, V> {
    One(K, oneshot::Sender<LoadResult<V>>),
    Many(Vec<K>, oneshot::Sender<Vec<LoadResult<V>>>),
}

impl<K, V> LoadRequest<K, V>
where
    V: Send + std::fmt::Debug,
{
    pub fn keys(&self) -> &[K] {
        match self {
            LoadRequest::One(ref key, _) => slice::from_ref(key),
            LoadRequest::Many(ref keys, _) => keys,
        }
    }

    /// Answers the requester with one outcome per key, in key order.
    pub fn send_response<I>(self, values: I)
    where
        I: IntoIterator<Item = LoadResult<V>>,
    {
        match self {
            LoadRequest::One(_, response_tx) => {
                let response = values.into_iter().next().unwrap_or(Err(LoadError::WorkerGone));
                if let Err(e) = response_tx.send(response) {
                    tracing::error!(?e, "receiver dropped");
                }
            }
            LoadRequest::Many(_, response_tx) => {
                let response = values.into_iter().collect::<Vec<_>>();
                if let Err(e) = response_tx.send(response) {
                    tracing::error!(?e, "receiver dropped");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_without_outcome_reports_worker_gone() {
        let (response_tx, mut response_rx) = oneshot::channel::<LoadResult<u8>>();
        LoadRequest::One(1_i64, response_tx).send_response(Vec::new());
        assert_eq!(response_rx.try_recv().unwrap(), Err(LoadError::WorkerGone));
    }

    #[test]
    fn many_answers_in_key_order() {
        let (response_tx, mut response_rx) = oneshot::channel::<Vec<LoadResult<u8>>>();
        LoadRequest::Many(vec![1_i64, 2], response_tx).send_response(vec![Ok(1), Ok(2)]);
        assert_eq!(response_rx.try_recv().unwrap(), vec![Ok(1), Ok(2)]);
    }
}
