//! Request-scoped batching loaders.
//!
//! A [`Loader`] collects the keys requested during one batch window, hands them to its
//! [`BatchFunction`] in a single call, and memoizes every outcome for the rest of its life.
//! [`Loaders`] bundles one loader per entity or relationship the API resolves, and is built fresh
//! for every request through [`RequestContext`].

mod batch_function;
mod cache;
mod config;
mod context;
mod error;
mod loader;
mod loader_op;
mod loader_worker;
pub mod loaders;
#[cfg(feature = "memory")]
pub mod memory;
pub mod model;
mod options;
mod store;
#[cfg(feature = "stats")]
mod worker_stats;

pub use batch_function::BatchFunction;
pub use config::LoaderConfig;
pub use context::RequestContext;
pub use error::{BatchResult, LoadError, LoadResult, StoreError};
pub use loader::Loader;
pub use loaders::Loaders;
pub use options::{BatchSchedule, LoaderOptions, DEFAULT_BATCH_DELAY};
pub use store::{Collaborators, Store, UsersService};
