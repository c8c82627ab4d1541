//! Per-request batched loading.
//!
//! Every inbound request gets a fresh [`Loaders`] registry. Resolvers ask a
//! loader for keys; keys requested during one resolution round are fetched
//! with one store query per loader, and each key's result is memoized for
//! the rest of the request.

pub(crate) mod batch;
pub mod batch_fn;
pub mod config;
pub mod dataloader;
pub mod eager;
pub mod error;
pub mod key;
pub mod reader;
pub mod registry;
pub mod scope;

pub use batch_fn::BatchFn;
pub use config::{LoaderConfig, DEFAULT_MAX_BATCH};
pub use dataloader::{Loader, Pending};
pub use eager::{EagerLoad, HasMany};
pub use error::LoadError;
pub use key::{BatchKey, ReferenceKey, StoreKey};
pub use reader::{EntityReader, RelationReader, TagsByReferenceReader};
pub use registry::{LoaderStore, Loaders};
pub use scope::{CancelGuard, RequestScope};
