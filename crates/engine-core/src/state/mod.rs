use crate::error::StateStoreError;
use async_trait::async_trait;
use model::core::identifiers::RunId;

pub mod memory;
pub mod models;
pub mod sled_store;

pub use models::PublishedIgnoreSet;

/// Run-scoped state shared between the on-start stage and later per-row stages.
///
/// Publishing is write-once per run: a second publish for the same run id fails with
/// [`StateStoreError::AlreadyPublished`] and leaves the first value in place.
#[async_trait]
pub trait IgnoreSetStore: Send + Sync {
    async fn publish(&self, published: &PublishedIgnoreSet) -> Result<(), StateStoreError>;

    async fn load(&self, run_id: &RunId) -> Result<Option<PublishedIgnoreSet>, StateStoreError>;
}
