//! Persistence boundary for recall items.
//!
//! The scheduler hands back new snapshots; a [`RecallStore`] keeps the latest
//! one per item and refuses writes based on a stale read.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prx_srs::RecallItem;
use uuid::Uuid;

use crate::error::StoreError;

pub use memory::MemoryRecallStore;
pub use postgres::PgRecallStore;

#[async_trait]
pub trait RecallStore: Send + Sync {
    /// Short label for logs and readiness output.
    fn backend_tag(&self) -> &'static str;

    async fn get(&self, id: Uuid) -> Result<Option<RecallItem>, StoreError>;

    /// Look up an item by its natural key.
    async fn find_by_question(
        &self,
        learner_id: Uuid,
        question_ref: &str,
    ) -> Result<Option<RecallItem>, StoreError>;

    /// Persist a new item. Fails with [`StoreError::AlreadyExists`] if either
    /// the id or the `(learner_id, question_ref)` pair is taken.
    async fn insert(&self, item: &RecallItem) -> Result<(), StoreError>;

    /// Replace an item's schedule with a newer snapshot.
    ///
    /// `expected_last_attempted_at` is the `last_attempted_at` of the snapshot
    /// the caller read before reviewing. The write is rejected with
    /// [`StoreError::ConcurrentModification`] if the persisted value differs,
    /// or if `item` is older than what is persisted.
    async fn update(
        &self,
        expected_last_attempted_at: DateTime<Utc>,
        item: &RecallItem,
    ) -> Result<(), StoreError>;

    /// Every item of a learner, ordered by id.
    async fn list_for_learner(&self, learner_id: Uuid) -> Result<Vec<RecallItem>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
