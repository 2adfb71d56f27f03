use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prx_srs::RecallItem;
use sqlx::PgPool;
use uuid::Uuid;

use super::RecallStore;
use crate::{error::StoreError, models::RecallItemRow, repositories::recall};

/// PostgreSQL-backed store over the `recall_items` table.
#[derive(Debug, Clone)]
pub struct PgRecallStore {
    pool: PgPool,
}

impl PgRecallStore {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecallStore for PgRecallStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, id: Uuid) -> Result<Option<RecallItem>, StoreError> {
        recall::find_by_id(&self.pool, id)
            .await?
            .map(RecallItem::try_from)
            .transpose()
    }

    async fn find_by_question(
        &self,
        learner_id: Uuid,
        question_ref: &str,
    ) -> Result<Option<RecallItem>, StoreError> {
        recall::find_by_question(&self.pool, learner_id, question_ref)
            .await?
            .map(RecallItem::try_from)
            .transpose()
    }

    async fn insert(&self, item: &RecallItem) -> Result<(), StoreError> {
        let row = RecallItemRow::try_from(item)?;
        recall::insert(&self.pool, &row)
            .await
            .map_err(StoreError::from_insert)
    }

    async fn update(
        &self,
        expected_last_attempted_at: DateTime<Utc>,
        item: &RecallItem,
    ) -> Result<(), StoreError> {
        let row = RecallItemRow::try_from(item)?;
        if recall::update_schedule(&self.pool, expected_last_attempted_at, &row).await? {
            return Ok(());
        }

        if recall::exists(&self.pool, item.id).await? {
            tracing::warn!(item_id = %item.id, "Rejected stale recall item write");
            Err(StoreError::ConcurrentModification(item.id))
        } else {
            Err(StoreError::NotFound(item.id))
        }
    }

    async fn list_for_learner(&self, learner_id: Uuid) -> Result<Vec<RecallItem>, StoreError> {
        recall::list_for_learner(&self.pool, learner_id)
            .await?
            .into_iter()
            .map(RecallItem::try_from)
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
