use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prx_srs::RecallItem;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RecallStore;
use crate::error::StoreError;

/// Process-local store, used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryRecallStore {
    items: RwLock<HashMap<Uuid, RecallItem>>,
}

impl MemoryRecallStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl RecallStore for MemoryRecallStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, id: Uuid) -> Result<Option<RecallItem>, StoreError> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn find_by_question(
        &self,
        learner_id: Uuid,
        question_ref: &str,
    ) -> Result<Option<RecallItem>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .find(|item| item.learner_id == learner_id && item.question_ref == question_ref)
            .cloned())
    }

    async fn insert(&self, item: &RecallItem) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let taken = items.contains_key(&item.id)
            || items.values().any(|existing| {
                existing.learner_id == item.learner_id && existing.question_ref == item.question_ref
            });
        if taken {
            return Err(StoreError::AlreadyExists);
        }
        items.insert(item.id, item.clone());
        Ok(())
    }

    async fn update(
        &self,
        expected_last_attempted_at: DateTime<Utc>,
        item: &RecallItem,
    ) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let current = items
            .get_mut(&item.id)
            .ok_or(StoreError::NotFound(item.id))?;

        if current.last_attempted_at != expected_last_attempted_at
            || item.last_attempted_at < current.last_attempted_at
        {
            tracing::warn!(item_id = %item.id, "Rejected stale recall item write");
            return Err(StoreError::ConcurrentModification(item.id));
        }

        *current = item.clone();
        Ok(())
    }

    async fn list_for_learner(&self, learner_id: Uuid) -> Result<Vec<RecallItem>, StoreError> {
        let mut items: Vec<RecallItem> = self
            .items
            .read()
            .await
            .values()
            .filter(|item| item.learner_id == learner_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
