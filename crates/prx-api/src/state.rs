use std::sync::Arc;

use prx_db::{MemoryRecallStore, PgRecallStore, RecallStore};
use prx_srs::Scheduler;

use crate::config::ApiConfig;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn RecallStore>,
    pub scheduler: Scheduler,
}

impl ApiState {
    pub fn new(store: Arc<dyn RecallStore>, scheduler: Scheduler) -> Self {
        Self { store, scheduler }
    }

    /// Build the state from configuration, connecting to PostgreSQL when a
    /// database URL is set and falling back to an in-memory store otherwise.
    pub async fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let scheduler = Scheduler::new(config.scheduler_config()?)?;

        let store: Arc<dyn RecallStore> = match config.database_url.as_deref() {
            Some(database_url) => {
                let pool = prx_db::create_pool(database_url, config.db_max_connections).await?;
                prx_db::ensure_db_and_migrate(database_url, &pool).await?;
                Arc::new(PgRecallStore::new(pool))
            }
            None => {
                tracing::warn!(
                    "PRX_DATABASE_URL not set, recall items are kept in memory and lost on restart"
                );
                Arc::new(MemoryRecallStore::new())
            }
        };

        tracing::info!(
            backend = store.backend_tag(),
            mastery_repetitions = scheduler.config().mastery_repetitions,
            mastery_ease = scheduler.config().mastery_ease,
            "Recall store ready"
        );

        Ok(Self::new(store, scheduler))
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("store", &self.store.backend_tag())
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
