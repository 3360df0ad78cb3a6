use std::sync::Arc;

use quiz_core::model::{ModuleProgress, ProgressMap, Score};
use storage::repository::KeyValueStore;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::ProgressError;

/// Key under which the whole progress mapping is stored.
pub const PROGRESS_KEY: &str = "moduleProgress";

/// Durable per-module performance history.
///
/// Loaded once, then written through on every update. The write lock is held
/// across the durable write so updates never interleave.
pub struct ProgressStore {
    values: Arc<dyn KeyValueStore>,
    entries: RwLock<ProgressMap>,
}

impl ProgressStore {
    /// Load the stored mapping.
    ///
    /// Missing, unreadable, or corrupt data yields an empty mapping.
    pub async fn load(values: Arc<dyn KeyValueStore>) -> Self {
        let entries = match values.get(PROGRESS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<ProgressMap>(&raw) {
                Ok(map) => map,
                Err(err) => {
                    warn!(%err, "stored module progress is corrupt; starting empty");
                    ProgressMap::new()
                }
            },
            Ok(None) => ProgressMap::new(),
            Err(err) => {
                warn!(%err, "module progress could not be read; starting empty");
                ProgressMap::new()
            }
        };

        Self {
            values,
            entries: RwLock::new(entries),
        }
    }

    /// Record a finished session's score for `module`.
    ///
    /// The in-memory mapping only changes once the durable write succeeds, so a
    /// failed update can be retried without counting the session twice.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the mapping cannot be serialized or written.
    pub async fn update(
        &self,
        module: &str,
        score: Score,
        answers: u32,
    ) -> Result<ModuleProgress, ProgressError> {
        let mut entries = self.entries.write().await;

        let mut updated = entries.get(module).cloned().unwrap_or_default();
        updated.record(score, answers);

        let mut next = entries.clone();
        next.insert(module.to_owned(), updated.clone());
        let raw = serde_json::to_string(&next)?;
        self.values.set(PROGRESS_KEY, &raw).await?;

        *entries = next;
        info!(
            module,
            score = score.value(),
            avg = ?updated.avg_score(),
            "recorded module progress"
        );
        Ok(updated)
    }

    pub async fn get(&self, module: &str) -> Option<ModuleProgress> {
        self.entries.read().await.get(module).cloned()
    }

    pub async fn all(&self) -> ProgressMap {
        self.entries.read().await.clone()
    }
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quiz_core::model::HISTORY_LIMIT;
    use storage::repository::{InMemoryRepository, StorageError};

    fn score(v: u8) -> Score {
        Score::new(v).unwrap()
    }

    struct FailingWrites(InMemoryRepository);

    #[async_trait]
    impl KeyValueStore for FailingWrites {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key).await
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk full".into()))
        }
    }

    #[tokio::test]
    async fn absent_state_loads_empty() {
        let store = ProgressStore::load(Arc::new(InMemoryRepository::new())).await;
        assert!(store.all().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_state_loads_empty() {
        let repo = InMemoryRepository::new();
        repo.set(PROGRESS_KEY, "{not json").await.unwrap();
        let store = ProgressStore::load(Arc::new(repo)).await;
        assert!(store.all().await.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_scores_count_as_corrupt() {
        let repo = InMemoryRepository::new();
        repo.set(PROGRESS_KEY, r#"{"Vida":{"totalQuestions":1,"history":[250]}}"#)
            .await
            .unwrap();
        let store = ProgressStore::load(Arc::new(repo)).await;
        assert!(store.get("Vida").await.is_none());
    }

    #[tokio::test]
    async fn over_long_history_is_trimmed_on_load() {
        let repo = InMemoryRepository::new();
        repo.set(
            PROGRESS_KEY,
            r#"{"Vida":{"lastScore":55,"avgScore":99,"totalQuestions":12,
                "history":[0,5,10,15,20,25,30,35,40,45,50,55]}}"#,
        )
        .await
        .unwrap();
        let store = ProgressStore::load(Arc::new(repo)).await;

        let vida = store.get("Vida").await.unwrap();
        assert_eq!(vida.history().len(), HISTORY_LIMIT);
        assert_eq!(vida.history()[0], score(10));
        assert_eq!(vida.avg_score(), Some(score(33)));
        assert_eq!(vida.last_score(), Some(score(55)));

        let next = store.update("Vida", score(60), 2).await.unwrap();
        assert_eq!(next.history().len(), HISTORY_LIMIT);
        assert_eq!(next.history()[0], score(15));
    }

    #[tokio::test]
    async fn update_writes_through_and_reloads() {
        let repo = InMemoryRepository::new();
        let store = ProgressStore::load(Arc::new(repo.clone())).await;

        let progress = store.update("Property", score(75), 4).await.unwrap();
        assert_eq!(progress.last_score(), Some(score(75)));
        assert_eq!(progress.total_questions_ever(), 4);

        let raw = repo.get(PROGRESS_KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"Property\""));

        let reloaded = ProgressStore::load(Arc::new(repo)).await;
        assert_eq!(reloaded.get("Property").await, Some(progress));
    }

    #[tokio::test]
    async fn updates_accumulate_per_module() {
        let store = ProgressStore::load(Arc::new(InMemoryRepository::new())).await;
        for i in 0..(HISTORY_LIMIT as u8 + 3) {
            store.update("Life", score(i * 5), 2).await.unwrap();
        }
        store.update("Auto", score(100), 5).await.unwrap();

        let life = store.get("Life").await.unwrap();
        assert_eq!(life.history().len(), HISTORY_LIMIT);
        assert_eq!(life.history()[0], score(15));
        assert_eq!(life.total_questions_ever(), 26);

        let auto = store.get("Auto").await.unwrap();
        assert_eq!(auto.history(), &[score(100)]);
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_untouched() {
        let store = ProgressStore::load(Arc::new(FailingWrites(InMemoryRepository::new()))).await;
        let err = store.update("Life", score(50), 2).await.unwrap_err();
        assert!(matches!(err, ProgressError::Storage(_)));
        assert!(store.get("Life").await.is_none());
    }
}
