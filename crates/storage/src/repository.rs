use async_trait::async_trait;
use quiz_core::model::{ModuleInfo, Question};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters and question providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read-only source of every question in the bank.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the full question list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be reached or does not parse.
    async fn list_all_questions(&self) -> Result<Vec<Question>, StorageError>;
}

/// Read-only list of modules for the presentation layer.
#[async_trait]
pub trait ModuleCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be reached or does not parse.
    async fn list_modules(&self) -> Result<Vec<ModuleInfo>, StorageError>;
}

/// Durable string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory implementation of every storage trait, for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<Vec<Question>>>,
    modules: Arc<Mutex<Vec<ModuleInfo>>>,
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_questions(questions: Vec<Question>) -> Self {
        let repo = Self::new();
        if let Ok(mut guard) = repo.questions.lock() {
            *guard = questions;
        }
        repo
    }

    /// Replace the question bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn set_questions(&self, questions: Vec<Question>) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = questions;
        Ok(())
    }

    /// Replace the module catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn set_modules(&self, modules: Vec<ModuleInfo>) -> Result<(), StorageError> {
        let mut guard = self
            .modules
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = modules;
        Ok(())
    }
}

#[async_trait]
impl QuestionSource for InMemoryRepository {
    async fn list_all_questions(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl ModuleCatalog for InMemoryRepository {
    async fn list_modules(&self) -> Result<Vec<ModuleInfo>, StorageError> {
        let guard = self
            .modules
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Collaborators behind trait objects so backends can be swapped.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionSource>,
    pub catalog: Arc<dyn ModuleCatalog>,
    pub values: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(repo: InMemoryRepository) -> Self {
        let questions: Arc<dyn QuestionSource> = Arc::new(repo.clone());
        let catalog: Arc<dyn ModuleCatalog> = Arc::new(repo.clone());
        let values: Arc<dyn KeyValueStore> = Arc::new(repo);
        Self {
            questions,
            catalog,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Difficulty;

    fn build_question(module: &str) -> Question {
        Question::new(
            module,
            "General",
            Difficulty::Basic,
            "Q",
            vec!["a".into(), "b".into()],
            0,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn in_memory_values_round_trip() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get("moduleProgress").await.unwrap(), None);

        repo.set("moduleProgress", "{}").await.unwrap();
        repo.set("moduleProgress", r#"{"a":1}"#).await.unwrap();
        assert_eq!(
            repo.get("moduleProgress").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
    }

    #[tokio::test]
    async fn storage_shares_one_backing_repo() {
        let repo = InMemoryRepository::with_questions(vec![build_question("Vida")]);
        let storage = Storage::in_memory(repo.clone());

        repo.set_questions(vec![build_question("Vida"), build_question("Autos")])
            .unwrap();
        let all = storage.questions.list_all_questions().await.unwrap();
        assert_eq!(all.len(), 2);

        storage.values.set("k", "v").await.unwrap();
        assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
