use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::QuizSettings;
use storage::bank::JsonQuestionBank;
use storage::repository::{KeyValueStore, ModuleCatalog, QuestionSource, Storage};
use storage::sqlite::SqliteRepository;
use tracing::{info, warn};

use crate::Clock;
use crate::error::{AppServicesError, QuizError};
use crate::progress_service::ProgressStore;
use crate::remote_bank::{RemoteBankConfig, RemoteQuestionBank};
use crate::sessions::{ModuleOverview, QuizService};

/// Where questions and the module catalog come from.
#[derive(Debug, Clone)]
pub enum BankSource {
    /// A directory holding `questions_all.json` and `questions_index.json`.
    Dir(PathBuf),
    /// The same two documents served over HTTP.
    Remote(RemoteBankConfig),
}

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    catalog: Arc<dyn ModuleCatalog>,
    progress: Arc<ProgressStore>,
    settings: QuizSettings,
}

impl AppServices {
    /// Build services with progress in `SQLite` and questions from `source`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        source: BankSource,
        clock: Clock,
        settings: QuizSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = match source {
            BankSource::Dir(dir) => {
                info!(dir = %dir.display(), "using local question bank");
                Storage::sqlite(db_url, JsonQuestionBank::new(dir)).await?
            }
            BankSource::Remote(config) => {
                info!(url = %config.base_url(), "using remote question bank");
                let repo = SqliteRepository::connect(db_url).await?;
                repo.migrate().await?;
                let bank = RemoteQuestionBank::new(config);
                let questions: Arc<dyn QuestionSource> = Arc::new(bank.clone());
                let catalog: Arc<dyn ModuleCatalog> = Arc::new(bank);
                let values: Arc<dyn KeyValueStore> = Arc::new(repo);
                Storage {
                    questions,
                    catalog,
                    values,
                }
            }
        };
        Ok(Self::from_storage(storage, clock, settings).await)
    }

    /// Build services over an already assembled storage backend.
    pub async fn from_storage(storage: Storage, clock: Clock, settings: QuizSettings) -> Self {
        let progress = Arc::new(ProgressStore::load(Arc::clone(&storage.values)).await);
        let quiz = Arc::new(QuizService::new(
            clock,
            Arc::clone(&storage.questions),
            Arc::clone(&progress),
        ));
        Self {
            quiz,
            catalog: storage.catalog,
            progress,
            settings,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn settings(&self) -> QuizSettings {
        self.settings
    }

    /// Catalog entries joined with their stored progress, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::ProviderUnavailable` if the catalog cannot be loaded.
    pub async fn list_modules(&self) -> Result<Vec<ModuleOverview>, QuizError> {
        let modules = self.catalog.list_modules().await.map_err(|err| {
            warn!(%err, "could not load module catalog");
            QuizError::ProviderUnavailable(err)
        })?;
        let progress = self.progress.all().await;
        Ok(modules
            .into_iter()
            .map(|info| {
                let progress = progress.get(&info.name).cloned();
                ModuleOverview { info, progress }
            })
            .collect())
    }
}
