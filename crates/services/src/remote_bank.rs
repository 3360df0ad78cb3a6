use std::env;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use quiz_core::model::{ModuleInfo, Question};
use storage::bank::{INDEX_FILE, QUESTIONS_FILE, parse_catalog, parse_questions};
use storage::repository::{ModuleCatalog, QuestionSource, StorageError};

use crate::error::RemoteBankError;

/// Where a remote bank's `questions_all.json` and `questions_index.json` live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteBankConfig {
    base_url: Url,
}

impl RemoteBankConfig {
    /// Parse a base url. A trailing `/` is added so documents resolve beneath it.
    ///
    /// # Errors
    ///
    /// Returns `RemoteBankError` if `base_url` is not an absolute hierarchical url.
    pub fn new(base_url: &str) -> Result<Self, RemoteBankError> {
        let trimmed = base_url.trim();
        let mut url = Url::parse(trimmed)?;
        if url.cannot_be_a_base() {
            return Err(RemoteBankError::NotABase(trimmed.to_owned()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self { base_url: url })
    }

    /// Read `QUIZ_BANK_URL`. Unset or blank means no remote bank.
    ///
    /// # Errors
    ///
    /// Returns `RemoteBankError` if the variable is set but is not a usable url.
    pub fn from_env() -> Result<Option<Self>, RemoteBankError> {
        match env::var("QUIZ_BANK_URL") {
            Ok(raw) if !raw.trim().is_empty() => Self::new(&raw).map(Some),
            _ => Ok(None),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn document_url(&self, name: &str) -> Result<Url, StorageError> {
        self.base_url
            .join(name)
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

/// Question bank served over HTTP. Fetches on every call.
#[derive(Clone)]
pub struct RemoteQuestionBank {
    client: Client,
    config: RemoteBankConfig,
}

impl RemoteQuestionBank {
    #[must_use]
    pub fn new(config: RemoteBankConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn fetch(&self, name: &str) -> Result<String, StorageError> {
        let url = self.config.document_url(name)?;
        debug!(%url, "fetching question bank document");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "question bank request failed");
            return Err(StorageError::Connection(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

impl std::fmt::Debug for RemoteQuestionBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteQuestionBank")
            .field("base_url", &self.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl QuestionSource for RemoteQuestionBank {
    async fn list_all_questions(&self) -> Result<Vec<Question>, StorageError> {
        let raw = self.fetch(QUESTIONS_FILE).await?;
        parse_questions(&raw)
    }
}

#[async_trait]
impl ModuleCatalog for RemoteQuestionBank {
    async fn list_modules(&self) -> Result<Vec<ModuleInfo>, StorageError> {
        let raw = self.fetch(INDEX_FILE).await?;
        parse_catalog(&raw)
    }
}
