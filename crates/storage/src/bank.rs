//! Question bank documents stored as JSON on disk.
//!
//! A bank directory holds `questions_all.json` (an array of questions) and
//! `questions_index.json` (`{ "modules": [...] }`).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quiz_core::model::{ModuleInfo, Question};
use serde::Deserialize;
use tracing::debug;

use crate::repository::{ModuleCatalog, QuestionSource, StorageError};

pub const QUESTIONS_FILE: &str = "questions_all.json";
pub const INDEX_FILE: &str = "questions_index.json";

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    modules: Vec<ModuleInfo>,
}

/// Parse a `questions_all.json` document. Every question is validated.
///
/// # Errors
///
/// Returns `StorageError::Serialization` on malformed JSON or an invalid question.
pub fn parse_questions(raw: &str) -> Result<Vec<Question>, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse a `questions_index.json` document.
///
/// # Errors
///
/// Returns `StorageError::Serialization` on malformed JSON or a missing `modules` list.
pub fn parse_catalog(raw: &str) -> Result<Vec<ModuleInfo>, StorageError> {
    serde_json::from_str::<CatalogDocument>(raw)
        .map(|doc| doc.modules)
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// File-backed question bank. Re-reads the documents on every call.
#[derive(Debug, Clone)]
pub struct JsonQuestionBank {
    questions_path: PathBuf,
    index_path: PathBuf,
}

impl JsonQuestionBank {
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            questions_path: dir.join(QUESTIONS_FILE),
            index_path: dir.join(INDEX_FILE),
        }
    }
}

async fn read_document(path: &Path) -> Result<String, StorageError> {
    debug!(path = %path.display(), "reading question bank document");
    tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => StorageError::NotFound,
        _ => StorageError::Connection(format!("{}: {e}", path.display())),
    })
}

#[async_trait]
impl QuestionSource for JsonQuestionBank {
    async fn list_all_questions(&self) -> Result<Vec<Question>, StorageError> {
        let raw = read_document(&self.questions_path).await?;
        parse_questions(&raw)
    }
}

#[async_trait]
impl ModuleCatalog for JsonQuestionBank {
    async fn list_modules(&self) -> Result<Vec<ModuleInfo>, StorageError> {
        let raw = read_document(&self.index_path).await?;
        parse_catalog(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_question_array() {
        let raw = r#"[
            {"module": "Vida", "subtopic": "Temporal", "difficulty": "Básico",
             "question": "q1", "options": ["a", "b"], "correct": 1},
            {"module": "Autos", "subtopic": "RC", "difficulty": "Avanzado",
             "question": "q2", "options": ["a", "b", "c"], "correct": 2}
        ]"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].module(), "Autos");
    }

    #[test]
    fn schema_mismatch_is_a_serialization_error() {
        let err = parse_questions(r#"{"questions": []}"#).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));

        let err = parse_questions(
            r#"[{"module": "Vida", "subtopic": "", "difficulty": "Básico",
                 "question": "q", "options": ["a", "b"], "correct": 7}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn parses_catalog_document() {
        let raw = r#"{"modules": [
            {"id": "vida", "name": "Vida", "description": "d",
             "questionCount": 3, "icon": "User", "color": "green"}
        ]}"#;
        let modules = parse_catalog(raw).unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].id, "vida");
    }

    #[tokio::test]
    async fn missing_bank_file_is_not_found() {
        let bank = JsonQuestionBank::new("/nonexistent/quiz-bank");
        let err = bank.list_all_questions().await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }
}
