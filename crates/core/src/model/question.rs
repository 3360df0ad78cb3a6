use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question module cannot be empty")]
    EmptyModule,

    #[error("question text cannot be empty")]
    EmptyPrompt,

    #[error("question must offer at least two options, got {0}")]
    TooFewOptions(usize),

    #[error("correct option {correct} is out of range for {options} options")]
    CorrectOutOfRange { correct: usize, options: usize },
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty label attached to each question in the bank.
///
/// The bank is authored in Spanish; English spellings are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "Básico", alias = "Basico", alias = "Basic")]
    Basic,
    #[serde(rename = "Intermedio", alias = "Intermediate")]
    Intermediate,
    #[serde(rename = "Avanzado", alias = "Advanced")]
    Advanced,
}

impl Difficulty {
    /// Label as written in the question bank.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Basic => "Básico",
            Difficulty::Intermediate => "Intermedio",
            Difficulty::Advanced => "Avanzado",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Wire shape of a question in `questions_all.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuestionRecord {
    module: String,
    subtopic: String,
    difficulty: Difficulty,
    question: String,
    options: Vec<String>,
    correct: usize,
}

/// A multiple-choice question. Always holds a `correct` index inside `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct Question {
    module: String,
    subtopic: String,
    difficulty: Difficulty,
    prompt: String,
    options: Vec<String>,
    correct: usize,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the module or prompt is blank, fewer than two
    /// options are given, or `correct` does not index into `options`.
    pub fn new(
        module: impl Into<String>,
        subtopic: impl Into<String>,
        difficulty: Difficulty,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: usize,
    ) -> Result<Self, QuestionError> {
        let module = module.into();
        let prompt = prompt.into();
        if module.trim().is_empty() {
            return Err(QuestionError::EmptyModule);
        }
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions(options.len()));
        }
        if correct >= options.len() {
            return Err(QuestionError::CorrectOutOfRange {
                correct,
                options: options.len(),
            });
        }

        Ok(Self {
            module,
            subtopic: subtopic.into(),
            difficulty,
            prompt,
            options,
            correct,
        })
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn subtopic(&self) -> &str {
        &self.subtopic
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn has_option(&self, index: usize) -> bool {
        index < self.options.len()
    }

    #[must_use]
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct
    }
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.module,
            record.subtopic,
            record.difficulty,
            record.question,
            record.options,
            record.correct,
        )
    }
}

impl From<Question> for QuestionRecord {
    fn from(q: Question) -> Self {
        Self {
            module: q.module,
            subtopic: q.subtopic,
            difficulty: q.difficulty,
            question: q.prompt,
            options: q.options,
            correct: q.correct,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
