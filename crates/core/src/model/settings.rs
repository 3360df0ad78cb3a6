use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("minimum question count must be > 0")]
    InvalidMinQuestions,

    #[error("minimum question count must be <= maximum ({min} > {max})")]
    InvalidQuestionBounds { min: u32, max: u32 },

    #[error("default question count {default} must lie within {min}..={max}")]
    DefaultOutOfBounds { default: u32, min: u32, max: u32 },
}

/// Bounds for how many questions a user may request per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    min_questions: u32,
    max_questions: u32,
    default_questions: u32,
}

impl Default for QuizSettings {
    /// 20 questions by default, selectable between 5 and 50.
    fn default() -> Self {
        Self {
            min_questions: 5,
            max_questions: 50,
            default_questions: 20,
        }
    }
}

impl QuizSettings {
    /// # Errors
    ///
    /// Returns `SettingsError` if `min` is zero, `min > max`, or the default
    /// falls outside `min..=max`.
    pub fn new(
        min_questions: u32,
        max_questions: u32,
        default_questions: u32,
    ) -> Result<Self, SettingsError> {
        if min_questions == 0 {
            return Err(SettingsError::InvalidMinQuestions);
        }
        if min_questions > max_questions {
            return Err(SettingsError::InvalidQuestionBounds {
                min: min_questions,
                max: max_questions,
            });
        }
        if !(min_questions..=max_questions).contains(&default_questions) {
            return Err(SettingsError::DefaultOutOfBounds {
                default: default_questions,
                min: min_questions,
                max: max_questions,
            });
        }
        Ok(Self {
            min_questions,
            max_questions,
            default_questions,
        })
    }

    #[must_use]
    pub fn min_questions(&self) -> u32 {
        self.min_questions
    }

    #[must_use]
    pub fn max_questions(&self) -> u32 {
        self.max_questions
    }

    #[must_use]
    pub fn default_questions(&self) -> u32 {
        self.default_questions
    }

    /// Pull a user-entered count into the allowed range.
    #[must_use]
    pub fn clamp_count(&self, requested: u32) -> u32 {
        requested.clamp(self.min_questions, self.max_questions)
    }
}
