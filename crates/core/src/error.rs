use thiserror::Error;

use crate::model::{QuestionError, ScoreError, SettingsError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
