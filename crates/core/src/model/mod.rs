mod catalog;
mod ids;
mod progress;
mod question;
mod settings;
mod stats;

pub use catalog::ModuleInfo;
pub use ids::{ParseIdError, SessionId};
pub use progress::{HISTORY_LIMIT, ModuleProgress, ProgressMap, Score, ScoreError};
pub use question::{Difficulty, Question, QuestionError};
pub use settings::{QuizSettings, SettingsError};
pub use stats::{AnswerOutcome, RunningStats};
