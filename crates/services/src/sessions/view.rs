use chrono::{DateTime, Utc};

use quiz_core::model::{
    ModuleInfo, ModuleProgress, Question, RunningStats, Score, SessionId,
};

use super::progress::SessionProgress;
use super::state::{Phase, SessionState};

/// Consistent read of every façade accessor, taken under one lock.
///
/// Presentation-agnostic: no formatted strings, no localization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSnapshot {
    pub session_id: Option<SessionId>,
    pub module: Option<String>,
    pub phase: Phase,
    pub current_question: Option<Question>,
    pub question_index: usize,
    pub total_questions: usize,
    pub stats: RunningStats,
    pub selected_answer: Option<usize>,
    pub show_result: bool,
    pub is_correct: bool,
    pub progress: Option<SessionProgress>,
    pub started_at: Option<DateTime<Utc>>,
}

impl QuizSnapshot {
    pub(crate) fn capture(state: &SessionState) -> Self {
        let phase = state.phase();
        Self {
            session_id: state.session_id(),
            module: state.module().map(str::to_owned),
            phase,
            current_question: state.current_question().cloned(),
            question_index: state.question_index(),
            total_questions: state.total_questions(),
            stats: state.stats(),
            selected_answer: state.selected_answer(),
            show_result: phase == Phase::Answered,
            is_correct: state.is_correct(),
            progress: state.progress(),
            started_at: state.started_at(),
        }
    }
}

/// Outcome of recording a session into module progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub session_id: SessionId,
    pub module: String,
    pub score: Score,
    pub stats: RunningStats,
    /// Module progress after this session was folded in.
    pub progress: ModuleProgress,
    pub completed_at: DateTime<Utc>,
}

/// What `next_question` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the question at `index`.
    Next { index: usize },
    /// The last question was acknowledged and the façade is idle again.
    /// `None` when the session had already been recorded.
    Finished(Option<SessionResult>),
    /// Nothing answered yet, or no session; state unchanged.
    Ignored,
}

/// Catalog entry joined with the stored progress for that module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOverview {
    pub info: ModuleInfo,
    pub progress: Option<ModuleProgress>,
}
