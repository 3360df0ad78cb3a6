use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{AnswerOutcome, Question, RunningStats, Score, SessionId};

use super::progress::SessionProgress;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No active session.
    Idle,
    /// A question is shown and has not been answered.
    InProgress,
    /// The current question was answered and feedback is shown.
    Answered,
}

/// What a session is worth recording once it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingResult {
    pub session_id: SessionId,
    pub module: String,
    pub score: Score,
    pub stats: RunningStats,
}

/// One run through a sampled set of questions for a single module.
#[derive(Clone)]
pub(crate) struct ActiveSession {
    id: SessionId,
    module: String,
    questions: Vec<Question>,
    index: usize,
    selected: Option<usize>,
    was_correct: bool,
    stats: RunningStats,
    started_at: DateTime<Utc>,
    recorded: bool,
}

impl ActiveSession {
    fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    fn is_last(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }
}

impl fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSession")
            .field("id", &self.id)
            .field("module", &self.module)
            .field("questions_len", &self.questions.len())
            .field("index", &self.index)
            .field("selected", &self.selected)
            .field("stats", &self.stats)
            .field("recorded", &self.recorded)
            .finish_non_exhaustive()
    }
}

/// Single owned value behind the quiz façade: either idle or one active session.
///
/// Every transition is synchronous; persistence is left to the caller.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    active: Option<ActiveSession>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was active with a fresh session and zeroed stats.
    pub fn start(
        &mut self,
        id: SessionId,
        module: impl Into<String>,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) {
        self.active = Some(ActiveSession {
            id,
            module: module.into(),
            questions,
            index: 0,
            selected: None,
            was_correct: false,
            stats: RunningStats::new(),
            started_at,
            recorded: false,
        });
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match &self.active {
            None => Phase::Idle,
            Some(s) if s.selected.is_some() => Phase::Answered,
            Some(_) => Phase::InProgress,
        }
    }

    /// Score the current question.
    ///
    /// Returns `None` without touching any counter when there is no question to
    /// answer, the question was already answered, or `option` is out of range.
    pub fn select_answer(&mut self, option: usize) -> Option<AnswerOutcome> {
        let session = self.active.as_mut()?;
        if session.selected.is_some() {
            return None;
        }
        let question = session.current_question()?;
        if !question.has_option(option) {
            return None;
        }

        let is_correct = question.is_correct(option);
        let correct_option = question.correct();
        session.selected = Some(option);
        session.was_correct = is_correct;
        session.stats.record(is_correct);

        Some(AnswerOutcome {
            selected: option,
            correct_option,
            is_correct,
        })
    }

    /// Move past an answered question that is not the last one.
    ///
    /// Returns the new index, or `None` if the session is not answered or is
    /// already on its last question.
    pub fn advance(&mut self) -> Option<usize> {
        let session = self.active.as_mut()?;
        if session.selected.is_none() || session.is_last() {
            return None;
        }
        session.index += 1;
        session.selected = None;
        session.was_correct = false;
        Some(session.index)
    }

    /// True when the last question has been answered.
    #[must_use]
    pub fn on_answered_last(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|s| s.selected.is_some() && s.is_last())
    }

    /// Result to persist, read from the live stats.
    ///
    /// `None` when idle, when nothing was answered, or when this session was
    /// already recorded.
    #[must_use]
    pub fn pending_result(&self) -> Option<PendingResult> {
        let session = self.active.as_ref()?;
        if session.recorded {
            return None;
        }
        let score = Score::from_counts(
            session.stats.correct_answers(),
            session.stats.total_answers(),
        )?;
        Some(PendingResult {
            session_id: session.id,
            module: session.module.clone(),
            score,
            stats: session.stats,
        })
    }

    /// Flag the session as recorded if it is still the one identified by `id`.
    pub fn mark_recorded(&mut self, id: SessionId) {
        if let Some(session) = self.active.as_mut().filter(|s| s.id == id) {
            session.recorded = true;
        }
    }

    pub fn reset(&mut self) {
        self.active = None;
    }

    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.active.as_ref().map(|s| s.id)
    }

    #[must_use]
    pub fn module(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.module.as_str())
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|s| s.started_at)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.active.as_ref().and_then(ActiveSession::current_question)
    }

    #[must_use]
    pub fn question_index(&self) -> usize {
        self.active.as_ref().map_or(0, |s| s.index)
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.active.as_ref().map_or(0, |s| s.questions.len())
    }

    /// Zeroed while idle.
    #[must_use]
    pub fn stats(&self) -> RunningStats {
        self.active.as_ref().map(|s| s.stats).unwrap_or_default()
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<usize> {
        self.active.as_ref().and_then(|s| s.selected)
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.active.as_ref().is_some_and(|s| s.was_correct)
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        let session = self.active.as_ref()?;
        Some(SessionProgress::new(
            session.index,
            session.questions.len(),
            session.stats,
            session.selected.is_some(),
        ))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
