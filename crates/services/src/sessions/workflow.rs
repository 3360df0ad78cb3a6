use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use quiz_core::model::{
    AnswerOutcome, ModuleProgress, ProgressMap, Question, RunningStats, SessionId,
};
use storage::repository::QuestionSource;

use super::plan::plan_questions;
use super::progress::SessionProgress;
use super::state::{Phase, SessionState};
use super::view::{Advance, QuizSnapshot, SessionResult};
use crate::Clock;
use crate::error::QuizError;
use crate::progress_service::ProgressStore;

/// The quiz façade: the only entry point the presentation layer talks to.
///
/// Owns the single session state behind an async mutex, so callers sharing the
/// service through an `Arc` are serialized. Only the question fetch in
/// `start_quiz` runs outside the lock; a later `start_quiz` or `reset_quiz`
/// supersedes a fetch still in flight.
pub struct QuizService {
    clock: Clock,
    questions: Arc<dyn QuestionSource>,
    progress: Arc<ProgressStore>,
    state: Mutex<SessionState>,
    latest_start: AtomicU64,
    rng: Option<StdMutex<StdRng>>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionSource>,
        progress: Arc<ProgressStore>,
    ) -> Self {
        Self {
            clock,
            questions,
            progress,
            state: Mutex::new(SessionState::new()),
            latest_start: AtomicU64::new(0),
            rng: None,
        }
    }

    /// Draw questions from a seeded generator instead of the thread RNG.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Some(StdMutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    #[must_use]
    pub fn progress_store(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.progress)
    }

    //
    // ─── COMMANDS ─────────────────────────────────────────────────────────────
    //

    /// Start a session of up to `count` random questions from `module`.
    ///
    /// Any active session is discarded without being recorded. A module with no
    /// questions still starts, with zero questions.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::ProviderUnavailable` if the questions cannot be loaded;
    /// the current state is left as it was.
    /// Returns `QuizError::Superseded` if another start or a reset arrived while
    /// the questions were loading.
    pub async fn start_quiz(&self, module: &str, count: u32) -> Result<QuizSnapshot, QuizError> {
        let ticket = self.latest_start.fetch_add(1, Ordering::SeqCst) + 1;

        let all = match self.questions.list_all_questions().await {
            Ok(all) => all,
            Err(err) => {
                warn!(module, %err, "could not load questions");
                return Err(QuizError::ProviderUnavailable(err));
            }
        };
        let count = usize::try_from(count).unwrap_or(usize::MAX);
        let picked = self.pick(&all, module, count);

        let mut state = self.state.lock().await;
        if self.latest_start.load(Ordering::SeqCst) != ticket {
            debug!(module, "dropping superseded quiz start");
            return Err(QuizError::Superseded);
        }
        if picked.is_empty() {
            warn!(module, "no questions found for module");
        }

        let id = SessionId::new();
        info!(%id, module, questions = picked.len(), "quiz started");
        state.start(id, module, picked, self.clock.now());
        Ok(QuizSnapshot::capture(&state))
    }

    /// Answer the current question.
    ///
    /// Returns `None` and changes nothing if there is no unanswered question or
    /// `option` is out of range.
    pub async fn select_answer(&self, option: usize) -> Option<AnswerOutcome> {
        let mut state = self.state.lock().await;
        let outcome = state.select_answer(option);
        if outcome.is_none() {
            debug!(option, phase = ?state.phase(), "answer ignored");
        }
        outcome
    }

    /// Acknowledge feedback and move on.
    ///
    /// On the last question this records the session (at most once) and
    /// returns the façade to idle.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Progress` if recording fails; the session stays on
    /// its answered last question so the call can be retried.
    pub async fn next_question(&self) -> Result<Advance, QuizError> {
        let mut state = self.state.lock().await;
        if let Some(index) = state.advance() {
            return Ok(Advance::Next { index });
        }
        if !state.on_answered_last() {
            debug!(phase = ?state.phase(), "next ignored");
            return Ok(Advance::Ignored);
        }

        let result = self.record(&mut state).await?;
        state.reset();
        info!("quiz finished");
        Ok(Advance::Finished(result))
    }

    /// Record the session's score into module progress.
    ///
    /// The session itself stays in memory; follow with `reset_quiz` or a new
    /// `start_quiz`. Returns `Ok(None)` when idle, when nothing was answered, or
    /// when this session was already recorded.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Progress` if the progress store cannot be written.
    pub async fn end_quiz(&self) -> Result<Option<SessionResult>, QuizError> {
        let mut state = self.state.lock().await;
        self.record(&mut state).await
    }

    /// Drop the active session without touching stored progress.
    pub async fn reset_quiz(&self) {
        self.latest_start.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        if let Some(id) = state.session_id() {
            debug!(%id, "quiz reset");
        }
        state.reset();
    }

    //
    // ─── QUERIES ──────────────────────────────────────────────────────────────
    //

    pub async fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot::capture(&*self.state.lock().await)
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase()
    }

    pub async fn current_module(&self) -> Option<String> {
        self.state.lock().await.module().map(str::to_owned)
    }

    pub async fn current_question(&self) -> Option<Question> {
        self.state.lock().await.current_question().cloned()
    }

    pub async fn question_index(&self) -> usize {
        self.state.lock().await.question_index()
    }

    pub async fn total_questions(&self) -> usize {
        self.state.lock().await.total_questions()
    }

    pub async fn stats(&self) -> RunningStats {
        self.state.lock().await.stats()
    }

    pub async fn selected_answer(&self) -> Option<usize> {
        self.state.lock().await.selected_answer()
    }

    /// True while feedback for the current question is shown.
    pub async fn show_result(&self) -> bool {
        self.state.lock().await.phase() == Phase::Answered
    }

    pub async fn is_correct(&self) -> bool {
        self.state.lock().await.is_correct()
    }

    pub async fn session_progress(&self) -> Option<SessionProgress> {
        self.state.lock().await.progress()
    }

    pub async fn module_progress(&self) -> ProgressMap {
        self.progress.all().await
    }

    pub async fn progress_for(&self, module: &str) -> Option<ModuleProgress> {
        self.progress.get(module).await
    }

    //
    // ─── INTERNALS ────────────────────────────────────────────────────────────
    //

    fn pick(&self, all: &[Question], module: &str, count: usize) -> Vec<Question> {
        match &self.rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                plan_questions(all, module, count, &mut *rng)
            }
            None => plan_questions(all, module, count, &mut rand::rng()),
        }
    }

    async fn record(&self, state: &mut SessionState) -> Result<Option<SessionResult>, QuizError> {
        let Some(pending) = state.pending_result() else {
            debug!("nothing to record");
            return Ok(None);
        };

        let progress = self
            .progress
            .update(&pending.module, pending.score, pending.stats.total_answers())
            .await?;
        state.mark_recorded(pending.session_id);

        Ok(Some(SessionResult {
            session_id: pending.session_id,
            module: pending.module,
            score: pending.score,
            stats: pending.stats,
            progress,
            completed_at: self.clock.now(),
        }))
    }
}

impl std::fmt::Debug for QuizService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizService")
            .field("clock", &self.clock)
            .field("seeded", &self.rng.is_some())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
