use serde::{Deserialize, Serialize};

/// Result of scoring one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub selected: usize,
    pub correct_option: usize,
    pub is_correct: bool,
}

/// Live counters for the session in progress.
///
/// Only `record` mutates the counters, which keeps
/// `correct_answers <= total_answers` and `max_streak >= streak` at all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningStats {
    correct_answers: u32,
    total_answers: u32,
    streak: u32,
    max_streak: u32,
}

impl RunningStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one answer. A miss breaks the streak.
    pub fn record(&mut self, correct: bool) {
        self.total_answers = self.total_answers.saturating_add(1);
        if correct {
            self.correct_answers = self.correct_answers.saturating_add(1);
            self.streak = self.streak.saturating_add(1);
            self.max_streak = self.max_streak.max(self.streak);
        } else {
            self.streak = 0;
        }
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn total_answers(&self) -> u32 {
        self.total_answers
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> u32 {
        self.total_answers - self.correct_answers
    }

    /// Consecutive correct answers ending at the latest one.
    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn max_streak(&self) -> u32 {
        self.max_streak
    }
}
