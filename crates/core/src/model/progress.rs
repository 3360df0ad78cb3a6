use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of session scores kept per module.
pub const HISTORY_LIMIT: usize = 10;

/// Stored progress, keyed by module name.
pub type ProgressMap = BTreeMap<String, ModuleProgress>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("score must be between 0 and 100, got {0}")]
    OutOfRange(u8),
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Whole-number percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` above 100.
    pub fn new(value: u8) -> Result<Self, ScoreError> {
        if value > 100 {
            return Err(ScoreError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Percentage of correct answers, rounded half up.
    ///
    /// Returns `None` when nothing was answered.
    #[must_use]
    pub fn from_counts(correct: u32, total: u32) -> Option<Self> {
        if total == 0 {
            return None;
        }
        let correct = u64::from(correct.min(total));
        let total = u64::from(total);
        let rounded = (200 * correct + total) / (2 * total);
        u8::try_from(rounded).ok().map(Self)
    }

    /// Rounded arithmetic mean, or `None` for an empty slice.
    #[must_use]
    pub fn mean(scores: &[Score]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let sum: u64 = scores.iter().map(|s| u64::from(s.0)).sum();
        let n = scores.len() as u64;
        let rounded = (2 * sum + n) / (2 * n);
        u8::try_from(rounded).ok().map(Self)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

//
// ─── MODULE PROGRESS ───────────────────────────────────────────────────────────
//

/// Historical performance for one module.
///
/// Serialized field names match the stored `moduleProgress` document. Loading
/// rebuilds the record from its history, so an over-long history is trimmed
/// and a stored average is never trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProgressRecord")]
pub struct ModuleProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avg_score: Option<Score>,
    #[serde(rename = "totalQuestions", default)]
    total_questions_ever: u64,
    #[serde(default)]
    history: Vec<Score>,
}

/// Stored shape of a `ModuleProgress`, as read back from storage.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressRecord {
    #[serde(default)]
    last_score: Option<Score>,
    #[serde(rename = "totalQuestions", default)]
    total_questions_ever: u64,
    #[serde(default)]
    history: Vec<Score>,
}

impl From<ProgressRecord> for ModuleProgress {
    fn from(record: ProgressRecord) -> Self {
        let mut history = record.history;
        if history.len() > HISTORY_LIMIT {
            let excess = history.len() - HISTORY_LIMIT;
            history.drain(..excess);
        }
        Self {
            last_score: record.last_score.or_else(|| history.last().copied()),
            avg_score: Score::mean(&history),
            total_questions_ever: record.total_questions_ever,
            history,
        }
    }
}

impl ModuleProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one finished session into the record.
    ///
    /// The history keeps the newest `HISTORY_LIMIT` scores and the average is
    /// recomputed from whatever remains.
    pub fn record(&mut self, score: Score, answers: u32) {
        self.history.push(score);
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
        self.avg_score = Score::mean(&self.history);
        self.last_score = Some(score);
        self.total_questions_ever = self.total_questions_ever.saturating_add(u64::from(answers));
    }

    #[must_use]
    pub fn last_score(&self) -> Option<Score> {
        self.last_score
    }

    #[must_use]
    pub fn avg_score(&self) -> Option<Score> {
        self.avg_score
    }

    #[must_use]
    pub fn total_questions_ever(&self) -> u64 {
        self.total_questions_ever
    }

    /// Oldest first.
    #[must_use]
    pub fn history(&self) -> &[Score] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(v: u8) -> Score {
        Score::new(v).unwrap()
    }

    #[test]
    fn score_rounds_half_up() {
        assert_eq!(Score::from_counts(3, 4), Some(score(75)));
        assert_eq!(Score::from_counts(1, 3), Some(score(33)));
        assert_eq!(Score::from_counts(2, 3), Some(score(67)));
        assert_eq!(Score::from_counts(1, 8), Some(score(13)));
        assert_eq!(Score::from_counts(0, 5), Some(score(0)));
        assert_eq!(Score::from_counts(5, 5), Some(score(100)));
    }

    #[test]
    fn score_needs_at_least_one_answer() {
        assert_eq!(Score::from_counts(0, 0), None);
    }

    #[test]
    fn score_rejects_values_above_100() {
        assert_eq!(Score::new(101), Err(ScoreError::OutOfRange(101)));
        assert!(serde_json::from_str::<Score>("150").is_err());
    }

    #[test]
    fn first_record_sets_all_fields() {
        let mut p = ModuleProgress::new();
        p.record(score(75), 4);
        assert_eq!(p.last_score(), Some(score(75)));
        assert_eq!(p.avg_score(), Some(score(75)));
        assert_eq!(p.total_questions_ever(), 4);
        assert_eq!(p.history(), &[score(75)]);
    }

    #[test]
    fn history_evicts_oldest_first() {
        let mut p = ModuleProgress::new();
        for v in 0..12_u8 {
            p.record(score(v * 5), 1);
            assert!(p.history().len() <= HISTORY_LIMIT);
        }
        let kept: Vec<u8> = p.history().iter().map(|s| s.value()).collect();
        assert_eq!(kept, vec![10, 15, 20, 25, 30, 35, 40, 45, 50, 55]);
        assert_eq!(p.total_questions_ever(), 12);
    }

    #[test]
    fn average_tracks_current_history() {
        let mut p = ModuleProgress::new();
        p.record(score(100), 2);
        p.record(score(50), 2);
        p.record(score(75), 2);
        assert_eq!(p.avg_score(), Some(score(75)));

        p.record(score(80), 5);
        // (100 + 50 + 75 + 80) / 4 = 76.25
        assert_eq!(p.avg_score(), Some(score(76)));
        assert_eq!(p.last_score(), Some(score(80)));
    }

    #[test]
    fn average_ignores_evicted_scores() {
        let mut p = ModuleProgress::new();
        p.record(score(0), 1);
        for _ in 0..HISTORY_LIMIT {
            p.record(score(90), 1);
        }
        assert_eq!(p.avg_score(), Some(score(90)));
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let mut p = ModuleProgress::new();
        p.record(score(60), 10);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "lastScore": 60,
                "avgScore": 60,
                "totalQuestions": 10,
                "history": [60]
            })
        );
    }

    #[test]
    fn loading_trims_history_and_recomputes_average() {
        let history: Vec<u8> = (0..12).map(|v| v * 5).collect();
        let raw = serde_json::json!({
            "avgScore": 99,
            "totalQuestions": 12,
            "history": history
        });
        let p: ModuleProgress = serde_json::from_value(raw).unwrap();

        let kept: Vec<u8> = p.history().iter().map(|s| s.value()).collect();
        assert_eq!(kept, vec![10, 15, 20, 25, 30, 35, 40, 45, 50, 55]);
        // (10 + 15 + ... + 55) / 10 = 32.5
        assert_eq!(p.avg_score(), Some(score(33)));
        assert_eq!(p.last_score(), Some(score(55)));
        assert_eq!(p.total_questions_ever(), 12);
    }

    #[test]
    fn loading_keeps_stored_last_score() {
        let p: ModuleProgress = serde_json::from_str(
            r#"{"lastScore": 40, "avgScore": 0, "totalQuestions": 6, "history": [80, 40]}"#,
        )
        .unwrap();
        assert_eq!(p.last_score(), Some(score(40)));
        assert_eq!(p.avg_score(), Some(score(60)));
    }

    #[test]
    fn deserializes_record_without_scores() {
        let p: ModuleProgress =
            serde_json::from_str(r#"{"totalQuestions": 0, "history": []}"#).unwrap();
        assert_eq!(p, ModuleProgress::new());
    }
}
