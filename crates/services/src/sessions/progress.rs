use quiz_core::model::RunningStats;

/// Position within the running session, useful for a progress bar and header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    /// 1-based position of the current question; 0 when the session is empty.
    pub position: usize,
    pub total: usize,
    pub answered: u32,
    pub correct: u32,
    pub streak: u32,
    /// Share of the session reached, counting the current question.
    pub percent: u8,
    /// The current question is the last one ("see results" rather than "next").
    pub is_last: bool,
    pub showing_feedback: bool,
}

impl SessionProgress {
    #[must_use]
    pub fn new(index: usize, total: usize, stats: RunningStats, showing_feedback: bool) -> Self {
        let position = if total == 0 { 0 } else { index + 1 };
        let percent = if total == 0 {
            0
        } else {
            u8::try_from((position * 100) / total).unwrap_or(100)
        };
        Self {
            position,
            total,
            answered: stats.total_answers(),
            correct: stats.correct_answers(),
            streak: stats.streak(),
            percent,
            is_last: total > 0 && position == total,
            showing_feedback,
        }
    }
}
