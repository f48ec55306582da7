//! Attempt records: what a finished run through a quiz leaves behind.
//!
//! Attempts are append-only. Eligibility and pass state are always derived
//! from the stored history, never written back onto it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One finished, graded run through a quiz by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    /// Unique identifier for this attempt.
    pub id: Uuid,
    /// The quiz that was taken.
    pub quiz_id: String,
    /// The user who took it.
    pub user_id: String,
    /// 1-based position in this user's history for this quiz.
    pub attempt_number: u32,
    /// When the attempt started.
    pub started_at: DateTime<Utc>,
    /// When the attempt was submitted.
    pub completed_at: DateTime<Utc>,
    /// Wall-clock seconds between start and submission.
    pub time_spent_secs: u32,
    /// Percent score, 0 to 100.
    pub score: u8,
    /// Whether the score met the quiz's pass mark.
    pub passed: bool,
    /// Per-question results, in the order the session presented them.
    pub answers: Vec<AnswerRecord>,
}

/// The graded outcome of one question within an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// The question that was answered.
    pub question_id: String,
    /// The option ids the user had selected. Treated as a set.
    pub selected_option_ids: Vec<String>,
    /// Whether the selection was correct under the question's kind.
    pub correct: bool,
    /// Seconds spent on this question, when tracked.
    #[serde(default)]
    pub time_spent_secs: Option<u32>,
}

/// An ungraded answer to one question, as handed in for grading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSubmission {
    /// The question being answered.
    pub question_id: String,
    /// The selected option ids.
    pub selected_option_ids: Vec<String>,
    /// Seconds spent on this question, when tracked.
    #[serde(default)]
    pub time_spent_secs: Option<u32>,
}

impl AnswerSubmission {
    /// Builds a submission, dropping duplicate option ids.
    ///
    /// Selections are sets. Keeping the first occurrence preserves the order
    /// the user clicked in, which the review screen echoes back.
    pub fn new(question_id: impl Into<String>, selected_option_ids: Vec<String>) -> Self {
        let mut deduped: Vec<String> = Vec::with_capacity(selected_option_ids.len());
        for id in selected_option_ids {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }
        Self {
            question_id: question_id.into(),
            selected_option_ids: deduped,
            time_spent_secs: None,
        }
    }

    /// Convenience for single-choice answers.
    pub fn single(question_id: impl Into<String>, option_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            selected_option_ids: vec![option_id.into()],
            time_spent_secs: None,
        }
    }

    /// Sets the per-question timer.
    pub fn with_time_spent(mut self, secs: u32) -> Self {
        self.time_spent_secs = Some(secs);
        self
    }
}
