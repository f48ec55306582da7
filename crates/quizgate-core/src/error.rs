//! Gate error types.
//!
//! These are the failure kinds the verification gate reports. Defined in
//! `quizgate-core` so callers can match and classify outcomes without
//! string matching. Lookups that miss are errors here; there are no
//! silent fallback entities anywhere in the system.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::QuizStatus;

/// Errors that can occur when taking, grading, or gating a quiz.
#[derive(Debug, Error)]
pub enum GateError {
    /// No quiz with the given id exists.
    #[error("quiz not found: {0}")]
    QuizNotFound(String),

    /// No user with the given id exists.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// A question violates an authoring invariant.
    #[error("question {question_id} is malformed: {reason}")]
    QuestionMalformed { question_id: String, reason: String },

    /// A quiz violates an authoring invariant.
    #[error("quiz {quiz_id} is malformed: {reason}")]
    QuizMalformed { quiz_id: String, reason: String },

    /// The quiz exists but is not open for attempts.
    #[error("quiz {quiz_id} is not open for attempts (status: {status})")]
    QuizNotOpen { quiz_id: String, status: QuizStatus },

    /// The user's retake cooldown has not elapsed yet.
    #[error("retake cooldown active until {until}")]
    CooldownActive { until: DateTime<Utc> },

    /// An answer referenced a question the session does not contain.
    #[error("question not found: {0}")]
    QuestionNotFound(String),

    /// An answer referenced an option the question does not offer.
    #[error("option {option_id} not found on question {question_id}")]
    OptionNotFound {
        question_id: String,
        option_id: String,
    },

    /// A backing store failed.
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl GateError {
    /// Returns `true` if this error means a referenced entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GateError::QuizNotFound(_)
                | GateError::UserNotFound(_)
                | GateError::QuestionNotFound(_)
                | GateError::OptionNotFound { .. }
        )
    }

    /// Returns when the caller may retry, if this error carries a cooldown.
    pub fn retry_available_at(&self) -> Option<DateTime<Utc>> {
        match self {
            GateError::CooldownActive { until } => Some(*until),
            _ => None,
        }
    }
}
