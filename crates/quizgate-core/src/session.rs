//! An in-progress run through a quiz.
//!
//! A session owns the sampled question list and the working answer sheet;
//! grading on submit runs against exactly the questions the session
//! presented, not the quiz's whole pool.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::attempt::{AnswerSubmission, QuizAttempt};
use crate::error::GateError;
use crate::model::{Question, Quiz};
use crate::scoring;

/// A started, not yet submitted run through a quiz by one user.
#[derive(Debug, Clone)]
pub struct TakingSession {
    user_id: String,
    quiz: Quiz,
    questions: Vec<Question>,
    selections: Vec<Vec<String>>,
    started_at: DateTime<Utc>,
}

impl TakingSession {
    /// Starts a session, sampling questions with the thread RNG.
    pub fn new(user_id: impl Into<String>, quiz: Quiz, now: DateTime<Utc>) -> Self {
        Self::with_rng(user_id, quiz, now, &mut rand::rng())
    }

    /// Starts a session with an explicit RNG, for reproducible sampling.
    ///
    /// When the quiz randomizes, the pool is shuffled before truncation so
    /// the sample is uniform. Otherwise the authored order is kept and the
    /// RNG is untouched.
    pub fn with_rng<R: Rng + ?Sized>(
        user_id: impl Into<String>,
        quiz: Quiz,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        let mut questions = quiz.questions.clone();
        if quiz.randomize {
            questions.shuffle(rng);
        }
        questions.truncate(quiz.session_size());

        let selections = vec![Vec::new(); questions.len()];
        Self {
            user_id: user_id.into(),
            quiz,
            questions,
            selections,
            started_at: now,
        }
    }

    /// The user taking this session.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The quiz this session runs over.
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// The sampled questions, in presentation order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// When the session started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Records a click on an option.
    ///
    /// Single-choice and true/false questions replace the previous
    /// selection; multi-select questions toggle the option in and out.
    pub fn select(&mut self, question_id: &str, option_id: &str) -> Result<(), GateError> {
        let idx = self
            .questions
            .iter()
            .position(|q| q.id == question_id)
            .ok_or_else(|| GateError::QuestionNotFound(question_id.to_string()))?;

        let question = &self.questions[idx];
        if question.option(option_id).is_none() {
            return Err(GateError::OptionNotFound {
                question_id: question_id.to_string(),
                option_id: option_id.to_string(),
            });
        }

        let slot = &mut self.selections[idx];
        if question.kind.allows_multiple() {
            if let Some(pos) = slot.iter().position(|id| id == option_id) {
                slot.remove(pos);
            } else {
                slot.push(option_id.to_string());
            }
        } else {
            *slot = vec![option_id.to_string()];
        }
        Ok(())
    }

    /// Empties the selection for a question.
    pub fn clear(&mut self, question_id: &str) -> Result<(), GateError> {
        let idx = self
            .questions
            .iter()
            .position(|q| q.id == question_id)
            .ok_or_else(|| GateError::QuestionNotFound(question_id.to_string()))?;
        self.selections[idx].clear();
        Ok(())
    }

    /// The current selection for a question, if the session contains it.
    pub fn selected(&self, question_id: &str) -> Option<&[String]> {
        self.questions
            .iter()
            .position(|q| q.id == question_id)
            .map(|idx| self.selections[idx].as_slice())
    }

    /// Whether a question has at least one option selected.
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.selected(question_id).map_or(false, |s| !s.is_empty())
    }

    /// Number of questions with at least one option selected.
    pub fn answered_count(&self) -> usize {
        self.selections.iter().filter(|s| !s.is_empty()).count()
    }

    /// Answered questions as a rounded percentage of the session.
    pub fn progress_percent(&self) -> u8 {
        scoring::percent_score(self.answered_count(), self.questions.len())
    }

    /// Seconds left on the clock, clamped at zero. `None` when untimed.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<u32> {
        self.quiz.time_limit_secs.map(|limit| {
            let elapsed = (now - self.started_at).num_seconds().max(0);
            u32::try_from(i64::from(limit) - elapsed).unwrap_or(0)
        })
    }

    /// Whether the time limit has run out.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.time_remaining(now).is_some_and(|left| left == 0)
    }

    /// Grades the answer sheet and seals it into an attempt record.
    ///
    /// The caller supplies the attempt number; numbering lives with the
    /// attempt history, not with the session.
    pub fn finish(self, now: DateTime<Utc>, attempt_number: u32) -> QuizAttempt {
        let submissions: Vec<AnswerSubmission> = self
            .questions
            .iter()
            .zip(&self.selections)
            .map(|(question, selected)| AnswerSubmission {
                question_id: question.id.clone(),
                selected_option_ids: selected.clone(),
                time_spent_secs: None,
            })
            .collect();

        let outcome = scoring::grade(&self.questions, self.quiz.pass_score, &submissions);
        let time_spent = u32::try_from((now - self.started_at).num_seconds().max(0))
            .unwrap_or(u32::MAX);

        QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id: self.quiz.id,
            user_id: self.user_id,
            attempt_number,
            started_at: self.started_at,
            completed_at: now,
            time_spent_secs: time_spent,
            score: outcome.score,
            passed: outcome.passed,
            answers: outcome.answers,
        }
    }
}
