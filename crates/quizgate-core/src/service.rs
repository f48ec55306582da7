//! The verification gate service.
//!
//! Orchestrates the stores and the pure policy functions. This is the seam
//! the CLI talks to; a web layer would sit on the same calls. All state
//! lives behind the store traits, so every answer here is derived fresh
//! from the recorded history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::attempt::{AnswerSubmission, QuizAttempt};
use crate::error::GateError;
use crate::model::{Quiz, QuizStatus, UserProfile};
use crate::parser::validate_quiz;
use crate::policy::{self, Eligibility, GateDecision, PolicyConfig};
use crate::report::{compute_quiz_statistics, QuizStatistics};
use crate::scoring;
use crate::session::TakingSession;
use crate::store::{AttemptStore, QuizStore, UserStore};

/// The verification gate: catalog, attempt history, and policy in one place.
pub struct VerificationGate {
    quizzes: Arc<dyn QuizStore>,
    attempts: Arc<dyn AttemptStore>,
    users: Arc<dyn UserStore>,
    policy: PolicyConfig,
}

impl VerificationGate {
    pub fn new(
        quizzes: Arc<dyn QuizStore>,
        attempts: Arc<dyn AttemptStore>,
        users: Arc<dyn UserStore>,
        policy: PolicyConfig,
    ) -> Self {
        Self {
            quizzes,
            attempts,
            users,
            policy,
        }
    }

    /// The policy constants in force.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// All quizzes in the catalog, whatever their status.
    pub async fn catalog(&self) -> Result<Vec<Quiz>, GateError> {
        Ok(self.quizzes.quizzes().await?)
    }

    /// One quiz by id.
    pub async fn quiz(&self, quiz_id: &str) -> Result<Quiz, GateError> {
        self.require_quiz(quiz_id).await
    }

    /// Starts a taking session for a user on a quiz.
    ///
    /// The user and quiz must exist, the quiz must be active and pass the
    /// authoring invariants, and the user must not be in a retake cooldown.
    pub async fn start_session(
        &self,
        user_id: &str,
        quiz_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TakingSession, GateError> {
        let (quiz, _history) = self.admit(user_id, quiz_id, now).await?;
        tracing::debug!("session started for {user_id} on {quiz_id}");
        Ok(TakingSession::new(user_id, quiz, now))
    }

    /// Grades a finished session, numbers it, and appends it to the history.
    pub async fn submit(
        &self,
        session: TakingSession,
        now: DateTime<Utc>,
    ) -> Result<QuizAttempt, GateError> {
        let history = self
            .attempts
            .attempts(session.user_id(), &session.quiz().id)
            .await?;
        let attempt_number = policy::next_attempt_number(&history);

        let attempt = session.finish(now, attempt_number);
        self.attempts.record(attempt.clone()).await?;
        tracing::info!(
            "recorded attempt #{} for {} on {}: {}% ({})",
            attempt.attempt_number,
            attempt.user_id,
            attempt.quiz_id,
            attempt.score,
            if attempt.passed { "passed" } else { "failed" }
        );
        Ok(attempt)
    }

    /// Grades a prepared answer sheet against the quiz's full question pool
    /// and records the attempt. The non-interactive path.
    ///
    /// Unlike the pure scorer, this rejects answers that reference unknown
    /// questions or options; a typo in an answer sheet should fail loudly
    /// rather than silently count as wrong.
    pub async fn grade_and_record(
        &self,
        user_id: &str,
        quiz_id: &str,
        submissions: &[AnswerSubmission],
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<QuizAttempt, GateError> {
        let (quiz, history) = self.admit(user_id, quiz_id, completed_at).await?;

        for submission in submissions {
            let question = quiz.question(&submission.question_id).ok_or_else(|| {
                GateError::QuestionNotFound(submission.question_id.clone())
            })?;
            for option_id in &submission.selected_option_ids {
                if question.option(option_id).is_none() {
                    return Err(GateError::OptionNotFound {
                        question_id: question.id.clone(),
                        option_id: option_id.clone(),
                    });
                }
            }
        }

        let outcome = scoring::grade_quiz(&quiz, submissions);
        let attempt_number = policy::next_attempt_number(&history);
        let time_spent =
            u32::try_from((completed_at - started_at).num_seconds().max(0)).unwrap_or(u32::MAX);

        let attempt = QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id: quiz.id.clone(),
            user_id: user_id.to_string(),
            attempt_number,
            started_at,
            completed_at,
            time_spent_secs: time_spent,
            score: outcome.score,
            passed: outcome.passed,
            answers: outcome.answers,
        };
        self.attempts.record(attempt.clone()).await?;
        tracing::info!(
            "recorded attempt #{} for {} on {}: {}% ({})",
            attempt.attempt_number,
            attempt.user_id,
            attempt.quiz_id,
            attempt.score,
            if attempt.passed { "passed" } else { "failed" }
        );
        Ok(attempt)
    }

    /// The user's current eligibility to start a new attempt.
    pub async fn eligibility(
        &self,
        user_id: &str,
        quiz_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Eligibility, GateError> {
        self.require_user(user_id).await?;
        self.require_quiz(quiz_id).await?;
        let history = self.attempts.attempts(user_id, quiz_id).await?;
        Ok(policy::eligibility(&history, now, &self.policy))
    }

    /// The verification-gate decision for a user and quiz.
    pub async fn gate_decision(
        &self,
        user_id: &str,
        quiz_id: &str,
        now: DateTime<Utc>,
    ) -> Result<GateDecision, GateError> {
        self.require_user(user_id).await?;
        let quiz = self.require_quiz(quiz_id).await?;
        let history = self.attempts.attempts(user_id, quiz_id).await?;
        Ok(policy::verification_gate(&quiz, &history, now, &self.policy))
    }

    /// A user's attempt history for a quiz, newest first.
    pub async fn history(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> Result<Vec<QuizAttempt>, GateError> {
        self.require_user(user_id).await?;
        self.require_quiz(quiz_id).await?;
        let mut history = self.attempts.attempts(user_id, quiz_id).await?;
        history.sort_by_key(|a| std::cmp::Reverse(a.started_at));
        Ok(history)
    }

    /// One attempt by id, if the user made it on this quiz.
    pub async fn attempt(
        &self,
        user_id: &str,
        quiz_id: &str,
        attempt_id: Uuid,
    ) -> Result<Option<QuizAttempt>, GateError> {
        let history = self.history(user_id, quiz_id).await?;
        Ok(history.into_iter().find(|a| a.id == attempt_id))
    }

    /// Whether the user has ever passed this quiz.
    pub async fn has_passed(&self, user_id: &str, quiz_id: &str) -> Result<bool, GateError> {
        self.require_user(user_id).await?;
        self.require_quiz(quiz_id).await?;
        let history = self.attempts.attempts(user_id, quiz_id).await?;
        Ok(policy::has_passed(&history))
    }

    /// Aggregates over every user's attempts on a quiz.
    pub async fn statistics(&self, quiz_id: &str) -> Result<QuizStatistics, GateError> {
        self.require_quiz(quiz_id).await?;
        let attempts = self.attempts.attempts_for_quiz(quiz_id).await?;
        Ok(compute_quiz_statistics(quiz_id, &attempts))
    }

    /// Shared admission checks for anything that creates a new attempt.
    async fn admit(
        &self,
        user_id: &str,
        quiz_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(Quiz, Vec<QuizAttempt>), GateError> {
        self.require_user(user_id).await?;
        let quiz = self.require_quiz(quiz_id).await?;

        if quiz.status != QuizStatus::Active {
            return Err(GateError::QuizNotOpen {
                quiz_id: quiz.id,
                status: quiz.status,
            });
        }
        validate_quiz(&quiz)?;

        let history = self.attempts.attempts(user_id, quiz_id).await?;
        if let Eligibility::InCooldown { until } =
            policy::eligibility(&history, now, &self.policy)
        {
            tracing::warn!("{user_id} blocked on {quiz_id}: cooldown until {until}");
            return Err(GateError::CooldownActive { until });
        }

        Ok((quiz, history))
    }

    async fn require_user(&self, user_id: &str) -> Result<UserProfile, GateError> {
        self.users
            .user(user_id)
            .await?
            .ok_or_else(|| GateError::UserNotFound(user_id.to_string()))
    }

    async fn require_quiz(&self, quiz_id: &str) -> Result<Quiz, GateError> {
        self.quizzes
            .quiz(quiz_id)
            .await?
            .ok_or_else(|| GateError::QuizNotFound(quiz_id.to_string()))
    }
}
