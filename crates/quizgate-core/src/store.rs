//! Store trait definitions for quizzes, attempts, and users.
//!
//! These async traits are implemented by the `quizgate-store` crate. The
//! gate service only ever sees the traits, so the policy functions stay
//! pure and every backend is swappable in tests. A lookup that misses
//! returns `Ok(None)` or an empty list; stores never invent fallback
//! entities.

use async_trait::async_trait;

use crate::attempt::QuizAttempt;
use crate::model::{Quiz, UserProfile};

/// Trait for quiz catalogs.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Fetch one quiz by id.
    async fn quiz(&self, quiz_id: &str) -> anyhow::Result<Option<Quiz>>;

    /// All quizzes in the catalog.
    async fn quizzes(&self) -> anyhow::Result<Vec<Quiz>>;

    /// Insert or replace a quiz.
    async fn put_quiz(&self, quiz: Quiz) -> anyhow::Result<()>;
}

/// Trait for append-only attempt logs.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// All attempts one user made on one quiz, in no particular order.
    async fn attempts(&self, user_id: &str, quiz_id: &str) -> anyhow::Result<Vec<QuizAttempt>>;

    /// All attempts on one quiz across users, for statistics.
    async fn attempts_for_quiz(&self, quiz_id: &str) -> anyhow::Result<Vec<QuizAttempt>>;

    /// Append a finished attempt. Records are never updated or deleted.
    async fn record(&self, attempt: QuizAttempt) -> anyhow::Result<()>;
}

/// Trait for user registries.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch one user by id.
    async fn user(&self, user_id: &str) -> anyhow::Result<Option<UserProfile>>;

    /// Insert or replace a user.
    async fn put_user(&self, user: UserProfile) -> anyhow::Result<()>;
}
