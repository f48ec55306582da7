//! Core data model types for quizgate.
//!
//! These are the fundamental types that the entire quizgate system uses
//! to represent quizzes, their question pools, and the people taking them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trivia quiz attached to a movie release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Unique identifier for this quiz.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Description shown before an attempt starts.
    #[serde(default)]
    pub description: String,
    /// Identifier of the movie this quiz gates reviews for.
    pub movie_id: String,
    /// Movie title, denormalized for display.
    pub movie_title: String,
    /// Release date of the movie as a UTC calendar date.
    pub movie_release_date: NaiveDate,
    /// Minimum percent score required to pass.
    #[serde(default = "default_pass_score")]
    pub pass_score: u8,
    /// Time limit for one attempt, in seconds. `None` means untimed.
    #[serde(default)]
    pub time_limit_secs: Option<u32>,
    /// How many questions a session samples from the pool. `None` takes all.
    #[serde(default)]
    pub question_count: Option<usize>,
    /// Whether sessions shuffle the question order.
    #[serde(default)]
    pub randomize: bool,
    /// Whether passing this quiz is required before reviewing the movie.
    #[serde(default = "default_true")]
    pub verification_required: bool,
    /// Lifecycle status.
    #[serde(default)]
    pub status: QuizStatus,
    /// When the quiz was created.
    pub created_at: DateTime<Utc>,
    /// When the quiz was last edited.
    pub updated_at: DateTime<Utc>,
    /// The question pool, in authored order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Looks up a question in the pool by id.
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Number of questions a session over this quiz will contain.
    pub fn session_size(&self) -> usize {
        match self.question_count {
            Some(count) => count.min(self.questions.len()),
            None => self.questions.len(),
        }
    }
}

fn default_pass_score() -> u8 {
    70
}

fn default_true() -> bool {
    true
}

/// A single question in a quiz's pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the quiz.
    pub id: String,
    /// The question text shown to the taker.
    pub text: String,
    /// How the question is answered and scored.
    pub kind: QuestionKind,
    /// The answer options, in authored order.
    pub options: Vec<AnswerOption>,
    /// Optional hint shown on request.
    #[serde(default)]
    pub hint: Option<String>,
    /// Optional explanation shown in the post-attempt review.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Optional still or poster shown with the question.
    #[serde(default)]
    pub media_url: Option<String>,
    /// Explicit sort position; ties keep authored order.
    #[serde(default)]
    pub order: u32,
}

impl Question {
    /// Looks up an option by id.
    pub fn option(&self, option_id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Ids of the options marked correct, in authored order.
    pub fn correct_option_ids(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.correct)
            .map(|o| o.id.as_str())
            .collect()
    }
}

/// One selectable answer to a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Unique identifier within the question.
    pub id: String,
    /// The option text.
    pub text: String,
    /// Whether selecting this option is (part of) the correct answer.
    #[serde(default)]
    pub correct: bool,
    /// Explicit sort position; ties keep authored order.
    #[serde(default)]
    pub order: u32,
}

/// How a question is answered and scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Exactly one option may be selected.
    #[serde(alias = "multiple-choice")]
    SingleChoice,
    /// Any subset of options may be selected; all correct ones are required.
    #[serde(alias = "multiple-select")]
    MultiSelect,
    /// Single choice between two options.
    TrueFalse,
}

impl QuestionKind {
    /// Whether more than one option may be selected at once.
    pub fn allows_multiple(&self) -> bool {
        matches!(self, QuestionKind::MultiSelect)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::SingleChoice => write!(f, "single-choice"),
            QuestionKind::MultiSelect => write!(f, "multi-select"),
            QuestionKind::TrueFalse => write!(f, "true-false"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single-choice" | "single" | "multiple-choice" => Ok(QuestionKind::SingleChoice),
            "multi-select" | "multi" | "multiple-select" => Ok(QuestionKind::MultiSelect),
            "true-false" | "boolean" => Ok(QuestionKind::TrueFalse),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// Lifecycle status of a quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    /// Open for attempts.
    Active,
    /// Still being authored; not open for attempts.
    #[default]
    Draft,
    /// Retired; kept for history but not open for attempts.
    Archived,
}

impl fmt::Display for QuizStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizStatus::Active => write!(f, "active"),
            QuizStatus::Draft => write!(f, "draft"),
            QuizStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for QuizStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(QuizStatus::Active),
            "draft" => Ok(QuizStatus::Draft),
            "archived" => Ok(QuizStatus::Archived),
            other => Err(format!("unknown quiz status: {other}")),
        }
    }
}

/// A registered user, as the gate needs to know them.
///
/// Lookups that miss return an error to the caller. There is deliberately no
/// default profile to fall back on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// The day the account was created.
    pub joined_date: NaiveDate,
}
