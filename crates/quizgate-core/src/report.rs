//! Attempt reports and per-quiz statistics, with JSON persistence.
//!
//! An [`AttemptReport`] is a graded attempt joined back with its quiz so
//! option ids become readable texts. [`QuizStatistics`] are the aggregates
//! the admin grid shows per quiz.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attempt::QuizAttempt;
use crate::model::Quiz;

/// A graded attempt joined with its quiz, ready for display or export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    /// The quiz that was taken.
    pub quiz_id: String,
    /// Quiz title, for headers.
    pub quiz_title: String,
    /// Movie the quiz gates.
    pub movie_title: String,
    /// The user who took it.
    pub user_id: String,
    /// Attempt identifier.
    pub attempt_id: Uuid,
    /// 1-based attempt number.
    pub attempt_number: u32,
    /// When the attempt was submitted.
    pub completed_at: DateTime<Utc>,
    /// Wall-clock seconds spent.
    pub time_spent_secs: u32,
    /// Percent score achieved.
    pub score: u8,
    /// Percent score that was required.
    pub pass_score: u8,
    /// Whether the attempt passed.
    pub passed: bool,
    /// Per-question review rows, in presentation order.
    pub review: Vec<ReviewRow>,
}

/// One question's worth of review: what was asked, picked, and right.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRow {
    pub question_id: String,
    pub question_text: String,
    /// Texts of the options the user selected.
    pub selected: Vec<String>,
    /// Texts of the options marked correct.
    pub correct_answers: Vec<String>,
    /// Whether the selection was correct.
    pub correct: bool,
    /// Authored explanation, when one exists.
    pub explanation: Option<String>,
}

impl AttemptReport {
    /// Joins an attempt with its quiz.
    ///
    /// Questions or options no longer in the pool (the quiz was edited after
    /// the attempt) fall back to their raw ids rather than failing.
    pub fn new(quiz: &Quiz, attempt: &QuizAttempt) -> Self {
        let review = attempt
            .answers
            .iter()
            .map(|answer| {
                let question = quiz.question(&answer.question_id);
                let resolve = |option_id: &str| -> String {
                    question
                        .and_then(|q| q.option(option_id))
                        .map(|o| o.text.clone())
                        .unwrap_or_else(|| option_id.to_string())
                };

                ReviewRow {
                    question_id: answer.question_id.clone(),
                    question_text: question
                        .map(|q| q.text.clone())
                        .unwrap_or_else(|| answer.question_id.clone()),
                    selected: answer
                        .selected_option_ids
                        .iter()
                        .map(|id| resolve(id))
                        .collect(),
                    correct_answers: question
                        .map(|q| {
                            q.options
                                .iter()
                                .filter(|o| o.correct)
                                .map(|o| o.text.clone())
                                .collect()
                        })
                        .unwrap_or_default(),
                    correct: answer.correct,
                    explanation: question.and_then(|q| q.explanation.clone()),
                }
            })
            .collect();

        Self {
            quiz_id: quiz.id.clone(),
            quiz_title: quiz.title.clone(),
            movie_title: quiz.movie_title.clone(),
            user_id: attempt.user_id.clone(),
            attempt_id: attempt.id,
            attempt_number: attempt.attempt_number,
            completed_at: attempt.completed_at,
            time_spent_secs: attempt.time_spent_secs,
            score: attempt.score,
            pass_score: quiz.pass_score,
            passed: attempt.passed,
            review,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {} ({})\n\n", self.quiz_title, self.movie_title));
        md.push_str(&format!(
            "**User:** {} (attempt #{})\n",
            self.user_id, self.attempt_number
        ));
        md.push_str(&format!(
            "**Completed:** {}\n",
            self.completed_at.format("%Y-%m-%d %H:%M UTC")
        ));
        md.push_str(&format!(
            "**Score:** {}% against a pass mark of {}%: {}\n",
            self.score,
            self.pass_score,
            if self.passed { "PASSED" } else { "FAILED" }
        ));
        md.push_str(&format!(
            "**Time spent:** {}\n\n",
            format_time_spent(self.time_spent_secs)
        ));

        md.push_str("| # | Question | Your answer | Correct answer | Result |\n");
        md.push_str("|---|----------|-------------|----------------|--------|\n");
        for (i, row) in self.review.iter().enumerate() {
            let selected = if row.selected.is_empty() {
                "(unanswered)".to_string()
            } else {
                row.selected.join(", ")
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                i + 1,
                row.question_text,
                selected,
                row.correct_answers.join(", "),
                if row.correct { "correct" } else { "incorrect" }
            ));
        }

        let explanations: Vec<&ReviewRow> = self
            .review
            .iter()
            .filter(|r| !r.correct && r.explanation.is_some())
            .collect();
        if !explanations.is_empty() {
            md.push_str("\n### Explanations\n\n");
            for row in explanations {
                if let Some(explanation) = &row.explanation {
                    md.push_str(&format!("- **{}**: {}\n", row.question_text, explanation));
                }
            }
        }

        md
    }
}

/// Per-quiz aggregates over the recorded attempt history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizStatistics {
    /// The quiz these aggregates cover.
    pub quiz_id: String,
    /// Number of completed attempts.
    pub completions: usize,
    /// Number of passing attempts.
    pub pass_count: usize,
    /// Passing fraction, 0.0 to 1.0.
    pub pass_rate: f64,
    /// Mean percent score.
    pub average_score: f64,
    /// Mean wall-clock seconds per attempt.
    pub average_time_secs: u64,
}

/// Compute the per-quiz aggregates from an attempt history.
///
/// Attempts for other quizzes are ignored, so the whole log can be passed in.
pub fn compute_quiz_statistics(quiz_id: &str, attempts: &[QuizAttempt]) -> QuizStatistics {
    let relevant: Vec<&QuizAttempt> = attempts.iter().filter(|a| a.quiz_id == quiz_id).collect();

    if relevant.is_empty() {
        return QuizStatistics {
            quiz_id: quiz_id.to_string(),
            completions: 0,
            pass_count: 0,
            pass_rate: 0.0,
            average_score: 0.0,
            average_time_secs: 0,
        };
    }

    let completions = relevant.len();
    let pass_count = relevant.iter().filter(|a| a.passed).count();
    let average_score =
        relevant.iter().map(|a| a.score as f64).sum::<f64>() / completions as f64;
    let average_time_secs =
        relevant.iter().map(|a| a.time_spent_secs as u64).sum::<u64>() / completions as u64;

    QuizStatistics {
        quiz_id: quiz_id.to_string(),
        completions,
        pass_count,
        pass_rate: pass_count as f64 / completions as f64,
        average_score,
        average_time_secs,
    }
}

/// Human-readable duration, the way the results screen words it.
pub fn format_time_spent(seconds: u32) -> String {
    if seconds < 60 {
        return format!("{seconds} seconds");
    }

    let minutes = seconds / 60;
    let remaining_seconds = seconds % 60;

    if minutes < 60 {
        return format!(
            "{minutes} minute{} {remaining_seconds} second{}",
            if minutes != 1 { "s" } else { "" },
            if remaining_seconds != 1 { "s" } else { "" }
        );
    }

    let hours = minutes / 60;
    let remaining_minutes = minutes % 60;
    format!(
        "{hours} hour{} {remaining_minutes} minute{}",
        if hours != 1 { "s" } else { "" },
        if remaining_minutes != 1 { "s" } else { "" }
    )
}
