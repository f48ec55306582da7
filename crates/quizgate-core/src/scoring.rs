//! Answer correctness and percent scoring.
//!
//! The grading contract is all-or-nothing per question: single-choice and
//! true/false need exactly one selected option and it must be the correct
//! one; multi-select needs the selected set to equal the correct set. There
//! is no partial credit anywhere.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::attempt::{AnswerRecord, AnswerSubmission};
use crate::model::{Question, QuestionKind, Quiz};

/// Decides whether a selection answers a question correctly.
///
/// Selections are treated as a set; duplicate ids collapse before any length
/// check. A question whose options contain no correct option can never be
/// answered correctly, not even with an empty selection. That is a valid
/// (if useless) question, not an error.
pub fn is_answer_correct(question: &Question, selected_option_ids: &[String]) -> bool {
    let correct: BTreeSet<&str> = question
        .options
        .iter()
        .filter(|o| o.correct)
        .map(|o| o.id.as_str())
        .collect();
    if correct.is_empty() {
        return false;
    }

    let selected: BTreeSet<&str> = selected_option_ids.iter().map(String::as_str).collect();
    match question.kind {
        QuestionKind::SingleChoice | QuestionKind::TrueFalse => {
            selected.len() == 1 && selected.iter().all(|id| correct.contains(id))
        }
        QuestionKind::MultiSelect => selected == correct,
    }
}

/// Integer percent score: `round(100 * correct / total)`, rounded half-up.
///
/// A total of zero scores 0 rather than dividing by zero; validation keeps
/// empty quizzes out of the taking path, but the scorer stays total.
pub fn percent_score(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (100.0 * correct as f64 / total as f64).round() as u8
}

/// The result of grading one full answer sheet against a question list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeOutcome {
    /// Per-question records, in the order the questions were graded.
    pub answers: Vec<AnswerRecord>,
    /// Number of correctly answered questions.
    pub correct_count: usize,
    /// Number of questions graded.
    pub total_questions: usize,
    /// Integer percent score, 0 to 100.
    pub score: u8,
    /// Whether the score met the pass mark.
    pub passed: bool,
}

/// Grades an answer sheet against a question list.
///
/// The question list drives the walk: a question with no matching submission
/// is graded with an empty selection and counts as incorrect. Submissions for
/// questions outside the list are ignored.
pub fn grade(
    questions: &[Question],
    pass_score: u8,
    submissions: &[AnswerSubmission],
) -> GradeOutcome {
    let mut answers = Vec::with_capacity(questions.len());
    let mut correct_count = 0;

    for question in questions {
        let submission = submissions.iter().find(|s| s.question_id == question.id);
        let selected: Vec<String> = submission
            .map(|s| s.selected_option_ids.clone())
            .unwrap_or_default();
        let correct = is_answer_correct(question, &selected);
        if correct {
            correct_count += 1;
        }
        answers.push(AnswerRecord {
            question_id: question.id.clone(),
            selected_option_ids: selected,
            correct,
            time_spent_secs: submission.and_then(|s| s.time_spent_secs),
        });
    }

    let score = percent_score(correct_count, questions.len());
    GradeOutcome {
        answers,
        correct_count,
        total_questions: questions.len(),
        score,
        passed: score >= pass_score,
    }
}

/// Grades an answer sheet against a quiz's full question pool.
pub fn grade_quiz(quiz: &Quiz, submissions: &[AnswerSubmission]) -> GradeOutcome {
    grade(&quiz.questions, quiz.pass_score, submissions)
}
