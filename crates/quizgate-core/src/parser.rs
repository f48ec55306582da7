//! TOML quiz file parser.
//!
//! Loads quizzes from TOML files and directories, validates the hard
//! authoring invariants, and lints for soft issues. Dates are written as
//! strings ("2010-07-16", RFC 3339 for timestamps) so files stay portable
//! across tooling.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::GateError;
use crate::model::{AnswerOption, Question, QuestionKind, Quiz, QuizStatus};

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    movie_id: String,
    movie_title: String,
    movie_release_date: String,
    #[serde(default = "default_pass_score")]
    pass_score: u8,
    #[serde(default)]
    time_limit_secs: Option<u32>,
    #[serde(default)]
    question_count: Option<usize>,
    #[serde(default)]
    randomize: bool,
    #[serde(default = "default_true")]
    verification_required: bool,
    #[serde(default = "default_status_str")]
    status: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

fn default_pass_score() -> u8 {
    70
}

fn default_true() -> bool {
    true
}

fn default_status_str() -> String {
    "draft".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    text: String,
    kind: String,
    #[serde(default)]
    options: Vec<TomlOption>,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    media_url: Option<String>,
    #[serde(default)]
    order: u32,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: String,
    text: String,
    #[serde(default)]
    correct: bool,
    #[serde(default)]
    order: u32,
}

/// Parse a single TOML file into a `Quiz`.
pub fn parse_quiz_file(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let header = parsed.quiz;
    let movie_release_date = parse_date(&header.movie_release_date)
        .with_context(|| format!("bad movie_release_date in {}", source_path.display()))?;
    let status: QuizStatus = header
        .status
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;
    let created_at = parse_timestamp(header.created_at.as_deref())
        .with_context(|| format!("bad created_at in {}", source_path.display()))?;
    let updated_at = parse_timestamp(header.updated_at.as_deref())
        .with_context(|| format!("bad updated_at in {}", source_path.display()))?;

    let mut questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind: QuestionKind = q
                .kind
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;

            let mut options: Vec<AnswerOption> = q
                .options
                .into_iter()
                .map(|o| AnswerOption {
                    id: o.id,
                    text: o.text,
                    correct: o.correct,
                    order: o.order,
                })
                .collect();
            options.sort_by_key(|o| o.order);

            Ok(Question {
                id: q.id,
                text: q.text,
                kind,
                options,
                hint: q.hint,
                explanation: q.explanation,
                media_url: q.media_url,
                order: q.order,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    // Stable sort: all-default orders keep the file's authored sequence.
    questions.sort_by_key(|q| q.order);

    Ok(Quiz {
        id: header.id,
        title: header.title,
        description: header.description,
        movie_id: header.movie_id,
        movie_title: header.movie_title,
        movie_release_date,
        pass_score: header.pass_score,
        time_limit_secs: header.time_limit_secs,
        question_count: header.question_count,
        randomize: header.randomize,
        verification_required: header.verification_required,
        status,
        created_at,
        updated_at,
        questions,
    })
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("expected YYYY-MM-DD, got {s:?}"))
}

fn parse_timestamp(s: Option<&str>) -> Result<DateTime<Utc>> {
    match s {
        Some(raw) => {
            let parsed = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("expected RFC 3339 timestamp, got {raw:?}"))?;
            Ok(parsed.with_timezone(&Utc))
        }
        None => Ok(DateTime::UNIX_EPOCH),
    }
}

/// Recursively collect the `.toml` files under a directory, sorted by path.
pub fn quiz_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            files.extend(quiz_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Recursively load all `.toml` quiz files from a directory.
///
/// Files that fail to parse are skipped with a warning so one broken quiz
/// does not take the whole catalog down.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();
    for path in quiz_files(dir)? {
        match parse_quiz_file(&path) {
            Ok(quiz) => quizzes.push(quiz),
            Err(e) => {
                tracing::warn!("skipping {}: {}", path.display(), e);
            }
        }
    }
    Ok(quizzes)
}

/// Check the hard authoring invariants.
///
/// These are the rules the question editor refuses to save without; a quiz
/// that fails any of them must not reach the taking path.
pub fn validate_quiz(quiz: &Quiz) -> Result<(), GateError> {
    let quiz_err = |reason: &str| GateError::QuizMalformed {
        quiz_id: quiz.id.clone(),
        reason: reason.to_string(),
    };

    if quiz.id.trim().is_empty() {
        return Err(quiz_err("id is empty"));
    }
    if quiz.pass_score > 100 {
        return Err(quiz_err("pass_score exceeds 100"));
    }
    if quiz.time_limit_secs == Some(0) {
        return Err(quiz_err("time_limit_secs is zero"));
    }
    if quiz.question_count == Some(0) {
        return Err(quiz_err("question_count is zero"));
    }
    if quiz.questions.is_empty() {
        return Err(quiz_err("quiz has no questions"));
    }

    for question in &quiz.questions {
        let question_err = |reason: String| GateError::QuestionMalformed {
            question_id: question.id.clone(),
            reason,
        };

        if question.text.trim().is_empty() {
            return Err(question_err("question text is empty".into()));
        }
        if question.options.len() < 2 {
            return Err(question_err(format!(
                "needs at least 2 options, has {}",
                question.options.len()
            )));
        }
        if question.options.iter().any(|o| o.text.trim().is_empty()) {
            return Err(question_err("an option has empty text".into()));
        }

        let correct_count = question.options.iter().filter(|o| o.correct).count();
        if correct_count == 0 {
            return Err(question_err("no option is marked correct".into()));
        }
        match question.kind {
            QuestionKind::SingleChoice | QuestionKind::TrueFalse if correct_count != 1 => {
                return Err(question_err(format!(
                    "{} question must have exactly 1 correct option, has {}",
                    question.kind, correct_count
                )));
            }
            _ => {}
        }
        if question.kind == QuestionKind::TrueFalse && question.options.len() != 2 {
            return Err(question_err(format!(
                "true-false question must have exactly 2 options, has {}",
                question.options.len()
            )));
        }
    }

    Ok(())
}

/// A warning from quiz linting.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Lint a quiz for soft issues that don't block taking it.
pub fn lint_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate question ids
    let mut seen_ids = std::collections::HashSet::new();
    for question in &quiz.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    // Duplicate option ids within a question
    for question in &quiz.questions {
        let mut seen = std::collections::HashSet::new();
        for option in &question.options {
            if !seen.insert(&option.id) {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!("duplicate option ID: {}", option.id),
                });
            }
        }
    }

    if let Some(count) = quiz.question_count {
        if count > quiz.questions.len() {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!(
                    "question_count is {count} but only {} questions exist; \
                     sessions will take them all",
                    quiz.questions.len()
                ),
            });
        }
    }

    if quiz.description.trim().is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "description is empty".into(),
        });
    }

    // The review screen leans on explanations when a gate quiz is failed.
    if quiz.verification_required {
        for question in &quiz.questions {
            if question.explanation.is_none() {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: "no explanation for the post-attempt review".into(),
                });
            }
        }
    }

    warnings
}
