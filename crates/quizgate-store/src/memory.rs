//! In-memory store with JSON snapshot persistence.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use async_trait::async_trait;

use quizgate_core::attempt::QuizAttempt;
use quizgate_core::model::{Quiz, UserProfile};
use quizgate_core::store::{AttemptStore, QuizStore, UserStore};

use crate::snapshot::StoreSnapshot;

/// The standard store: everything lives behind mutexes in memory and is
/// persisted as a JSON snapshot when the caller asks.
///
/// Implements all three store traits, so a single instance can back a whole
/// [`VerificationGate`](quizgate_core::service::VerificationGate). Misses
/// answer with `Ok(None)` or an empty list, never an error.
pub struct MemoryStore {
    quizzes: Mutex<HashMap<String, Quiz>>,
    users: Mutex<HashMap<String, UserProfile>>,
    attempts: Mutex<Vec<QuizAttempt>>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            quizzes: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Rebuild a store from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        {
            let mut quizzes = guard(&store.quizzes);
            for quiz in snapshot.quizzes {
                quizzes.insert(quiz.id.clone(), quiz);
            }
            let mut users = guard(&store.users);
            for user in snapshot.users {
                users.insert(user.id.clone(), user);
            }
            *guard(&store.attempts) = snapshot.attempts;
        }
        store
    }

    /// Capture the store as a snapshot. Catalog and users come out sorted by
    /// id so saved files diff cleanly; attempts keep their recorded order.
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut quizzes: Vec<Quiz> = guard(&self.quizzes).values().cloned().collect();
        quizzes.sort_by(|a, b| a.id.cmp(&b.id));
        let mut users: Vec<UserProfile> = guard(&self.users).values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        StoreSnapshot {
            quizzes,
            users,
            attempts: guard(&self.attempts).clone(),
        }
    }

    /// Load a store from a snapshot file. A missing file starts an empty
    /// store, so first runs need no setup.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no snapshot at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        Ok(Self::from_snapshot(StoreSnapshot::load_json(path)?))
    }

    /// Save the store to a snapshot file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.snapshot().save_json(path)
    }

    /// Insert or replace a quiz without going through the async trait.
    /// Startup seeds the catalog from TOML files with this.
    pub fn insert_quiz(&self, quiz: Quiz) {
        guard(&self.quizzes).insert(quiz.id.clone(), quiz);
    }

    /// Insert or replace a user profile.
    pub fn insert_user(&self, user: UserProfile) {
        guard(&self.users).insert(user.id.clone(), user);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn quiz(&self, quiz_id: &str) -> Result<Option<Quiz>> {
        Ok(guard(&self.quizzes).get(quiz_id).cloned())
    }

    async fn quizzes(&self) -> Result<Vec<Quiz>> {
        let mut all: Vec<Quiz> = guard(&self.quizzes).values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn put_quiz(&self, quiz: Quiz) -> Result<()> {
        self.insert_quiz(quiz);
        Ok(())
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn attempts(&self, user_id: &str, quiz_id: &str) -> Result<Vec<QuizAttempt>> {
        Ok(guard(&self.attempts)
            .iter()
            .filter(|a| a.user_id == user_id && a.quiz_id == quiz_id)
            .cloned()
            .collect())
    }

    async fn attempts_for_quiz(&self, quiz_id: &str) -> Result<Vec<QuizAttempt>> {
        Ok(guard(&self.attempts)
            .iter()
            .filter(|a| a.quiz_id == quiz_id)
            .cloned()
            .collect())
    }

    async fn record(&self, attempt: QuizAttempt) -> Result<()> {
        guard(&self.attempts).push(attempt);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn user(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(guard(&self.users).get(user_id).cloned())
    }

    async fn put_user(&self, user: UserProfile) -> Result<()> {
        self.insert_user(user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    use quizgate_core::attempt::AnswerSubmission;
    use quizgate_core::error::GateError;
    use quizgate_core::model::{AnswerOption, Question, QuestionKind, QuizStatus};
    use quizgate_core::policy::{BypassReason, PolicyConfig};
    use quizgate_core::service::VerificationGate;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn question(id: &str, options: &[(&str, bool)]) -> Question {
        Question {
            id: id.into(),
            text: format!("Question {id}"),
            kind: QuestionKind::SingleChoice,
            options: options
                .iter()
                .enumerate()
                .map(|(i, (oid, correct))| AnswerOption {
                    id: (*oid).into(),
                    text: format!("Option {oid}"),
                    correct: *correct,
                    order: i as u32,
                })
                .collect(),
            hint: None,
            explanation: None,
            media_url: None,
            order: 0,
        }
    }

    fn sample_quiz(id: &str, status: QuizStatus) -> Quiz {
        Quiz {
            id: id.into(),
            title: "Dune Trivia".into(),
            description: "Spice knowledge check".into(),
            movie_id: "mv-dune".into(),
            movie_title: "Dune: Part Two".into(),
            movie_release_date: NaiveDate::from_ymd_opt(2024, 2, 20).unwrap(),
            pass_score: 70,
            time_limit_secs: None,
            question_count: None,
            randomize: false,
            verification_required: true,
            status,
            created_at: at(1, 0),
            updated_at: at(1, 0),
            questions: vec![
                question("q1", &[("a", true), ("b", false)]),
                question("q2", &[("c", false), ("d", true)]),
            ],
        }
    }

    fn sample_user(id: &str) -> UserProfile {
        UserProfile {
            id: id.into(),
            name: format!("User {id}"),
            email: format!("{id}@example.com"),
            joined_date: NaiveDate::from_ymd_opt(2023, 11, 5).unwrap(),
        }
    }

    fn recorded_attempt(
        user_id: &str,
        quiz_id: &str,
        number: u32,
        passed: bool,
        completed_at: DateTime<Utc>,
    ) -> QuizAttempt {
        QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id: quiz_id.into(),
            user_id: user_id.into(),
            attempt_number: number,
            started_at: completed_at - Duration::minutes(5),
            completed_at,
            time_spent_secs: 300,
            score: if passed { 100 } else { 50 },
            passed,
            answers: Vec::new(),
        }
    }

    fn gate_over(store: &Arc<MemoryStore>) -> VerificationGate {
        VerificationGate::new(
            store.clone(),
            store.clone(),
            store.clone(),
            PolicyConfig::default(),
        )
    }

    #[tokio::test]
    async fn put_and_get_quiz() {
        let store = MemoryStore::new();
        store
            .put_quiz(sample_quiz("qz-dune", QuizStatus::Active))
            .await
            .unwrap();

        let found = store.quiz("qz-dune").await.unwrap();
        assert_eq!(found.unwrap().movie_title, "Dune: Part Two");
        assert!(store.quiz("qz-other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn attempts_filter_by_user_and_quiz() {
        let store = MemoryStore::new();
        store
            .record(recorded_attempt("u1", "qz-dune", 1, false, at(1, 10)))
            .await
            .unwrap();
        store
            .record(recorded_attempt("u1", "qz-other", 1, true, at(1, 11)))
            .await
            .unwrap();
        store
            .record(recorded_attempt("u2", "qz-dune", 1, true, at(1, 12)))
            .await
            .unwrap();

        let mine = store.attempts("u1", "qz-dune").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(!mine[0].passed);

        let all = store.attempts_for_quiz("qz-dune").await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(store.attempts("u3", "qz-dune").await.unwrap().is_empty());
    }

    #[test]
    fn snapshot_roundtrip_preserves_store() {
        let store = MemoryStore::new();
        store.insert_quiz(sample_quiz("qz-b", QuizStatus::Active));
        store.insert_quiz(sample_quiz("qz-a", QuizStatus::Draft));
        store.insert_user(sample_user("u1"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.quizzes[0].id, "qz-a");
        assert_eq!(snapshot.quizzes[1].id, "qz-b");

        let restored = MemoryStore::from_snapshot(snapshot);
        assert_eq!(restored.snapshot().quizzes.len(), 2);
        assert_eq!(restored.snapshot().users[0].id, "u1");
    }

    #[test]
    fn load_missing_path_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load(&dir.path().join("nope.json")).unwrap();
        assert!(store.snapshot().quizzes.is_empty());
    }

    #[test]
    fn save_then_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = MemoryStore::new();
        store.insert_user(sample_user("u1"));
        store.save(&path).unwrap();

        let loaded = MemoryStore::load(&path).unwrap();
        assert_eq!(loaded.snapshot().users.len(), 1);
    }

    #[tokio::test]
    async fn start_and_submit_records_attempt() {
        let store = Arc::new(MemoryStore::new());
        store.insert_user(sample_user("u1"));
        store.insert_quiz(sample_quiz("qz-dune", QuizStatus::Active));
        let gate = gate_over(&store);

        let mut session = gate.start_session("u1", "qz-dune", at(1, 12)).await.unwrap();
        let picks: Vec<(String, String)> = session
            .questions()
            .iter()
            .map(|q| (q.id.clone(), q.correct_option_ids()[0].to_string()))
            .collect();
        for (question_id, option_id) in &picks {
            session.select(question_id, option_id).unwrap();
        }

        let attempt = gate
            .submit(session, at(1, 12) + Duration::minutes(3))
            .await
            .unwrap();
        assert_eq!(attempt.score, 100);
        assert!(attempt.passed);
        assert_eq!(attempt.attempt_number, 1);
        assert_eq!(attempt.time_spent_secs, 180);

        let history = gate.history("u1", "qz-dune").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, attempt.id);
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        store.insert_quiz(sample_quiz("qz-dune", QuizStatus::Active));
        let gate = gate_over(&store);

        let err = gate.start_session("ghost", "qz-dune", at(1, 12)).await.unwrap_err();
        assert!(matches!(err, GateError::UserNotFound(_)));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn draft_quiz_is_not_open() {
        let store = Arc::new(MemoryStore::new());
        store.insert_user(sample_user("u1"));
        store.insert_quiz(sample_quiz("qz-dune", QuizStatus::Draft));
        let gate = gate_over(&store);

        let err = gate.start_session("u1", "qz-dune", at(1, 12)).await.unwrap_err();
        match err {
            GateError::QuizNotOpen { status, .. } => assert_eq!(status, QuizStatus::Draft),
            other => panic!("expected QuizNotOpen, got {other}"),
        }
    }

    #[tokio::test]
    async fn third_attempt_blocked_by_cooldown() {
        let store = Arc::new(MemoryStore::new());
        store.insert_user(sample_user("u1"));
        store.insert_quiz(sample_quiz("qz-dune", QuizStatus::Active));
        store
            .record(recorded_attempt("u1", "qz-dune", 1, false, at(1, 10)))
            .await
            .unwrap();
        store
            .record(recorded_attempt("u1", "qz-dune", 2, false, at(3, 10)))
            .await
            .unwrap();
        let gate = gate_over(&store);

        let err = gate.start_session("u1", "qz-dune", at(9, 12)).await.unwrap_err();
        match &err {
            GateError::CooldownActive { until } => assert_eq!(*until, at(10, 10)),
            other => panic!("expected CooldownActive, got {other}"),
        }
        assert_eq!(err.retry_available_at(), Some(at(10, 10)));

        // the cooldown has lapsed an hour later
        assert!(gate.start_session("u1", "qz-dune", at(10, 11)).await.is_ok());
    }

    #[tokio::test]
    async fn a_pass_keeps_the_user_eligible() {
        let store = Arc::new(MemoryStore::new());
        store.insert_user(sample_user("u1"));
        store.insert_quiz(sample_quiz("qz-dune", QuizStatus::Active));
        store
            .record(recorded_attempt("u1", "qz-dune", 1, true, at(1, 10)))
            .await
            .unwrap();
        store
            .record(recorded_attempt("u1", "qz-dune", 2, false, at(2, 10)))
            .await
            .unwrap();
        store
            .record(recorded_attempt("u1", "qz-dune", 3, false, at(3, 10)))
            .await
            .unwrap();
        let gate = gate_over(&store);

        assert!(gate.start_session("u1", "qz-dune", at(4, 12)).await.is_ok());
        assert!(gate.has_passed("u1", "qz-dune").await.unwrap());
    }

    #[tokio::test]
    async fn grade_and_record_numbers_attempts() {
        let store = Arc::new(MemoryStore::new());
        store.insert_user(sample_user("u1"));
        store.insert_quiz(sample_quiz("qz-dune", QuizStatus::Active));
        let gate = gate_over(&store);

        let half_right = vec![
            AnswerSubmission::single("q1", "a"),
            AnswerSubmission::single("q2", "c"),
        ];
        let first = gate
            .grade_and_record("u1", "qz-dune", &half_right, at(1, 12), at(1, 13))
            .await
            .unwrap();
        assert_eq!(first.attempt_number, 1);
        assert_eq!(first.score, 50);
        assert!(!first.passed);
        assert_eq!(first.time_spent_secs, 3600);

        let all_right = vec![
            AnswerSubmission::single("q1", "a"),
            AnswerSubmission::single("q2", "d"),
        ];
        let second = gate
            .grade_and_record("u1", "qz-dune", &all_right, at(2, 12), at(2, 13))
            .await
            .unwrap();
        assert_eq!(second.attempt_number, 2);
        assert!(second.passed);
    }

    #[tokio::test]
    async fn grade_and_record_rejects_stray_ids() {
        let store = Arc::new(MemoryStore::new());
        store.insert_user(sample_user("u1"));
        store.insert_quiz(sample_quiz("qz-dune", QuizStatus::Active));
        let gate = gate_over(&store);

        let bad_option = vec![AnswerSubmission::single("q1", "zz")];
        let err = gate
            .grade_and_record("u1", "qz-dune", &bad_option, at(1, 12), at(1, 13))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::OptionNotFound { .. }));

        let bad_question = vec![AnswerSubmission::single("q9", "a")];
        let err = gate
            .grade_and_record("u1", "qz-dune", &bad_question, at(1, 12), at(1, 13))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::QuestionNotFound(_)));

        // nothing was recorded by the rejected sheets
        assert!(store.attempts("u1", "qz-dune").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let store = Arc::new(MemoryStore::new());
        store.insert_user(sample_user("u1"));
        store.insert_quiz(sample_quiz("qz-dune", QuizStatus::Active));
        store
            .record(recorded_attempt("u1", "qz-dune", 1, false, at(1, 10)))
            .await
            .unwrap();
        store
            .record(recorded_attempt("u1", "qz-dune", 3, true, at(5, 10)))
            .await
            .unwrap();
        store
            .record(recorded_attempt("u1", "qz-dune", 2, false, at(3, 10)))
            .await
            .unwrap();
        let gate = gate_over(&store);

        let history = gate.history("u1", "qz-dune").await.unwrap();
        let numbers: Vec<u32> = history.iter().map(|a| a.attempt_number).collect();
        assert_eq!(numbers, vec![3, 2, 1]);

        let by_id = gate
            .attempt("u1", "qz-dune", history[1].id)
            .await
            .unwrap();
        assert_eq!(by_id.unwrap().attempt_number, 2);
    }

    #[tokio::test]
    async fn gate_decision_reflects_recorded_pass() {
        let store = Arc::new(MemoryStore::new());
        store.insert_user(sample_user("u1"));
        store.insert_quiz(sample_quiz("qz-dune", QuizStatus::Active));
        let gate = gate_over(&store);

        // released 2024-02-20, ten days before "now": still inside the window
        let before = gate.gate_decision("u1", "qz-dune", at(1, 12)).await.unwrap();
        assert!(!before.bypass);
        assert_eq!(before.reason, None);
        assert_eq!(
            before.window_ends,
            NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
        );

        store
            .record(recorded_attempt("u1", "qz-dune", 1, true, at(1, 13)))
            .await
            .unwrap();
        let after = gate.gate_decision("u1", "qz-dune", at(1, 14)).await.unwrap();
        assert!(after.bypass);
        assert_eq!(after.reason, Some(BypassReason::AlreadyPassed));
        assert!(after.explanation().is_some());
    }

    #[tokio::test]
    async fn statistics_aggregate_all_users() {
        let store = Arc::new(MemoryStore::new());
        store.insert_quiz(sample_quiz("qz-dune", QuizStatus::Active));
        store
            .record(recorded_attempt("u1", "qz-dune", 1, true, at(1, 10)))
            .await
            .unwrap();
        store
            .record(recorded_attempt("u2", "qz-dune", 1, false, at(2, 10)))
            .await
            .unwrap();
        store
            .record(recorded_attempt("u1", "qz-other", 1, false, at(3, 10)))
            .await
            .unwrap();
        let gate = gate_over(&store);

        let stats = gate.statistics("qz-dune").await.unwrap();
        assert_eq!(stats.completions, 2);
        assert_eq!(stats.pass_count, 1);
        assert!((stats.pass_rate - 0.5).abs() < f64::EPSILON);
        assert!((stats.average_score - 75.0).abs() < f64::EPSILON);

        let err = gate.statistics("qz-missing").await.unwrap_err();
        assert!(matches!(err, GateError::QuizNotFound(_)));
    }
}
