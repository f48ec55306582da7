//! Retake cooldown and verification-bypass policy.
//!
//! Everything here is a pure function over an attempt history, a quiz, and a
//! clock reading. Eligibility is derived on every query and never persisted,
//! so a cooldown expires by itself with no transition event to record.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

use crate::attempt::QuizAttempt;
use crate::model::Quiz;

/// Tunable policy constants.
///
/// The defaults are the production rules: two recent failures open a
/// seven-day cooldown, and verification is only demanded during the first
/// 25 days after a movie's release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// How many most-recent failures are needed to open a cooldown.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,
    /// Days a cooldown lasts, counted from the most recent failure.
    #[serde(default = "default_cooldown_days")]
    pub cooldown_days: i64,
    /// Days after release during which verification is required.
    #[serde(default = "default_verification_window_days")]
    pub verification_window_days: i64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed_attempts(),
            cooldown_days: default_cooldown_days(),
            verification_window_days: default_verification_window_days(),
        }
    }
}

fn default_max_failed_attempts() -> u32 {
    2
}

fn default_cooldown_days() -> i64 {
    7
}

fn default_verification_window_days() -> i64 {
    25
}

/// Whether a user may start a new attempt right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Eligibility {
    /// A new attempt may start.
    Eligible,
    /// Recent failures hold a cooldown open until the given instant.
    InCooldown { until: DateTime<Utc> },
}

impl Eligibility {
    /// Returns `true` for [`Eligibility::Eligible`].
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Computes eligibility to start a new attempt from the attempt history.
///
/// Any passed attempt anywhere in the history means `Eligible`, as does a
/// history shorter than `max_failed_attempts`. Otherwise only the
/// `max_failed_attempts` most recent attempts by completion time are
/// examined: if all of them failed, a cooldown runs until `cooldown_days`
/// after the most recent completion. A user with five failures and a recent
/// passing attempt is eligible; a user whose old cooldown has lapsed is
/// eligible with nothing to reset.
pub fn eligibility(
    attempts: &[QuizAttempt],
    now: DateTime<Utc>,
    config: &PolicyConfig,
) -> Eligibility {
    if (attempts.len() as u32) < config.max_failed_attempts
        || attempts.iter().any(|a| a.passed)
    {
        return Eligibility::Eligible;
    }

    let mut recent: Vec<&QuizAttempt> = attempts.iter().collect();
    recent.sort_by_key(|a| Reverse(a.completed_at));
    let window = &recent[..(config.max_failed_attempts as usize).min(recent.len())];

    match window.first() {
        Some(latest) if window.iter().all(|a| !a.passed) => {
            let until = latest.completed_at + Duration::days(config.cooldown_days);
            if now < until {
                Eligibility::InCooldown { until }
            } else {
                Eligibility::Eligible
            }
        }
        _ => Eligibility::Eligible,
    }
}

/// True if any attempt in the history passed.
pub fn has_passed(attempts: &[QuizAttempt]) -> bool {
    attempts.iter().any(|a| a.passed)
}

/// 1-based number for the next attempt: count of recorded attempts plus one.
pub fn next_attempt_number(attempts: &[QuizAttempt]) -> u32 {
    attempts.len() as u32 + 1
}

/// Whole days between the release date and `now`, on UTC calendar dates.
///
/// Calendar-date arithmetic keeps the count independent of the time of day:
/// a movie released 26 calendar days ago is 26 days old at breakfast and at
/// midnight. Negative for releases still in the future.
pub fn days_since_release(release: NaiveDate, now: DateTime<Utc>) -> i64 {
    (now.date_naive() - release).num_days()
}

/// True once the movie has been out strictly longer than the window.
///
/// Strictly: at exactly `verification_window_days` days the window still
/// holds and verification is still required.
pub fn verification_window_elapsed(
    release: NaiveDate,
    now: DateTime<Utc>,
    config: &PolicyConfig,
) -> bool {
    days_since_release(release, now) > config.verification_window_days
}

/// Why the quiz gate may be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BypassReason {
    /// Verification was switched off for this quiz by an administrator.
    AdminDisabled,
    /// The movie has been out longer than the verification window.
    WindowElapsed,
    /// The user already passed this quiz.
    AlreadyPassed,
}

impl BypassReason {
    /// The user-facing sentence explaining this bypass.
    pub fn explanation(&self, window_days: i64) -> String {
        match self {
            BypassReason::AdminDisabled => {
                "The verification requirement has been disabled for this movie.".to_string()
            }
            BypassReason::WindowElapsed => format!(
                "This movie was released more than {window_days} days ago, \
                 so verification is no longer required."
            ),
            BypassReason::AlreadyPassed => {
                "You have already passed the verification quiz for this movie.".to_string()
            }
        }
    }
}

impl fmt::Display for BypassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BypassReason::AdminDisabled => write!(f, "admin-disabled"),
            BypassReason::WindowElapsed => write!(f, "window-elapsed"),
            BypassReason::AlreadyPassed => write!(f, "already-passed"),
        }
    }
}

/// The verification-gate outcome for one user/quiz pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDecision {
    /// Whether the user may skip the quiz and review directly.
    pub bypass: bool,
    /// Which rule granted the bypass, when one did.
    pub reason: Option<BypassReason>,
    /// The movie's release date.
    pub release_date: NaiveDate,
    /// The day the verification window ends.
    pub window_ends: NaiveDate,
}

impl GateDecision {
    /// User-facing sentence for the granting rule, when one granted.
    pub fn explanation(&self) -> Option<String> {
        let window_days = (self.window_ends - self.release_date).num_days();
        self.reason.map(|r| r.explanation(window_days))
    }
}

/// Evaluates the three bypass rules for a quiz and a user's attempt history.
///
/// The rules remain independently callable (`verification_window_elapsed`,
/// `has_passed`); this composes them and reports which one granted the
/// bypass. The admin override is checked first, then the time exemption,
/// then a previous pass.
pub fn verification_gate(
    quiz: &Quiz,
    attempts: &[QuizAttempt],
    now: DateTime<Utc>,
    config: &PolicyConfig,
) -> GateDecision {
    let release = quiz.movie_release_date;
    let window_ends = release + Duration::days(config.verification_window_days);

    let reason = if !quiz.verification_required {
        Some(BypassReason::AdminDisabled)
    } else if verification_window_elapsed(release, now, config) {
        Some(BypassReason::WindowElapsed)
    } else if has_passed(attempts) {
        Some(BypassReason::AlreadyPassed)
    } else {
        None
    };

    GateDecision {
        bypass: reason.is_some(),
        reason,
        release_date: release,
        window_ends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuizStatus;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn attempt(number: u32, passed: bool, completed_at: DateTime<Utc>) -> QuizAttempt {
        QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id: "qz-1".into(),
            user_id: "usr-1".into(),
            attempt_number: number,
            started_at: completed_at - Duration::minutes(10),
            completed_at,
            time_spent_secs: 600,
            score: if passed { 85 } else { 40 },
            passed,
            answers: vec![],
        }
    }

    fn gate_quiz(release: NaiveDate, verification_required: bool) -> Quiz {
        let created = at(2024, 1, 1, 0);
        Quiz {
            id: "qz-1".into(),
            title: "Gate".into(),
            description: String::new(),
            movie_id: "mv-1".into(),
            movie_title: "Gated Movie".into(),
            movie_release_date: release,
            pass_score: 70,
            time_limit_secs: None,
            question_count: None,
            randomize: false,
            verification_required,
            status: QuizStatus::Active,
            created_at: created,
            updated_at: created,
            questions: vec![],
        }
    }

    #[test]
    fn fewer_than_two_attempts_is_eligible() {
        let config = PolicyConfig::default();
        let now = at(2024, 2, 1, 12);
        assert!(eligibility(&[], now, &config).is_eligible());
        let one = vec![attempt(1, false, at(2024, 1, 31, 12))];
        assert!(eligibility(&one, now, &config).is_eligible());
    }

    #[test]
    fn two_recent_failures_open_a_seven_day_cooldown() {
        let config = PolicyConfig::default();
        let attempts = vec![
            attempt(1, false, at(2024, 1, 1, 10)),
            attempt(2, false, at(2024, 1, 3, 10)),
        ];
        let until = at(2024, 1, 10, 10);

        match eligibility(&attempts, at(2024, 1, 9, 10), &config) {
            Eligibility::InCooldown { until: got } => assert_eq!(got, until),
            other => panic!("expected cooldown, got {other:?}"),
        }
        assert!(eligibility(&attempts, at(2024, 1, 11, 10), &config).is_eligible());
    }

    #[test]
    fn cooldown_boundary_instant_is_eligible() {
        let config = PolicyConfig::default();
        let attempts = vec![
            attempt(1, false, at(2024, 1, 1, 10)),
            attempt(2, false, at(2024, 1, 3, 10)),
        ];
        // now == until: strictly-before comparison means the cooldown is over.
        assert!(eligibility(&attempts, at(2024, 1, 10, 10), &config).is_eligible());
    }

    #[test]
    fn any_passed_attempt_short_circuits_to_eligible() {
        let config = PolicyConfig::default();
        let attempts = vec![
            attempt(1, false, at(2024, 1, 1, 10)),
            attempt(2, true, at(2024, 1, 2, 10)),
            attempt(3, false, at(2024, 1, 3, 10)),
            attempt(4, false, at(2024, 1, 4, 10)),
        ];
        assert!(eligibility(&attempts, at(2024, 1, 5, 10), &config).is_eligible());
    }

    #[test]
    fn older_pass_with_newer_failure_is_eligible() {
        // Exactly two attempts, the older one passed. The pass check runs
        // over the whole history, not just the recent window.
        let config = PolicyConfig::default();
        let attempts = vec![
            attempt(1, true, at(2024, 1, 1, 10)),
            attempt(2, false, at(2024, 1, 3, 10)),
        ];
        assert!(eligibility(&attempts, at(2024, 1, 4, 10), &config).is_eligible());
    }

    #[test]
    fn only_the_most_recent_failures_hold_the_cooldown() {
        let config = PolicyConfig::default();
        // Five failures, but the latest two completed long ago.
        let attempts = vec![
            attempt(1, false, at(2023, 11, 1, 10)),
            attempt(2, false, at(2023, 11, 5, 10)),
            attempt(3, false, at(2023, 11, 9, 10)),
            attempt(4, false, at(2023, 12, 1, 10)),
            attempt(5, false, at(2023, 12, 2, 10)),
        ];
        assert!(eligibility(&attempts, at(2024, 2, 1, 10), &config).is_eligible());

        // The cooldown window tracks the newest completion, whatever the
        // order the history arrived in.
        let mut shuffled = attempts.clone();
        shuffled.swap(0, 4);
        match eligibility(&shuffled, at(2023, 12, 3, 10), &config) {
            Eligibility::InCooldown { until } => {
                assert_eq!(until, at(2023, 12, 9, 10));
            }
            other => panic!("expected cooldown, got {other:?}"),
        }
    }

    #[test]
    fn next_attempt_number_is_count_plus_one() {
        assert_eq!(next_attempt_number(&[]), 1);
        let attempts = vec![
            attempt(1, false, at(2024, 1, 1, 10)),
            attempt(2, false, at(2024, 1, 2, 10)),
        ];
        assert_eq!(next_attempt_number(&attempts), 3);
    }

    #[test]
    fn window_elapses_strictly_after_25_days() {
        let config = PolicyConfig::default();
        let release = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let at_26_days = at(2024, 1, 27, 8);
        assert_eq!(days_since_release(release, at_26_days), 26);
        assert!(verification_window_elapsed(release, at_26_days, &config));

        let at_25_days = at(2024, 1, 26, 23);
        assert_eq!(days_since_release(release, at_25_days), 25);
        assert!(!verification_window_elapsed(release, at_25_days, &config));
    }

    #[test]
    fn gate_admin_override_wins_over_time_exemption() {
        let config = PolicyConfig::default();
        let release = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let quiz = gate_quiz(release, false);
        let decision = verification_gate(&quiz, &[], at(2024, 1, 1, 12), &config);
        assert!(decision.bypass);
        assert_eq!(decision.reason, Some(BypassReason::AdminDisabled));
    }

    #[test]
    fn gate_reports_window_elapsed() {
        let config = PolicyConfig::default();
        let release = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let quiz = gate_quiz(release, true);
        let decision = verification_gate(&quiz, &[], at(2024, 1, 27, 8), &config);
        assert!(decision.bypass);
        assert_eq!(decision.reason, Some(BypassReason::WindowElapsed));
        assert_eq!(
            decision.window_ends,
            NaiveDate::from_ymd_opt(2024, 1, 26).unwrap()
        );
    }

    #[test]
    fn gate_reports_already_passed_inside_the_window() {
        let config = PolicyConfig::default();
        let release = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let quiz = gate_quiz(release, true);
        let attempts = vec![attempt(1, true, at(2024, 1, 5, 10))];
        let decision = verification_gate(&quiz, &attempts, at(2024, 1, 10, 10), &config);
        assert!(decision.bypass);
        assert_eq!(decision.reason, Some(BypassReason::AlreadyPassed));
    }

    #[test]
    fn gate_requires_the_quiz_otherwise() {
        let config = PolicyConfig::default();
        let release = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let quiz = gate_quiz(release, true);
        let decision = verification_gate(&quiz, &[], at(2024, 1, 10, 10), &config);
        assert!(!decision.bypass);
        assert_eq!(decision.reason, None);
        assert!(decision.explanation().is_none());
    }

    #[test]
    fn explanations_are_distinct_per_reason() {
        assert!(BypassReason::AdminDisabled
            .explanation(25)
            .contains("disabled"));
        assert!(BypassReason::WindowElapsed
            .explanation(25)
            .contains("more than 25 days"));
        assert!(BypassReason::AlreadyPassed
            .explanation(25)
            .contains("already passed"));
    }
}
