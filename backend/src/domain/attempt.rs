//! Quiz attempts and grading.
//!
//! Grading rules:
//! - An answer is correct when the selected choice is flagged `is_correct`.
//! - The score is the sum of points of correctly answered questions.
//! - The total possible score is the sum of points of every question in the
//!   quiz; unanswered questions count against the learner.
//! - An attempt passes when `score * 100 >= passing_score * total`, an exact
//!   integer comparison. The stored percentage is informational only.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Error, Question, Quiz, UserId};

/// Recorded answer for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionAnswer {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub selected_choice_id: Option<Uuid>,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// Final grading of a completed attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome {
    pub score: i32,
    pub total_possible_score: i32,
    pub percentage: f64,
    pub is_passed: bool,
    pub questions_attempted: i32,
    pub questions_correct: i32,
}

/// A learner's attempt at a quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub user_id: UserId,
    pub quiz_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_possible_score: i32,
    /// Present once the attempt is completed.
    pub outcome: Option<AttemptOutcome>,
    pub time_taken_seconds: Option<i64>,
}

impl QuizAttempt {
    /// Open a fresh attempt for `user_id`.
    pub fn start(user_id: UserId, quiz_id: Uuid, total_possible_score: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            quiz_id,
            started_at: now,
            completed_at: None,
            total_possible_score,
            outcome: None,
            time_taken_seconds: None,
        }
    }

    /// Whether the attempt has been submitted.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Whether the attempt was submitted and passed.
    pub fn is_passed(&self) -> bool {
        self.outcome.as_ref().is_some_and(|outcome| outcome.is_passed)
    }

    /// Percentage of a completed attempt.
    pub fn percentage(&self) -> Option<f64> {
        self.outcome.as_ref().map(|outcome| outcome.percentage)
    }

    /// Mark the attempt complete with `outcome`.
    pub fn complete(&mut self, outcome: AttemptOutcome, now: DateTime<Utc>) {
        self.time_taken_seconds = Some((now - self.started_at).num_seconds().max(0));
        self.total_possible_score = outcome.total_possible_score;
        self.completed_at = Some(now);
        self.outcome = Some(outcome);
    }
}

/// Sum of points over `questions`, saturating at `i32::MAX`.
pub fn total_points(questions: &[Question]) -> i32 {
    questions
        .iter()
        .fold(0_i32, |total, question| total.saturating_add(question.points))
}

/// Percentage of `score` over `total`, `0.0` when `total` is zero.
pub fn percentage(score: i32, total: i32) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    f64::from(score) * 100.0 / f64::from(total)
}

/// Whether `score` out of `total` meets `passing_score` percent.
///
/// Uses integer cross-multiplication so `60%` of `10` points passes with
/// exactly `6`.
pub fn meets_threshold(score: i32, total: i32, passing_score: i32) -> bool {
    if total <= 0 {
        return false;
    }
    i64::from(score) * 100 >= i64::from(passing_score) * i64::from(total)
}

/// Grade `answers` (question id to selected choice id) against `questions`.
///
/// Returns the outcome and one [`QuestionAnswer`] per submitted answer.
///
/// # Errors
/// Returns `invalid_request` when an answer names a question outside the
/// quiz or a choice that does not belong to its question.
pub fn grade(
    quiz: &Quiz,
    questions: &[Question],
    attempt_id: Uuid,
    answers: &HashMap<Uuid, Uuid>,
    now: DateTime<Utc>,
) -> Result<(AttemptOutcome, Vec<QuestionAnswer>), Error> {
    let by_id: HashMap<&Uuid, &Question> = questions.iter().map(|q| (&q.id, q)).collect();

    let mut recorded = Vec::with_capacity(answers.len());
    let mut score = 0_i32;
    let mut questions_correct = 0_i32;

    // Iterate in question order so recorded answers are deterministic.
    for question in questions {
        let Some(choice_id) = answers.get(&question.id) else {
            continue;
        };
        let choice = question.choice(choice_id).ok_or_else(|| {
            Error::invalid_field(
                "answers",
                "choice_not_in_question",
                format!("choice {choice_id} does not belong to question {}", question.id),
            )
        })?;
        if choice.is_correct {
            score = score.saturating_add(question.points);
            questions_correct += 1;
        }
        recorded.push(QuestionAnswer {
            id: Uuid::new_v4(),
            attempt_id,
            question_id: question.id,
            selected_choice_id: Some(choice.id),
            is_correct: choice.is_correct,
            answered_at: now,
        });
    }

    if let Some(unknown) = answers.keys().find(|id| !by_id.contains_key(id)) {
        return Err(Error::invalid_field(
            "answers",
            "unknown_question",
            format!("question {unknown} is not part of this quiz"),
        ));
    }

    let total = total_points(questions);
    let questions_attempted = i32::try_from(recorded.len()).unwrap_or(i32::MAX);
    Ok((
        AttemptOutcome {
            score,
            total_possible_score: total,
            percentage: percentage(score, total),
            is_passed: meets_threshold(score, total, quiz.settings.passing_score),
            questions_attempted,
            questions_correct,
        },
        recorded,
    ))
}
