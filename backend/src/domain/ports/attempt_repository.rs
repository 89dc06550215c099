//! Port for quiz attempts, recorded answers and attempt statistics.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{QuestionAnswer, QuizAttempt, UserId};

use super::repository_error;

repository_error!(
    /// An open attempt already exists, or a submission reached a closed attempt.
    Attempt,
    "attempt"
);

/// Aggregates over one learner's attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LearnerStats {
    pub total_attempts: u64,
    /// Distinct quizzes with at least one attempt.
    pub quizzes_attempted: u64,
    /// Distinct quizzes with at least one passed attempt.
    pub quizzes_passed: u64,
    /// Mean percentage over passed attempts.
    pub average_passed_percentage: Option<f64>,
}

/// Aggregates over attempts on one author's quizzes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AuthorAttemptStats {
    pub total_attempts: u64,
    /// Mean percentage over passed attempts.
    pub average_passed_percentage: Option<f64>,
}

/// Port for attempt persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Insert a newly started attempt.
    async fn insert(&self, attempt: &QuizAttempt) -> Result<(), AttemptRepositoryError>;

    /// Fetch an attempt by id.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<QuizAttempt>, AttemptRepositoryError>;

    /// The learner's uncompleted attempt at a quiz, if any.
    async fn find_open(
        &self,
        user_id: &UserId,
        quiz_id: &Uuid,
    ) -> Result<Option<QuizAttempt>, AttemptRepositoryError>;

    /// Number of attempts (open or completed) a learner has made at a quiz.
    async fn count_for_quiz(
        &self,
        user_id: &UserId,
        quiz_id: &Uuid,
    ) -> Result<u64, AttemptRepositoryError>;

    /// The learner's passed attempt with the highest percentage.
    async fn best_passed(
        &self,
        user_id: &UserId,
        quiz_id: &Uuid,
    ) -> Result<Option<QuizAttempt>, AttemptRepositoryError>;

    /// Store the graded attempt and its answers in one transaction.
    ///
    /// Fails with a conflict, writing nothing, when the attempt is no
    /// longer open.
    async fn complete(
        &self,
        attempt: &QuizAttempt,
        answers: &[QuestionAnswer],
    ) -> Result<(), AttemptRepositoryError>;

    /// Answers recorded for an attempt.
    async fn answers(&self, attempt_id: &Uuid)
    -> Result<Vec<QuestionAnswer>, AttemptRepositoryError>;

    /// A learner's most recent attempts, newest first.
    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<QuizAttempt>, AttemptRepositoryError>;

    /// Aggregates over a learner's attempts.
    async fn learner_stats(&self, user_id: &UserId) -> Result<LearnerStats, AttemptRepositoryError>;

    /// Aggregates over attempts on quizzes authored by `author`.
    async fn author_stats(
        &self,
        author: &UserId,
    ) -> Result<AuthorAttemptStats, AttemptRepositoryError>;

    /// Number of attempts across all users.
    async fn count(&self) -> Result<u64, AttemptRepositoryError>;
}
