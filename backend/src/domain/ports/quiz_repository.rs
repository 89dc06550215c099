//! Port for quizzes and their question banks.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Question, Quiz, UserId};

use super::repository_error;

repository_error!(
    /// A referenced row is missing or a unique key collided.
    Quiz,
    "quiz"
);

/// Port for quiz persistence.
///
/// Adapters keep `Quiz::total_questions` equal to the number of stored
/// questions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Insert a new quiz.
    async fn insert(&self, quiz: &Quiz) -> Result<(), QuizRepositoryError>;

    /// Persist header changes; `total_questions` is left untouched.
    async fn update(&self, quiz: &Quiz) -> Result<(), QuizRepositoryError>;

    /// Fetch a quiz by id.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Quiz>, QuizRepositoryError>;

    /// Page through published quizzes, newest first.
    async fn list_published(&self, page: PageRequest) -> Result<Page<Quiz>, QuizRepositoryError>;

    /// Published quizzes attached to a module, newest first.
    async fn published_for_module(&self, module_id: &Uuid)
    -> Result<Vec<Quiz>, QuizRepositoryError>;

    /// Quizzes authored by `author`, newest first.
    async fn list_by_author(&self, author: &UserId) -> Result<Vec<Quiz>, QuizRepositoryError>;

    /// Number of quizzes.
    async fn count(&self) -> Result<u64, QuizRepositoryError>;

    /// Questions with their choices, ordered by `order`.
    async fn questions(&self, quiz_id: &Uuid) -> Result<Vec<Question>, QuizRepositoryError>;

    /// Store a question with its choices and return the new question count.
    async fn add_question(&self, question: &Question) -> Result<i32, QuizRepositoryError>;

    /// Delete a question and return the new question count, or `None` when
    /// the question is not part of the quiz.
    async fn remove_question(
        &self,
        quiz_id: &Uuid,
        question_id: &Uuid,
    ) -> Result<Option<i32>, QuizRepositoryError>;
}
