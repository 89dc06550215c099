//! Driving port for quiz authoring and browsing.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Error, Question, QuestionForm, Quiz, QuizAttempt, QuizForm, User};

/// Number of quizzes per listing page.
pub const QUIZZES_PAGE_SIZE: u32 = 12;

/// Attempt history of the viewing learner.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerProgress {
    pub attempts_used: u64,
    pub best_attempt: Option<QuizAttempt>,
    pub can_attempt: bool,
}

/// A quiz as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizDetail {
    pub quiz: Quiz,
    /// Present for authenticated viewers.
    pub progress: Option<ViewerProgress>,
    /// The full question bank, for the author and admins only.
    pub questions: Option<Vec<Question>>,
}

/// Domain use-case port for quizzes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Quizzes: Send + Sync {
    /// Page through published quizzes, newest first.
    async fn list_published(&self, page: PageRequest) -> Result<Page<Quiz>, Error>;

    /// Fetch a quiz; unpublished quizzes are hidden from non-owners.
    async fn get(&self, viewer: Option<User>, quiz_id: Uuid) -> Result<QuizDetail, Error>;

    /// Create a quiz for an existing module.
    async fn create(&self, actor: &User, form: QuizForm) -> Result<Quiz, Error>;

    /// Edit a quiz as its author or an admin.
    async fn update(&self, actor: &User, quiz_id: Uuid, form: QuizForm) -> Result<Quiz, Error>;

    /// Append a validated question to a quiz.
    async fn add_question(
        &self,
        actor: &User,
        quiz_id: Uuid,
        form: QuestionForm,
    ) -> Result<Question, Error>;

    /// Remove a question from a quiz.
    async fn remove_question(
        &self,
        actor: &User,
        quiz_id: Uuid,
        question_id: Uuid,
    ) -> Result<(), Error>;
}
