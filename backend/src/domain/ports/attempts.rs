//! Driving port for taking quizzes.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Question, Quiz, QuizAttempt, User};

/// An open attempt with the questions to answer.
///
/// Adapters must not reveal which choices are correct.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptSheet {
    pub quiz: Quiz,
    pub attempt: QuizAttempt,
    /// Shuffled when the quiz asks for it, otherwise in question order.
    pub questions: Vec<Question>,
    /// Whether an existing open attempt was resumed.
    pub resumed: bool,
}

/// One graded answer in a result review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReview {
    pub question_id: Uuid,
    pub question_text: String,
    pub points: i32,
    pub selected_choice_id: Option<Uuid>,
    pub is_correct: bool,
    /// Only revealed when the quiz shows answers.
    pub correct_choice_id: Option<Uuid>,
    /// Only revealed when the quiz shows answers.
    pub explanation: Option<String>,
}

/// A completed attempt with its per-question review.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptResult {
    pub quiz: Quiz,
    pub attempt: QuizAttempt,
    pub answers: Vec<AnswerReview>,
}

/// Domain use-case port for quiz attempts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Attempts: Send + Sync {
    /// Resume the learner's open attempt or start a new one.
    async fn start(&self, actor: &User, quiz_id: Uuid) -> Result<AttemptSheet, Error>;

    /// Grade and complete the learner's open attempt.
    ///
    /// `answers` maps question ids to selected choice ids.
    async fn submit(
        &self,
        actor: &User,
        quiz_id: Uuid,
        answers: HashMap<Uuid, Uuid>,
    ) -> Result<QuizAttempt, Error>;

    /// Review a completed attempt owned by the actor.
    async fn result(&self, actor: &User, attempt_id: Uuid) -> Result<AttemptResult, Error>;
}
