//! Quiz attempt service: starting, grading and reviewing attempts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use rand::seq::SliceRandom;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    AnswerReview, AttemptRepository, AttemptResult, AttemptSheet, Attempts, QuizRepository,
};
use crate::domain::quiz_service::quiz_not_found;
use crate::domain::{Error, QuestionAnswer, Quiz, QuizAttempt, Role, User, grade, total_points};

fn attempt_not_found(attempt_id: &Uuid) -> Error {
    Error::not_found(format!("attempt {attempt_id} not found"))
}

/// Attempt service over quiz and attempt repositories.
#[derive(Clone)]
pub struct AttemptService<Q, A> {
    quizzes: Arc<Q>,
    attempts: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<Q, A> AttemptService<Q, A> {
    /// Create the service.
    pub fn new(quizzes: Arc<Q>, attempts: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            quizzes,
            attempts,
            clock,
        }
    }
}

impl<Q, A> AttemptService<Q, A>
where
    Q: QuizRepository,
{
    async fn published_quiz(&self, quiz_id: &Uuid) -> Result<Quiz, Error> {
        self.quizzes
            .find_by_id(quiz_id)
            .await?
            .filter(Quiz::is_published)
            .ok_or_else(|| quiz_not_found(quiz_id))
    }
}

#[async_trait]
impl<Q, A> Attempts for AttemptService<Q, A>
where
    Q: QuizRepository,
    A: AttemptRepository,
{
    async fn start(&self, actor: &User, quiz_id: Uuid) -> Result<AttemptSheet, Error> {
        actor.require_role(Role::Citizen, "take quizzes")?;
        let quiz = self.published_quiz(&quiz_id).await?;
        let mut questions = self.quizzes.questions(&quiz.id).await?;
        if questions.is_empty() {
            return Err(Error::conflict("this quiz has no questions yet")
                .with_details(json!({ "code": "quiz_has_no_questions" })));
        }

        let (attempt, resumed) = match self.attempts.find_open(&actor.id, &quiz.id).await? {
            Some(open) => (open, true),
            None => {
                let used = self.attempts.count_for_quiz(&actor.id, &quiz.id).await?;
                if quiz.attempts_exhausted(used) {
                    return Err(Error::conflict("maximum attempts reached for this quiz")
                        .with_details(json!({
                            "code": "max_attempts_reached",
                            "maxAttempts": quiz.settings.max_attempts,
                        })));
                }
                let attempt = QuizAttempt::start(
                    actor.id,
                    quiz.id,
                    total_points(&questions),
                    self.clock.utc(),
                );
                self.attempts.insert(&attempt).await?;
                info!(attempt_id = %attempt.id, quiz_id = %quiz.id, user_id = %actor.id, "started attempt");
                (attempt, false)
            }
        };

        if quiz.settings.shuffle_questions {
            questions.shuffle(&mut rand::thread_rng());
        }
        Ok(AttemptSheet {
            quiz,
            attempt,
            questions,
            resumed,
        })
    }

    async fn submit(
        &self,
        actor: &User,
        quiz_id: Uuid,
        answers: HashMap<Uuid, Uuid>,
    ) -> Result<QuizAttempt, Error> {
        actor.require_role(Role::Citizen, "take quizzes")?;
        let quiz = self
            .quizzes
            .find_by_id(&quiz_id)
            .await?
            .ok_or_else(|| quiz_not_found(&quiz_id))?;
        let mut attempt = self
            .attempts
            .find_open(&actor.id, &quiz.id)
            .await?
            .ok_or_else(|| {
                Error::conflict("no attempt in progress for this quiz")
                    .with_details(json!({ "code": "no_open_attempt" }))
            })?;
        let questions = self.quizzes.questions(&quiz.id).await?;

        let now = self.clock.utc();
        let (outcome, recorded) = grade(&quiz, &questions, attempt.id, &answers, now)?;
        attempt.complete(outcome, now);
        self.attempts.complete(&attempt, &recorded).await?;
        if let Some(outcome) = attempt.outcome.as_ref() {
            info!(
                attempt_id = %attempt.id,
                quiz_id = %quiz.id,
                score = outcome.score,
                total = outcome.total_possible_score,
                passed = outcome.is_passed,
                "completed attempt"
            );
        }
        Ok(attempt)
    }

    async fn result(&self, actor: &User, attempt_id: Uuid) -> Result<AttemptResult, Error> {
        let attempt = self
            .attempts
            .find_by_id(&attempt_id)
            .await?
            .filter(|attempt| attempt.user_id == actor.id)
            .ok_or_else(|| attempt_not_found(&attempt_id))?;
        if !attempt.is_completed() {
            return Err(Error::conflict("this attempt has not been submitted yet")
                .with_details(json!({ "code": "attempt_in_progress" })));
        }
        let quiz = self
            .quizzes
            .find_by_id(&attempt.quiz_id)
            .await?
            .ok_or_else(|| quiz_not_found(&attempt.quiz_id))?;
        let questions = self.quizzes.questions(&quiz.id).await?;
        let recorded: HashMap<Uuid, QuestionAnswer> = self
            .attempts
            .answers(&attempt.id)
            .await?
            .into_iter()
            .map(|answer| (answer.question_id, answer))
            .collect();

        let reveal = quiz.settings.show_answers;
        let answers = questions
            .into_iter()
            .map(|question| {
                let answer = recorded.get(&question.id);
                AnswerReview {
                    question_id: question.id,
                    correct_choice_id: reveal
                        .then(|| question.correct_choice().map(|choice| choice.id))
                        .flatten(),
                    explanation: if reveal { question.explanation } else { None },
                    question_text: question.text,
                    points: question.points,
                    selected_choice_id: answer.and_then(|a| a.selected_choice_id),
                    is_correct: answer.is_some_and(|a| a.is_correct),
                }
            })
            .collect();

        Ok(AttemptResult {
            quiz,
            attempt,
            answers,
        })
    }
}

#[cfg(test)]
#[path = "attempt_service_tests.rs"]
mod tests;
