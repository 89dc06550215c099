//! In-memory `AttemptRepository`.

use std::cmp::{Ordering, Reverse};
use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    AttemptRepository, AttemptRepositoryError, AuthorAttemptStats, LearnerStats,
};
use crate::domain::{QuestionAnswer, QuizAttempt, UserId};

use super::{MemoryStore, to_count};

fn average<'a>(attempts: impl Iterator<Item = &'a QuizAttempt>) -> Option<f64> {
    let percentages: Vec<f64> = attempts.filter_map(QuizAttempt::percentage).collect();
    if percentages.is_empty() {
        return None;
    }
    let count = f64::from(u32::try_from(percentages.len()).unwrap_or(u32::MAX));
    Some(percentages.iter().sum::<f64>() / count)
}

#[async_trait]
impl AttemptRepository for MemoryStore {
    async fn insert(&self, attempt: &QuizAttempt) -> Result<(), AttemptRepositoryError> {
        let mut tables = self.lock(AttemptRepositoryError::connection)?;
        let already_open = tables.attempts.iter().any(|row| {
            row.user_id == attempt.user_id && row.quiz_id == attempt.quiz_id && !row.is_completed()
        });
        if already_open && !attempt.is_completed() {
            return Err(AttemptRepositoryError::conflict(
                "an attempt at this quiz is already in progress",
            ));
        }
        tables.attempts.push(attempt.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<QuizAttempt>, AttemptRepositoryError> {
        let tables = self.lock(AttemptRepositoryError::connection)?;
        Ok(tables.attempts.iter().find(|row| row.id == *id).cloned())
    }

    async fn find_open(
        &self,
        user_id: &UserId,
        quiz_id: &Uuid,
    ) -> Result<Option<QuizAttempt>, AttemptRepositoryError> {
        let tables = self.lock(AttemptRepositoryError::connection)?;
        Ok(tables
            .attempts
            .iter()
            .find(|row| row.user_id == *user_id && row.quiz_id == *quiz_id && !row.is_completed())
            .cloned())
    }

    async fn count_for_quiz(
        &self,
        user_id: &UserId,
        quiz_id: &Uuid,
    ) -> Result<u64, AttemptRepositoryError> {
        let tables = self.lock(AttemptRepositoryError::connection)?;
        Ok(to_count(
            tables
                .attempts
                .iter()
                .filter(|row| row.user_id == *user_id && row.quiz_id == *quiz_id)
                .count(),
        ))
    }

    async fn best_passed(
        &self,
        user_id: &UserId,
        quiz_id: &Uuid,
    ) -> Result<Option<QuizAttempt>, AttemptRepositoryError> {
        let tables = self.lock(AttemptRepositoryError::connection)?;
        let best = tables
            .attempts
            .iter()
            .filter(|row| row.user_id == *user_id && row.quiz_id == *quiz_id && row.is_passed())
            // Highest percentage wins; ties go to the earliest completion.
            .min_by(|a, b| {
                b.percentage()
                    .partial_cmp(&a.percentage())
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.completed_at.cmp(&b.completed_at))
            });
        Ok(best.cloned())
    }

    async fn complete(
        &self,
        attempt: &QuizAttempt,
        answers: &[QuestionAnswer],
    ) -> Result<(), AttemptRepositoryError> {
        let mut tables = self.lock(AttemptRepositoryError::connection)?;
        let Some(index) = tables
            .attempts
            .iter()
            .position(|row| row.id == attempt.id && !row.is_completed())
        else {
            return Err(AttemptRepositoryError::conflict(
                "attempt is not open for submission",
            ));
        };
        let duplicate = answers.iter().any(|answer| {
            tables.answers.iter().any(|row| {
                row.attempt_id == answer.attempt_id && row.question_id == answer.question_id
            })
        });
        if duplicate {
            return Err(AttemptRepositoryError::conflict(
                "an answer for that question is already recorded",
            ));
        }
        tables.attempts[index] = attempt.clone();
        tables.answers.extend(answers.iter().cloned());
        Ok(())
    }

    async fn answers(
        &self,
        attempt_id: &Uuid,
    ) -> Result<Vec<QuestionAnswer>, AttemptRepositoryError> {
        let tables = self.lock(AttemptRepositoryError::connection)?;
        let mut answers: Vec<QuestionAnswer> = tables
            .answers
            .iter()
            .filter(|row| row.attempt_id == *attempt_id)
            .cloned()
            .collect();
        answers.sort_by_key(|row| (row.answered_at, row.id));
        Ok(answers)
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<QuizAttempt>, AttemptRepositoryError> {
        let tables = self.lock(AttemptRepositoryError::connection)?;
        let mut attempts: Vec<QuizAttempt> = tables
            .attempts
            .iter()
            .filter(|row| row.user_id == *user_id)
            .cloned()
            .collect();
        attempts.sort_by_key(|row| Reverse(row.started_at));
        attempts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(attempts)
    }

    async fn learner_stats(&self, user_id: &UserId) -> Result<LearnerStats, AttemptRepositoryError> {
        let tables = self.lock(AttemptRepositoryError::connection)?;
        let mine: Vec<&QuizAttempt> = tables
            .attempts
            .iter()
            .filter(|row| row.user_id == *user_id)
            .collect();
        let attempted: HashSet<Uuid> = mine.iter().map(|row| row.quiz_id).collect();
        let passed: HashSet<Uuid> = mine
            .iter()
            .filter(|row| row.is_passed())
            .map(|row| row.quiz_id)
            .collect();
        Ok(LearnerStats {
            total_attempts: to_count(mine.len()),
            quizzes_attempted: to_count(attempted.len()),
            quizzes_passed: to_count(passed.len()),
            average_passed_percentage: average(
                mine.iter().copied().filter(|row| row.is_passed()),
            ),
        })
    }

    async fn author_stats(
        &self,
        author: &UserId,
    ) -> Result<AuthorAttemptStats, AttemptRepositoryError> {
        let tables = self.lock(AttemptRepositoryError::connection)?;
        let authored: HashSet<Uuid> = tables
            .quizzes
            .iter()
            .filter(|quiz| quiz.created_by.as_ref() == Some(author))
            .map(|quiz| quiz.id)
            .collect();
        let attempts: Vec<&QuizAttempt> = tables
            .attempts
            .iter()
            .filter(|row| authored.contains(&row.quiz_id))
            .collect();
        Ok(AuthorAttemptStats {
            total_attempts: to_count(attempts.len()),
            average_passed_percentage: average(
                attempts.iter().copied().filter(|row| row.is_passed()),
            ),
        })
    }

    async fn count(&self) -> Result<u64, AttemptRepositoryError> {
        let tables = self.lock(AttemptRepositoryError::connection)?;
        Ok(to_count(tables.attempts.len()))
    }
}
