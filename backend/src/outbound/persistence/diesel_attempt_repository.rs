//! PostgreSQL-backed `AttemptRepository` implementation using Diesel ORM.
//!
//! A partial unique index keeps at most one open attempt per learner and
//! quiz; completing an attempt writes the graded row and its answers in one
//! transaction.

use async_trait::async_trait;
use diesel::dsl::{avg, count_distinct, count_star};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    AttemptRepository, AttemptRepositoryError, AuthorAttemptStats, LearnerStats,
};
use crate::domain::{AttemptOutcome, QuestionAnswer, QuizAttempt, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_helpers::count_to_u64;
use super::models::{AnswerRow, AttemptRow};
use super::pool::DbPool;
use super::schema::{question_answers, quiz_attempts, quizzes};

/// Diesel-backed implementation of the attempt repository port.
#[derive(Clone)]
pub struct DieselAttemptRepository {
    pool: DbPool,
}

impl DieselAttemptRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn attempt_to_row(attempt: &QuizAttempt) -> AttemptRow {
    let outcome = attempt.outcome.as_ref();
    AttemptRow {
        id: attempt.id,
        user_id: *attempt.user_id.as_uuid(),
        quiz_id: attempt.quiz_id,
        started_at: attempt.started_at,
        completed_at: attempt.completed_at,
        score: outcome.map(|o| o.score),
        total_possible_score: attempt.total_possible_score,
        percentage: outcome.map(|o| o.percentage),
        is_passed: outcome.map(|o| o.is_passed),
        questions_attempted: outcome.map_or(0, |o| o.questions_attempted),
        questions_correct: outcome.map_or(0, |o| o.questions_correct),
        time_taken_seconds: attempt.time_taken_seconds,
    }
}

fn row_to_attempt(row: AttemptRow) -> QuizAttempt {
    let outcome = match (row.completed_at, row.score, row.percentage, row.is_passed) {
        (Some(_), Some(score), Some(percentage), Some(is_passed)) => Some(AttemptOutcome {
            score,
            total_possible_score: row.total_possible_score,
            percentage,
            is_passed,
            questions_attempted: row.questions_attempted,
            questions_correct: row.questions_correct,
        }),
        _ => None,
    };
    QuizAttempt {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        quiz_id: row.quiz_id,
        started_at: row.started_at,
        completed_at: row.completed_at,
        total_possible_score: row.total_possible_score,
        outcome,
        time_taken_seconds: row.time_taken_seconds,
    }
}

fn answer_to_row(answer: &QuestionAnswer) -> AnswerRow {
    AnswerRow {
        id: answer.id,
        attempt_id: answer.attempt_id,
        question_id: answer.question_id,
        selected_choice_id: answer.selected_choice_id,
        is_correct: answer.is_correct,
        answered_at: answer.answered_at,
    }
}

fn row_to_answer(row: AnswerRow) -> QuestionAnswer {
    QuestionAnswer {
        id: row.id,
        attempt_id: row.attempt_id,
        question_id: row.question_id,
        selected_choice_id: row.selected_choice_id,
        is_correct: row.is_correct,
        answered_at: row.answered_at,
    }
}

#[async_trait]
impl AttemptRepository for DieselAttemptRepository {
    async fn insert(&self, attempt: &QuizAttempt) -> Result<(), AttemptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(quiz_attempts::table)
            .values(&attempt_to_row(attempt))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<QuizAttempt>, AttemptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        quiz_attempts::table
            .find(id)
            .select(AttemptRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(row_to_attempt))
            .map_err(map_diesel_error)
    }

    async fn find_open(
        &self,
        user_id: &UserId,
        quiz_id: &Uuid,
    ) -> Result<Option<QuizAttempt>, AttemptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        quiz_attempts::table
            .filter(
                quiz_attempts::user_id
                    .eq(user_id.as_uuid())
                    .and(quiz_attempts::quiz_id.eq(quiz_id))
                    .and(quiz_attempts::completed_at.is_null()),
            )
            .select(AttemptRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(row_to_attempt))
            .map_err(map_diesel_error)
    }

    async fn count_for_quiz(
        &self,
        user_id: &UserId,
        quiz_id: &Uuid,
    ) -> Result<u64, AttemptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = quiz_attempts::table
            .filter(
                quiz_attempts::user_id
                    .eq(user_id.as_uuid())
                    .and(quiz_attempts::quiz_id.eq(quiz_id)),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        count_to_u64(total)
    }

    async fn best_passed(
        &self,
        user_id: &UserId,
        quiz_id: &Uuid,
    ) -> Result<Option<QuizAttempt>, AttemptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        quiz_attempts::table
            .filter(
                quiz_attempts::user_id
                    .eq(user_id.as_uuid())
                    .and(quiz_attempts::quiz_id.eq(quiz_id))
                    .and(quiz_attempts::is_passed.eq(true)),
            )
            .order((
                quiz_attempts::percentage.desc(),
                quiz_attempts::completed_at.asc(),
            ))
            .select(AttemptRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(row_to_attempt))
            .map_err(map_diesel_error)
    }

    async fn complete(
        &self,
        attempt: &QuizAttempt,
        answers: &[QuestionAnswer],
    ) -> Result<(), AttemptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = attempt_to_row(attempt);
        let answer_rows: Vec<AnswerRow> = answers.iter().map(answer_to_row).collect();
        let attempt_id = attempt.id;
        let completed = conn
            .transaction::<bool, diesel::result::Error, _>(|conn| {
                async move {
                    let updated = diesel::update(
                        quiz_attempts::table
                            .find(attempt_id)
                            .filter(quiz_attempts::completed_at.is_null()),
                    )
                    .set(&row)
                    .execute(conn)
                    .await?;
                    // Another submission already closed the attempt.
                    if updated == 0 {
                        return Ok(false);
                    }
                    if !answer_rows.is_empty() {
                        diesel::insert_into(question_answers::table)
                            .values(&answer_rows)
                            .execute(conn)
                            .await?;
                    }
                    Ok(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        if completed {
            Ok(())
        } else {
            Err(AttemptRepositoryError::conflict(
                "attempt is not open for submission",
            ))
        }
    }

    async fn answers(
        &self,
        attempt_id: &Uuid,
    ) -> Result<Vec<QuestionAnswer>, AttemptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AnswerRow> = question_answers::table
            .filter(question_answers::attempt_id.eq(attempt_id))
            .order((question_answers::answered_at.asc(), question_answers::id.asc()))
            .select(AnswerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_answer).collect())
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<QuizAttempt>, AttemptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AttemptRow> = quiz_attempts::table
            .filter(quiz_attempts::user_id.eq(user_id.as_uuid()))
            .order(quiz_attempts::started_at.desc())
            .limit(i64::from(limit))
            .select(AttemptRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_attempt).collect())
    }

    async fn learner_stats(&self, user_id: &UserId) -> Result<LearnerStats, AttemptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mine = quiz_attempts::user_id.eq(*user_id.as_uuid());
        let (total, attempted): (i64, i64) = quiz_attempts::table
            .filter(mine.clone())
            .select((count_star(), count_distinct(quiz_attempts::quiz_id)))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (passed, average): (i64, Option<f64>) = quiz_attempts::table
            .filter(mine.and(quiz_attempts::is_passed.eq(true)))
            .select((
                count_distinct(quiz_attempts::quiz_id),
                avg(quiz_attempts::percentage),
            ))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(LearnerStats {
            total_attempts: count_to_u64(total)?,
            quizzes_attempted: count_to_u64(attempted)?,
            quizzes_passed: count_to_u64(passed)?,
            average_passed_percentage: average,
        })
    }

    async fn author_stats(
        &self,
        author: &UserId,
    ) -> Result<AuthorAttemptStats, AttemptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let authored = quizzes::created_by.eq(*author.as_uuid());
        let total: i64 = quiz_attempts::table
            .inner_join(quizzes::table)
            .filter(authored.clone())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let average: Option<f64> = quiz_attempts::table
            .inner_join(quizzes::table)
            .filter(authored.and(quiz_attempts::is_passed.eq(true)))
            .select(avg(quiz_attempts::percentage))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(AuthorAttemptStats {
            total_attempts: count_to_u64(total)?,
            average_passed_percentage: average,
        })
    }

    async fn count(&self) -> Result<u64, AttemptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = quiz_attempts::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        count_to_u64(total)
    }
}
