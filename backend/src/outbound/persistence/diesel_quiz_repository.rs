//! PostgreSQL-backed `QuizRepository` implementation using Diesel ORM.
//!
//! Questions and their choices are written in one transaction together with
//! the quiz's `total_questions` counter.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{QuizRepository, QuizRepositoryError};
use crate::domain::{Choice, Question, Quiz, QuizSettings, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_helpers::{count_to_u64, page_window, parse_stored};
use super::models::{ChoiceRow, QuestionRow, QuizRow};
use super::pool::DbPool;
use super::schema::{choices, questions, quizzes};

/// Diesel-backed implementation of the quiz repository port.
#[derive(Clone)]
pub struct DieselQuizRepository {
    pool: DbPool,
}

impl DieselQuizRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn quiz_to_row(quiz: &Quiz) -> QuizRow {
    let settings = &quiz.settings;
    QuizRow {
        id: quiz.id,
        title: quiz.title.clone(),
        description: quiz.description.clone(),
        module_id: quiz.module_id,
        created_by: quiz.created_by.map(|id| *id.as_uuid()),
        difficulty: settings.difficulty.as_str().to_owned(),
        total_questions: quiz.total_questions,
        passing_score: settings.passing_score,
        time_limit_minutes: settings.time_limit_minutes,
        is_published: settings.is_published,
        shuffle_questions: settings.shuffle_questions,
        show_answers: settings.show_answers,
        max_attempts: settings.max_attempts,
        created_at: quiz.created_at,
        updated_at: quiz.updated_at,
    }
}

fn row_to_quiz(row: QuizRow) -> Result<Quiz, QuizRepositoryError> {
    Ok(Quiz {
        id: row.id,
        settings: QuizSettings {
            difficulty: parse_stored("difficulty", &row.difficulty)?,
            passing_score: row.passing_score,
            time_limit_minutes: row.time_limit_minutes,
            is_published: row.is_published,
            shuffle_questions: row.shuffle_questions,
            show_answers: row.show_answers,
            max_attempts: row.max_attempts,
        },
        title: row.title,
        description: row.description,
        module_id: row.module_id,
        created_by: row.created_by.map(UserId::from_uuid),
        total_questions: row.total_questions,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_quizzes(rows: Vec<QuizRow>) -> Result<Vec<Quiz>, QuizRepositoryError> {
    rows.into_iter().map(row_to_quiz).collect()
}

fn question_to_rows(question: &Question) -> (QuestionRow, Vec<ChoiceRow>) {
    let row = QuestionRow {
        id: question.id,
        quiz_id: question.quiz_id,
        text: question.text.clone(),
        question_type: question.question_type.as_str().to_owned(),
        sort_order: question.order,
        explanation: question.explanation.clone(),
        points: question.points,
    };
    let choice_rows = question
        .choices
        .iter()
        .map(|choice| ChoiceRow {
            id: choice.id,
            question_id: choice.question_id,
            text: choice.text.clone(),
            is_correct: choice.is_correct,
            sort_order: choice.order,
        })
        .collect();
    (row, choice_rows)
}

/// Assemble questions from rows already sorted by `sort_order`.
fn rows_to_questions(
    question_rows: Vec<QuestionRow>,
    choice_rows: Vec<ChoiceRow>,
) -> Result<Vec<Question>, QuizRepositoryError> {
    let mut grouped: HashMap<Uuid, Vec<Choice>> = HashMap::new();
    for row in choice_rows {
        grouped.entry(row.question_id).or_default().push(Choice {
            id: row.id,
            question_id: row.question_id,
            text: row.text,
            is_correct: row.is_correct,
            order: row.sort_order,
        });
    }
    question_rows
        .into_iter()
        .map(|row| {
            Ok(Question {
                question_type: parse_stored("question_type", &row.question_type)?,
                choices: grouped.remove(&row.id).unwrap_or_default(),
                id: row.id,
                quiz_id: row.quiz_id,
                text: row.text,
                order: row.sort_order,
                explanation: row.explanation,
                points: row.points,
            })
        })
        .collect()
}

/// Recount a quiz's questions and store the result on the quiz row.
async fn refresh_total(
    conn: &mut AsyncPgConnection,
    quiz_id: Uuid,
) -> Result<i32, diesel::result::Error> {
    let total: i64 = questions::table
        .filter(questions::quiz_id.eq(quiz_id))
        .count()
        .get_result(conn)
        .await?;
    let total = i32::try_from(total).unwrap_or(i32::MAX);
    diesel::update(quizzes::table.find(quiz_id))
        .set(quizzes::total_questions.eq(total))
        .execute(conn)
        .await?;
    Ok(total)
}

#[async_trait]
impl QuizRepository for DieselQuizRepository {
    async fn insert(&self, quiz: &Quiz) -> Result<(), QuizRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(quizzes::table)
            .values(&quiz_to_row(quiz))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, quiz: &Quiz) -> Result<(), QuizRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = quiz_to_row(quiz);
        // The question counter is owned by add/remove question.
        diesel::update(quizzes::table.find(quiz.id))
            .set((
                quizzes::title.eq(row.title),
                quizzes::description.eq(row.description),
                quizzes::module_id.eq(row.module_id),
                quizzes::difficulty.eq(row.difficulty),
                quizzes::passing_score.eq(row.passing_score),
                quizzes::time_limit_minutes.eq(row.time_limit_minutes),
                quizzes::is_published.eq(row.is_published),
                quizzes::shuffle_questions.eq(row.shuffle_questions),
                quizzes::show_answers.eq(row.show_answers),
                quizzes::max_attempts.eq(row.max_attempts),
                quizzes::updated_at.eq(row.updated_at),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Quiz>, QuizRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = quizzes::table
            .find(id)
            .select(QuizRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_quiz).transpose()
    }

    async fn list_published(&self, page: PageRequest) -> Result<Page<Quiz>, QuizRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (offset, limit) = page_window(page)?;
        let total: i64 = quizzes::table
            .filter(quizzes::is_published.eq(true))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows = quizzes::table
            .filter(quizzes::is_published.eq(true))
            .order((quizzes::created_at.desc(), quizzes::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(QuizRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Page::new(rows_to_quizzes(rows)?, page, count_to_u64(total)?))
    }

    async fn published_for_module(&self, module_id: &Uuid) -> Result<Vec<Quiz>, QuizRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = quizzes::table
            .filter(quizzes::module_id.eq(module_id).and(quizzes::is_published.eq(true)))
            .order(quizzes::created_at.desc())
            .select(QuizRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_quizzes(rows)
    }

    async fn list_by_author(&self, author: &UserId) -> Result<Vec<Quiz>, QuizRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = quizzes::table
            .filter(quizzes::created_by.eq(author.as_uuid()))
            .order(quizzes::created_at.desc())
            .select(QuizRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_quizzes(rows)
    }

    async fn count(&self) -> Result<u64, QuizRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = quizzes::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        count_to_u64(total)
    }

    async fn questions(&self, quiz_id: &Uuid) -> Result<Vec<Question>, QuizRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let question_rows: Vec<QuestionRow> = questions::table
            .filter(questions::quiz_id.eq(quiz_id))
            .order((questions::sort_order.asc(), questions::id.asc()))
            .select(QuestionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let ids: Vec<Uuid> = question_rows.iter().map(|row| row.id).collect();
        let choice_rows: Vec<ChoiceRow> = choices::table
            .filter(choices::question_id.eq_any(ids))
            .order((choices::sort_order.asc(), choices::id.asc()))
            .select(ChoiceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_questions(question_rows, choice_rows)
    }

    async fn add_question(&self, question: &Question) -> Result<i32, QuizRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (question_row, choice_rows) = question_to_rows(question);
        let quiz_id = question.quiz_id;
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(questions::table)
                    .values(&question_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(choices::table)
                    .values(&choice_rows)
                    .execute(conn)
                    .await?;
                refresh_total(conn, quiz_id).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn remove_question(
        &self,
        quiz_id: &Uuid,
        question_id: &Uuid,
    ) -> Result<Option<i32>, QuizRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (quiz_id, question_id) = (*quiz_id, *question_id);
        conn.transaction(|conn| {
            async move {
                let removed = diesel::delete(
                    questions::table
                        .filter(questions::id.eq(question_id).and(questions::quiz_id.eq(quiz_id))),
                )
                .execute(conn)
                .await?;
                if removed == 0 {
                    return Ok(None);
                }
                refresh_total(conn, quiz_id).await.map(Some)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row assembly.

    use rstest::rstest;

    use super::*;
    use crate::domain::{ChoiceForm, QuestionForm, QuestionType};

    fn question(order: i32) -> Question {
        QuestionForm {
            text: format!("Question {order}"),
            question_type: Some(QuestionType::MultipleChoice),
            choices: vec![
                ChoiceForm {
                    text: "Council".to_owned(),
                    is_correct: true,
                },
                ChoiceForm {
                    text: "Parliament".to_owned(),
                    is_correct: false,
                },
                ChoiceForm {
                    text: "Court".to_owned(),
                    is_correct: false,
                },
            ],
            ..QuestionForm::default()
        }
        .into_question(Uuid::new_v4(), order)
        .expect("valid question")
    }

    #[rstest]
    fn questions_regain_their_choices_in_order() {
        let first = question(0);
        let second = question(1);
        let (first_row, first_choices) = question_to_rows(&first);
        let (second_row, second_choices) = question_to_rows(&second);
        let mut choice_rows = second_choices;
        choice_rows.extend(first_choices);

        let restored =
            rows_to_questions(vec![first_row, second_row], choice_rows).expect("valid rows");

        assert_eq!(restored, vec![first, second]);
    }

    #[rstest]
    fn unknown_question_types_are_rejected() {
        let (mut row, _) = question_to_rows(&question(0));
        row.question_type = "essay".to_owned();
        let error = rows_to_questions(vec![row], Vec::new()).expect_err("corrupt type");
        assert!(matches!(error, QuizRepositoryError::Query { .. }));
    }
}
