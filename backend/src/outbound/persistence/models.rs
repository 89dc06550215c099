//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversion into validated domain types
//! lives next to each repository.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    choices, comment_likes, comments, discussion_threads, learning_modules, question_answers,
    questions, quiz_attempts, quizzes, users,
};

// ---------------------------------------------------------------------------
// User models
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: &'a str,
    pub bio: Option<&'a str>,
    pub profile_image_url: Option<&'a str>,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for profile and role edits. The username is immutable.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users, treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: &'a str,
    pub bio: Option<&'a str>,
    pub profile_image_url: Option<&'a str>,
    pub is_email_verified: bool,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Learning module models
// ---------------------------------------------------------------------------

/// Row struct for the learning_modules table; also used for inserts and
/// full-row updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = learning_modules, treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ModuleRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub content: String,
    pub created_by: Option<Uuid>,
    pub status: String,
    pub sort_order: i32,
    pub image_url: Option<String>,
    pub attachment_url: Option<String>,
    pub difficulty_level: String,
    pub estimated_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Quiz models
// ---------------------------------------------------------------------------

/// Row struct for the quizzes table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = quizzes, treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct QuizRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub module_id: Uuid,
    pub created_by: Option<Uuid>,
    pub difficulty: String,
    pub total_questions: i32,
    pub passing_score: i32,
    pub time_limit_minutes: Option<i32>,
    pub is_published: bool,
    pub shuffle_questions: bool,
    pub show_answers: bool,
    pub max_attempts: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for the questions table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct QuestionRow {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub text: String,
    pub question_type: String,
    pub sort_order: i32,
    pub explanation: Option<String>,
    pub points: i32,
}

/// Row struct for the choices table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = choices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChoiceRow {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    pub is_correct: bool,
    pub sort_order: i32,
}

// ---------------------------------------------------------------------------
// Attempt models
// ---------------------------------------------------------------------------

/// Row struct for the quiz_attempts table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = quiz_attempts, treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AttemptRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: Option<i32>,
    pub total_possible_score: i32,
    pub percentage: Option<f64>,
    pub is_passed: Option<bool>,
    pub questions_attempted: i32,
    pub questions_correct: i32,
    pub time_taken_seconds: Option<i64>,
}

/// Row struct for the question_answers table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = question_answers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnswerRow {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub selected_choice_id: Option<Uuid>,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Discussion models
// ---------------------------------------------------------------------------

/// Row struct for the discussion_threads table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = discussion_threads, treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ThreadRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub module_id: Option<Uuid>,
    pub status: String,
    pub is_pinned: bool,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for the comments table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = comments, treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub is_edited: bool,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for the comment_likes join table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comment_likes)]
pub(crate) struct NewCommentLikeRow {
    pub comment_id: Uuid,
    pub user_id: Uuid,
}
